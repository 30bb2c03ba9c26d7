use std::fs;

use artwork_engine::{write_atomic, PersistError};
use tempfile::TempDir;

#[test]
fn missing_directories_are_created() {
    let temp = TempDir::new().unwrap();
    let nested = temp.path().join("covers").join("saved");

    let path = write_atomic(&nested, "cover.jpg", b"\xff\xd8").unwrap();
    assert_eq!(path, nested.join("cover.jpg"));
    assert_eq!(fs::read(&path).unwrap(), b"\xff\xd8");
}

#[test]
fn second_write_replaces_the_first_and_leaves_no_temp_files() {
    let temp = TempDir::new().unwrap();

    write_atomic(temp.path(), "artwork_picker.ron", b"(debug: true)").unwrap();
    let path = write_atomic(temp.path(), "artwork_picker.ron", b"()").unwrap();

    assert_eq!(fs::read(&path).unwrap(), b"()");
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn file_in_place_of_directory_is_rejected() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("not_a_dir");
    fs::write(&blocker, "x").unwrap();

    let err = write_atomic(&blocker, "cover.jpg", b"data").unwrap_err();
    assert!(matches!(err, PersistError::Dir { .. }));
    assert_eq!(fs::read(&blocker).unwrap(), b"x");
}
