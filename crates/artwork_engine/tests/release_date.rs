use artwork_engine::{extract_release_date, match_date};
use scraper::Html;

fn date_of(html: &str) -> Option<String> {
    extract_release_date(&Html::parse_document(html))
}

#[test]
fn first_match_in_document_order_wins() {
    let html = r#"<table><tr><td>Label</td><td>12.03.1998</td></tr></table>
        <p>2021-01-01</p>"#;
    assert_eq!(date_of(html).as_deref(), Some("12.03.1998"));
}

#[test]
fn data_attribute_is_read_before_text() {
    let html = r#"<span data-release="2020-05-01">Out now</span>"#;
    assert_eq!(date_of(html).as_deref(), Some("2020-05-01"));
}

#[test]
fn month_name_formats_are_recognised() {
    assert_eq!(match_date("March 3, 2001").as_deref(), Some("March 3, 2001"));
    assert_eq!(match_date("3 Sept 2001").as_deref(), Some("3 Sept 2001"));
}

#[test]
fn years_must_be_four_digits_in_range() {
    assert_eq!(match_date("123"), None);
    assert_eq!(match_date("12345"), None);
    assert_eq!(match_date("1850"), None);
    assert_eq!(match_date("Tracks 12345 and 999"), None);
    assert_eq!(match_date("1999").as_deref(), Some("1999"));
}

#[test]
fn meta_tag_is_the_fallback() {
    let html = r#"<html><head><meta property="music:release_date" content="2011-09-26"></head>
        <body><p>no dates here</p></body></html>"#;
    assert_eq!(date_of(html).as_deref(), Some("2011-09-26"));
}

#[test]
fn page_without_dates_yields_none() {
    assert_eq!(date_of("<p>Cover art</p><div>12345</div>"), None);
}
