//! Turns a downloaded image into a named file ready for a form's file input.
use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use url::Url;

use artwork_logging::artwork_info;

use crate::fetch::ArtworkFetcher;
use crate::DownloadError;

/// Every artifact gets this stem; remote file names are never reused.
pub const ARTIFACT_BASE_NAME: &str = "Uploaded With Artwork Upload Helper";
pub const DEFAULT_EXTENSION: &str = "jpg";
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

const KNOWN_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "tiff", "svg"];

const MIME_EXTENSIONS: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/jpg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
    ("image/bmp", "bmp"),
    ("image/tiff", "tiff"),
    ("image/svg+xml", "svg"),
];

/// Raw bytes with an optional type and no name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub bytes: Bytes,
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileArtifact {
    pub bytes: Bytes,
    pub mime_type: String,
    pub file_name: String,
}

impl FileArtifact {
    /// Attaches a name and a type to a bare blob so every consumer sees the same shape.
    pub fn from_blob(blob: Blob, file_name: impl Into<String>) -> Self {
        let mime_type = blob
            .mime_type
            .map(|mime| essence(&mime).to_string())
            .filter(|mime| !mime.is_empty())
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());
        Self {
            bytes: blob.bytes,
            mime_type,
            file_name: file_name.into(),
        }
    }

    pub fn byte_len(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Extension from the last path segment, ignoring query and fragment.
pub fn extension_from_url(url: &str) -> Option<&'static str> {
    let parsed = Url::parse(url).ok()?;
    let last = parsed.path_segments()?.next_back()?;
    let (_, ext) = last.rsplit_once('.')?;
    KNOWN_EXTENSIONS
        .iter()
        .find(|known| known.eq_ignore_ascii_case(ext))
        .copied()
}

pub fn extension_from_mime(content_type: &str) -> Option<&'static str> {
    let essence = essence(content_type);
    MIME_EXTENSIONS
        .iter()
        .find(|(mime, _)| mime.eq_ignore_ascii_case(essence))
        .map(|(_, ext)| *ext)
}

pub fn infer_extension(url: &str, content_type: Option<&str>) -> &'static str {
    extension_from_url(url)
        .or_else(|| content_type.and_then(extension_from_mime))
        .unwrap_or(DEFAULT_EXTENSION)
}

fn essence(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
}

/// Downloads `url` and wraps the bytes as `ARTIFACT_BASE_NAME.<ext>`.
pub async fn acquire(
    fetcher: &dyn ArtworkFetcher,
    url: &str,
    cancel: &CancellationToken,
) -> Result<FileArtifact, DownloadError> {
    let output = fetcher.fetch(url, cancel).await?;
    let content_type = output.metadata.content_type.as_deref();
    let extension = infer_extension(url, content_type);
    let blob = Blob {
        bytes: Bytes::from(output.bytes),
        mime_type: output.metadata.content_type.clone(),
    };
    let artifact = FileArtifact::from_blob(blob, format!("{ARTIFACT_BASE_NAME}.{extension}"));
    artwork_info!(
        "Prepared {} ({} bytes, {})",
        artifact.file_name,
        artifact.byte_len(),
        artifact.mime_type
    );
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_extension_ignores_query_and_case() {
        assert_eq!(extension_from_url("https://x/y.PNG?z=1"), Some("png"));
        assert_eq!(extension_from_url("https://x/y.jpeg#frag"), Some("jpeg"));
        assert_eq!(extension_from_url("https://x/y.php?img=a.png"), None);
        assert_eq!(extension_from_url("https://x/cover"), None);
    }

    #[test]
    fn mime_table_strips_parameters() {
        assert_eq!(extension_from_mime("image/svg+xml; charset=utf-8"), Some("svg"));
        assert_eq!(extension_from_mime("IMAGE/JPEG"), Some("jpg"));
        assert_eq!(extension_from_mime("application/octet-stream"), None);
    }

    #[test]
    fn blob_without_type_defaults_to_jpeg() {
        let artifact = FileArtifact::from_blob(
            Blob {
                bytes: Bytes::from_static(b"\xff\xd8"),
                mime_type: None,
            },
            "a.jpg",
        );
        assert_eq!(artifact.mime_type, DEFAULT_MIME_TYPE);
        assert_eq!(artifact.byte_len(), 2);
    }
}
