use std::sync::LazyLock;

use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use regex::bytes::Regex;

/// Browsers only honour a charset declared in the first 1024 bytes.
const PRESCAN_LEN: usize = 1024;

static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([a-z0-9_:.\-]+)"#).expect("meta charset pattern")
});

/// A saved page turned into UTF-8 text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPage {
    pub html: String,
    pub encoding_label: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("failed to decode page with {encoding}: {message}")]
    DecodeFailure { encoding: String, message: String },
}

/// Decodes a saved page: BOM, then the charset its `<meta>` declares, then detection.
///
/// Picker and host pages are saved to disk as raw bytes; they are not
/// guaranteed to be UTF-8.
pub fn decode_page(bytes: &[u8]) -> Result<DecodedPage, DecodeError> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(encoding) = declared_charset(bytes) {
        return decode_with(bytes, encoding);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    decode_with(bytes, detector.guess(None, true))
}

/// Covers both `<meta charset=..>` and the `http-equiv="Content-Type"` form.
fn declared_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(PRESCAN_LEN)];
    let label = META_CHARSET.captures(head)?.get(1)?;
    Encoding::for_label(label.as_bytes())
}

fn decode_with(bytes: &[u8], encoding: &'static Encoding) -> Result<DecodedPage, DecodeError> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(DecodeError::DecodeFailure {
            encoding: encoding.name().to_string(),
            message: "malformed byte sequence".into(),
        });
    }
    Ok(DecodedPage {
        html: text.into_owned(),
        encoding_label: encoding.name().to_string(),
    })
}
