use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// Value of `kind` on every selection message.
pub const ARTWORK_SELECTED: &str = "artworkSelected";

/// What the platform hands the listener: the sender's origin plus the structured payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub origin: String,
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePayload {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
}

/// `{ "kind": "artworkSelected", "data": { "url", "releaseDate"?, "session"? } }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub kind: String,
    pub data: WirePayload,
}

/// A selection the controller may act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkMessage {
    pub url: String,
    pub release_date: Option<String>,
    pub session: Option<String>,
}

impl ArtworkMessage {
    pub fn to_wire(&self) -> WireMessage {
        WireMessage {
            kind: ARTWORK_SELECTED.to_string(),
            data: WirePayload {
                url: self.url.clone(),
                release_date: self.release_date.clone(),
                session: self.session.clone(),
            },
        }
    }

    pub fn to_value(&self) -> Value {
        // Plain strings and options always serialise.
        serde_json::to_value(self.to_wire()).unwrap_or(Value::Null)
    }
}

/// Why an incoming message was dropped. Never surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportIgnored {
    ForeignOrigin,
    Malformed,
    WrongKind,
    MissingUrl,
    RelativeUrl,
    SessionMismatch,
}

/// Accepts `envelope` only from `allowed_origin`, with the selection shape and,
/// when `expected_session` is set, the matching session token.
pub fn authenticate(
    envelope: &Envelope,
    allowed_origin: &str,
    expected_session: Option<&str>,
) -> Result<ArtworkMessage, TransportIgnored> {
    if normalize_origin(&envelope.origin) != normalize_origin(allowed_origin) {
        return Err(TransportIgnored::ForeignOrigin);
    }

    let object = envelope.data.as_object().ok_or(TransportIgnored::Malformed)?;
    match object.get("kind").and_then(Value::as_str) {
        Some(ARTWORK_SELECTED) => {}
        Some(_) => return Err(TransportIgnored::WrongKind),
        None => return Err(TransportIgnored::Malformed),
    }

    let payload = object
        .get("data")
        .and_then(Value::as_object)
        .ok_or(TransportIgnored::Malformed)?;
    let url = payload
        .get("url")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or(TransportIgnored::MissingUrl)?;
    match Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
        _ => return Err(TransportIgnored::RelativeUrl),
    }

    let session = payload
        .get("session")
        .and_then(Value::as_str)
        .map(str::to_string);
    if let Some(expected) = expected_session {
        if session.as_deref() != Some(expected) {
            return Err(TransportIgnored::SessionMismatch);
        }
    }

    let release_date = payload
        .get("releaseDate")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|date| !date.is_empty())
        .map(str::to_string);

    Ok(ArtworkMessage {
        url: url.to_string(),
        release_date,
        session,
    })
}

fn normalize_origin(origin: &str) -> &str {
    origin.trim().trim_end_matches('/')
}
