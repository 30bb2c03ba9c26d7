use std::fmt;

use artwork_core::{InjectFailure, Msg, SessionId};

use crate::inject::InjectError;

/// Completion of an engine command, tagged with the session that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    ArtifactReady {
        session: SessionId,
        file_name: String,
        byte_len: u64,
    },
    DownloadFailed {
        session: SessionId,
        error: DownloadError,
    },
    Injected {
        session: SessionId,
    },
    InjectionFailed {
        session: SessionId,
        error: InjectError,
    },
}

impl EngineEvent {
    pub fn session(&self) -> SessionId {
        match self {
            EngineEvent::ArtifactReady { session, .. }
            | EngineEvent::DownloadFailed { session, .. }
            | EngineEvent::Injected { session }
            | EngineEvent::InjectionFailed { session, .. } => *session,
        }
    }

    /// Translates an engine completion into the controller message it stands for.
    pub fn into_msg(self) -> Msg {
        match self {
            EngineEvent::ArtifactReady {
                session,
                file_name,
                byte_len,
            } => Msg::ArtifactReady {
                session,
                file_name,
                byte_len,
            },
            EngineEvent::DownloadFailed { session, error } => Msg::DownloadFailed {
                session,
                reason: error.to_string(),
            },
            EngineEvent::Injected { session } => Msg::Injected { session },
            EngineEvent::InjectionFailed {
                session,
                error: InjectError::InputNotFound { .. },
            } => Msg::InjectionFailed {
                session,
                failure: InjectFailure::InputNotFound,
            },
            EngineEvent::InjectionFailed { session, error } => Msg::InjectionFailed {
                session,
                failure: InjectFailure::Other(error.to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    pub final_url: String,
    pub redirect_count: usize,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct DownloadError {
    pub kind: DownloadFailureKind,
    pub message: String,
}

impl DownloadError {
    pub(crate) fn new(kind: DownloadFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadFailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Cancelled,
    Network,
}

impl fmt::Display for DownloadFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadFailureKind::InvalidUrl => write!(f, "invalid url"),
            DownloadFailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            DownloadFailureKind::Timeout => write!(f, "timeout"),
            DownloadFailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            DownloadFailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            DownloadFailureKind::Cancelled => write!(f, "cancelled"),
            DownloadFailureKind::Network => write!(f, "network error"),
        }
    }
}
