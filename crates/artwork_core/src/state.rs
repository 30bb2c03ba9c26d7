use std::fmt;

use crate::view_model::ControllerView;
use crate::{ArtworkMessage, Config, SelectionRequest};

pub type SessionId = u64;

pub const STATUS_READY: &str = "Ready to search for artwork.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    AwaitingSelection,
    Downloading,
    Injecting,
    Complete,
    Failed(FailureReason),
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Complete | SessionState::Failed(_))
    }

    pub fn is_working(&self) -> bool {
        matches!(self, SessionState::Downloading | SessionState::Injecting)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    Download(String),
    InputNotFound,
    Injection(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Download(message) => write!(f, "download failed: {message}"),
            FailureReason::InputNotFound => write!(
                f,
                "upload input not found; make sure the upload form is open"
            ),
            FailureReason::Injection(message) => write!(f, "could not set artwork: {message}"),
        }
    }
}

/// Controller state for the single live session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerState {
    config: Config,
    session: SessionState,
    session_id: SessionId,
    request: Option<SelectionRequest>,
    session_token: Option<String>,
    selection: Option<ArtworkMessage>,
    status: String,
    dirty: bool,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl ControllerState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            session: SessionState::Idle,
            session_id: 0,
            request: None,
            session_token: None,
            selection: None,
            status: STATUS_READY.to_string(),
            dirty: false,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn request(&self) -> Option<&SelectionRequest> {
        self.request.as_ref()
    }

    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    pub fn selection(&self) -> Option<&ArtworkMessage> {
        self.selection.as_ref()
    }

    pub fn view(&self) -> ControllerView {
        ControllerView {
            session: self.session.clone(),
            session_id: self.session_id,
            status: self.status.clone(),
            artist: self.request.as_ref().map(|r| r.artist().to_string()),
            album: self.request.as_ref().map(|r| r.album().to_string()),
            artwork_url: self.selection.as_ref().map(|s| s.url.clone()),
            release_date: self.selection.as_ref().and_then(|s| s.release_date.clone()),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn begin_session(&mut self, request: SelectionRequest, token: String) {
        self.session_id += 1;
        self.request = Some(request);
        self.session_token = Some(token);
        self.selection = None;
        self.session = SessionState::AwaitingSelection;
        self.dirty = true;
    }

    pub(crate) fn accept_selection(&mut self, selection: ArtworkMessage) {
        self.selection = Some(selection);
        self.session = SessionState::Downloading;
        self.dirty = true;
    }

    pub(crate) fn transition(&mut self, next: SessionState) {
        self.session = next;
        self.dirty = true;
    }

    pub(crate) fn end_session(&mut self) {
        self.session = SessionState::Idle;
        self.session_token = None;
        self.dirty = true;
    }

    pub(crate) fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.dirty = true;
    }
}
