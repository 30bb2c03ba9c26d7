use crate::{SessionId, SessionState};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ControllerView {
    pub session: SessionState,
    pub session_id: SessionId,
    pub status: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub artwork_url: Option<String>,
    pub release_date: Option<String>,
    pub dirty: bool,
}
