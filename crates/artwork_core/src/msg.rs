#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User asked to search for artwork; opens a fresh session.
    OpenPicker {
        request: crate::SelectionRequest,
        session_token: String,
    },
    /// The message listener received something from another window.
    MessageReceived(crate::Envelope),
    /// Engine finished downloading the selected artwork.
    ArtifactReady {
        session: crate::SessionId,
        file_name: String,
        byte_len: u64,
    },
    /// Engine could not download the selected artwork.
    DownloadFailed {
        session: crate::SessionId,
        reason: String,
    },
    /// Engine assigned the artwork to the upload form.
    Injected { session: crate::SessionId },
    /// Engine could not assign the artwork.
    InjectionFailed {
        session: crate::SessionId,
        failure: InjectFailure,
    },
    /// The picker window went away (closed or its channel dropped).
    PickerClosed,
    /// The host page is being torn down.
    HostClosing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectFailure {
    InputNotFound,
    Other(String),
}
