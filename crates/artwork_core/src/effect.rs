#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Open the picker window at `url`.
    OpenPicker { url: String },
    /// Download the selected artwork.
    Acquire {
        session: crate::SessionId,
        url: String,
    },
    /// Assign the downloaded artwork to the upload form and fill the text fields.
    Inject {
        session: crate::SessionId,
        fields: crate::FormFields,
    },
    /// Tell the user the automatic path failed and offer to open `url` in a new tab.
    OfferManualFallback { url: String },
    /// Abandon any download or injection still running.
    CancelInFlight,
}
