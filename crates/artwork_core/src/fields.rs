use crate::request::SelectionRequest;

/// Values written into the host form's title and description controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFields {
    pub title: String,
    pub description: String,
}

impl FormFields {
    pub fn compose(request: &SelectionRequest, release_date: Option<&str>) -> Self {
        let title = format!("{} - {}", request.artist(), request.album());
        let description = match release_date.map(str::trim).filter(|d| !d.is_empty()) {
            Some(date) => format!("Released: {date}"),
            None => format!(
                "Album artwork for {} by {}",
                request.album(),
                request.artist()
            ),
        };
        Self { title, description }
    }
}
