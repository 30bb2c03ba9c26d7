//! Puts an artifact into the host page's upload form.
use std::fmt;
use std::time::Duration;

use artwork_core::FormFields;
use artwork_logging::{artwork_debug, artwork_info, artwork_warn};

use crate::artifact::FileArtifact;
use crate::poll::await_condition;

/// Form controls the pipeline touches, each with its selectors in lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormControl {
    FileInput,
    Title,
    Description,
}

impl FormControl {
    pub const ALL: [FormControl; 3] = [
        FormControl::FileInput,
        FormControl::Title,
        FormControl::Description,
    ];

    pub fn selectors(self) -> &'static [&'static str] {
        match self {
            FormControl::FileInput => &[r#"input#id_image[type="file"][name="image"]"#],
            FormControl::Title => &[r#"input#id_title[name="title"]"#, r#"input[name="title"]"#],
            FormControl::Description => &[
                r#"textarea#id_description[name="description"]"#,
                r#"textarea[name="description"]"#,
            ],
        }
    }
}

impl fmt::Display for FormControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormControl::FileInput => write!(f, "file input"),
            FormControl::Title => write!(f, "title"),
            FormControl::Description => write!(f, "description"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEventKind {
    Change,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormEvent {
    pub kind: FormEventKind,
    pub bubbles: bool,
}

impl FormEvent {
    pub fn bubbling(kind: FormEventKind) -> Self {
        Self {
            kind,
            bubbles: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("{0} not found")]
    Missing(FormControl),
    #[error("{0} is not interactable")]
    NotInteractable(FormControl),
    #[error("form rejected the operation: {0}")]
    Rejected(String),
}

/// The host page's form as the injection pipeline can drive it.
pub trait HostForm: Send + Sync {
    fn has_control(&self, control: FormControl) -> bool;
    /// Present, visible and enabled.
    fn is_interactable(&self, control: FormControl) -> bool;
    /// Replaces the file input's selection with exactly `artifact`.
    fn assign_file(&self, artifact: &FileArtifact) -> Result<(), FormError>;
    fn set_value(&self, control: FormControl, value: &str) -> Result<(), FormError>;
    fn dispatch(&self, control: FormControl, event: FormEvent) -> Result<(), FormError>;
}

#[derive(Debug, Clone)]
pub struct InjectSettings {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for InjectSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InjectError {
    #[error("file input did not appear within {timeout:?}")]
    InputNotFound { timeout: Duration },
    #[error("injection failed: {0}")]
    Injection(String),
}

impl From<FormError> for InjectError {
    fn from(err: FormError) -> Self {
        InjectError::Injection(err.to_string())
    }
}

/// Waits for the file input, assigns `artifact` and fires `change` then `input`.
pub async fn inject(
    artifact: &FileArtifact,
    form: &dyn HostForm,
    settings: &InjectSettings,
) -> Result<(), InjectError> {
    await_condition(
        || form.is_interactable(FormControl::FileInput).then_some(()),
        settings.poll_interval,
        settings.timeout,
    )
    .await
    .map_err(|err| InjectError::InputNotFound {
        timeout: err.timeout,
    })?;

    form.assign_file(artifact)?;
    for kind in [FormEventKind::Change, FormEventKind::Input] {
        form.dispatch(FormControl::FileInput, FormEvent::bubbling(kind))?;
    }
    artwork_info!("Injected {} into the upload form", artifact.file_name);
    Ok(())
}

/// Which metadata fields ended up filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetadataReport {
    pub title: bool,
    pub description: bool,
}

/// Best effort: absent fields are skipped and failures only logged.
pub fn fill_metadata(form: &dyn HostForm, fields: &FormFields) -> MetadataReport {
    MetadataReport {
        title: fill_field(form, FormControl::Title, &fields.title),
        description: fill_field(form, FormControl::Description, &fields.description),
    }
}

fn fill_field(form: &dyn HostForm, control: FormControl, value: &str) -> bool {
    if !form.has_control(control) {
        artwork_debug!("No {} field on the form; skipping", control);
        return false;
    }
    let result = form.set_value(control, value).and_then(|()| {
        [FormEventKind::Input, FormEventKind::Change]
            .into_iter()
            .try_for_each(|kind| form.dispatch(control, FormEvent::bubbling(kind)))
    });
    match result {
        Ok(()) => true,
        Err(err) => {
            artwork_warn!("Could not fill {}: {}", control, err);
            false
        }
    }
}
