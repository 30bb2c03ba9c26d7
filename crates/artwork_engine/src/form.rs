use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use scraper::{ElementRef, Html, Selector};

use crate::artifact::FileArtifact;
use crate::inject::{FormControl, FormError, FormEvent, HostForm};

#[derive(Debug, Clone, PartialEq, Eq)]
struct ControlSnapshot {
    interactable: bool,
}

#[derive(Debug, Default)]
struct FormState {
    controls: HashMap<FormControl, ControlSnapshot>,
    values: HashMap<FormControl, String>,
    file: Option<FileArtifact>,
    events: Vec<(FormControl, FormEvent)>,
}

/// In-memory host upload form built from the page's HTML.
///
/// Only the plain data scraped out of the page is kept, so the form can be
/// shared with the engine thread. Assigned files, values and dispatched events
/// are recorded for inspection.
#[derive(Debug, Default)]
pub struct FormDocument {
    state: Mutex<FormState>,
}

impl FormDocument {
    pub fn parse(html: &str) -> Self {
        let document = Self::default();
        document.load(html);
        document
    }

    /// Re-reads the controls from `html`, as after the page mutated its DOM.
    ///
    /// Values are taken from the new markup; the file selection and event log survive.
    pub fn load(&self, html: &str) {
        let (controls, values) = scan(html);
        if let Ok(mut state) = self.state.lock() {
            state.controls = controls;
            state.values = values;
        }
    }

    pub fn value(&self, control: FormControl) -> Option<String> {
        self.lock().ok()?.values.get(&control).cloned()
    }

    pub fn file(&self) -> Option<FileArtifact> {
        self.lock().ok()?.file.clone()
    }

    pub fn events(&self) -> Vec<(FormControl, FormEvent)> {
        self.lock()
            .map(|state| state.events.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, FormState>, FormError> {
        self.state
            .lock()
            .map_err(|_| FormError::Rejected("form state poisoned".into()))
    }

    fn require(state: &FormState, control: FormControl) -> Result<(), FormError> {
        match state.controls.get(&control) {
            None => Err(FormError::Missing(control)),
            Some(snapshot) if !snapshot.interactable => Err(FormError::NotInteractable(control)),
            Some(_) => Ok(()),
        }
    }
}

impl HostForm for FormDocument {
    fn has_control(&self, control: FormControl) -> bool {
        self.lock()
            .map(|state| state.controls.contains_key(&control))
            .unwrap_or(false)
    }

    fn is_interactable(&self, control: FormControl) -> bool {
        self.lock()
            .map(|state| {
                state
                    .controls
                    .get(&control)
                    .is_some_and(|snapshot| snapshot.interactable)
            })
            .unwrap_or(false)
    }

    fn assign_file(&self, artifact: &FileArtifact) -> Result<(), FormError> {
        let mut state = self.lock()?;
        Self::require(&state, FormControl::FileInput)?;
        state.file = Some(artifact.clone());
        state
            .values
            .insert(FormControl::FileInput, artifact.file_name.clone());
        Ok(())
    }

    fn set_value(&self, control: FormControl, value: &str) -> Result<(), FormError> {
        let mut state = self.lock()?;
        if control == FormControl::FileInput {
            return Err(FormError::Rejected(
                "file inputs only accept a file selection".into(),
            ));
        }
        Self::require(&state, control)?;
        state.values.insert(control, value.to_string());
        Ok(())
    }

    fn dispatch(&self, control: FormControl, event: FormEvent) -> Result<(), FormError> {
        let mut state = self.lock()?;
        if !state.controls.contains_key(&control) {
            return Err(FormError::Missing(control));
        }
        state.events.push((control, event));
        Ok(())
    }
}

fn scan(html: &str) -> (HashMap<FormControl, ControlSnapshot>, HashMap<FormControl, String>) {
    let document = Html::parse_document(html);
    let mut controls = HashMap::new();
    let mut values = HashMap::new();
    for control in FormControl::ALL {
        let Some(element) = find_control(&document, control) else {
            continue;
        };
        controls.insert(
            control,
            ControlSnapshot {
                interactable: is_visible(element) && element.value().attr("disabled").is_none(),
            },
        );
        let value = match element.value().name() {
            "textarea" => element.text().collect::<String>(),
            _ => element.value().attr("value").unwrap_or_default().to_string(),
        };
        if control != FormControl::FileInput {
            values.insert(control, value);
        }
    }
    (controls, values)
}

fn find_control(document: &Html, control: FormControl) -> Option<ElementRef<'_>> {
    control.selectors().iter().find_map(|raw| {
        let selector = Selector::parse(raw).ok()?;
        document.select(&selector).next()
    })
}

/// Hidden when the element is `type=hidden`, or it or any ancestor carries
/// `hidden` or an inline `display: none` / `visibility: hidden`.
fn is_visible(element: ElementRef<'_>) -> bool {
    if element
        .value()
        .attr("type")
        .is_some_and(|kind| kind.eq_ignore_ascii_case("hidden"))
    {
        return false;
    }
    std::iter::once(element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .all(|el| !hides(el))
}

fn hides(element: ElementRef<'_>) -> bool {
    let attrs = element.value();
    if attrs.attr("hidden").is_some() {
        return true;
    }
    let Some(style) = attrs.attr("style") else {
        return false;
    };
    let compact: String = style
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    compact.contains("display:none") || compact.contains("visibility:hidden")
}
