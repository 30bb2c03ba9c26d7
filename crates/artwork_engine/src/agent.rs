//! The script that runs inside the picker window.
//!
//! It only activates on pages the host opened for a picker session, waits for
//! artwork to render, then turns the first usable image click into exactly one
//! selection message for the opener.
use std::sync::Arc;
use std::time::Duration;

use artwork_core::{ArtworkMessage, IDENTIFIER_PARAM, PICKER_IDENTIFIER, SESSION_PARAM};
use artwork_logging::{artwork_debug, artwork_diag, artwork_info, artwork_warn};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::poll::await_condition;
use crate::release_date::extract_release_date;
use crate::resolve::{ImageResolver, IMG};
use crate::transport::PickerWindow;

/// Images that look like artwork on the search page.
pub const ARTWORK_IMAGE_SELECTORS: &str = r#"img[src*="cover"], img[src*="album"], img[src*="artwork"], .cover img, .album-art img, a > img, button img"#;

/// The picker page as the agent can observe it.
pub trait PickerPage: Send + Sync {
    fn url(&self) -> Url;
    /// Current serialized DOM.
    fn snapshot(&self) -> String;
}

/// Identity of a picker window opened by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerSession {
    pub page_url: Url,
    pub session_token: Option<String>,
}

impl PickerSession {
    /// Recognises a picker session from the window's own URL only.
    pub fn detect(page_url: &Url, search_origin: &str) -> Option<Self> {
        let origin = page_url.origin().ascii_serialization();
        if origin != search_origin.trim_end_matches('/') {
            return None;
        }
        let mut marked = false;
        let mut session_token = None;
        for (key, value) in page_url.query_pairs() {
            if key == IDENTIFIER_PARAM && value == PICKER_IDENTIFIER {
                marked = true;
            } else if key == SESSION_PARAM && !value.is_empty() {
                session_token = Some(value.into_owned());
            }
        }
        marked.then(|| Self {
            page_url: page_url.clone(),
            session_token,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub image_wait_timeout: Duration,
    pub image_poll_interval: Duration,
    pub close_delay: Duration,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            image_wait_timeout: Duration::from_secs(10),
            image_poll_interval: Duration::from_millis(300),
            close_delay: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    /// No selection sent yet.
    Armed,
    /// A selection was sent; the window is closing.
    Consumed,
}

/// What the page should do with a click after the agent saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickDisposition {
    /// Not an image click; let the page handle it.
    PassThrough,
    /// Default action and propagation must be stopped.
    Intercepted { sent: bool },
}

pub struct Agent {
    session: PickerSession,
    host_origin: String,
    window: Arc<dyn PickerWindow>,
    resolver: ImageResolver,
    settings: AgentSettings,
    state: AgentState,
}

impl Agent {
    pub fn new(
        session: PickerSession,
        host_origin: impl Into<String>,
        window: Arc<dyn PickerWindow>,
        settings: AgentSettings,
    ) -> Self {
        let resolver = ImageResolver::new(Some(session.page_url.clone()));
        Self {
            session,
            host_origin: host_origin.into(),
            window,
            resolver,
            settings,
            state: AgentState::Armed,
        }
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn session(&self) -> &PickerSession {
        &self.session
    }

    /// Waits until the page shows at least one artwork-like image.
    ///
    /// Returns how many were found; 0 means the wait timed out, in which case the
    /// interceptor is armed anyway since images may still arrive.
    pub async fn wait_until_ready(&self, page: &dyn PickerPage) -> usize {
        let selector = match Selector::parse(ARTWORK_IMAGE_SELECTORS) {
            Ok(selector) => selector,
            Err(_) => return 0,
        };
        let found = await_condition(
            || {
                let document = Html::parse_document(&page.snapshot());
                let count = document.select(&selector).count();
                (count > 0).then_some(count)
            },
            self.settings.image_poll_interval,
            self.settings.image_wait_timeout,
        )
        .await;
        match found {
            Ok(count) => {
                artwork_diag!("Found {} potential artwork images", count);
                count
            }
            Err(err) => {
                artwork_debug!("No artwork images yet: {}", err);
                0
            }
        }
    }

    /// Handles a capturing-phase click on `target` inside `document`.
    pub fn on_click(&mut self, document: &Html, target: ElementRef<'_>) -> ClickDisposition {
        let image = if target.value().name().eq_ignore_ascii_case("img") {
            Some(target)
        } else {
            target.select(&IMG).next()
        };
        let Some(image) = image else {
            return ClickDisposition::PassThrough;
        };

        if self.state == AgentState::Consumed {
            artwork_diag!("Selection already sent; ignoring click");
            return ClickDisposition::Intercepted { sent: false };
        }

        let Some(url) = self.resolver.resolve(image) else {
            artwork_warn!("Could not resolve an image URL for the clicked element");
            return ClickDisposition::Intercepted { sent: false };
        };
        let release_date = extract_release_date(document);

        if !self.window.opener_alive() {
            artwork_warn!("Opener window is gone; not sending {}", url);
            return ClickDisposition::Intercepted { sent: false };
        }

        let message = ArtworkMessage {
            url,
            release_date,
            session: self.session.session_token.clone(),
        };
        if let Err(err) = self.window.post_to_opener(&message, &self.host_origin) {
            artwork_warn!("Could not post selection: {}", err);
            return ClickDisposition::Intercepted { sent: false };
        }

        artwork_info!(
            "Sent artwork {} (release date {:?})",
            message.url,
            message.release_date
        );
        self.state = AgentState::Consumed;
        self.window.mark_selected(&message.url);
        self.window.focus_opener();
        self.schedule_close();
        ClickDisposition::Intercepted { sent: true }
    }

    fn schedule_close(&self) {
        let window = Arc::clone(&self.window);
        let delay = self.settings.close_delay;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    window.close();
                });
            }
            Err(_) => window.close(),
        }
    }
}
