use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use artwork_core::{Config, Msg};
use artwork_engine::{
    channel, Agent, AgentSettings, ClickDisposition, PickerPage, PickerSession, PickerWindow,
    ARTWORK_IMAGE_SELECTORS,
};
use artwork_logging::{artwork_info, artwork_warn};
use scraper::{Html, Selector};
use url::Url;

/// A saved search results page served as the picker window's DOM.
struct SnapshotPage {
    url: Url,
    html: String,
}

impl PickerPage for SnapshotPage {
    fn url(&self) -> Url {
        self.url.clone()
    }

    fn snapshot(&self) -> String {
        self.html.clone()
    }
}

/// Stands in for the picker window: loads the snapshot at the search URL, runs the
/// agent in it and performs one click on behalf of the user.
pub(crate) struct SnapshotPicker {
    html: String,
    click: Option<String>,
    settings: AgentSettings,
}

impl SnapshotPicker {
    pub(crate) fn new(html: String, click: Option<String>, settings: AgentSettings) -> Self {
        Self {
            html,
            click,
            settings,
        }
    }

    /// Returns the message the host would observe: a delivered selection, or the
    /// picker closing without one.
    ///
    /// A live picker stays open after a click that selects nothing so the user can
    /// try another image. The snapshot gets exactly one click, so it closes instead.
    pub(crate) async fn open(&self, url: &str, config: &Config) -> anyhow::Result<Msg> {
        let page_url = Url::parse(url).with_context(|| format!("invalid picker url {url}"))?;
        let session = PickerSession::detect(&page_url, &config.search_origin)
            .ok_or_else(|| anyhow!("{url} is not a picker session url"))?;

        let (window, mut listener) =
            channel(config.search_origin.clone(), config.host_origin.clone());
        let window = Arc::new(window);
        let mut agent = Agent::new(
            session,
            config.host_origin.clone(),
            Arc::clone(&window) as Arc<dyn PickerWindow>,
            self.settings.clone(),
        );

        let page = SnapshotPage {
            url: page_url,
            html: self.html.clone(),
        };
        let found = agent.wait_until_ready(&page).await;
        artwork_info!("Picker page shows {} artwork candidates", found);

        let disposition = self.click_target(&mut agent, &page)?;
        if disposition != (ClickDisposition::Intercepted { sent: true }) {
            artwork_warn!("Click produced no selection ({:?}); closing picker", disposition);
            window.close();
            return Ok(Msg::PickerClosed);
        }

        let wait = self.settings.close_delay + Duration::from_secs(1);
        match listener.recv_timeout(wait).await {
            Ok(Some(envelope)) => Ok(Msg::MessageReceived(envelope)),
            Ok(None) | Err(_) => Ok(Msg::PickerClosed),
        }
    }

    fn click_target(
        &self,
        agent: &mut Agent,
        page: &SnapshotPage,
    ) -> anyhow::Result<ClickDisposition> {
        let raw = self.click.as_deref().unwrap_or(ARTWORK_IMAGE_SELECTORS);
        let selector =
            Selector::parse(raw).map_err(|err| anyhow!("invalid click selector {raw}: {err}"))?;
        let document = Html::parse_document(&page.snapshot());
        let Some(target) = document.select(&selector).next() else {
            artwork_warn!("Nothing in the picker page matches {}", raw);
            return Ok(ClickDisposition::PassThrough);
        };
        Ok(agent.on_click(&document, target))
    }
}
