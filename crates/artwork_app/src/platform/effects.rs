use std::time::Duration;

use anyhow::bail;
use artwork_core::{Config, Effect, Msg, SessionId};
use artwork_engine::EngineHandle;
use artwork_logging::{artwork_diag, artwork_info, artwork_warn};

use super::picker::SnapshotPicker;

const ENGINE_POLL: Duration = Duration::from_millis(20);

/// Executes controller effects and reports what came of them as messages.
pub(crate) struct EffectRunner {
    engine: EngineHandle,
    picker: SnapshotPicker,
    config: Config,
    engine_deadline: Duration,
    fallback_url: Option<String>,
}

impl EffectRunner {
    pub(crate) fn new(engine: EngineHandle, picker: SnapshotPicker, config: Config) -> Self {
        // Download and injection carry their own timeouts; this only guards a stalled engine.
        let engine_deadline = Duration::from_secs(60)
            + Duration::from_millis(config.input_wait_timeout_ms);
        Self {
            engine,
            picker,
            config,
            engine_deadline,
            fallback_url: None,
        }
    }

    pub(crate) fn engine(&self) -> &EngineHandle {
        &self.engine
    }

    pub(crate) fn fallback_url(&self) -> Option<&str> {
        self.fallback_url.as_deref()
    }

    pub(crate) async fn run(&mut self, effects: Vec<Effect>) -> anyhow::Result<Vec<Msg>> {
        let mut replies = Vec::new();
        for effect in effects {
            match effect {
                Effect::OpenPicker { url } => {
                    println!("Opening artwork search: {url}");
                    replies.push(self.picker.open(&url, &self.config).await?);
                }
                Effect::Acquire { session, url } => {
                    artwork_info!("Acquire session={} url={}", session, url);
                    self.engine.acquire(session, url);
                    replies.push(self.next_engine_msg(session).await?);
                }
                Effect::Inject { session, fields } => {
                    artwork_info!("Inject session={} title={:?}", session, fields.title);
                    self.engine.inject(session, fields);
                    replies.push(self.next_engine_msg(session).await?);
                }
                Effect::OfferManualFallback { url } => {
                    artwork_warn!("Offering manual download of {}", url);
                    self.fallback_url = Some(url);
                }
                Effect::CancelInFlight => self.engine.cancel(),
            }
        }
        Ok(replies)
    }

    /// Waits for the result of `session`'s command; results of superseded sessions are dropped.
    async fn next_engine_msg(&self, session: SessionId) -> anyhow::Result<Msg> {
        let deadline = tokio::time::Instant::now() + self.engine_deadline;
        while tokio::time::Instant::now() < deadline {
            while let Some(event) = self.engine.try_recv() {
                if event.session() == session {
                    return Ok(event.into_msg());
                }
                artwork_diag!("Dropping engine result of session {}", event.session());
            }
            tokio::time::sleep(ENGINE_POLL).await;
        }
        bail!("engine did not answer within {:?}", self.engine_deadline)
    }
}
