use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use artwork_core::{FormFields, SessionId};
use artwork_logging::{artwork_error, artwork_info, artwork_warn};
use tokio_util::sync::CancellationToken;

use crate::artifact::{acquire, FileArtifact};
use crate::fetch::{ArtworkFetcher, FetchSettings, ReqwestFetcher};
use crate::inject::{fill_metadata, inject, HostForm, InjectError, InjectSettings};
use crate::EngineEvent;

enum EngineCommand {
    Acquire { session: SessionId, url: String },
    Inject { session: SessionId, fields: FormFields },
    Cancel,
}

/// Shared between the command loop and the tasks it spawns.
struct Worker {
    fetcher: Arc<dyn ArtworkFetcher>,
    form: Arc<dyn HostForm>,
    settings: InjectSettings,
    artifact: Mutex<Option<(SessionId, FileArtifact)>>,
    cancel: Mutex<CancellationToken>,
}

impl Worker {
    fn current_token(&self) -> CancellationToken {
        self.cancel
            .lock()
            .map(|token| token.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    fn cancel_in_flight(&self) {
        let mut guard = self
            .cancel
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.cancel();
        *guard = CancellationToken::new();
    }

    /// Keeps the newest session's artifact; a late download of an older session
    /// never replaces it.
    fn store_artifact(&self, session: SessionId, artifact: FileArtifact) {
        if let Ok(mut slot) = self.artifact.lock() {
            if slot.as_ref().is_none_or(|(held, _)| *held <= session) {
                *slot = Some((session, artifact));
            }
        }
    }

    fn artifact_for(&self, session: SessionId) -> Option<FileArtifact> {
        match self.artifact.lock().ok()?.as_ref() {
            Some((held, artifact)) if *held == session => Some(artifact.clone()),
            _ => None,
        }
    }

    fn artifact(&self) -> Option<FileArtifact> {
        Some(self.artifact.lock().ok()?.as_ref()?.1.clone())
    }
}

/// Runs controller effects on a tokio runtime owned by a worker thread.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    worker: Arc<Worker>,
}

impl EngineHandle {
    pub fn new(
        fetcher: Arc<dyn ArtworkFetcher>,
        form: Arc<dyn HostForm>,
        settings: InjectSettings,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let worker = Arc::new(Worker {
            fetcher,
            form,
            settings,
            artifact: Mutex::new(None),
            cancel: Mutex::new(CancellationToken::new()),
        });

        let thread_worker = Arc::clone(&worker);
        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    artwork_error!("Engine runtime failed to start: {}", err);
                    return;
                }
            };
            while let Ok(command) = cmd_rx.recv() {
                if let EngineCommand::Cancel = command {
                    thread_worker.cancel_in_flight();
                    continue;
                }
                let worker = Arc::clone(&thread_worker);
                let cancel = worker.current_token();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(worker.as_ref(), command, cancel, event_tx).await;
                });
            }
        });

        Self {
            cmd_tx,
            event_rx,
            worker,
        }
    }

    pub fn with_reqwest(
        fetch: FetchSettings,
        form: Arc<dyn HostForm>,
        settings: InjectSettings,
    ) -> Self {
        Self::new(Arc::new(ReqwestFetcher::new(fetch)), form, settings)
    }

    pub fn acquire(&self, session: SessionId, url: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Acquire {
            session,
            url: url.into(),
        });
    }

    /// Injects the artifact downloaded for `session`.
    pub fn inject(&self, session: SessionId, fields: FormFields) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::Inject { session, fields });
    }

    /// Abandons the running download or injection; its completion may still
    /// arrive as a failure event.
    pub fn cancel(&self) {
        let _ = self.cmd_tx.send(EngineCommand::Cancel);
    }

    /// The most recently downloaded artifact, if any.
    pub fn artifact(&self) -> Option<FileArtifact> {
        self.worker.artifact()
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }
}

async fn handle_command(
    worker: &Worker,
    command: EngineCommand,
    cancel: CancellationToken,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::Acquire { session, url } => {
            match acquire(worker.fetcher.as_ref(), &url, &cancel).await {
                Ok(artifact) => {
                    let event = EngineEvent::ArtifactReady {
                        session,
                        file_name: artifact.file_name.clone(),
                        byte_len: artifact.byte_len(),
                    };
                    worker.store_artifact(session, artifact);
                    event
                }
                Err(error) => {
                    artwork_warn!("Session {} download of {} failed: {}", session, url, error);
                    EngineEvent::DownloadFailed { session, error }
                }
            }
        }
        EngineCommand::Inject { session, fields } => {
            let Some(artifact) = worker.artifact_for(session) else {
                let _ = event_tx.send(EngineEvent::InjectionFailed {
                    session,
                    error: InjectError::Injection(
                        "no artwork has been downloaded for this session".into(),
                    ),
                });
                return;
            };
            let result = tokio::select! {
                _ = cancel.cancelled() => Err(InjectError::Injection("injection cancelled".into())),
                result = inject(&artifact, worker.form.as_ref(), &worker.settings) => result,
            };
            match result {
                Ok(()) => {
                    let report = fill_metadata(worker.form.as_ref(), &fields);
                    artwork_info!(
                        "Metadata filled: title={} description={}",
                        report.title,
                        report.description
                    );
                    EngineEvent::Injected { session }
                }
                Err(error) => {
                    artwork_warn!("Session {} injection failed: {}", session, error);
                    EngineEvent::InjectionFailed { session, error }
                }
            }
        }
        EngineCommand::Cancel => return,
    };
    let _ = event_tx.send(event);
}
