use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use artwork_core::{ArtworkMessage, Envelope};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::poll::TimeoutError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("opener window is gone")]
    OpenerGone,
    #[error("target origin {requested} does not match opener origin {actual}")]
    TargetOriginMismatch { requested: String, actual: String },
}

/// The picker window as seen by the agent running inside it.
pub trait PickerWindow: Send + Sync {
    /// Whether the window that opened us still exists.
    fn opener_alive(&self) -> bool;
    /// Posts `message` to the opener. The platform stamps our own origin on it.
    fn post_to_opener(&self, message: &ArtworkMessage, target_origin: &str)
        -> Result<(), TransportError>;
    /// Visual feedback on the clicked image.
    fn mark_selected(&self, _url: &str) {}
    fn focus_opener(&self) {}
    fn close(&self);
}

/// One-way, in-process message channel between a picker window and the host.
///
/// Mirrors cross-window messaging: the sender cannot choose the origin the
/// receiver sees, and delivery is refused unless the sender names the host origin.
pub fn channel(
    picker_origin: impl Into<String>,
    host_origin: impl Into<String>,
) -> (ChannelPickerWindow, MessageListener) {
    let (tx, rx) = mpsc::unbounded_channel();
    let window = ChannelPickerWindow {
        origin: picker_origin.into(),
        host_origin: host_origin.into(),
        tx: Mutex::new(Some(tx)),
        closed: AtomicBool::new(false),
        opener_focused: AtomicBool::new(false),
        marked: Mutex::new(None),
    };
    (window, MessageListener { rx })
}

pub struct ChannelPickerWindow {
    origin: String,
    host_origin: String,
    tx: Mutex<Option<mpsc::UnboundedSender<Envelope>>>,
    closed: AtomicBool,
    opener_focused: AtomicBool,
    marked: Mutex<Option<String>>,
}

impl ChannelPickerWindow {
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn opener_focused(&self) -> bool {
        self.opener_focused.load(Ordering::SeqCst)
    }

    /// URL of the image last marked as selected.
    pub fn marked(&self) -> Option<String> {
        self.marked.lock().ok()?.clone()
    }

    /// Posts arbitrary structured data, as any script in the window could.
    pub fn post_value(&self, data: Value, target_origin: &str) -> Result<(), TransportError> {
        if target_origin.trim_end_matches('/') != self.host_origin.trim_end_matches('/') {
            return Err(TransportError::TargetOriginMismatch {
                requested: target_origin.to_string(),
                actual: self.host_origin.clone(),
            });
        }
        let guard = self.tx.lock().map_err(|_| TransportError::OpenerGone)?;
        let tx = guard.as_ref().ok_or(TransportError::OpenerGone)?;
        tx.send(Envelope {
            origin: self.origin.clone(),
            data,
        })
        .map_err(|_| TransportError::OpenerGone)
    }
}

impl PickerWindow for ChannelPickerWindow {
    fn opener_alive(&self) -> bool {
        self.tx
            .lock()
            .map(|guard| guard.as_ref().is_some_and(|tx| !tx.is_closed()))
            .unwrap_or(false)
    }

    fn post_to_opener(
        &self,
        message: &ArtworkMessage,
        target_origin: &str,
    ) -> Result<(), TransportError> {
        self.post_value(message.to_value(), target_origin)
    }

    fn mark_selected(&self, url: &str) {
        if let Ok(mut marked) = self.marked.lock() {
            *marked = Some(url.to_string());
        }
    }

    fn focus_opener(&self) {
        self.opener_focused.store(true, Ordering::SeqCst);
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        if let Ok(mut guard) = self.tx.lock() {
            guard.take();
        }
    }
}

/// Host-side end of the channel.
pub struct MessageListener {
    rx: mpsc::UnboundedReceiver<Envelope>,
}

impl MessageListener {
    /// Next message, or `None` once the picker window has closed and the queue is drained.
    pub async fn recv(&mut self) -> Option<Envelope> {
        self.rx.recv().await
    }

    pub async fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<Envelope>, TimeoutError> {
        tokio::time::timeout(timeout, self.rx.recv())
            .await
            .map_err(|_| TimeoutError { timeout })
    }

    /// Dropping the listener is how the host page going away looks to the picker.
    pub fn close(&mut self) {
        self.rx.close();
    }
}
