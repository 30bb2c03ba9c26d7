use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use artwork_logging::artwork_debug;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use tokio_util::sync::CancellationToken;

use crate::{DownloadError, DownloadFailureKind, FetchMetadata, FetchOutput};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 25 * 1024 * 1024,
        }
    }
}

#[async_trait::async_trait]
pub trait ArtworkFetcher: Send + Sync {
    async fn fetch(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<FetchOutput, DownloadError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    fn build_client(
        &self,
        redirect_counter: Arc<AtomicUsize>,
    ) -> Result<reqwest::Client, DownloadError> {
        let redirect_limit = self.settings.redirect_limit;
        let policy = reqwest::redirect::Policy::custom(move |attempt| {
            let count = attempt.previous().len();
            redirect_counter.store(count, Ordering::Relaxed);
            if count >= redirect_limit {
                attempt.error("redirect limit exceeded")
            } else {
                attempt.follow()
            }
        });

        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .redirect(policy)
            .build()
            .map_err(|err| DownloadError::new(DownloadFailureKind::Network, err.to_string()))
    }

    async fn download(&self, url: &str) -> Result<FetchOutput, DownloadError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| DownloadError::new(DownloadFailureKind::InvalidUrl, err.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(DownloadError::new(
                DownloadFailureKind::InvalidUrl,
                format!("unsupported scheme {}", parsed.scheme()),
            ));
        }
        let redirect_counter = Arc::new(AtomicUsize::new(0));
        let client = self.build_client(redirect_counter.clone())?;

        let response = client.get(parsed).send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::new(
                DownloadFailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(DownloadError::new(
                    DownloadFailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(DownloadError::new(
                    DownloadFailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }

        let redirect_count = redirect_counter.load(Ordering::Relaxed);
        artwork_debug!(
            "Downloaded {} bytes from {} ({} redirects)",
            bytes.len(),
            final_url,
            redirect_count
        );
        let metadata = FetchMetadata {
            original_url: url.to_string(),
            final_url,
            redirect_count,
            content_type,
            byte_len: bytes.len() as u64,
        };

        Ok(FetchOutput { bytes, metadata })
    }
}

#[async_trait::async_trait]
impl ArtworkFetcher for ReqwestFetcher {
    async fn fetch(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<FetchOutput, DownloadError> {
        tokio::select! {
            _ = cancel.cancelled() => Err(DownloadError::new(
                DownloadFailureKind::Cancelled,
                "download cancelled",
            )),
            result = self.download(url) => result,
        }
    }
}

fn map_reqwest_error(err: reqwest::Error) -> DownloadError {
    if err.is_timeout() {
        return DownloadError::new(DownloadFailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return DownloadError::new(DownloadFailureKind::RedirectLimitExceeded, err.to_string());
    }
    DownloadError::new(DownloadFailureKind::Network, err.to_string())
}
