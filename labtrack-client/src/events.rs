//! Listener for the server's `/api/events` change feed.
//!
//! Every notification drops the cached projection it may have made stale. While the
//! connection is down events can be missed, so the whole cache is cleared before each
//! reconnect.

use std::sync::Arc;
use std::time::Duration;

use labtrack_api::models::ChangeEvent;
use reqwest::Response;
use reqwest::header::ACCEPT;
use tokio::task::JoinHandle;
use url::Url;

use crate::cache::LatestReadingCache;
use crate::error::{ClientError, ErrorBody, Result, from_status};

pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Splits a `text/event-stream` body into change events. Chunks may end anywhere,
/// including inside a line.
#[derive(Debug, Default)]
pub(crate) struct EventDecoder {
    buffer: Vec<u8>,
    data: String,
}

impl EventDecoder {
    pub(crate) fn push(&mut self, chunk: &[u8]) -> Vec<ChangeEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(end) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=end).collect();
            let text = String::from_utf8_lossy(&raw);
            let line = text.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                events.extend(self.dispatch());
                continue;
            }
            // Comment lines carry the keep-alive.
            if line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (line, ""),
            };
            if field == "data" {
                if !self.data.is_empty() {
                    self.data.push('\n');
                }
                self.data.push_str(value);
            }
        }

        events
    }

    fn dispatch(&mut self) -> Option<ChangeEvent> {
        if self.data.is_empty() {
            return None;
        }

        let data = std::mem::take(&mut self.data);
        match serde_json::from_str(&data) {
            Ok(event) => Some(event),
            Err(e) => {
                log::warn!("unreadable change event {data:?}: {e}");
                None
            }
        }
    }
}

/// Running feed listener. Dropping it closes the connection.
#[derive(Debug)]
pub struct ChangeSubscription {
    task: JoinHandle<()>,
}

impl ChangeSubscription {
    /// Opens the feed and starts applying events to `cache`. Fails when the first
    /// connection is refused; later drops are retried every [`RECONNECT_DELAY`].
    pub async fn connect(
        http_client: reqwest::Client,
        url: Url,
        token: String,
        cache: Arc<LatestReadingCache>,
    ) -> Result<Self> {
        let response = open(&http_client, &url, &token).await?;
        log::info!("listening for changes on {url}");

        let task = tokio::spawn(async move {
            let mut connected = Some(response);
            loop {
                let response = match connected.take() {
                    Some(response) => response,
                    None => match open(&http_client, &url, &token).await {
                        Ok(response) => response,
                        Err(ClientError::Unauthenticated) => {
                            log::warn!("change feed rejected the session, stopping");
                            break;
                        }
                        Err(e) => {
                            log::warn!("change feed unavailable: {e}");
                            tokio::time::sleep(RECONNECT_DELAY).await;
                            continue;
                        }
                    },
                };

                match pump(response, &cache).await {
                    Ok(()) => log::info!("change feed closed by server"),
                    Err(e) => log::warn!("change feed interrupted: {e}"),
                }

                cache.clear();
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        });

        Ok(Self { task })
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for ChangeSubscription {
    fn drop(&mut self) {
        self.task.abort();
        log::debug!("change feed released");
    }
}

async fn open(http_client: &reqwest::Client, url: &Url, token: &str) -> Result<Response> {
    let response = http_client
        .get(url.clone())
        .bearer_auth(token)
        .header(ACCEPT, "text/event-stream")
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let bytes = response.bytes().await.unwrap_or_default();
        return Err(from_status(status, ErrorBody::parse(&bytes)));
    }
    Ok(response)
}

async fn pump(mut response: Response, cache: &LatestReadingCache) -> Result<()> {
    let mut decoder = EventDecoder::default();

    while let Some(chunk) = response.chunk().await? {
        for event in decoder.push(&chunk) {
            log::debug!("{:?} on {} #{}", event.kind, event.table, event.id);
            cache.apply(&event);
        }
    }
    Ok(())
}
