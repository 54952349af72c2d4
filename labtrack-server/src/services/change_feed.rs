use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};

use labtrack_api::models::{ChangeEvent, ChangeTable};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::{Stream, StreamMap};

type Channels = HashMap<ChangeTable, broadcast::Sender<ChangeEvent>>;

/// Per-table change notifications for live views.
///
/// Channels are created on first subscription and dropped once their last
/// subscriber goes away, so an idle server holds no channels.
#[derive(Clone)]
pub struct ChangeFeed {
    channels: Arc<Mutex<Channels>>,
    capacity: usize,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    fn lock(channels: &Mutex<Channels>) -> MutexGuard<'_, Channels> {
        channels.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns how many subscribers received the event.
    pub fn publish(&self, event: ChangeEvent) -> usize {
        let sender = Self::lock(&self.channels).get(&event.table).cloned();

        match sender {
            Some(sender) => sender.send(event).unwrap_or(0),
            None => 0,
        }
    }

    pub fn subscribe(&self, tables: &[ChangeTable]) -> Subscription {
        let mut streams = StreamMap::new();
        {
            let mut channels = Self::lock(&self.channels);
            for table in tables {
                let receiver = channels
                    .entry(*table)
                    .or_insert_with(|| broadcast::channel(self.capacity).0)
                    .subscribe();
                streams.insert(*table, BroadcastStream::new(receiver));
            }
        }

        tracing::debug!("change feed subscribed to {} tables", tables.len());

        Subscription {
            streams: Some(streams),
            channels: self.channels.clone(),
        }
    }

    pub fn has_subscribers(&self, table: ChangeTable) -> bool {
        Self::lock(&self.channels)
            .get(&table)
            .is_some_and(|sender| sender.receiver_count() > 0)
    }

    pub fn channel_count(&self) -> usize {
        Self::lock(&self.channels).len()
    }
}

/// A live stream of change events that releases its channels on drop.
pub struct Subscription {
    streams: Option<StreamMap<ChangeTable, BroadcastStream<ChangeEvent>>>,
    channels: Arc<Mutex<Channels>>,
}

impl Stream for Subscription {
    type Item = ChangeEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            let Some(streams) = self.streams.as_mut() else {
                return Poll::Ready(None);
            };

            match Pin::new(streams).poll_next(cx) {
                Poll::Ready(Some((_, Ok(event)))) => return Poll::Ready(Some(event)),
                Poll::Ready(Some((table, Err(BroadcastStreamRecvError::Lagged(skipped))))) => {
                    tracing::warn!("change feed subscriber lagged {skipped} events on {table}");
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        drop(self.streams.take());

        let mut channels = ChangeFeed::lock(&self.channels);
        channels.retain(|_, sender| sender.receiver_count() > 0);
    }
}
