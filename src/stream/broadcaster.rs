//! Fan-out of camera frames to streaming subscribers.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{Mutex, RwLock};

use crate::stream::{PART_PREAMBLE, boundary_marker};

/// Identifies one registered subscriber.
pub type SubscriberId = u64;

type SubscriberWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Registered subscriber. The broadcaster only holds the write side; the
/// connection worker that registered it decides when it ends.
#[derive(Clone)]
struct Subscriber {
    writer: Arc<Mutex<SubscriberWriter>>,
}

/// Set of streaming subscribers, shared by every connection worker.
///
/// Cloning is cheap and yields a handle to the same set.
#[derive(Clone, Default)]
pub struct StreamBroadcaster {
    subscribers: Arc<RwLock<HashMap<SubscriberId, Subscriber>>>,
    next_id: Arc<AtomicU64>,
}

impl StreamBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a writer and returns its id.
    ///
    /// The writer is moved in, so the same socket cannot be registered twice.
    pub async fn subscribe<W>(&self, writer: W) -> SubscriberId
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let subscriber = Subscriber {
            writer: Arc::new(Mutex::new(Box::new(writer))),
        };

        let mut subscribers = self.subscribers.write().await;
        subscribers.insert(id, subscriber);

        tracing::debug!(subscriber = id, total = subscribers.len(), "Stream subscriber added");
        id
    }

    /// Removes a subscriber and shuts its writer down.
    ///
    /// Returns `false` if it was already gone; calling it twice is harmless.
    pub async fn unsubscribe(&self, id: SubscriberId) -> bool {
        let removed = self.subscribers.write().await.remove(&id);

        match removed {
            Some(subscriber) => {
                // A delivery in flight owns the writer; it is closed when
                // that task drops it.
                if let Ok(mut writer) = subscriber.writer.try_lock() {
                    let _ = writer.shutdown().await;
                }
                tracing::debug!(subscriber = id, "Stream subscriber removed");
                true
            }
            None => false,
        }
    }

    pub async fn is_subscribed(&self, id: SubscriberId) -> bool {
        self.subscribers.read().await.contains_key(&id)
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Sends `frame` to every current subscriber.
    ///
    /// Each delivery runs in its own task so a slow or broken subscriber does
    /// not hold up the others. A subscriber still busy with an earlier frame
    /// skips this one. Subscribers whose write fails are pruned.
    ///
    /// Returns the number of deliveries started.
    ///
    /// # Panics
    ///
    /// Deliveries are spawned with [`tokio::spawn`], so this must be polled
    /// from within a Tokio runtime. Producers on plain threads should hand
    /// frames over through a [`tokio::runtime::Handle`].
    pub async fn publish(&self, frame: impl Into<Bytes>) -> usize {
        let frame = frame.into();
        let snapshot: Vec<(SubscriberId, Subscriber)> = self
            .subscribers
            .read()
            .await
            .iter()
            .map(|(id, s)| (*id, s.clone()))
            .collect();

        let mut started = 0;
        for (id, subscriber) in snapshot {
            let Ok(mut writer) = subscriber.writer.try_lock_owned() else {
                tracing::trace!(subscriber = id, "Subscriber busy, frame skipped");
                continue;
            };

            let frame = frame.clone();
            let broadcaster = self.clone();
            started += 1;

            tokio::spawn(async move {
                if let Err(e) = write_part(&mut *writer, &frame).await {
                    tracing::info!(subscriber = id, error = %e, "Stream connection broken");
                    let _ = writer.shutdown().await;
                    drop(writer);
                    broadcaster.subscribers.write().await.remove(&id);
                }
            });
        }

        started
    }
}

async fn write_part<W>(writer: &mut W, frame: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    writer.write_all(PART_PREAMBLE).await?;
    writer.write_all(frame).await?;
    writer.flush().await?;

    writer.write_all(boundary_marker().as_bytes()).await?;
    writer.flush().await
}
