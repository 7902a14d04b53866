//! Live ingestion: the listener pushes messages into a bounded queue that a
//! background worker drains.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::info;

use super::ingester::Ingester;
use super::types::{ChannelMessage, IngestError, IngestTally};

/// Handle used by the channel listener to push new messages.
///
/// Cheaply cloneable. Pushing waits while the queue is full, so a slow store
/// slows the listener down instead of losing messages.
#[derive(Clone)]
pub struct IngestHandle {
    tx: mpsc::Sender<ChannelMessage>,
}

impl IngestHandle {
    pub fn new(tx: mpsc::Sender<ChannelMessage>) -> Self {
        Self { tx }
    }

    /// Queue a message posted in the source channel.
    ///
    /// Fails only once the worker has stopped accepting messages.
    pub async fn on_channel_message(&self, message: ChannelMessage) -> Result<(), IngestError> {
        self.tx
            .send(message)
            .await
            .map_err(|_| IngestError::QueueClosed)
    }
}

/// Background task that feeds queued messages through the [`Ingester`].
pub struct IngestWorker {
    rx: mpsc::Receiver<ChannelMessage>,
    ingester: Arc<Ingester>,
}

impl IngestWorker {
    pub fn new(rx: mpsc::Receiver<ChannelMessage>, ingester: Arc<Ingester>) -> Self {
        Self { rx, ingester }
    }

    /// Process messages until shutdown is signalled or every handle is dropped.
    ///
    /// On shutdown the queue stops accepting new messages, and the messages
    /// already queued are still ingested before this returns.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) -> IngestTally {
        info!(channel_id = self.ingester.channel_id(), "Live ingestion started");
        let mut tally = IngestTally::default();

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Live ingestion received shutdown signal");
                    break;
                }
                message = self.rx.recv() => {
                    match message {
                        Some(message) => tally.record(&self.ingester.ingest(&message)),
                        None => {
                            info!("All ingest handles dropped");
                            break;
                        }
                    }
                }
            }
        }

        self.rx.close();
        let mut drained = 0;
        while let Some(message) = self.rx.recv().await {
            tally.record(&self.ingester.ingest(&message));
            drained += 1;
        }
        if drained > 0 {
            info!(drained, "Ingested queued messages after shutdown");
        }

        info!(
            stored = tally.stored,
            rejected = tally.rejected,
            dropped = tally.dropped,
            "Live ingestion stopped"
        );
        tally
    }
}

/// Create the live ingestion system
///
/// Returns:
/// - `IngestHandle` - for the channel listener (clone this to share across tasks)
/// - `IngestWorker` - spawn this as a background task with `tokio::spawn(worker.run(shutdown))`
pub fn create_ingest_system(
    ingester: Arc<Ingester>,
    buffer_size: usize,
) -> (IngestHandle, IngestWorker) {
    let (tx, rx) = mpsc::channel(buffer_size);
    (IngestHandle::new(tx), IngestWorker::new(rx, ingester))
}
