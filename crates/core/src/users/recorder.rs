use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use super::{ProfileUpdate, UserRegistry};
use crate::metrics::USER_EVENTS_DROPPED;

/// A queued write to the user registry.
#[derive(Debug, Clone)]
pub enum UserEvent {
    Seen {
        user_id: i64,
        profile: ProfileUpdate,
        at: DateTime<Utc>,
    },
    Searched {
        user_id: i64,
        query: String,
        at: DateTime<Utc>,
    },
}

/// Handle for recording user activity.
///
/// Cheaply cloneable. Events are queued for the [`UserWriter`]; a full or
/// closed queue drops the event with a warning instead of blocking or failing
/// the caller.
#[derive(Clone)]
pub struct UserRecorder {
    tx: mpsc::Sender<UserEvent>,
}

impl UserRecorder {
    pub fn new(tx: mpsc::Sender<UserEvent>) -> Self {
        Self { tx }
    }

    /// Record that a user interacted with the front end.
    pub fn record_user(&self, user_id: i64, profile: ProfileUpdate) -> bool {
        self.enqueue(UserEvent::Seen {
            user_id,
            profile,
            at: Utc::now(),
        })
    }

    /// Record a search made by a user.
    pub fn record_search(&self, user_id: i64, query: impl Into<String>) -> bool {
        self.enqueue(UserEvent::Searched {
            user_id,
            query: query.into(),
            at: Utc::now(),
        })
    }

    fn enqueue(&self, event: UserEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(e) => {
                USER_EVENTS_DROPPED.inc();
                tracing::warn!("Dropped user event: {}", e);
                false
            }
        }
    }
}

/// Background task that drains user events into the registry
pub struct UserWriter {
    rx: mpsc::Receiver<UserEvent>,
    registry: Arc<dyn UserRegistry>,
}

impl UserWriter {
    pub fn new(rx: mpsc::Receiver<UserEvent>, registry: Arc<dyn UserRegistry>) -> Self {
        Self { rx, registry }
    }

    /// Run the writer until every [`UserRecorder`] is dropped.
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        tracing::info!("User writer started");

        while let Some(event) = self.rx.recv().await {
            let result = match &event {
                UserEvent::Seen {
                    user_id,
                    profile,
                    at,
                } => self.registry.record(*user_id, profile, *at),
                UserEvent::Searched { user_id, query, at } => {
                    self.registry.record_search(*user_id, query, *at)
                }
            };

            if let Err(e) = result {
                tracing::error!("Failed to write user event: {}", e);
            }
        }

        tracing::info!("User writer shutting down");
    }
}

/// Create the user recording system
///
/// Returns:
/// - `UserRecorder` - for recording activity (clone this to share across tasks)
/// - `UserWriter` - spawn this as a background task with `tokio::spawn(writer.run())`
pub fn create_user_system(
    registry: Arc<dyn UserRegistry>,
    buffer_size: usize,
) -> (UserRecorder, UserWriter) {
    let (tx, rx) = mpsc::channel(buffer_size);
    (UserRecorder::new(tx), UserWriter::new(rx, registry))
}
