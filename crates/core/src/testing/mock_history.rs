//! Mock channel history for testing.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::ingest::{ChannelMessage, HistorySource, SourceError};

/// In-memory implementation of the HistorySource trait.
///
/// Provides controllable behavior for testing:
/// - Serve a fixed set of messages, newest first
/// - Fail after a number of pages
/// - Count the pages served for assertions
///
/// # Example
///
/// ```rust,ignore
/// use filmzi_core::testing::{MockHistory, fixtures};
///
/// let history = MockHistory::new(vec![
///     fixtures::document_message(-1001, 1, "doc-1", "Up 2009 720p 700 MB"),
/// ])
/// .fail_after_pages(3);
/// ```
#[derive(Debug, Default)]
pub struct MockHistory {
    /// Sorted newest first.
    messages: Vec<ChannelMessage>,
    fail_after: Option<usize>,
    pages_served: AtomicUsize,
}

impl MockHistory {
    pub fn new(mut messages: Vec<ChannelMessage>) -> Self {
        messages.sort_by(|a, b| b.message_id.cmp(&a.message_id));
        Self {
            messages,
            fail_after: None,
            pages_served: AtomicUsize::new(0),
        }
    }

    /// Serve `pages` pages successfully, then fail every later fetch.
    pub fn fail_after_pages(mut self, pages: usize) -> Self {
        self.fail_after = Some(pages);
        self
    }

    /// Number of pages served so far.
    pub fn pages_served(&self) -> usize {
        self.pages_served.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HistorySource for MockHistory {
    async fn fetch_page(
        &self,
        channel_id: i64,
        before: Option<i64>,
        limit: usize,
    ) -> Result<Vec<ChannelMessage>, SourceError> {
        if let Some(fail_after) = self.fail_after {
            if self.pages_served() >= fail_after {
                return Err(SourceError::Unavailable("mock history failure".to_string()));
            }
        }
        self.pages_served.fetch_add(1, Ordering::SeqCst);

        Ok(self
            .messages
            .iter()
            .filter(|m| m.chat_id == channel_id)
            .filter(|m| before.map_or(true, |before| m.message_id < before))
            .take(limit)
            .cloned()
            .collect())
    }
}
