//! Channel history read from a JSON-lines export.

use std::path::Path;

use async_trait::async_trait;
use tracing::info;

use super::backfill::HistorySource;
use super::types::{ChannelMessage, SourceError};

/// History source backed by a JSON-lines file, one [`ChannelMessage`] per line.
///
/// The file is read once; pages are served from memory.
#[derive(Debug, Clone)]
pub struct JsonlHistory {
    /// Sorted newest first.
    messages: Vec<ChannelMessage>,
}

impl JsonlHistory {
    /// Load an export from disk.
    pub async fn open(path: &Path) -> Result<Self, SourceError> {
        let contents = tokio::fs::read_to_string(path).await?;
        let history = Self::parse(&contents)?;
        info!(
            path = %path.display(),
            messages = history.len(),
            "Loaded channel history export"
        );
        Ok(history)
    }

    /// Parse an export. Blank lines are skipped.
    pub fn parse(contents: &str) -> Result<Self, SourceError> {
        let mut messages = Vec::new();
        for (idx, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let message: ChannelMessage =
                serde_json::from_str(line).map_err(|e| SourceError::Parse {
                    line: idx + 1,
                    message: e.to_string(),
                })?;
            messages.push(message);
        }

        messages.sort_by(|a, b| b.message_id.cmp(&a.message_id));
        Ok(Self { messages })
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[async_trait]
impl HistorySource for JsonlHistory {
    async fn fetch_page(
        &self,
        channel_id: i64,
        before: Option<i64>,
        limit: usize,
    ) -> Result<Vec<ChannelMessage>, SourceError> {
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
