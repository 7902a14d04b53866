use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of file attached to a channel message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Document,
    Video,
}

/// A file attached to a channel message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAttachment {
    pub kind: MediaKind,
    /// Platform identifier the front end resolves to the file bytes.
    pub file_ref: String,
    #[serde(default)]
    pub file_name: Option<String>,
    /// Raw transport size in bytes, if the platform reported one.
    #[serde(default)]
    pub size_bytes: Option<u64>,
}

/// A message from the source channel, as pushed by the listener or read from
/// channel history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMessage {
    pub chat_id: i64,
    pub message_id: i64,
    /// Caption or message text.
    #[serde(default, alias = "text")]
    pub caption: Option<String>,
    #[serde(default)]
    pub media: Option<MediaAttachment>,
}

/// File information derived from a message before metadata extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub file_ref: String,
    pub file_name: Option<String>,
    pub size_bytes: Option<u64>,
    pub caption: String,
}

impl FileDescriptor {
    /// Derive the descriptor of the file a message carries.
    ///
    /// Returns `None` for messages without an attachment or with a blank file
    /// reference.
    pub fn from_message(message: &ChannelMessage) -> Option<Self> {
        let media = message.media.as_ref()?;
        let file_ref = media.file_ref.trim();
        if file_ref.is_empty() {
            return None;
        }

        Some(Self {
            file_ref: file_ref.to_string(),
            file_name: media
                .file_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from),
            size_bytes: media.size_bytes.filter(|bytes| *bytes > 0),
            caption: message.caption.clone().unwrap_or_default(),
        })
    }
}

/// Steps a message goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    Received,
    DescriptorExtracted,
    MetadataExtracted,
    Stored,
    Rejected,
}

impl fmt::Display for IngestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::DescriptorExtracted => "descriptor_extracted",
            Self::MetadataExtracted => "metadata_extracted",
            Self::Stored => "stored",
            Self::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

/// Why a message was filtered out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The message carries no file.
    NoFile,
    /// The message was posted outside the configured source channel.
    WrongChannel,
}

/// Result of ingesting one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum IngestOutcome {
    /// The file was inserted or its row refreshed.
    Stored { id: i64, file_ref: String },
    /// Routine filtering, not an error.
    Rejected { reason: RejectReason },
    /// Storage failed for this one message.
    Dropped { file_ref: String, error: String },
}

impl IngestOutcome {
    /// Metric label for this outcome.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Stored { .. } => "stored",
            Self::Rejected { .. } => "rejected",
            Self::Dropped { .. } => "dropped",
        }
    }
}

/// Counts of ingestion outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestTally {
    pub stored: usize,
    pub rejected: usize,
    pub dropped: usize,
}

impl IngestTally {
    pub fn record(&mut self, outcome: &IngestOutcome) {
        match outcome {
            IngestOutcome::Stored { .. } => self.stored += 1,
            IngestOutcome::Rejected { .. } => self.rejected += 1,
            IngestOutcome::Dropped { .. } => self.dropped += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.stored + self.rejected + self.dropped
    }
}

/// Summary of a startup backfill run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillReport {
    /// Messages read from history.
    pub scanned: usize,
    /// Pages fetched.
    pub pages: usize,
    #[serde(flatten)]
    pub tally: IngestTally,
    /// False when the history source failed before the window was covered.
    pub completed: bool,
}

/// Errors from the live ingestion queue.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Ingestion queue is closed")]
    QueueClosed,
}

/// Errors from a channel history source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("History unavailable: {0}")]
    Unavailable(String),
}
