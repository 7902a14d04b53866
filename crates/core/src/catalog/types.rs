//! Types for the file catalog.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extractor::{DEFAULT_SIZE_LABEL, UNKNOWN_TITLE};

/// Reference to the channel message a file was posted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i64,
}

impl MessageRef {
    pub fn new(chat_id: i64, message_id: i64) -> Self {
        Self {
            chat_id,
            message_id,
        }
    }
}

impl fmt::Display for MessageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.chat_id, self.message_id)
    }
}

#[derive(Debug, Error)]
#[error("Invalid message reference: {0}")]
pub struct MessageRefParseError(pub String);

impl FromStr for MessageRef {
    type Err = MessageRefParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (chat, message) = s
            .split_once('/')
            .ok_or_else(|| MessageRefParseError(s.to_string()))?;
        let chat_id = chat
            .parse()
            .map_err(|_| MessageRefParseError(s.to_string()))?;
        let message_id = message
            .parse()
            .map_err(|_| MessageRefParseError(s.to_string()))?;
        Ok(Self {
            chat_id,
            message_id,
        })
    }
}

/// An indexed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Surrogate key, stable for the lifetime of the row.
    pub id: i64,
    /// Platform file identifier. Unique across the catalog.
    pub file_ref: String,
    /// Original filename or caption.
    pub file_name: String,
    /// Display title. Never empty.
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    /// Human readable size, e.g. `"1.45 GB"`.
    pub size_label: String,
    /// Message the file was posted in, used to fetch the file later.
    pub source_message_ref: MessageRef,
    /// When the file was first indexed.
    pub created_at: DateTime<Utc>,
}

/// Fields of an entry to insert or overwrite.
///
/// Built through [`NewCatalogEntry::new`], which rejects an empty file
/// reference and replaces a blank title with the "Unknown Movie" sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCatalogEntry {
    file_ref: String,
    file_name: String,
    title: String,
    year: Option<u16>,
    quality: Option<String>,
    size_label: String,
    source_message_ref: MessageRef,
}

impl NewCatalogEntry {
    pub fn new(
        file_ref: impl Into<String>,
        title: impl Into<String>,
        source_message_ref: MessageRef,
    ) -> Result<Self, CatalogError> {
        let file_ref = file_ref.into().trim().to_string();
        if file_ref.is_empty() {
            return Err(CatalogError::Invalid("file_ref must not be empty".to_string()));
        }

        let title = title.into().trim().to_string();
        let title = if title.is_empty() {
            UNKNOWN_TITLE.to_string()
        } else {
            title
        };

        Ok(Self {
            file_ref,
            file_name: String::new(),
            title,
            year: None,
            quality: None,
            size_label: DEFAULT_SIZE_LABEL.to_string(),
            source_message_ref,
        })
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn with_year(mut self, year: Option<u16>) -> Self {
        self.year = year;
        self
    }

    pub fn with_quality(mut self, quality: Option<String>) -> Self {
        self.quality = quality.filter(|q| !q.trim().is_empty());
        self
    }

    pub fn with_size_label(mut self, size_label: impl Into<String>) -> Self {
        let size_label = size_label.into();
        if !size_label.trim().is_empty() {
            self.size_label = size_label;
        }
        self
    }

    pub fn file_ref(&self) -> &str {
        &self.file_ref
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn year(&self) -> Option<u16> {
        self.year
    }

    pub fn quality(&self) -> Option<&str> {
        self.quality.as_deref()
    }

    pub fn size_label(&self) -> &str {
        &self.size_label
    }

    pub fn source_message_ref(&self) -> MessageRef {
        self.source_message_ref
    }
}

/// How a search query is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// The whole query is a substring of the title or filename.
    #[default]
    Substring,
    /// Every whitespace separated word of the query appears in the title or
    /// filename, in any order.
    AllTerms,
}

/// Query for searching the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSearchQuery {
    /// Search text (matched against title and filename).
    pub query: String,
    /// Maximum results.
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub mode: MatchMode,
}

impl CatalogSearchQuery {
    pub fn new(query: impl Into<String>, limit: u32) -> Self {
        Self {
            query: query.into(),
            limit,
            mode: MatchMode::Substring,
        }
    }

    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }
}

fn default_limit() -> u32 {
    10
}

/// Catalog statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogStats {
    /// Total indexed files.
    pub total_entries: u64,
    /// First indexing time of the oldest entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_entry: Option<DateTime<Utc>>,
    /// First indexing time of the newest entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_entry: Option<DateTime<Utc>>,
    /// Titles of the most recently indexed entries.
    pub recent_titles: Vec<String>,
}

/// Errors for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid entry: {0}")]
    Invalid(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
