//! Testing utilities and mock implementations.
//!
//! This module provides mocks for the channel history and the catalog store,
//! plus fixtures for channel messages, so ingestion and search can be tested
//! without a real channel.
//!
//! # Example
//!
//! ```rust,ignore
//! use filmzi_core::testing::{fixtures, MockHistory};
//!
//! let history = MockHistory::new(vec![
//!     fixtures::document_message(-1001, 1, "doc-1", "Inception 2010 1080p 2.5 GB"),
//!     fixtures::text_message(-1001, 2, "welcome"),
//! ]);
//!
//! let report = reconcile_backlog(&ingester, &history, 500, 100).await;
//! ```

mod mock_catalog;
mod mock_history;

pub use mock_catalog::FailingCatalog;
pub use mock_history::MockHistory;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::ingest::{ChannelMessage, MediaAttachment, MediaKind};

    /// A message carrying a document with the given caption.
    pub fn document_message(
        chat_id: i64,
        message_id: i64,
        file_ref: &str,
        caption: &str,
    ) -> ChannelMessage {
        ChannelMessage {
            chat_id,
            message_id,
            caption: Some(caption.to_string()),
            media: Some(MediaAttachment {
                kind: MediaKind::Document,
                file_ref: file_ref.to_string(),
                file_name: None,
                size_bytes: None,
            }),
        }
    }

    /// A message carrying a video of `size_bytes` bytes.
    pub fn video_message(
        chat_id: i64,
        message_id: i64,
        file_ref: &str,
        caption: &str,
        size_bytes: u64,
    ) -> ChannelMessage {
        ChannelMessage {
            chat_id,
            message_id,
            caption: Some(caption.to_string()),
            media: Some(MediaAttachment {
                kind: MediaKind::Video,
                file_ref: file_ref.to_string(),
                file_name: None,
                size_bytes: Some(size_bytes),
            }),
        }
    }

    /// A document with a filename and no caption.
    pub fn named_document(
        chat_id: i64,
        message_id: i64,
        file_ref: &str,
        file_name: &str,
    ) -> ChannelMessage {
        ChannelMessage {
            chat_id,
            message_id,
            caption: None,
            media: Some(MediaAttachment {
                kind: MediaKind::Document,
                file_ref: file_ref.to_string(),
                file_name: Some(file_name.to_string()),
                size_bytes: None,
            }),
        }
    }

    /// A plain text message without a file.
    pub fn text_message(chat_id: i64, message_id: i64, text: &str) -> ChannelMessage {
        ChannelMessage {
            chat_id,
            message_id,
            caption: Some(text.to_string()),
            media: None,
        }
    }
}
