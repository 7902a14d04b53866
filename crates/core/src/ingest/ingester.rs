//! Per-message ingestion shared by live and backfill mode.

use std::sync::Arc;

use tracing::{debug, error, info};

use super::types::{ChannelMessage, FileDescriptor, IngestOutcome, IngestStage, RejectReason};
use crate::catalog::{CatalogEntry, CatalogStore, MessageRef, NewCatalogEntry};
use crate::extractor::{self, Extraction, Field};
use crate::metrics::INGEST_MESSAGES;

/// Turns channel messages into catalog rows.
///
/// Stateless apart from the store handle, so one instance is shared by the
/// live worker and the startup backfill. Replaying a message only overwrites
/// the row of its file.
pub struct Ingester {
    store: Arc<dyn CatalogStore>,
    channel_id: i64,
}

impl Ingester {
    pub fn new(store: Arc<dyn CatalogStore>, channel_id: i64) -> Self {
        Self { store, channel_id }
    }

    /// The source channel this ingester accepts messages from.
    pub fn channel_id(&self) -> i64 {
        self.channel_id
    }

    /// Run one message through the pipeline.
    ///
    /// Never fails: storage errors are logged and reported as
    /// [`IngestOutcome::Dropped`] so the caller can move on to the next message.
    pub fn ingest(&self, message: &ChannelMessage) -> IngestOutcome {
        let outcome = self.process(message);
        INGEST_MESSAGES.with_label_values(&[outcome.label()]).inc();
        outcome
    }

    /// Ingest a message and return the stored entry, if any.
    pub fn ingest_entry(&self, message: &ChannelMessage) -> Option<CatalogEntry> {
        match self.ingest(message) {
            IngestOutcome::Stored { id, .. } => self.store.get(id).ok(),
            _ => None,
        }
    }

    fn process(&self, message: &ChannelMessage) -> IngestOutcome {
        let msg_ref = MessageRef::new(message.chat_id, message.message_id);
        debug!(msg = %msg_ref, stage = %IngestStage::Received, "Processing channel message");

        if message.chat_id != self.channel_id {
            debug!(
                msg = %msg_ref,
                stage = %IngestStage::Rejected,
                "Message is not from the source channel"
            );
            return IngestOutcome::Rejected {
                reason: RejectReason::WrongChannel,
            };
        }

        let Some(descriptor) = FileDescriptor::from_message(message) else {
            debug!(msg = %msg_ref, stage = %IngestStage::Rejected, "Message carries no file");
            return IngestOutcome::Rejected {
                reason: RejectReason::NoFile,
            };
        };
        debug!(
            msg = %msg_ref,
            stage = %IngestStage::DescriptorExtracted,
            file_ref = %descriptor.file_ref
        );

        let extraction = extractor::extract(&descriptor.caption, descriptor.file_name.as_deref());
        debug!(
            msg = %msg_ref,
            stage = %IngestStage::MetadataExtracted,
            title = %extraction.title,
            method = ?extraction.method
        );

        let entry = match build_entry(&descriptor, &extraction, msg_ref) {
            Ok(entry) => entry,
            Err(e) => {
                error!(msg = %msg_ref, "Failed to build catalog entry: {}", e);
                return IngestOutcome::Dropped {
                    file_ref: descriptor.file_ref,
                    error: e.to_string(),
                };
            }
        };

        match self.store.upsert(&entry) {
            Ok(id) => {
                info!(
                    id,
                    stage = %IngestStage::Stored,
                    language = ?extraction.language,
                    "Indexed {} ({}) - {}",
                    extraction.title,
                    extraction.year,
                    extraction.quality
                );
                IngestOutcome::Stored {
                    id,
                    file_ref: descriptor.file_ref,
                }
            }
            Err(e) => {
                error!(
                    msg = %msg_ref,
                    file_ref = %descriptor.file_ref,
                    "Dropping message, catalog write failed: {}",
                    e
                );
                IngestOutcome::Dropped {
                    file_ref: descriptor.file_ref,
                    error: e.to_string(),
                }
            }
        }
    }
}

/// Map an extraction onto a catalog row.
///
/// A size declared in the caption wins over the transport size; the
/// transport size wins over the default label. Attachments without a
/// filename keep their caption in its place so they stay searchable.
fn build_entry(
    descriptor: &FileDescriptor,
    extraction: &Extraction,
    msg_ref: MessageRef,
) -> Result<NewCatalogEntry, crate::catalog::CatalogError> {
    let size_label = match descriptor.size_bytes {
        Some(bytes) if extraction.is_defaulted(Field::Size) => extractor::format_size(bytes),
        _ => extraction.size_label.clone(),
    };

    let file_name = descriptor
        .file_name
        .clone()
        .unwrap_or_else(|| descriptor.caption.trim().to_string());

    Ok(
        NewCatalogEntry::new(&descriptor.file_ref, &extraction.title, msg_ref)?
            .with_file_name(file_name)
            .with_year(Some(extraction.year))
            .with_quality(Some(extraction.quality.clone()))
            .with_size_label(size_label),
    )
}
