//! Ingestion of channel messages into the catalog.
//!
//! Two entry points share one per-message path ([`Ingester::ingest`]):
//! - live: the listener pushes messages through an [`IngestHandle`] and an
//!   [`IngestWorker`] drains them in the background
//! - backfill: [`reconcile_backlog`] runs once at startup over the most recent
//!   messages of a [`HistorySource`]
//!
//! Both may run at the same time. The catalog upsert is keyed by file
//! reference, so a message seen by both only overwrites its own row.

mod backfill;
mod history;
mod ingester;
mod live;
mod types;

pub use backfill::{reconcile_backlog, HistorySource};
pub use history::JsonlHistory;
pub use ingester::Ingester;
pub use live::{create_ingest_system, IngestHandle, IngestWorker};
pub use types::*;
