//! Startup reconciliation of the recent channel history.

use async_trait::async_trait;
use tracing::{info, warn};

use super::ingester::Ingester;
use super::types::{BackfillReport, ChannelMessage, SourceError};
use crate::metrics::BACKFILL_RUNS;

/// Source of past channel messages.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Up to `limit` messages of `channel_id`, newest first.
    ///
    /// With `before` set, only messages with a smaller message id are
    /// returned. An empty page means the history is exhausted.
    async fn fetch_page(
        &self,
        channel_id: i64,
        before: Option<i64>,
        limit: usize,
    ) -> Result<Vec<ChannelMessage>, SourceError>;
}

/// Feed the `window` most recent channel messages through the ingester,
/// `page_size` at a time.
///
/// Each message goes through the same path as a live one, so running this
/// while the live worker is active only overwrites rows with equivalent
/// values. A failing source ends the run early with `completed == false`;
/// whatever was ingested before stays in the catalog.
pub async fn reconcile_backlog(
    ingester: &Ingester,
    source: &dyn HistorySource,
    window: usize,
    page_size: usize,
) -> BackfillReport {
    let channel_id = ingester.channel_id();
    info!(channel_id, window, page_size, "Starting backlog reconciliation");

    let mut report = BackfillReport {
        completed: true,
        ..Default::default()
    };
    let mut before: Option<i64> = None;

    while report.scanned < window && page_size > 0 {
        let limit = page_size.min(window - report.scanned);

        let mut page = match source.fetch_page(channel_id, before, limit).await {
            Ok(page) => page,
            Err(e) => {
                warn!(
                    channel_id,
                    scanned = report.scanned,
                    "Backlog source failed, stopping early: {}",
                    e
                );
                report.completed = false;
                break;
            }
        };
        report.pages += 1;

        if page.is_empty() {
            break;
        }
        let exhausted = page.len() < limit;
        page.truncate(limit);

        for message in &page {
            report.scanned += 1;
            report.tally.record(&ingester.ingest(message));
        }

        let oldest = page.iter().map(|m| m.message_id).min();
        if exhausted || oldest.is_none() || (before.is_some() && oldest >= before) {
            break;
        }
        before = oldest;
    }

    let result = if report.completed { "completed" } else { "partial" };
    BACKFILL_RUNS.with_label_values(&[result]).inc();

    info!(
        scanned = report.scanned,
        pages = report.pages,
        stored = report.tally.stored,
        rejected = report.tally.rejected,
        dropped = report.tally.dropped,
        result,
        "Backlog reconciliation finished"
    );
    report
}
