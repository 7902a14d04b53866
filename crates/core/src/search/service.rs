use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::config::SearchConfig;
use crate::catalog::{CatalogEntry, CatalogError, CatalogSearchQuery, CatalogStore, MatchMode};
use crate::metrics::SEARCH_REQUESTS;

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPage {
    /// The normalized query.
    pub query: String,
    pub entries: Vec<CatalogEntry>,
    /// Whether more results exist beyond this page.
    pub has_more: bool,
}

/// Read side of the catalog for the front end.
///
/// Read failures never reach the caller: they are logged and answered with an
/// empty result, the same as a query that matches nothing.
pub struct SearchService {
    store: Arc<dyn CatalogStore>,
    config: SearchConfig,
}

impl SearchService {
    pub fn new(store: Arc<dyn CatalogStore>, config: SearchConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Ranked entries matching `query`, at most `limit`.
    pub fn search(&self, query: &str, limit: u32) -> Vec<CatalogEntry> {
        let query = normalize_query(query);
        self.ranked(&query, limit)
    }

    /// The first page of results for `query`.
    pub fn first_page(&self, query: &str) -> SearchPage {
        self.page(query, self.config.page_size)
    }

    /// The larger "show more" page for `query`, ranked the same way as the
    /// first page.
    pub fn more(&self, query: &str) -> SearchPage {
        self.page(query, self.config.more_page_size)
    }

    /// Every indexed quality of a title, lowest quality first.
    pub fn all_qualities(&self, title: &str) -> Vec<CatalogEntry> {
        self.store.get_all_by_title(title.trim()).unwrap_or_else(|e| {
            warn!(title, "Catalog read failed: {}", e);
            Vec::new()
        })
    }

    /// Full details of one entry. `None` when it does not exist or cannot be
    /// read.
    pub fn get_by_id(&self, id: i64) -> Option<CatalogEntry> {
        match self.store.get(id) {
            Ok(entry) => Some(entry),
            Err(CatalogError::NotFound(_)) => None,
            Err(e) => {
                warn!(id, "Catalog read failed: {}", e);
                None
            }
        }
    }

    /// A page of `page_size` results for `query`.
    pub fn page(&self, query: &str, page_size: u32) -> SearchPage {
        let query = normalize_query(query);
        let mut entries = self.ranked(&query, page_size.saturating_add(1));
        let has_more = entries.len() > page_size as usize;
        entries.truncate(page_size as usize);

        SearchPage {
            query,
            entries,
            has_more,
        }
    }

    fn ranked(&self, query: &str, limit: u32) -> Vec<CatalogEntry> {
        if limit == 0 || query.chars().count() < self.config.min_query_len.max(1) {
            debug!(query, "Query too short, skipping search");
            SEARCH_REQUESTS.with_label_values(&["empty"]).inc();
            return Vec::new();
        }

        match self.lookup(query, limit) {
            Ok(entries) => {
                let result = if entries.is_empty() { "empty" } else { "hit" };
                SEARCH_REQUESTS.with_label_values(&[result]).inc();
                debug!(query, results = entries.len(), "Search finished");
                entries
            }
            Err(e) => {
                SEARCH_REQUESTS.with_label_values(&["error"]).inc();
                warn!(query, "Catalog search failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Substring search, retried with every word matched separately when the
    /// query has several words and nothing matched as a whole.
    fn lookup(&self, query: &str, limit: u32) -> Result<Vec<CatalogEntry>, CatalogError> {
        let entries = self.store.search(&CatalogSearchQuery::new(query, limit))?;
        if !entries.is_empty() || query.split(' ').count() < 2 {
            return Ok(entries);
        }

        debug!(query, "No substring match, retrying with all terms");
        self.store
            .search(&CatalogSearchQuery::new(query, limit).with_mode(MatchMode::AllTerms))
    }
}

/// Trim and collapse whitespace runs to single spaces.
fn normalize_query(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ")
}
