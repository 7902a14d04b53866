//! Search configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the search service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Results on the first page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Results on the "show more" page for the same query.
    #[serde(default = "default_more_page_size")]
    pub more_page_size: u32,

    /// Queries shorter than this (in characters, after trimming) return
    /// nothing.
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
}

fn default_page_size() -> u32 {
    10
}

fn default_more_page_size() -> u32 {
    20
}

fn default_min_query_len() -> usize {
    2
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            more_page_size: default_more_page_size(),
            min_query_len: default_min_query_len(),
        }
    }
}
