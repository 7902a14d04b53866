//! Ranked keyword search over the catalog.

mod config;
mod service;

pub use config::SearchConfig;
pub use service::{SearchPage, SearchService};
