use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::search::SearchConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub channel: ChannelConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub users: UsersConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("filmzi.db")
}

/// The source channel files are indexed from
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChannelConfig {
    /// Platform id of the channel. Messages from any other chat are ignored.
    pub id: i64,
}

/// Ingestion configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngestConfig {
    /// Live messages buffered before the listener has to wait.
    #[serde(default = "default_ingest_queue_size")]
    pub queue_size: usize,

    /// Most recent messages scanned at startup.
    #[serde(default = "default_backfill_window")]
    pub backfill_window: usize,

    /// Messages fetched per history page during backfill.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// JSON-lines channel export used as backfill history. Backfill is
    /// skipped when unset.
    #[serde(default)]
    pub backlog_path: Option<PathBuf>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            queue_size: default_ingest_queue_size(),
            backfill_window: default_backfill_window(),
            page_size: default_page_size(),
            backlog_path: None,
        }
    }
}

fn default_ingest_queue_size() -> usize {
    1000
}

fn default_backfill_window() -> usize {
    500
}

fn default_page_size() -> usize {
    100
}

/// User registry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UsersConfig {
    /// User events buffered before new ones are dropped.
    #[serde(default = "default_users_queue_size")]
    pub queue_size: usize,
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            queue_size: default_users_queue_size(),
        }
    }
}

fn default_users_queue_size() -> usize {
    256
}
