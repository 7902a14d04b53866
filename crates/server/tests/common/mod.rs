//! Common test utilities for in-process API testing.
//!
//! This module provides a test fixture that builds the full router over
//! in-memory stores with the ingest worker and user writer running, so tests
//! exercise the same asynchronous paths as the real server.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tokio::sync::broadcast;
use tower::ServiceExt;

use filmzi_core::{
    config::{ChannelConfig, DatabaseConfig, IngestConfig, ServerConfig, UsersConfig},
    create_ingest_system, create_user_system, CatalogStore, Config, Ingester, SearchConfig,
    SqliteCatalog, SqliteUserRegistry, UserRegistry,
};

/// Re-export fixtures for test convenience
pub use filmzi_core::testing::fixtures;

/// Source channel used by every fixture.
pub const CHANNEL: i64 = -1001234567890;

/// Test fixture for in-process API testing.
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Catalog behind the router, for direct assertions
    pub catalog: Arc<SqliteCatalog>,
    /// User registry behind the router, for direct assertions
    pub users: Arc<SqliteUserRegistry>,
    /// Keeps the ingest worker running for the lifetime of the fixture
    shutdown_tx: broadcast::Sender<()>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default search settings.
    pub async fn new() -> Self {
        Self::with_search(SearchConfig::default()).await
    }

    /// Create a test fixture with custom search settings.
    pub async fn with_search(search: SearchConfig) -> Self {
        let config = Config {
            channel: ChannelConfig { id: CHANNEL },
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            database: DatabaseConfig::default(),
            ingest: IngestConfig::default(),
            search,
            users: UsersConfig::default(),
        };

        let catalog = Arc::new(SqliteCatalog::in_memory().expect("Failed to create catalog"));
        let users =
            Arc::new(SqliteUserRegistry::in_memory().expect("Failed to create user registry"));

        // User writer
        let (recorder, user_writer) = create_user_system(
            Arc::clone(&users) as Arc<dyn UserRegistry>,
            config.users.queue_size,
        );
        tokio::spawn(user_writer.run());

        // Live ingestion
        let ingester = Arc::new(Ingester::new(
            Arc::clone(&catalog) as Arc<dyn CatalogStore>,
            CHANNEL,
        ));
        let (ingest_handle, ingest_worker) =
            create_ingest_system(ingester, config.ingest.queue_size);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        tokio::spawn(ingest_worker.run(shutdown_rx));

        let state = Arc::new(filmzi_server::state::AppState::new(
            config,
            Arc::clone(&catalog) as Arc<dyn CatalogStore>,
            Arc::clone(&users) as Arc<dyn UserRegistry>,
            recorder,
            ingest_handle,
        ));

        let router = filmzi_server::api::create_router(state);

        Self {
            router,
            catalog,
            users,
            shutdown_tx,
        }
    }

    /// Stop the ingest worker; later pushes are refused.
    pub async fn stop_ingest(&self) {
        let _ = self.shutdown_tx.send(());
        // Give the worker a moment to close its queue.
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    /// Push a channel message through the API and wait until the worker has
    /// processed it.
    pub async fn ingest(&self, message: filmzi_core::ChannelMessage) -> TestResponse {
        let file_ref = message.media.as_ref().map(|m| m.file_ref.clone());
        let body = serde_json::to_value(&message).unwrap();
        let response = self.post("/api/v1/messages", body).await;

        if let Some(file_ref) = file_ref {
            if message.chat_id == CHANNEL && !file_ref.trim().is_empty() {
                self.wait_for_file(&file_ref).await;
            }
        }
        response
    }

    /// Poll the catalog until `file_ref` is indexed.
    pub async fn wait_for_file(&self, file_ref: &str) {
        for _ in 0..100 {
            if self.catalog.get_by_file_ref(file_ref).is_ok() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("File {} was not ingested in time", file_ref);
    }

    /// Poll until `check` passes or time runs out.
    pub async fn eventually(&self, check: impl Fn(&Self) -> bool) -> bool {
        for _ in 0..100 {
            if check(self) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Send a GET request and return the raw text body.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        self.send(request_builder.body(body).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
