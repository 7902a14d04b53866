pub mod catalog;
pub mod handlers;
pub mod messages;
pub mod middleware;
pub mod routes;
pub mod search;
pub mod users;

pub use routes::create_router;

use serde::Serialize;

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// JSON body of accepted asynchronous writes.
#[derive(Debug, Serialize)]
pub struct AcceptedResponse {
    pub message: String,
}
