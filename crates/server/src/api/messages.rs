//! Channel listener API handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use filmzi_core::ChannelMessage;
use tracing::warn;

use super::{AcceptedResponse, ErrorResponse};
use crate::state::AppState;

/// POST /api/v1/messages
///
/// Queue a message posted in the source channel for live ingestion.
/// Filtering happens in the worker, so any well-formed message is accepted.
pub async fn push_message(
    State(state): State<Arc<AppState>>,
    Json(message): Json<ChannelMessage>,
) -> Result<(StatusCode, Json<AcceptedResponse>), (StatusCode, Json<ErrorResponse>)> {
    let msg_ref = format!("{}/{}", message.chat_id, message.message_id);

    match state.ingest().on_channel_message(message).await {
        Ok(()) => Ok((
            StatusCode::ACCEPTED,
            Json(AcceptedResponse {
                message: format!("Queued message {}", msg_ref),
            }),
        )),
        Err(e) => {
            warn!(msg = %msg_ref, "Rejected channel message: {}", e);
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::new(e.to_string())),
            ))
        }
    }
}
