// Seraph Server — Feedback Endpoint
// Unauthenticated by contract: ratings arrive from embedded widgets that
// hold no token. Requires a nonempty userId and agentId and a nonzero
// rating; messageId defaults to "unknown".

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{internal, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct FeedbackBody {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "agentId")]
    pub agent_id: Option<String>,
    pub rating: Option<i64>,
    pub comment: Option<String>,
    #[serde(rename = "messageId")]
    pub message_id: Option<String>,
}

pub async fn submit(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FeedbackBody>,
) -> Result<Json<Value>, ApiError> {
    // Empty ids and a zero rating count as missing, not as values
    let (Some(user_id), Some(agent_id), Some(rating)) = (
        body.user_id.as_deref().filter(|id| !id.is_empty()),
        body.agent_id.as_deref().filter(|id| !id.is_empty()),
        body.rating.filter(|r| *r != 0),
    ) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Champs requis manquants"})),
        ));
    };

    state
        .feedback
        .submit(
            user_id,
            agent_id,
            body.message_id.as_deref().unwrap_or("unknown"),
            rating,
            body.comment.as_deref(),
        )
        .map_err(internal)?;

    Ok(Json(json!({
        "success": true,
        "message": "Merci pour votre feedback!",
    })))
}
