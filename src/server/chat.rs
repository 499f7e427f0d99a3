// Seraph Server — Chat Endpoint
// POST /webhook/chat drives the whole compose → generate → persist pipeline.
// Failures stay in-band: the body is always JSON with a `response` field,
// errors just switch the status to 500 and phrase the response in French.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use log::error;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    #[serde(default)]
    pub message: String,
    #[serde(rename = "agentId")]
    pub agent_id: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

pub async fn webhook_chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatBody>,
) -> (StatusCode, Json<Value>) {
    match state
        .chat
        .handle(&body.message, body.agent_id.as_deref(), body.user_id.as_deref())
        .await
    {
        Ok(outcome) => (
            StatusCode::OK,
            Json(json!({
                "response": outcome.response,
                "agent": {
                    "id": outcome.agent_id,
                    "name": outcome.agent_name,
                    "role": outcome.agent_role,
                },
            })),
        ),
        Err(e) => {
            error!("[server] chat failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"response": format!("Erreur: {}", e)})),
            )
        }
    }
}
