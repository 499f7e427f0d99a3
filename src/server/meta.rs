// Seraph Server — Token, Roster & Health Endpoints
// Token issuance gates on the backend key (the shared secret itself);
// the roster and health endpoints are public.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::engine::auth;
use crate::engine::clock;

#[derive(Debug, Deserialize)]
pub struct TokenBody {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "backendKey")]
    pub backend_key: Option<String>,
}

pub async fn issue_token(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TokenBody>,
) -> Result<Json<Value>, ApiError> {
    if body.backend_key.as_deref() != Some(state.config.secret.as_str()) {
        return Err((
            StatusCode::FORBIDDEN,
            Json(json!({"error": "Cle invalide"})),
        ));
    }
    let Some(user_id) = &body.user_id else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Champs requis manquants"})),
        ));
    };

    let token = auth::derive_token(user_id, &state.config.secret);
    Ok(Json(json!({"userId": user_id, "token": token})))
}

pub async fn list_agents(State(state): State<Arc<AppState>>) -> Json<Value> {
    let agents: Vec<Value> = state
        .registry
        .personas()
        .iter()
        .map(|p| {
            json!({
                "id": p.id,
                "name": p.name,
                "role": p.role,
                "color": p.color,
                "icon": p.icon,
                "description": p.description,
                "expertise": p.expertise,
            })
        })
        .collect();
    Json(json!({"agents": agents}))
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let agents: Vec<Value> = state
        .registry
        .personas()
        .iter()
        .map(|p| json!({"id": p.id, "name": p.name, "role": p.role}))
        .collect();

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "name": "Seraph - Les 3 Anges",
        "agents": agents,
        "features": [
            "shared_context",
            "user_profile",
            "inter_agent_communication",
            "feedback_system",
            "web_search",
            "datetime",
        ],
        "store": if state.vault.ping() { "connected" } else { "error" },
        "corrupt_records": state.vault.corrupt_reads(),
        "datetime": clock::french_now(),
    }))
}
