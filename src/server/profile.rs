// Seraph Server — Profile Endpoints
// GET returns the full per-user view (profile + shared context + every
// persona's insight log); POST/PATCH apply a partial merge update.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use super::{authorize, internal, ApiError, AppState};
use crate::atoms::types::ProfileUpdate;

pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    authorize(&state, &headers, &user_id)?;

    let profile = state.profiles.get(&user_id).map_err(internal)?;
    let context = state.shared.get(&user_id).map_err(internal)?;

    let mut insights = Map::new();
    for agent_id in state.registry.ids() {
        let notes = state.insights.get(&user_id, agent_id).map_err(internal)?;
        insights.insert(agent_id.to_string(), json!(notes));
    }

    Ok(Json(json!({
        "profile": profile,
        "context": context,
        "insights": insights,
    })))
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    Json(updates): Json<ProfileUpdate>,
) -> Result<Json<Value>, ApiError> {
    authorize(&state, &headers, &user_id)?;

    let profile = state.profiles.update(&user_id, &updates).map_err(internal)?;
    Ok(Json(json!({"success": true, "profile": profile})))
}
