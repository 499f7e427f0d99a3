// Seraph Server — History Endpoints
// Read and delete per-persona conversation logs. The per-persona GET accepts
// arbitrary ids (an unknown persona just has an empty log and echoes its raw
// id as the name); deletes report how many entries they removed.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{authorize, internal, ApiError, AppState};
use crate::atoms::constants::DEFAULT_HISTORY_LIMIT;

pub async fn get_all(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    authorize(&state, &headers, &user_id)?;

    let ids = state.registry.ids();
    let conversations = state
        .history
        .all_for_user(&user_id, &ids, DEFAULT_HISTORY_LIMIT)
        .map_err(internal)?;
    let stats = state.history.stats(&user_id).map_err(internal)?;
    let profile = state.profiles.get(&user_id).map_err(internal)?;

    Ok(Json(json!({
        "userId": user_id,
        "conversations": conversations,
        "stats": stats,
        "profile": profile,
    })))
}

pub async fn get_one(
    State(state): State<Arc<AppState>>,
    Path((user_id, agent_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    authorize(&state, &headers, &user_id)?;

    let history = state
        .history
        .recent(&user_id, &agent_id, DEFAULT_HISTORY_LIMIT)
        .map_err(internal)?;

    Ok(Json(json!({
        "userId": user_id,
        "agentId": agent_id,
        "agentName": state.registry.display_name(&agent_id),
        "history": history,
    })))
}

pub async fn delete_all(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    authorize(&state, &headers, &user_id)?;

    let ids = state.registry.ids();
    let deleted = state.history.delete_all(&user_id, &ids).map_err(internal)?;
    Ok(Json(json!({"success": true, "deletedCount": deleted})))
}

pub async fn delete_one(
    State(state): State<Arc<AppState>>,
    Path((user_id, agent_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    authorize(&state, &headers, &user_id)?;

    let deleted = state
        .history
        .delete_one(&user_id, &agent_id)
        .map_err(internal)?;
    Ok(Json(json!({
        "success": true,
        "agentId": agent_id,
        "deletedCount": deleted,
    })))
}
