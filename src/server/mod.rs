// Seraph Server — HTTP Surface
// Thin axum layer over the engine: one module per route family, shared
// state in an Arc, permissive CORS. Error policy follows the engine's:
// auth failures are a uniform 401, engine errors become a 500 with a JSON
// error body, and the chat endpoint masks its own failures as a French
// error string (clients always get JSON they can render).

pub mod chat;
pub mod feedback;
pub mod history;
pub mod meta;
pub mod profile;

use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, info};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::atoms::error::{ServerError, ServerResult};
use crate::config::ServerConfig;
use crate::engine::agents::AgentRegistry;
use crate::engine::auth;
use crate::engine::chat::ChatEngine;
use crate::engine::completion::CompletionClient;
use crate::engine::context::SharedContextStore;
use crate::engine::feedback::FeedbackStore;
use crate::engine::history::HistoryStore;
use crate::engine::insights::InsightStore;
use crate::engine::kv::{KvStore, SqliteKv};
use crate::engine::profile::ProfileStore;
use crate::engine::search::LookupClient;
use crate::engine::vault::Vault;

// ── Shared state ───────────────────────────────────────────────────────────

pub struct AppState {
    pub config: ServerConfig,
    pub registry: Arc<AgentRegistry>,
    pub vault: Arc<Vault>,
    pub profiles: ProfileStore,
    pub shared: SharedContextStore,
    pub insights: InsightStore,
    pub history: HistoryStore,
    pub feedback: FeedbackStore,
    pub chat: ChatEngine,
}

impl AppState {
    /// Open the on-disk store and wire every component.
    pub fn new(config: ServerConfig) -> ServerResult<Arc<Self>> {
        let kv: Arc<dyn KvStore> = Arc::new(SqliteKv::open(&config.db_path)?);
        Self::with_store(config, kv)
    }

    /// Same wiring over a caller-provided store (tests use an in-memory one).
    pub fn with_store(config: ServerConfig, kv: Arc<dyn KvStore>) -> ServerResult<Arc<Self>> {
        let registry = Arc::new(AgentRegistry::new()?);
        let vault = Arc::new(Vault::new(kv, &config.secret));

        let profiles = ProfileStore::new(Arc::clone(&vault));
        let shared = SharedContextStore::new(Arc::clone(&vault));
        let insights = InsightStore::new(Arc::clone(&vault));
        let history = HistoryStore::new(Arc::clone(&vault));
        let feedback = FeedbackStore::new(Arc::clone(&vault));

        let chat = ChatEngine::new(
            Arc::clone(&registry),
            profiles.clone(),
            shared.clone(),
            insights.clone(),
            history.clone(),
            CompletionClient::new(&config.completion_url, &config.model, config.timeout_secs),
            LookupClient::new(&config.search_url),
        );

        Ok(Arc::new(AppState {
            config,
            registry,
            vault,
            profiles,
            shared,
            insights,
            history,
            feedback,
            chat,
        }))
    }
}

// ── Router & serve ─────────────────────────────────────────────────────────

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhook/chat", post(chat::webhook_chat))
        .route(
            "/api/profile/:user_id",
            get(profile::get_profile)
                .post(profile::update_profile)
                .patch(profile::update_profile),
        )
        .route(
            "/api/history/:user_id",
            get(history::get_all).delete(history::delete_all),
        )
        .route(
            "/api/history/:user_id/:agent_id",
            get(history::get_one).delete(history::delete_one),
        )
        .route("/api/feedback", post(feedback::submit))
        .route("/api/auth/token", post(meta::issue_token))
        .route("/api/agents", get(meta::list_agents))
        .route("/health", get(meta::health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(state: Arc<AppState>) -> ServerResult<()> {
    let addr = state.config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("[server] Listening on http://{}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

// ── Handler helpers ────────────────────────────────────────────────────────

pub(crate) type ApiError = (StatusCode, Json<Value>);

/// Uniform bearer check for user-scoped endpoints.
pub(crate) fn authorize(
    state: &AppState,
    headers: &HeaderMap,
    user_id: &str,
) -> Result<(), ApiError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if auth::verify_bearer(header, user_id, &state.config.secret) {
        Ok(())
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Non autorise"})),
        ))
    }
}

/// Engine failure → 500 with a JSON error body.
pub(crate) fn internal(e: ServerError) -> ApiError {
    error!("[server] {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": e.to_string()})),
    )
}
