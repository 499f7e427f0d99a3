// Seraph Server — Configuration
// One immutable struct built from the environment in main() and passed down
// explicitly. Nothing reads env vars after startup.

use log::warn;
use std::path::PathBuf;

const DEFAULT_SECRET: &str = "seraph-secret-key-2026-secure";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind, `SERAPH_HOST` (default 0.0.0.0).
    pub host: String,
    /// Listen port, `SERAPH_PORT` (default 8080).
    pub port: u16,
    /// Shared secret: encryption key material, token derivation and the
    /// backend key for /api/auth/token. `SERAPH_SECRET`.
    pub secret: String,
    /// Base URL of the OpenAI-compatible completion API, `SERAPH_COMPLETION_URL`.
    pub completion_url: String,
    /// Model path/name passed through to the completion API, `SERAPH_MODEL`.
    pub model: String,
    /// Web lookup endpoint (DuckDuckGo HTML by default), `SERAPH_SEARCH_URL`.
    pub search_url: String,
    /// SQLite store location, `SERAPH_DB` (default under the OS data dir).
    pub db_path: PathBuf,
    /// Completion call timeout in seconds, `SERAPH_TIMEOUT_SECS` (default 120).
    pub timeout_secs: u64,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let secret = std::env::var("SERAPH_SECRET").unwrap_or_else(|_| {
            warn!("[config] SERAPH_SECRET not set, using the built-in dev secret");
            DEFAULT_SECRET.to_string()
        });

        ServerConfig {
            host: env_or("SERAPH_HOST", "0.0.0.0"),
            port: std::env::var("SERAPH_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            secret,
            completion_url: env_or("SERAPH_COMPLETION_URL", "http://localhost:8000"),
            model: env_or("SERAPH_MODEL", "/workspace/models/hermes-3-llama-8b"),
            search_url: env_or("SERAPH_SEARCH_URL", "https://html.duckduckgo.com/html/"),
            db_path: std::env::var("SERAPH_DB")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_db_path()),
            timeout_secs: std::env::var("SERAPH_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(120),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("seraph")
        .join("store.db")
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // Env-var-free assertions only: the test runner may set SERAPH_* vars
        let config = ServerConfig {
            host: "0.0.0.0".into(),
            port: 8080,
            secret: DEFAULT_SECRET.into(),
            completion_url: "http://localhost:8000".into(),
            model: "m".into(),
            search_url: "https://html.duckduckgo.com/html/".into(),
            db_path: default_db_path(),
            timeout_secs: 120,
        };
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert!(config.db_path.ends_with("seraph/store.db") || config.db_path.ends_with("store.db"));
    }
}
