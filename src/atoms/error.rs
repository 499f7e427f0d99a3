// ── Seraph Atoms: Error Types ──────────────────────────────────────────────
// Single canonical error enum for the server, built with `thiserror`.
//
// Design rules:
//   • Variants are coarse-grained by domain (I/O, DB, Network, Config…).
//   • The `#[from]` attribute wires std/external error conversions automatically.
//   • No variant carries secret material (tokens, the shared secret) in its
//     message.

use thiserror::Error;

// ── Primary error enum ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ServerError {
    /// Filesystem or OS-level I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization / deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP / network failure (reqwest layer).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// SQLite / rusqlite store failure.
    #[error("Store error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Record encryption / decryption failure.
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Server or persona configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catch-all for errors that do not yet have a dedicated variant.
    /// Prefer adding a specific variant over using this in new code.
    #[error("{0}")]
    Other(String),
}

// ── Convenience alias ──────────────────────────────────────────────────────

/// All server operations should return this type.
pub type ServerResult<T> = Result<T, ServerError>;
