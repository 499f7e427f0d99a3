// Seraph Server — Derived Bearer Tokens
// One static token per user: the first 32 hex chars of
// SHA-256("{user_id}:{secret}"). The backend key holder mints tokens via
// /api/auth/token; every user-scoped endpoint checks the Authorization
// header against the recomputed value. No sessions, no expiry.

use sha2::{Digest, Sha256};

/// Bearer token for one user under the given shared secret.
pub fn derive_token(user_id: &str, secret: &str) -> String {
    let digest = format!(
        "{:x}",
        Sha256::digest(format!("{}:{}", user_id, secret).as_bytes())
    );
    digest[..32].to_string()
}

/// True only for an exact `Bearer {token}` match. A missing header, wrong
/// scheme or token for a different user all fail identically.
pub fn verify_bearer(header: Option<&str>, user_id: &str, secret: &str) -> bool {
    match header {
        Some(value) => value == format!("Bearer {}", derive_token(user_id, secret)),
        None => false,
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_stable_and_scoped() {
        let a = derive_token("u1", "secret");
        assert_eq!(a.len(), 32);
        assert_eq!(a, derive_token("u1", "secret"));
        assert_ne!(a, derive_token("u2", "secret"));
        assert_ne!(a, derive_token("u1", "other-secret"));
    }

    #[test]
    fn test_verify_bearer_accepts_exact_match() {
        let token = derive_token("u1", "secret");
        assert!(verify_bearer(
            Some(&format!("Bearer {}", token)),
            "u1",
            "secret"
        ));
    }

    #[test]
    fn test_verify_bearer_rejects_everything_else() {
        let token = derive_token("u1", "secret");
        assert!(!verify_bearer(None, "u1", "secret"));
        assert!(!verify_bearer(Some(&token), "u1", "secret")); // missing scheme
        assert!(!verify_bearer(
            Some(&format!("bearer {}", token)),
            "u1",
            "secret"
        ));
        assert!(!verify_bearer(
            Some(&format!("Bearer {}", token)),
            "u2",
            "secret"
        ));
    }
}
