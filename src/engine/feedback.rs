// Seraph Server — Feedback Store
// Two sinks per rating: the user's own encrypted feedback log (a year, like
// the rest of their data) and a global plaintext histogram per persona.
// The histogram holds no user content and never expires, so persona quality
// can be tracked across the whole install lifetime.

use chrono::Local;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::atoms::constants::{feedback_global_key, feedback_key, FEEDBACK_TTL_SECS};
use crate::atoms::error::ServerResult;
use crate::atoms::types::FeedbackEntry;
use crate::engine::vault::Vault;

#[derive(Clone)]
pub struct FeedbackStore {
    vault: Arc<Vault>,
}

impl FeedbackStore {
    pub fn new(vault: Arc<Vault>) -> Self {
        FeedbackStore { vault }
    }

    /// Record one rating in both sinks.
    pub fn submit(
        &self,
        user_id: &str,
        agent_id: &str,
        message_id: &str,
        rating: i64,
        comment: Option<&str>,
    ) -> ServerResult<()> {
        let entry = FeedbackEntry {
            timestamp: Local::now().to_rfc3339(),
            agent_id: agent_id.to_string(),
            message_id: message_id.to_string(),
            rating,
            comment: comment.map(str::to_string),
        };
        self.vault
            .push_record(&feedback_key(user_id), &entry, FEEDBACK_TTL_SECS)?;

        let global = feedback_global_key(agent_id);
        self.vault
            .hash_incr(&global, &format!("rating_{}", rating), 1, None)?;
        self.vault.hash_incr(&global, "total", 1, None)?;
        Ok(())
    }

    /// Global rating histogram for one persona: `rating_{n}` fields + `total`.
    pub fn histogram(&self, agent_id: &str) -> ServerResult<BTreeMap<String, i64>> {
        self.vault.hash_get_all(&feedback_global_key(agent_id))
    }

    /// The user's most recent feedback entries, oldest first.
    pub fn recent(&self, user_id: &str, limit: i64) -> ServerResult<Vec<FeedbackEntry>> {
        self.vault.tail_records(&feedback_key(user_id), limit)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::kv::SqliteKv;

    fn store() -> FeedbackStore {
        let kv = Arc::new(SqliteKv::open_in_memory().unwrap());
        FeedbackStore::new(Arc::new(Vault::new(kv, "test-secret")))
    }

    #[test]
    fn test_submit_feeds_both_sinks() {
        let feedback = store();
        feedback
            .submit("u1", "gabriel", "msg-1", 5, Some("tres utile"))
            .unwrap();
        feedback.submit("u1", "gabriel", "msg-2", 3, None).unwrap();

        let entries = feedback.recent("u1", 10).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].rating, 5);
        assert_eq!(entries[0].comment.as_deref(), Some("tres utile"));
        assert_eq!(entries[1].comment, None);

        let histogram = feedback.histogram("gabriel").unwrap();
        assert_eq!(histogram.get("rating_5"), Some(&1));
        assert_eq!(histogram.get("rating_3"), Some(&1));
        assert_eq!(histogram.get("total"), Some(&2));
    }

    #[test]
    fn test_histogram_aggregates_across_users() {
        let feedback = store();
        feedback.submit("u1", "michael", "m1", 4, None).unwrap();
        feedback.submit("u2", "michael", "m2", 4, None).unwrap();
        let histogram = feedback.histogram("michael").unwrap();
        assert_eq!(histogram.get("rating_4"), Some(&2));
        assert_eq!(histogram.get("total"), Some(&2));
        // Each user's own log stays separate
        assert_eq!(feedback.recent("u1", 10).unwrap().len(), 1);
    }

    #[test]
    fn test_histogram_empty_for_unrated_persona() {
        assert!(store().histogram("raphael").unwrap().is_empty());
    }
}
