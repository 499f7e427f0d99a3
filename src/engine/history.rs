// Seraph Server — Conversation History Store
// Append-only exchange log per (user, persona), 90-day retention, plus
// per-user usage counters that live a year. The log key embeds a digest of
// the pair (see constants) so deleting one persona's log can never touch
// another's.

use chrono::Local;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::atoms::constants::{history_key, stats_key, HISTORY_TTL_SECS, STATS_TTL_SECS};
use crate::atoms::error::ServerResult;
use crate::atoms::types::ConversationEntry;
use crate::engine::vault::Vault;

#[derive(Clone)]
pub struct HistoryStore {
    vault: Arc<Vault>,
}

impl HistoryStore {
    pub fn new(vault: Arc<Vault>) -> Self {
        HistoryStore { vault }
    }

    /// Record one exchange and bump the user's usage counters.
    pub fn append(
        &self,
        user_id: &str,
        agent_id: &str,
        agent_name: &str,
        message: &str,
        response: &str,
    ) -> ServerResult<()> {
        let entry = ConversationEntry {
            timestamp: Local::now().to_rfc3339(),
            user_id: user_id.to_string(),
            agent_id: agent_id.to_string(),
            agent_name: agent_name.to_string(),
            message: message.to_string(),
            response: response.to_string(),
        };
        self.vault
            .push_record(&history_key(user_id, agent_id), &entry, HISTORY_TTL_SECS)?;

        let stats = stats_key(user_id);
        self.vault
            .hash_incr(&stats, "total_messages", 1, Some(STATS_TTL_SECS))?;
        self.vault.hash_incr(
            &stats,
            &format!("agent_{}", agent_id),
            1,
            Some(STATS_TTL_SECS),
        )?;
        Ok(())
    }

    /// The most recent `limit` exchanges, oldest first.
    pub fn recent(
        &self,
        user_id: &str,
        agent_id: &str,
        limit: i64,
    ) -> ServerResult<Vec<ConversationEntry>> {
        self.vault
            .tail_records(&history_key(user_id, agent_id), limit)
    }

    /// Recent history for every persona that has any, keyed by persona id.
    pub fn all_for_user(
        &self,
        user_id: &str,
        agent_ids: &[&str],
        limit: i64,
    ) -> ServerResult<BTreeMap<String, Vec<ConversationEntry>>> {
        let mut conversations = BTreeMap::new();
        for agent_id in agent_ids {
            let entries = self.recent(user_id, agent_id, limit)?;
            if !entries.is_empty() {
                conversations.insert(agent_id.to_string(), entries);
            }
        }
        Ok(conversations)
    }

    /// Drop one persona's log. Returns the number of entries removed.
    pub fn delete_one(&self, user_id: &str, agent_id: &str) -> ServerResult<i64> {
        let key = history_key(user_id, agent_id);
        let count = self.vault.list_len(&key)?;
        self.vault.delete(&key)?;
        Ok(count)
    }

    /// Drop every persona's log for this user. Returns total entries removed.
    pub fn delete_all(&self, user_id: &str, agent_ids: &[&str]) -> ServerResult<i64> {
        let mut deleted = 0;
        for agent_id in agent_ids {
            deleted += self.delete_one(user_id, agent_id)?;
        }
        Ok(deleted)
    }

    /// Usage counters: `total_messages` plus one `agent_{id}` field per
    /// persona the user has talked to.
    pub fn stats(&self, user_id: &str) -> ServerResult<BTreeMap<String, i64>> {
        self.vault.hash_get_all(&stats_key(user_id))
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::kv::SqliteKv;

    fn store() -> HistoryStore {
        let kv = Arc::new(SqliteKv::open_in_memory().unwrap());
        HistoryStore::new(Arc::new(Vault::new(kv, "test-secret")))
    }

    fn seed(history: &HistoryStore, agent: &str, n: usize) {
        for i in 1..=n {
            history
                .append("u1", agent, "Agent", &format!("question {}", i), &format!("reponse {}", i))
                .unwrap();
        }
    }

    #[test]
    fn test_recent_window_after_eight_appends() {
        let history = store();
        seed(&history, "raphael", 8);
        let entries = history.recent("u1", "raphael", 5).unwrap();
        let messages: Vec<&str> = entries.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["question 4", "question 5", "question 6", "question 7", "question 8"]
        );
    }

    #[test]
    fn test_stats_count_per_persona_and_total() {
        let history = store();
        seed(&history, "raphael", 2);
        seed(&history, "gabriel", 1);
        let stats = history.stats("u1").unwrap();
        assert_eq!(stats.get("total_messages"), Some(&3));
        assert_eq!(stats.get("agent_raphael"), Some(&2));
        assert_eq!(stats.get("agent_gabriel"), Some(&1));
    }

    #[test]
    fn test_all_for_user_skips_empty_logs() {
        let history = store();
        seed(&history, "gabriel", 1);
        let all = history
            .all_for_user("u1", &["raphael", "gabriel", "michael"], 10)
            .unwrap();
        assert_eq!(all.len(), 1);
        assert!(all.contains_key("gabriel"));
    }

    #[test]
    fn test_delete_one_leaves_other_personas_intact() {
        let history = store();
        seed(&history, "raphael", 3);
        seed(&history, "michael", 2);
        assert_eq!(history.delete_one("u1", "raphael").unwrap(), 3);
        assert!(history.recent("u1", "raphael", 10).unwrap().is_empty());
        assert_eq!(history.recent("u1", "michael", 10).unwrap().len(), 2);
    }

    #[test]
    fn test_delete_all_sums_counts() {
        let history = store();
        seed(&history, "raphael", 2);
        seed(&history, "gabriel", 3);
        let deleted = history
            .delete_all("u1", &["raphael", "gabriel", "michael"])
            .unwrap();
        assert_eq!(deleted, 5);
        assert!(history
            .all_for_user("u1", &["raphael", "gabriel", "michael"], 10)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_logs_are_isolated_per_user() {
        let history = store();
        seed(&history, "raphael", 1);
        assert!(history.recent("u2", "raphael", 10).unwrap().is_empty());
    }

    #[test]
    fn test_entry_carries_persona_name() {
        let history = store();
        history
            .append("u1", "gabriel", "Gabriel", "salut", "bonjour")
            .unwrap();
        let entries = history.recent("u1", "gabriel", 1).unwrap();
        assert_eq!(entries[0].agent_name, "Gabriel");
        assert_eq!(entries[0].user_id, "u1");
    }
}
