// Seraph Server — Persona Insight Store
// Short dated notes one persona keeps about a user, stored per (user,
// persona) and capped at the 10 newest. This is the other half of the
// shared-memory model: the assembler exposes each persona's log to its
// peers read-only, so personas "communicate" without ever calling each
// other.

use chrono::Local;
use std::sync::Arc;

use crate::atoms::constants::{insights_key, INSIGHTS_CAP, INSIGHTS_TTL_SECS};
use crate::atoms::error::ServerResult;
use crate::atoms::types::InsightNote;
use crate::engine::vault::{RecordRead, Vault};

#[derive(Clone)]
pub struct InsightStore {
    vault: Arc<Vault>,
}

impl InsightStore {
    pub fn new(vault: Arc<Vault>) -> Self {
        InsightStore { vault }
    }

    /// All retained notes, oldest first. Empty for an unknown pair.
    pub fn get(&self, user_id: &str, agent_id: &str) -> ServerResult<Vec<InsightNote>> {
        Ok(
            match self.vault.get_record(&insights_key(user_id, agent_id))? {
                RecordRead::Found(notes) => notes,
                RecordRead::Missing | RecordRead::Corrupt => Vec::new(),
            },
        )
    }

    /// Append a note, evicting the oldest past the cap.
    pub fn add(&self, user_id: &str, agent_id: &str, text: &str) -> ServerResult<Vec<InsightNote>> {
        let mut notes = self.get(user_id, agent_id)?;
        notes.push(InsightNote {
            insight: text.to_string(),
            timestamp: Local::now().to_rfc3339(),
        });
        if notes.len() > INSIGHTS_CAP {
            let excess = notes.len() - INSIGHTS_CAP;
            notes.drain(..excess);
        }

        self.vault
            .put_record(&insights_key(user_id, agent_id), &notes, INSIGHTS_TTL_SECS)?;
        Ok(notes)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────
