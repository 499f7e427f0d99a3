// Seraph Server — Shared Context Store
// The knowledge every persona sees about one user: deduplicated fact and
// preference lists capped at the 20 newest entries, plus a free-form history
// summary that is overwritten wholesale. This is the cross-persona half of
// the shared-memory model; per-persona notes live in the insight store.

use std::sync::Arc;

use crate::atoms::constants::{context_key, CONTEXT_TTL_SECS, SHARED_ITEMS_CAP};
use crate::atoms::error::{ServerError, ServerResult};
use crate::atoms::types::SharedContext;
use crate::engine::vault::{RecordRead, Vault};

#[derive(Clone)]
pub struct SharedContextStore {
    vault: Arc<Vault>,
}

impl SharedContextStore {
    pub fn new(vault: Arc<Vault>) -> Self {
        SharedContextStore { vault }
    }

    /// Stored context or the empty default.
    pub fn get(&self, user_id: &str) -> ServerResult<SharedContext> {
        Ok(match self.vault.get_record(&context_key(user_id))? {
            RecordRead::Found(context) => context,
            RecordRead::Missing | RecordRead::Corrupt => SharedContext::default(),
        })
    }

    /// Add one piece of shared knowledge. `facts` and `preferences` append
    /// (deduplicated, newest 20 kept); `history_summary` overwrites. Any
    /// other kind is a caller bug and errors instead of writing.
    pub fn add(&self, user_id: &str, kind: &str, value: &str) -> ServerResult<SharedContext> {
        let mut context = self.get(user_id)?;

        match kind {
            "facts" => append_capped(&mut context.facts, value),
            "preferences" => append_capped(&mut context.preferences, value),
            "history_summary" => context.history_summary = value.to_string(),
            other => {
                return Err(ServerError::Other(format!(
                    "Unknown shared context kind: {}",
                    other
                )))
            }
        }

        self.vault
            .put_record(&context_key(user_id), &context, CONTEXT_TTL_SECS)?;
        Ok(context)
    }
}

fn append_capped(list: &mut Vec<String>, value: &str) {
    if list.iter().any(|v| v == value) {
        return;
    }
    list.push(value.to_string());
    if list.len() > SHARED_ITEMS_CAP {
        let excess = list.len() - SHARED_ITEMS_CAP;
        list.drain(..excess);
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────
