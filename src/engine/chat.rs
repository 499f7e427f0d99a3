// Seraph Server — Chat Orchestrator
// Three stages per message: Compose (resolve persona, assemble context,
// render prompt, splice datetime/lookup/history), Generate (one completion
// call), Persist (history + profile touch, skipped for anonymous users).
// No retries and no queues — one message, one pass, synchronous end to end.

use log::info;
use std::sync::Arc;

use crate::atoms::constants::{ANONYMOUS_USER, CHAT_HISTORY_TURNS};
use crate::atoms::error::ServerResult;
use crate::engine::agents::{AgentRegistry, Persona};
use crate::engine::assembler;
use crate::engine::clock;
use crate::engine::completion::{ChatMessage, CompletionClient};
use crate::engine::context::SharedContextStore;
use crate::engine::history::HistoryStore;
use crate::engine::insights::InsightStore;
use crate::engine::profile::ProfileStore;
use crate::engine::search::{self, LookupClient};

/// A generated reply plus the persona that produced it.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub response: String,
    pub agent_id: String,
    pub agent_name: String,
    pub agent_role: String,
}

#[derive(Clone)]
pub struct ChatEngine {
    registry: Arc<AgentRegistry>,
    profiles: ProfileStore,
    shared: SharedContextStore,
    insights: InsightStore,
    history: HistoryStore,
    completion: CompletionClient,
    lookup: LookupClient,
}

impl ChatEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        registry: Arc<AgentRegistry>,
        profiles: ProfileStore,
        shared: SharedContextStore,
        insights: InsightStore,
        history: HistoryStore,
        completion: CompletionClient,
        lookup: LookupClient,
    ) -> Self {
        ChatEngine {
            registry,
            profiles,
            shared,
            insights,
            history,
            completion,
            lookup,
        }
    }

    /// Compose the full message list for one request. `lookup_block` is the
    /// already-resolved web lookup output (results or the degraded string);
    /// `None` means the message triggered no lookup.
    fn compose(
        &self,
        persona: &Persona,
        user_id: &str,
        message: &str,
        lookup_block: Option<&str>,
    ) -> ServerResult<Vec<ChatMessage>> {
        let ids = self.registry.ids();
        let context = assembler::assemble(
            &self.profiles,
            &self.shared,
            &self.insights,
            &ids,
            persona.id,
            user_id,
        )?;

        let mut system = assembler::render(persona.template, &context)?;
        system.push_str(&format!(
            "\n\nDate et heure actuelles: {}",
            clock::french_now()
        ));
        if let Some(block) = lookup_block {
            system.push_str(&format!("\n\n[Resultats de recherche web]:\n{}", block));
        }

        let mut messages = vec![ChatMessage::system(system)];
        for entry in self
            .history
            .recent(user_id, persona.id, CHAT_HISTORY_TURNS)?
        {
            messages.push(ChatMessage::user(entry.message));
            messages.push(ChatMessage::assistant(entry.response));
        }
        messages.push(ChatMessage::user(message));
        Ok(messages)
    }

    /// Handle one incoming chat message end to end.
    pub async fn handle(
        &self,
        message: &str,
        agent_id: Option<&str>,
        user_id: Option<&str>,
    ) -> ServerResult<ChatOutcome> {
        // Compose
        let persona = self.registry.resolve(agent_id);
        let user_id = user_id.filter(|id| !id.is_empty()).unwrap_or(ANONYMOUS_USER);
        info!(
            "[chat] {} -> {} ({} chars)",
            user_id,
            persona.id,
            message.len()
        );

        let lookup_block = if search::needs_lookup(message) {
            Some(match self.lookup.run(message).await {
                Ok(results) => results,
                Err(e) => format!("Recherche indisponible: {}", e),
            })
        } else {
            None
        };
        let messages = self.compose(persona, user_id, message, lookup_block.as_deref())?;

        // Generate
        let response = self.completion.complete(&messages).await?;

        // Persist — anonymous users leave no trace
        if user_id != ANONYMOUS_USER {
            self.history
                .append(user_id, persona.id, persona.name, message, &response)?;
            self.profiles.touch(user_id)?;
        }

        Ok(ChatOutcome {
            response,
            agent_id: persona.id.to_string(),
            agent_name: persona.name.to_string(),
            agent_role: persona.role.to_string(),
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────
