// ── Seraph Atoms: Constants ────────────────────────────────────────────────
// Retention caps, prompt placeholders, lookup triggers and the store key
// namespace. Rationale: collecting them in one place eliminates magic numbers
// and makes auditing the retention policy a single-file read.

use sha2::{Digest, Sha256};

// ── Record time-to-live ────────────────────────────────────────────────────
// Profiles, shared context, insights, feedback and per-user stats survive a
// year of inactivity; raw conversation logs only 90 days. Every write
// refreshes the clock.
pub(crate) const PROFILE_TTL_SECS: i64 = 86_400 * 365;
pub(crate) const CONTEXT_TTL_SECS: i64 = 86_400 * 365;
pub(crate) const INSIGHTS_TTL_SECS: i64 = 86_400 * 365;
pub(crate) const FEEDBACK_TTL_SECS: i64 = 86_400 * 365;
pub(crate) const STATS_TTL_SECS: i64 = 86_400 * 365;
pub(crate) const HISTORY_TTL_SECS: i64 = 86_400 * 90;

// ── Bounded collections ────────────────────────────────────────────────────
// Shared facts/preferences and per-persona insights are capped; appends past
// the cap drop the oldest entries.
pub(crate) const SHARED_ITEMS_CAP: usize = 20;
pub(crate) const INSIGHTS_CAP: usize = 10;

// ── History windows ────────────────────────────────────────────────────────
// The HTTP surface returns the last 10 exchanges per persona; the chat loop
// replays only the last 5 into the completion prompt.
pub(crate) const DEFAULT_HISTORY_LIMIT: i64 = 10;
pub(crate) const CHAT_HISTORY_TURNS: i64 = 5;

// ── Prompt assembly windows ────────────────────────────────────────────────
// Prompts see a trimmed view of the stores: the first 5 goals/challenges,
// the 5 newest facts/preferences, the 3 newest insights of each peer.
pub(crate) const PROFILE_LIST_PREVIEW: usize = 5;
pub(crate) const SHARED_PREVIEW: usize = 5;
pub(crate) const PEER_INSIGHTS_PREVIEW: usize = 3;

// ── Fixed French strings ───────────────────────────────────────────────────
// These are part of the persona contract: prompt templates and clients both
// key off them, so they are compared verbatim in tests.
pub(crate) const NEW_USER_PLACEHOLDER: &str = "Nouvel utilisateur - profil a decouvrir";
pub(crate) const NO_SHARED_PLACEHOLDER: &str = "Aucune connaissance partagee encore";
pub(crate) const NO_INSIGHTS_PLACEHOLDER: &str = "Pas encore d'insights";
pub(crate) const APOLOGY_REPLY: &str = "Desole, une erreur est survenue.";

/// User id that opts out of all persistence.
pub(crate) const ANONYMOUS_USER: &str = "anonymous";

// ── Web lookup triggers ────────────────────────────────────────────────────
// Case-insensitive substring match against the incoming message. Any hit
// routes the message through the web lookup before prompt composition.
pub(crate) const LOOKUP_TRIGGERS: &[&str] = &[
    "recherche",
    "cherche",
    "internet",
    "web",
    "actualite",
    "news",
    "dernier",
    "derniere",
    "recent",
    "2026",
    "2025",
    "aujourd'hui",
    "tendance",
    "prix actuel",
    "meteo",
    "bourse",
];

// ── Store key namespace ────────────────────────────────────────────────────
// Every user-scoped record lives under `user:{id}:...`. The history key
// embeds a short digest of (user, persona) so a crafted persona id cannot
// collide with another user's log.

pub(crate) fn profile_key(user_id: &str) -> String {
    format!("user:{}:profile", user_id)
}

pub(crate) fn context_key(user_id: &str) -> String {
    format!("user:{}:context", user_id)
}

pub(crate) fn history_key(user_id: &str, agent_id: &str) -> String {
    let digest = format!(
        "{:x}",
        Sha256::digest(format!("{}:{}", user_id, agent_id).as_bytes())
    );
    format!("user:{}:history:{}", user_id, &digest[..16])
}

pub(crate) fn insights_key(user_id: &str, agent_id: &str) -> String {
    format!("user:{}:insights:{}", user_id, agent_id)
}

pub(crate) fn feedback_key(user_id: &str) -> String {
    format!("user:{}:feedback", user_id)
}

pub(crate) fn stats_key(user_id: &str) -> String {
    format!("stats:{}", user_id)
}

pub(crate) fn feedback_global_key(agent_id: &str) -> String {
    format!("feedback:global:{}", agent_id)
}
