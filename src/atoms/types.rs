// ── Seraph Atoms: Pure Data Types ──────────────────────────────────────────
// Record shapes stored in the encrypted vault, plus the patch type the
// profile endpoint accepts. Field names here ARE the wire/storage format —
// renaming one breaks both the API and every record already at rest.

use chrono::Local;
use serde::{Deserialize, Serialize};

// ── User profile ───────────────────────────────────────────────────────────

/// Per-user profile record. `goals` and `challenges` grow over time via
/// [`ProfileUpdate`]; the rest are plain overwrite fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub name: Option<String>,
    pub company: Option<String>,
    pub sector: Option<String>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub challenges: Vec<String>,
    pub created_at: String,
    pub last_interaction: String,
}

impl UserProfile {
    /// Blank profile for a user we have never seen (or whose record expired).
    pub fn fresh(user_id: &str) -> Self {
        let now = Local::now().to_rfc3339();
        UserProfile {
            user_id: user_id.to_string(),
            name: None,
            company: None,
            sector: None,
            goals: Vec::new(),
            challenges: Vec::new(),
            created_at: now.clone(),
            last_interaction: now,
        }
    }
}

/// Partial profile update. Omitted fields are left untouched; a single
/// string for `goals`/`challenges` appends (if absent), a full list replaces.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub company: Option<String>,
    pub sector: Option<String>,
    pub goals: Option<OneOrMany>,
    pub challenges: Option<OneOrMany>,
}

/// Either one value to append or a whole replacement list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

// ── Shared context ─────────────────────────────────────────────────────────

/// Cross-persona knowledge about one user. Facts and preferences are
/// deduplicated append-only lists capped to the most recent entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SharedContext {
    #[serde(default)]
    pub facts: Vec<String>,
    #[serde(default)]
    pub preferences: Vec<String>,
    #[serde(default)]
    pub history_summary: String,
}

// ── Persona insights ───────────────────────────────────────────────────────

/// One dated note a persona recorded about a user. Peers read these when
/// composing their prompts; the author never sees its own notes there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightNote {
    pub insight: String,
    pub timestamp: String,
}

// ── Conversation history ───────────────────────────────────────────────────

/// One user/persona exchange as persisted in the per-pair history log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub timestamp: String,
    pub user_id: String,
    pub agent_id: String,
    pub agent_name: String,
    pub message: String,
    pub response: String,
}

// ── Feedback ───────────────────────────────────────────────────────────────

/// One rating a user left on a persona reply. `comment` stays `null` when
/// absent so stored records keep a stable shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub timestamp: String,
    pub agent_id: String,
    pub message_id: String,
    pub rating: i64,
    pub comment: Option<String>,
}
