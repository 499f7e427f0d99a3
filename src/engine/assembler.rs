// Seraph Server — Prompt Context Assembler
// Merges profile, shared context and peer insight logs into the typed set of
// fields a persona template can reference. Two contracts are enforced here:
//
//   • Peer insights are a read-only view — the assembler only ever reads the
//     OTHER personas' logs, so a persona can never see (or launder) its own
//     notes through its prompt. That read-only view is the entire
//     inter-persona communication model.
//   • Templates are typed — a placeholder is either `user_context`,
//     `shared_knowledge` or `{peer}_insights` for a real peer. Anything else
//     is rejected when the registry is built, so rendering cannot fail per
//     request on a typo.

use std::collections::BTreeMap;

use crate::atoms::constants::{
    NEW_USER_PLACEHOLDER, NO_INSIGHTS_PLACEHOLDER, NO_SHARED_PLACEHOLDER, PEER_INSIGHTS_PREVIEW,
    PROFILE_LIST_PREVIEW, SHARED_PREVIEW,
};
use crate::atoms::error::{ServerError, ServerResult};
use crate::engine::context::SharedContextStore;
use crate::engine::insights::InsightStore;
use crate::engine::profile::ProfileStore;

/// Everything a persona template may substitute.
#[derive(Debug, Clone)]
pub struct PromptContext {
    /// Bullet block of populated profile fields, or the new-user placeholder.
    pub user_context: String,
    /// Labeled fact/preference lines, or the no-shared-knowledge placeholder.
    pub shared_knowledge: String,
    /// Peer persona id → comma-joined newest insights (or placeholder).
    /// Never contains the target persona itself.
    pub peer_insights: BTreeMap<String, String>,
}

impl PromptContext {
    /// Placeholder name → substitution value.
    fn fields(&self) -> BTreeMap<String, &str> {
        let mut fields: BTreeMap<String, &str> = BTreeMap::new();
        fields.insert("user_context".into(), &self.user_context);
        fields.insert("shared_knowledge".into(), &self.shared_knowledge);
        for (peer, joined) in &self.peer_insights {
            fields.insert(format!("{}_insights", peer), joined);
        }
        fields
    }
}

// ── Assembly ───────────────────────────────────────────────────────────────

/// Build the prompt context for `target_id` over all personas in `agent_ids`.
pub fn assemble(
    profiles: &ProfileStore,
    shared: &SharedContextStore,
    insights: &InsightStore,
    agent_ids: &[&str],
    target_id: &str,
    user_id: &str,
) -> ServerResult<PromptContext> {
    let profile = profiles.get(user_id)?;

    let mut bullets = Vec::new();
    if let Some(name) = &profile.name {
        bullets.push(format!("- Nom: {}", name));
    }
    if let Some(company) = &profile.company {
        bullets.push(format!("- Entreprise: {}", company));
    }
    if let Some(sector) = &profile.sector {
        bullets.push(format!("- Secteur: {}", sector));
    }
    if !profile.goals.is_empty() {
        bullets.push(format!(
            "- Objectifs: {}",
            join_first(&profile.goals, PROFILE_LIST_PREVIEW)
        ));
    }
    if !profile.challenges.is_empty() {
        bullets.push(format!(
            "- Defis: {}",
            join_first(&profile.challenges, PROFILE_LIST_PREVIEW)
        ));
    }
    let user_context = if bullets.is_empty() {
        NEW_USER_PLACEHOLDER.to_string()
    } else {
        bullets.join("\n")
    };

    let context = shared.get(user_id)?;
    let mut lines = Vec::new();
    if !context.facts.is_empty() {
        lines.push(format!("Faits: {}", join_last(&context.facts, SHARED_PREVIEW)));
    }
    if !context.preferences.is_empty() {
        lines.push(format!(
            "Preferences: {}",
            join_last(&context.preferences, SHARED_PREVIEW)
        ));
    }
    let shared_knowledge = if lines.is_empty() {
        NO_SHARED_PLACEHOLDER.to_string()
    } else {
        lines.join("\n")
    };

    let mut peer_insights = BTreeMap::new();
    for peer in agent_ids.iter().filter(|id| **id != target_id) {
        let notes = insights.get(user_id, peer)?;
        let texts: Vec<String> = notes
            .iter()
            .rev()
            .take(PEER_INSIGHTS_PREVIEW)
            .rev()
            .map(|n| n.insight.clone())
            .collect();
        let joined = if texts.is_empty() {
            NO_INSIGHTS_PLACEHOLDER.to_string()
        } else {
            texts.join(", ")
        };
        peer_insights.insert(peer.to_string(), joined);
    }

    Ok(PromptContext {
        user_context,
        shared_knowledge,
        peer_insights,
    })
}

fn join_first(values: &[String], n: usize) -> String {
    values.iter().take(n).cloned().collect::<Vec<_>>().join(", ")
}

fn join_last(values: &[String], n: usize) -> String {
    let skip = values.len().saturating_sub(n);
    values[skip..].join(", ")
}

// ── Template rendering ─────────────────────────────────────────────────────

/// `{name}` spans found in a template, in order of appearance.
fn placeholders(template: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        rest = &rest[open + 1..];
        if let Some(close) = rest.find('}') {
            names.push(rest[..close].to_string());
            rest = &rest[close + 1..];
        } else {
            break;
        }
    }
    names
}

/// Check, at registry construction, that every placeholder in `template`
/// is fillable for `target_id` given the full roster.
pub fn validate_template(template: &str, target_id: &str, agent_ids: &[&str]) -> ServerResult<()> {
    for name in placeholders(template) {
        let known = name == "user_context"
            || name == "shared_knowledge"
            || agent_ids
                .iter()
                .filter(|id| **id != target_id)
                .any(|peer| name == format!("{}_insights", peer));
        if !known {
            return Err(ServerError::Config(format!(
                "Unfillable placeholder {{{}}}",
                name
            )));
        }
    }
    Ok(())
}

/// Substitute every placeholder from the assembled context. A name the
/// context cannot supply errors — unreachable for registry-validated
/// templates, loud for everything else.
pub fn render(template: &str, context: &PromptContext) -> ServerResult<String> {
    let fields = context.fields();
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        rest = &rest[open + 1..];
        let Some(close) = rest.find('}') else {
            out.push('{');
            break;
        };
        let name = &rest[..close];
        match fields.get(name) {
            Some(value) => out.push_str(value),
            None => {
                return Err(ServerError::Config(format!(
                    "Template references unknown field {{{}}}",
                    name
                )))
            }
        }
        rest = &rest[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::types::{OneOrMany, ProfileUpdate};
    use crate::engine::kv::SqliteKv;
    use crate::engine::vault::Vault;
    use std::sync::Arc;

    const IDS: [&str; 3] = ["raphael", "gabriel", "michael"];

    fn stores() -> (ProfileStore, SharedContextStore, InsightStore) {
        let kv = Arc::new(SqliteKv::open_in_memory().unwrap());
        let vault = Arc::new(Vault::new(kv, "test-secret"));
        (
            ProfileStore::new(Arc::clone(&vault)),
            SharedContextStore::new(Arc::clone(&vault)),
            InsightStore::new(vault),
        )
    }

    #[test]
    fn test_new_user_gets_placeholders_verbatim() {
        let (profiles, shared, insights) = stores();
        let ctx = assemble(&profiles, &shared, &insights, &IDS, "raphael", "inconnu").unwrap();
        assert_eq!(ctx.user_context, NEW_USER_PLACEHOLDER);
        assert_eq!(ctx.shared_knowledge, NO_SHARED_PLACEHOLDER);
        assert_eq!(
            ctx.peer_insights.get("gabriel").map(String::as_str),
            Some(NO_INSIGHTS_PLACEHOLDER)
        );
    }

    #[test]
    fn test_populated_profile_renders_bullets() {
        let (profiles, shared, insights) = stores();
        profiles
            .update(
                "u1",
                &ProfileUpdate {
                    name: Some("Marie".into()),
                    sector: Some("artisanat".into()),
                    goals: Some(OneOrMany::Many(vec![
                        "g1".into(),
                        "g2".into(),
                        "g3".into(),
                        "g4".into(),
                        "g5".into(),
                        "g6".into(),
                    ])),
                    ..Default::default()
                },
            )
            .unwrap();
        let ctx = assemble(&profiles, &shared, &insights, &IDS, "raphael", "u1").unwrap();
        assert!(ctx.user_context.contains("- Nom: Marie"));
        assert!(ctx.user_context.contains("- Secteur: artisanat"));
        assert!(!ctx.user_context.contains("- Entreprise:"));
        // Only the first five goals appear
        assert!(ctx.user_context.contains("- Objectifs: g1, g2, g3, g4, g5"));
        assert!(!ctx.user_context.contains("g6"));
    }

    #[test]
    fn test_shared_knowledge_shows_newest_five() {
        let (profiles, shared, insights) = stores();
        for n in 1..=7 {
            shared.add("u1", "facts", &format!("fait {}", n)).unwrap();
        }
        shared.add("u1", "preferences", "ton informel").unwrap();
        let ctx = assemble(&profiles, &shared, &insights, &IDS, "raphael", "u1").unwrap();
        assert!(ctx
            .shared_knowledge
            .contains("Faits: fait 3, fait 4, fait 5, fait 6, fait 7"));
        assert!(ctx.shared_knowledge.contains("Preferences: ton informel"));
    }

    #[test]
    fn test_gabriel_sees_michaels_newest_three_never_its_own() {
        let (profiles, shared, insights) = stores();
        for n in 1..=5 {
            insights
                .add("u1", "michael", &format!("note commerciale {}", n))
                .unwrap();
        }
        insights.add("u1", "gabriel", "note marketing").unwrap();

        let ctx = assemble(&profiles, &shared, &insights, &IDS, "gabriel", "u1").unwrap();
        assert_eq!(
            ctx.peer_insights.get("michael").map(String::as_str),
            Some("note commerciale 3, note commerciale 4, note commerciale 5")
        );
        assert!(!ctx.peer_insights.contains_key("gabriel"));
    }

    #[test]
    fn test_render_substitutes_every_field() {
        let ctx = PromptContext {
            user_context: "PROFIL".into(),
            shared_knowledge: "SAVOIR".into(),
            peer_insights: BTreeMap::from([("michael".to_string(), "NOTES".to_string())]),
        };
        let out = render("A {user_context} B {shared_knowledge} C {michael_insights}", &ctx).unwrap();
        assert_eq!(out, "A PROFIL B SAVOIR C NOTES");
    }

    #[test]
    fn test_render_rejects_unknown_field() {
        let ctx = PromptContext {
            user_context: String::new(),
            shared_knowledge: String::new(),
            peer_insights: BTreeMap::new(),
        };
        assert!(render("{mystere}", &ctx).is_err());
    }

    #[test]
    fn test_validate_template_rejects_self_insights() {
        assert!(validate_template("{gabriel_insights}", "michael", &IDS).is_ok());
        assert!(validate_template("{gabriel_insights}", "gabriel", &IDS).is_err());
        assert!(validate_template("{user_context} {typo}", "raphael", &IDS).is_err());
    }
}
