// Seraph Server — User Profile Store
// Long-lived attributes about one user: identity fields that overwrite,
// goal/challenge lists that grow. A profile that is missing, expired or
// unreadable reads as a fresh one; every save refreshes `last_interaction`
// and the one-year retention clock.

use chrono::Local;
use std::sync::Arc;

use crate::atoms::constants::{profile_key, PROFILE_TTL_SECS};
use crate::atoms::error::ServerResult;
use crate::atoms::types::{OneOrMany, ProfileUpdate, UserProfile};
use crate::engine::vault::{RecordRead, Vault};

#[derive(Clone)]
pub struct ProfileStore {
    vault: Arc<Vault>,
}

impl ProfileStore {
    pub fn new(vault: Arc<Vault>) -> Self {
        ProfileStore { vault }
    }

    /// Stored profile, or a fresh default for a user we have never seen.
    pub fn get(&self, user_id: &str) -> ServerResult<UserProfile> {
        Ok(match self.vault.get_record(&profile_key(user_id))? {
            RecordRead::Found(profile) => profile,
            RecordRead::Missing | RecordRead::Corrupt => UserProfile::fresh(user_id),
        })
    }

    /// Persist with a refreshed `last_interaction` and retention clock.
    pub fn save(&self, mut profile: UserProfile) -> ServerResult<UserProfile> {
        profile.last_interaction = Local::now().to_rfc3339();
        self.vault
            .put_record(&profile_key(&profile.user_id), &profile, PROFILE_TTL_SECS)?;
        Ok(profile)
    }

    /// Merge a partial update: string fields overwrite, a single goal or
    /// challenge appends if absent, a full list replaces. Returns the
    /// resulting profile.
    pub fn update(&self, user_id: &str, updates: &ProfileUpdate) -> ServerResult<UserProfile> {
        let mut profile = self.get(user_id)?;

        if let Some(name) = &updates.name {
            profile.name = Some(name.clone());
        }
        if let Some(company) = &updates.company {
            profile.company = Some(company.clone());
        }
        if let Some(sector) = &updates.sector {
            profile.sector = Some(sector.clone());
        }
        if let Some(goals) = &updates.goals {
            merge_list(&mut profile.goals, goals);
        }
        if let Some(challenges) = &updates.challenges {
            merge_list(&mut profile.challenges, challenges);
        }

        self.save(profile)
    }

    /// Refresh `last_interaction` without changing anything else.
    pub fn touch(&self, user_id: &str) -> ServerResult<()> {
        let profile = self.get(user_id)?;
        self.save(profile)?;
        Ok(())
    }
}

fn merge_list(existing: &mut Vec<String>, incoming: &OneOrMany) {
    match incoming {
        OneOrMany::One(value) => {
            if !existing.contains(value) {
                existing.push(value.clone());
            }
        }
        OneOrMany::Many(values) => *existing = values.clone(),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::kv::SqliteKv;

    fn store() -> ProfileStore {
        let kv = Arc::new(SqliteKv::open_in_memory().unwrap());
        ProfileStore::new(Arc::new(Vault::new(kv, "test-secret")))
    }

    #[test]
    fn test_unknown_user_gets_fresh_profile() {
        let profiles = store();
        let p = profiles.get("nouveau").unwrap();
        assert_eq!(p.user_id, "nouveau");
        assert_eq!(p.name, None);
        assert!(p.goals.is_empty());
    }

    #[test]
    fn test_update_overwrites_strings_and_appends_goals() {
        let profiles = store();
        let updates = ProfileUpdate {
            name: Some("Marie".into()),
            company: Some("Boulangerie Marie".into()),
            goals: Some(OneOrMany::One("augmenter les ventes".into())),
            ..Default::default()
        };
        let p = profiles.update("u1", &updates).unwrap();
        assert_eq!(p.name.as_deref(), Some("Marie"));
        assert_eq!(p.goals, vec!["augmenter les ventes"]);

        // Stored, not just returned
        let again = profiles.get("u1").unwrap();
        assert_eq!(again.company.as_deref(), Some("Boulangerie Marie"));
    }

    #[test]
    fn test_duplicate_goal_appends_once() {
        let profiles = store();
        let update = ProfileUpdate {
            goals: Some(OneOrMany::One("SEO".into())),
            ..Default::default()
        };
        profiles.update("u1", &update).unwrap();
        let p = profiles.update("u1", &update).unwrap();
        assert_eq!(p.goals, vec!["SEO"]);
    }

    #[test]
    fn test_list_value_replaces_wholesale() {
        let profiles = store();
        profiles
            .update(
                "u1",
                &ProfileUpdate {
                    challenges: Some(OneOrMany::One("recrutement".into())),
                    ..Default::default()
                },
            )
            .unwrap();
        let p = profiles
            .update(
                "u1",
                &ProfileUpdate {
                    challenges: Some(OneOrMany::Many(vec!["tresorerie".into()])),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(p.challenges, vec!["tresorerie"]);
    }

    #[test]
    fn test_omitted_fields_stay_untouched() {
        let profiles = store();
        profiles
            .update(
                "u1",
                &ProfileUpdate {
                    name: Some("Marie".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        let p = profiles
            .update(
                "u1",
                &ProfileUpdate {
                    sector: Some("artisanat".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(p.name.as_deref(), Some("Marie"));
        assert_eq!(p.sector.as_deref(), Some("artisanat"));
    }

    #[test]
    fn test_touch_refreshes_last_interaction() {
        let profiles = store();
        let before = profiles
            .update(
                "u1",
                &ProfileUpdate {
                    name: Some("Marie".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        profiles.touch("u1").unwrap();
        let after = profiles.get("u1").unwrap();
        assert!(after.last_interaction > before.last_interaction);
        assert_eq!(after.name.as_deref(), Some("Marie"));
    }
}
