use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serenity::model::id::UserId;

use crate::store::{DocumentStore, StoreError, API_KEYS};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ApiKeyRecord {
    pub api_key: String,
    pub account_name: String,
    pub updated_at: DateTime<Utc>,
    pub active: bool,
}

impl ApiKeyRecord {
    /// The key with everything but its first segment hidden.
    pub fn masked(&self) -> String {
        let visible: String = self.api_key.chars().take(8).collect();
        format!("{visible}…")
    }
}

/// GW2 keys are 72 characters: hex groups of 8-4-4-4-20-4-4-4-12.
pub fn is_well_formed(api_key: &str) -> bool {
    const GROUPS: [usize; 9] = [8, 4, 4, 4, 20, 4, 4, 4, 12];
    let parts: Vec<&str> = api_key.split('-').collect();
    parts.len() == GROUPS.len()
        && parts
            .iter()
            .zip(GROUPS)
            .all(|(part, len)| part.len() == len && part.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Every API key a user has registered. At most one is active.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct ApiKeyRing {
    keys: Vec<ApiKeyRecord>,
}

impl ApiKeyRing {
    pub fn load(store: &DocumentStore, user_id: UserId) -> Result<Self, StoreError> {
        Ok(store
            .get(API_KEYS, &user_id.to_string())?
            .unwrap_or_default())
    }

    pub fn save(&self, store: &DocumentStore, user_id: UserId) -> Result<(), StoreError> {
        let key = user_id.to_string();
        if self.keys.is_empty() {
            store.delete(API_KEYS, &key)?;
        } else {
            store.set(API_KEYS, &key, self)?;
        }
        Ok(())
    }

    pub fn keys(&self) -> &[ApiKeyRecord] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn active(&self) -> Option<&ApiKeyRecord> {
        self.keys.iter().find(|k| k.active)
    }

    /// Adds or refreshes a key and makes it the active one.
    pub fn upsert(&mut self, api_key: &str, account_name: &str, now: DateTime<Utc>) {
        for key in &mut self.keys {
            key.active = false;
        }

        match self.keys.iter_mut().find(|k| k.api_key == api_key) {
            Some(existing) => {
                existing.account_name = account_name.to_string();
                existing.updated_at = now;
                existing.active = true;
            }
            None => self.keys.push(ApiKeyRecord {
                api_key: api_key.to_string(),
                account_name: account_name.to_string(),
                updated_at: now,
                active: true,
            }),
        }
    }

    /// Makes the key at `index` (0-based) active. Returns false if there is no such key.
    pub fn activate(&mut self, index: usize) -> bool {
        if index >= self.keys.len() {
            return false;
        }
        for (i, key) in self.keys.iter_mut().enumerate() {
            key.active = i == index;
        }
        true
    }

    /// Position of the key registered for an account, matched case-insensitively.
    pub fn position_by_account(&self, account_name: &str) -> Option<usize> {
        self.keys
            .iter()
            .position(|k| k.account_name.eq_ignore_ascii_case(account_name))
    }

    /// Removes the key at `index`. If it was active, the most recently
    /// updated remaining key takes over.
    pub fn remove(&mut self, index: usize) -> Option<ApiKeyRecord> {
        if index >= self.keys.len() {
            return None;
        }
        let removed = self.keys.remove(index);

        if removed.active {
            if let Some(newest) = self.keys.iter_mut().max_by_key(|k| k.updated_at) {
                newest.active = true;
            }
        }
        Some(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    const SAMPLE_KEY: &str =
        "564F181A-F0FC-114A-A55D-3C1DCD45F3767AF3848F-AB29-4EBF-9594-F91E6A75E015";

    #[test]
    fn test_is_well_formed() {
        assert!(is_well_formed(SAMPLE_KEY));
        assert!(!is_well_formed("not-a-key"));
        assert!(!is_well_formed(&SAMPLE_KEY.replace('F', "G")));
        assert!(!is_well_formed(&SAMPLE_KEY[..71]));
    }

    fn t(offset_secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(offset_secs)
    }

    fn active_count(ring: &ApiKeyRing) -> usize {
        ring.keys().iter().filter(|k| k.active).count()
    }

    #[test]
    fn test_upsert_makes_newest_active() {
        let mut ring = ApiKeyRing::default();
        ring.upsert("KEY-A", "Alpha.1234", t(0));
        ring.upsert("KEY-B", "Beta.5678", t(10));

        assert_eq!(ring.keys().len(), 2);
        assert_eq!(active_count(&ring), 1);
        assert_eq!(ring.active().unwrap().api_key, "KEY-B");
    }

    #[test]
    fn test_upsert_existing_key_refreshes() {
        let mut ring = ApiKeyRing::default();
        ring.upsert("KEY-A", "Alpha.1234", t(0));
        ring.upsert("KEY-B", "Beta.5678", t(10));
        ring.upsert("KEY-A", "Renamed.1234", t(20));

        assert_eq!(ring.keys().len(), 2);
        assert_eq!(active_count(&ring), 1);
        let active = ring.active().unwrap();
        assert_eq!(active.account_name, "Renamed.1234");
        assert_eq!(active.updated_at, t(20));
    }

    #[test]
    fn test_activate() {
        let mut ring = ApiKeyRing::default();
        ring.upsert("KEY-A", "Alpha.1234", t(0));
        ring.upsert("KEY-B", "Beta.5678", t(10));

        assert!(ring.activate(0));
        assert_eq!(ring.active().unwrap().api_key, "KEY-A");
        assert_eq!(active_count(&ring), 1);

        assert!(!ring.activate(5));
        assert_eq!(ring.active().unwrap().api_key, "KEY-A");
    }

    #[test]
    fn test_remove_active_promotes_newest() {
        let mut ring = ApiKeyRing::default();
        ring.upsert("KEY-A", "Alpha.1234", t(0));
        ring.upsert("KEY-B", "Beta.5678", t(10));
        ring.upsert("KEY-C", "Gamma.9012", t(5));

        let removed = ring.remove(2).unwrap();
        assert_eq!(removed.api_key, "KEY-C");
        assert_eq!(ring.active().unwrap().api_key, "KEY-B");
        assert_eq!(active_count(&ring), 1);
    }

    #[test]
    fn test_remove_inactive_keeps_active() {
        let mut ring = ApiKeyRing::default();
        ring.upsert("KEY-A", "Alpha.1234", t(0));
        ring.upsert("KEY-B", "Beta.5678", t(10));

        ring.remove(0).unwrap();
        assert_eq!(ring.active().unwrap().api_key, "KEY-B");
        assert!(ring.remove(3).is_none());
    }

    #[test]
    fn test_position_by_account() {
        let mut ring = ApiKeyRing::default();
        ring.upsert("KEY-A", "Alpha.1234", t(0));
        assert_eq!(ring.position_by_account("alpha.1234"), Some(0));
        assert_eq!(ring.position_by_account("nobody"), None);
    }

    #[test]
    fn test_masked() {
        let mut ring = ApiKeyRing::default();
        ring.upsert("ABCDEFGH-1234-5678", "Alpha.1234", t(0));
        assert_eq!(ring.keys()[0].masked(), "ABCDEFGH…");
    }

    #[test]
    fn test_store_roundtrip_and_delete_when_empty() {
        let store = DocumentStore::open_in_memory().unwrap();
        let user = UserId::new(42);

        let mut ring = ApiKeyRing::default();
        ring.upsert("KEY-A", "Alpha.1234", t(0));
        ring.save(&store, user).unwrap();

        let loaded = ApiKeyRing::load(&store, user).unwrap();
        assert_eq!(loaded, ring);

        let mut emptied = loaded;
        emptied.remove(0);
        emptied.save(&store, user).unwrap();
        assert!(store.get::<ApiKeyRing>(API_KEYS, "42").unwrap().is_none());
    }
}
