use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const API_KEYS: &str = "api_keys";
pub const REMINDERS: &str = "reminders";
pub const CUSTOM_COMMANDS: &str = "custom_commands";
pub const GUILD_CONFIG: &str = "guild_config";
pub const ROLE_REACTIONS: &str = "role_reactions";

#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    Serde(serde_json::Error),
    Poisoned,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(e) => write!(f, "database error: {e}"),
            Self::Serde(e) => write!(f, "stored document is malformed: {e}"),
            Self::Poisoned => write!(f, "database connection lock poisoned"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Sqlite(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e)
    }
}

/// Flat JSON documents grouped by collection and addressed by a string key
/// (a Discord snowflake or a composite `guild-message` id).
pub struct DocumentStore {
    conn: Mutex<Connection>,
}

impl DocumentStore {
    pub fn open(path: &str) -> Result<Self, StoreError> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                key TEXT NOT NULL,
                body TEXT NOT NULL,
                updated_at TEXT DEFAULT (datetime('now')),
                PRIMARY KEY (collection, key)
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn get<T: DeserializeOwned>(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<T>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND key = ?2",
                params![collection, key],
                |row| row.get(0),
            )
            .optional()?;

        match body {
            Some(body) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }

    pub fn set<T: Serialize>(&self, collection: &str, key: &str, doc: &T) -> Result<(), StoreError> {
        let body = serde_json::to_string(doc)?;
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        conn.execute(
            "INSERT INTO documents (collection, key, body) VALUES (?1, ?2, ?3)
             ON CONFLICT (collection, key)
             DO UPDATE SET body = excluded.body, updated_at = datetime('now')",
            params![collection, key, body],
        )?;
        Ok(())
    }

    /// Returns whether a document was removed.
    pub fn delete(&self, collection: &str, key: &str) -> Result<bool, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let removed = conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND key = ?2",
            params![collection, key],
        )?;
        Ok(removed > 0)
    }

    /// All documents of a collection as `(key, document)` pairs, ordered by key.
    ///
    /// A malformed document is skipped with a warning instead of failing the
    /// whole load.
    pub fn list<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<(String, T)>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let mut stmt =
            conn.prepare("SELECT key, body FROM documents WHERE collection = ?1 ORDER BY key")?;
        let rows = stmt.query_map(params![collection], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut docs = Vec::new();
        for row in rows {
            let (key, body) = row?;
            match serde_json::from_str(&body) {
                Ok(doc) => docs.push((key, doc)),
                Err(e) => tracing::warn!("skipping malformed document {collection}/{key}: {e}"),
            }
        }
        Ok(docs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Note {
        text: String,
        count: u32,
    }

    #[test]
    fn test_set_then_get() {
        let store = DocumentStore::open_in_memory().unwrap();
        let note = Note {
            text: "hello".to_string(),
            count: 2,
        };
        store.set("notes", "1", &note).unwrap();

        let loaded: Option<Note> = store.get("notes", "1").unwrap();
        assert_eq!(loaded, Some(note));
    }

    #[test]
    fn test_get_missing_is_none() {
        let store = DocumentStore::open_in_memory().unwrap();
        let loaded: Option<Note> = store.get("notes", "nope").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_set_overwrites() {
        let store = DocumentStore::open_in_memory().unwrap();
        store
            .set("notes", "1", &Note { text: "a".into(), count: 1 })
            .unwrap();
        store
            .set("notes", "1", &Note { text: "b".into(), count: 5 })
            .unwrap();

        let loaded: Note = store.get("notes", "1").unwrap().unwrap();
        assert_eq!(loaded.text, "b");
        assert_eq!(loaded.count, 5);
    }

    #[test]
    fn test_collections_are_isolated() {
        let store = DocumentStore::open_in_memory().unwrap();
        store
            .set("a", "key", &Note { text: "in a".into(), count: 0 })
            .unwrap();

        let from_b: Option<Note> = store.get("b", "key").unwrap();
        assert!(from_b.is_none());
        assert_eq!(store.list::<Note>("b").unwrap().len(), 0);
    }

    #[test]
    fn test_delete() {
        let store = DocumentStore::open_in_memory().unwrap();
        store
            .set("notes", "1", &Note { text: "x".into(), count: 0 })
            .unwrap();

        assert!(store.delete("notes", "1").unwrap());
        assert!(!store.delete("notes", "1").unwrap());
        assert!(store.get::<Note>("notes", "1").unwrap().is_none());
    }

    #[test]
    fn test_list_skips_malformed() {
        let store = DocumentStore::open_in_memory().unwrap();
        store
            .set("notes", "1", &Note { text: "ok".into(), count: 1 })
            .unwrap();
        store.set("notes", "2", &"not a note").unwrap();

        let docs: Vec<(String, Note)> = store.list("notes").unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].0, "1");
    }
}
