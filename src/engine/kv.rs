// Seraph Server — Key-Value Store
// TTL'd string/list/hash primitives behind a trait, backed by SQLite.
//
// The trait is the contract the rest of the engine writes against: an opaque
// store with per-key expiry, ordered lists and integer hash fields. Expiry is
// lazy — reads treat a past-due key as absent and purge it, writes sweep the
// key they touch first so a fresh append never resurrects stale entries.

use crate::atoms::error::ServerResult;
use log::info;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::Path;

// ── Store contract ─────────────────────────────────────────────────────────

pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> ServerResult<Option<String>>;
    fn set(&self, key: &str, value: &str, ttl_secs: i64) -> ServerResult<()>;
    /// Remove a key from every namespace. Returns whether anything was stored.
    fn delete(&self, key: &str) -> ServerResult<bool>;

    /// Append to a list and refresh the whole list's expiry.
    fn list_push(&self, key: &str, value: &str, ttl_secs: i64) -> ServerResult<()>;
    /// Inclusive range with negative-index support: -1 is the newest entry,
    /// so `(-n, -1)` yields the most recent n values, oldest first.
    fn list_range(&self, key: &str, start: i64, stop: i64) -> ServerResult<Vec<String>>;
    fn list_len(&self, key: &str) -> ServerResult<i64>;

    /// Add `by` to an integer hash field, creating it at zero. `ttl_secs`
    /// refreshes the hash's expiry when given and leaves it untouched when
    /// `None` (a hash never written with a TTL never expires).
    fn hash_incr(&self, key: &str, field: &str, by: i64, ttl_secs: Option<i64>)
        -> ServerResult<i64>;
    fn hash_get_all(&self, key: &str) -> ServerResult<BTreeMap<String, i64>>;

    /// Liveness probe for the health endpoint.
    fn ping(&self) -> bool;
}

// ── SQLite implementation ──────────────────────────────────────────────────

/// Thread-safe SQLite-backed store.
pub struct SqliteKv {
    conn: Mutex<Connection>,
}

impl SqliteKv {
    /// Open (or create) the store at `path` and initialize tables.
    pub fn open(path: &Path) -> ServerResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        info!("[kv] Opening store at {:?}", path);

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;").ok();
        run_migrations(&conn)?;

        Ok(SqliteKv {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> ServerResult<Self> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(SqliteKv {
            conn: Mutex::new(conn),
        })
    }
}

fn run_migrations(conn: &Connection) -> ServerResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS kv_strings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            expires_at INTEGER
        );

        CREATE TABLE IF NOT EXISTS kv_list_items (
            key TEXT NOT NULL,
            seq INTEGER NOT NULL,
            value TEXT NOT NULL,
            PRIMARY KEY (key, seq)
        );

        CREATE TABLE IF NOT EXISTS kv_hash_fields (
            key TEXT NOT NULL,
            field TEXT NOT NULL,
            value INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (key, field)
        );

        CREATE TABLE IF NOT EXISTS kv_expiry (
            key TEXT PRIMARY KEY,
            expires_at INTEGER
        );
    ",
    )?;
    Ok(())
}

fn now_epoch() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Drop a list/hash key whose expiry (tracked in kv_expiry) has passed.
fn sweep_collection(conn: &Connection, key: &str) -> ServerResult<()> {
    let expires: Option<Option<i64>> = conn
        .query_row(
            "SELECT expires_at FROM kv_expiry WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(Some(at)) = expires {
        if at <= now_epoch() {
            conn.execute("DELETE FROM kv_list_items WHERE key = ?1", params![key])?;
            conn.execute("DELETE FROM kv_hash_fields WHERE key = ?1", params![key])?;
            conn.execute("DELETE FROM kv_expiry WHERE key = ?1", params![key])?;
        }
    }
    Ok(())
}

impl KvStore for SqliteKv {
    fn get(&self, key: &str) -> ServerResult<Option<String>> {
        let conn = self.conn.lock();
        let row: Option<(String, Option<i64>)> = conn
            .query_row(
                "SELECT value, expires_at FROM kv_strings WHERE key = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((_, Some(at))) if at <= now_epoch() => {
                conn.execute("DELETE FROM kv_strings WHERE key = ?1", params![key])?;
                Ok(None)
            }
            Some((value, _)) => Ok(Some(value)),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str, ttl_secs: i64) -> ServerResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO kv_strings (key, value, expires_at) VALUES (?1, ?2, ?3)",
            params![key, value, now_epoch() + ttl_secs],
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> ServerResult<bool> {
        let conn = self.conn.lock();
        let mut removed = conn.execute("DELETE FROM kv_strings WHERE key = ?1", params![key])?;
        removed += conn.execute("DELETE FROM kv_list_items WHERE key = ?1", params![key])?;
        removed += conn.execute("DELETE FROM kv_hash_fields WHERE key = ?1", params![key])?;
        conn.execute("DELETE FROM kv_expiry WHERE key = ?1", params![key])?;
        Ok(removed > 0)
    }

    fn list_push(&self, key: &str, value: &str, ttl_secs: i64) -> ServerResult<()> {
        let conn = self.conn.lock();
        sweep_collection(&conn, key)?;
        conn.execute(
            "INSERT INTO kv_list_items (key, seq, value)
             VALUES (?1, COALESCE((SELECT MAX(seq) + 1 FROM kv_list_items WHERE key = ?1), 0), ?2)",
            params![key, value],
        )?;
        conn.execute(
            "INSERT OR REPLACE INTO kv_expiry (key, expires_at) VALUES (?1, ?2)",
            params![key, now_epoch() + ttl_secs],
        )?;
        Ok(())
    }

    fn list_range(&self, key: &str, start: i64, stop: i64) -> ServerResult<Vec<String>> {
        let conn = self.conn.lock();
        sweep_collection(&conn, key)?;

        let len: i64 = conn.query_row(
            "SELECT COUNT(*) FROM kv_list_items WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )?;
        if len == 0 {
            return Ok(Vec::new());
        }

        let from = (if start < 0 { len + start } else { start }).max(0);
        let to = (if stop < 0 { len + stop } else { stop }).min(len - 1);
        if from > to {
            return Ok(Vec::new());
        }

        let mut stmt = conn.prepare(
            "SELECT value FROM kv_list_items WHERE key = ?1 ORDER BY seq LIMIT ?2 OFFSET ?3",
        )?;
        let rows = stmt.query_map(params![key, to - from + 1, from], |row| row.get(0))?;
        let mut values = Vec::new();
        for row in rows {
            values.push(row?);
        }
        Ok(values)
    }

    fn list_len(&self, key: &str) -> ServerResult<i64> {
        let conn = self.conn.lock();
        sweep_collection(&conn, key)?;
        let len = conn.query_row(
            "SELECT COUNT(*) FROM kv_list_items WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )?;
        Ok(len)
    }

    fn hash_incr(
        &self,
        key: &str,
        field: &str,
        by: i64,
        ttl_secs: Option<i64>,
    ) -> ServerResult<i64> {
        let conn = self.conn.lock();
        sweep_collection(&conn, key)?;
        conn.execute(
            "INSERT INTO kv_hash_fields (key, field, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(key, field) DO UPDATE SET value = kv_hash_fields.value + excluded.value",
            params![key, field, by],
        )?;
        if let Some(ttl) = ttl_secs {
            conn.execute(
                "INSERT OR REPLACE INTO kv_expiry (key, expires_at) VALUES (?1, ?2)",
                params![key, now_epoch() + ttl],
            )?;
        }
        let value = conn.query_row(
            "SELECT value FROM kv_hash_fields WHERE key = ?1 AND field = ?2",
            params![key, field],
            |row| row.get(0),
        )?;
        Ok(value)
    }

    fn hash_get_all(&self, key: &str) -> ServerResult<BTreeMap<String, i64>> {
        let conn = self.conn.lock();
        sweep_collection(&conn, key)?;
        let mut stmt =
            conn.prepare("SELECT field, value FROM kv_hash_fields WHERE key = ?1")?;
        let rows = stmt.query_map(params![key], |row| Ok((row.get(0)?, row.get(1)?)))?;
        let mut fields = BTreeMap::new();
        for row in rows {
            let (field, value): (String, i64) = row?;
            fields.insert(field, value);
        }
        Ok(fields)
    }

    fn ping(&self) -> bool {
        let conn = self.conn.lock();
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .is_ok()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteKv {
        SqliteKv::open_in_memory().unwrap()
    }

    #[test]
    fn test_set_get_roundtrip() {
        let kv = store();
        kv.set("user:1:profile", "payload", 300).unwrap();
        assert_eq!(kv.get("user:1:profile").unwrap().as_deref(), Some("payload"));
        assert_eq!(kv.get("user:2:profile").unwrap(), None);
    }

    #[test]
    fn test_expired_string_reads_as_absent() {
        let kv = store();
        kv.set("stale", "payload", -5).unwrap();
        assert_eq!(kv.get("stale").unwrap(), None);
        // The row is purged, not just hidden
        kv.set("stale", "fresh", 300).unwrap();
        assert_eq!(kv.get("stale").unwrap().as_deref(), Some("fresh"));
    }

    #[test]
    fn test_set_overwrites() {
        let kv = store();
        kv.set("k", "one", 300).unwrap();
        kv.set("k", "two", 300).unwrap();
        assert_eq!(kv.get("k").unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn test_list_push_and_negative_range() {
        let kv = store();
        for v in ["a", "b", "c", "d"] {
            kv.list_push("log", v, 300).unwrap();
        }
        assert_eq!(kv.list_len("log").unwrap(), 4);
        // Last two entries, oldest first
        assert_eq!(kv.list_range("log", -2, -1).unwrap(), vec!["c", "d"]);
        // Asking for more than exists returns everything
        assert_eq!(
            kv.list_range("log", -10, -1).unwrap(),
            vec!["a", "b", "c", "d"]
        );
        assert_eq!(kv.list_range("log", 1, 2).unwrap(), vec!["b", "c"]);
    }

    #[test]
    fn test_expired_list_does_not_resurrect() {
        let kv = store();
        kv.list_push("log", "ancient", -5).unwrap();
        kv.list_push("log", "new", 300).unwrap();
        assert_eq!(kv.list_range("log", 0, -1).unwrap(), vec!["new"]);
    }

    #[test]
    fn test_delete_clears_every_namespace() {
        let kv = store();
        kv.set("k", "v", 300).unwrap();
        kv.list_push("k", "item", 300).unwrap();
        kv.hash_incr("k", "count", 1, None).unwrap();
        assert!(kv.delete("k").unwrap());
        assert_eq!(kv.get("k").unwrap(), None);
        assert_eq!(kv.list_len("k").unwrap(), 0);
        assert!(kv.hash_get_all("k").unwrap().is_empty());
        assert!(!kv.delete("k").unwrap());
    }

    #[test]
    fn test_hash_incr_accumulates() {
        let kv = store();
        assert_eq!(kv.hash_incr("stats:u", "total", 1, Some(300)).unwrap(), 1);
        assert_eq!(kv.hash_incr("stats:u", "total", 1, Some(300)).unwrap(), 2);
        assert_eq!(kv.hash_incr("stats:u", "agent_x", 1, Some(300)).unwrap(), 1);
        let all = kv.hash_get_all("stats:u").unwrap();
        assert_eq!(all.get("total"), Some(&2));
        assert_eq!(all.get("agent_x"), Some(&1));
    }

    #[test]
    fn test_hash_without_ttl_never_expires() {
        let kv = store();
        kv.hash_incr("histogram", "rating_5", 1, None).unwrap();
        let all = kv.hash_get_all("histogram").unwrap();
        assert_eq!(all.get("rating_5"), Some(&1));
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");
        let kv = SqliteKv::open(&path).unwrap();
        kv.set("k", "v", 300).unwrap();
        assert_eq!(kv.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_ping() {
        assert!(store().ping());
    }
}
