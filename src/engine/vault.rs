// Seraph Server — Encrypted Vault
// AES-256-GCM envelope around the kv store for everything user-derived.
//
// Key: SHA-256 of the configured shared secret (32 bytes).
// Wire form: base64(nonce(12) || ciphertext+tag), fresh random nonce per seal.
//
// Reads distinguish a record that was never written from one that no longer
// opens (wrong key, truncation, bit rot): the latter is logged, counted and
// reported as `RecordRead::Corrupt`. Callers still degrade to defaults, so a
// damaged record behaves like a missing one — the counter is what surfaces
// the damage on the health endpoint.

use aes_gcm::aead::{Aead, AeadCore, OsRng};
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::atoms::error::{ServerError, ServerResult};
use crate::engine::kv::KvStore;

/// Outcome of reading one encrypted record.
#[derive(Debug)]
pub enum RecordRead<T> {
    Found(T),
    Missing,
    /// Stored bytes exist but would not decrypt or deserialize.
    Corrupt,
}

pub struct Vault {
    kv: Arc<dyn KvStore>,
    cipher: Aes256Gcm,
    corrupt_reads: AtomicU64,
}

impl Vault {
    pub fn new(kv: Arc<dyn KvStore>, secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&digest));
        Vault {
            kv,
            cipher,
            corrupt_reads: AtomicU64::new(0),
        }
    }

    // ── Envelope ───────────────────────────────────────────────────────────

    fn seal(&self, plaintext: &[u8]) -> ServerResult<String> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|e| ServerError::Crypto(format!("AES-256-GCM encryption failed: {}", e)))?;

        // Pack: nonce (12) || ciphertext+tag
        let mut packed = Vec::with_capacity(12 + ciphertext.len());
        packed.extend_from_slice(&nonce);
        packed.extend_from_slice(&ciphertext);

        Ok(base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            &packed,
        ))
    }

    fn unseal(&self, encoded: &str) -> ServerResult<Vec<u8>> {
        let packed = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, encoded)
            .map_err(|e| ServerError::Crypto(format!("Base64 decode failed: {}", e)))?;

        if packed.len() < 12 + 16 {
            return Err(ServerError::Crypto("Ciphertext too short".into()));
        }

        let (nonce_bytes, ciphertext) = packed.split_at(12);
        let nonce = Nonce::from_slice(nonce_bytes);

        self.cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| ServerError::Crypto("Decryption failed - wrong key or corrupted data".into()))
    }

    fn decode<T: DeserializeOwned>(&self, key: &str, sealed: &str) -> Option<T> {
        let opened = self
            .unseal(sealed)
            .and_then(|bytes| serde_json::from_slice(&bytes).map_err(ServerError::from));
        match opened {
            Ok(record) => Some(record),
            Err(e) => {
                self.corrupt_reads.fetch_add(1, Ordering::Relaxed);
                warn!("[vault] Unreadable record at {}: {}", key, e);
                None
            }
        }
    }

    // ── Typed records ──────────────────────────────────────────────────────

    pub fn put_record<T: Serialize>(&self, key: &str, record: &T, ttl_secs: i64) -> ServerResult<()> {
        let json = serde_json::to_string(record)?;
        let sealed = self.seal(json.as_bytes())?;
        self.kv.set(key, &sealed, ttl_secs)
    }

    pub fn get_record<T: DeserializeOwned>(&self, key: &str) -> ServerResult<RecordRead<T>> {
        let Some(sealed) = self.kv.get(key)? else {
            return Ok(RecordRead::Missing);
        };
        Ok(match self.decode(key, &sealed) {
            Some(record) => RecordRead::Found(record),
            None => RecordRead::Corrupt,
        })
    }

    pub fn push_record<T: Serialize>(&self, key: &str, record: &T, ttl_secs: i64) -> ServerResult<()> {
        let json = serde_json::to_string(record)?;
        let sealed = self.seal(json.as_bytes())?;
        self.kv.list_push(key, &sealed, ttl_secs)
    }

    /// The most recent `limit` list records, oldest first. Entries that no
    /// longer open are counted and skipped.
    pub fn tail_records<T: DeserializeOwned>(&self, key: &str, limit: i64) -> ServerResult<Vec<T>> {
        let sealed = self.kv.list_range(key, -limit, -1)?;
        Ok(sealed
            .iter()
            .filter_map(|enc| self.decode(key, enc))
            .collect())
    }

    // ── Plaintext passthrough ──────────────────────────────────────────────
    // Counters and length/delete bookkeeping are not user content and stay
    // unencrypted, same store underneath.

    pub fn list_len(&self, key: &str) -> ServerResult<i64> {
        self.kv.list_len(key)
    }

    pub fn delete(&self, key: &str) -> ServerResult<bool> {
        self.kv.delete(key)
    }

    pub fn hash_incr(
        &self,
        key: &str,
        field: &str,
        by: i64,
        ttl_secs: Option<i64>,
    ) -> ServerResult<i64> {
        self.kv.hash_incr(key, field, by, ttl_secs)
    }

    pub fn hash_get_all(&self, key: &str) -> ServerResult<BTreeMap<String, i64>> {
        self.kv.hash_get_all(key)
    }

    pub fn ping(&self) -> bool {
        self.kv.ping()
    }

    /// Number of records that failed to open since startup.
    pub fn corrupt_reads(&self) -> u64 {
        self.corrupt_reads.load(Ordering::Relaxed)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::kv::SqliteKv;
    use serde_json::{json, Value};

    fn vault() -> Vault {
        Vault::new(Arc::new(SqliteKv::open_in_memory().unwrap()), "test-secret")
    }

    #[test]
    fn test_seal_unseal_roundtrip() {
        let v = vault();
        let sealed = v.seal(b"bonjour").unwrap();
        assert_ne!(sealed.as_bytes(), b"bonjour");
        assert_eq!(v.unseal(&sealed).unwrap(), b"bonjour");
    }

    #[test]
    fn test_nonces_differ_between_seals() {
        let v = vault();
        let a = v.seal(b"same plaintext").unwrap();
        let b = v.seal(b"same plaintext").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_record_roundtrip_arbitrary_json() {
        let v = vault();
        let record = json!({"name": "Marie", "goals": ["SEO", "ventes"], "n": 3});
        v.put_record("user:1:profile", &record, 300).unwrap();
        match v.get_record::<Value>("user:1:profile").unwrap() {
            RecordRead::Found(out) => assert_eq!(out, record),
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_record() {
        let v = vault();
        assert!(matches!(
            v.get_record::<Value>("nope").unwrap(),
            RecordRead::Missing
        ));
        assert_eq!(v.corrupt_reads(), 0);
    }

    #[test]
    fn test_wrong_key_reads_as_corrupt_and_counts() {
        let kv: Arc<dyn KvStore> = Arc::new(SqliteKv::open_in_memory().unwrap());
        let writer = Vault::new(Arc::clone(&kv), "secret-a");
        let reader = Vault::new(kv, "secret-b");

        writer.put_record("k", &json!({"x": 1}), 300).unwrap();
        assert!(matches!(
            reader.get_record::<Value>("k").unwrap(),
            RecordRead::Corrupt
        ));
        assert_eq!(reader.corrupt_reads(), 1);
    }

    #[test]
    fn test_garbage_reads_as_corrupt() {
        let v = vault();
        v.put_record("good", &json!({"x": 1}), 300).unwrap();
        // Overwrite with something that is not even valid base64
        let kv = SqliteKv::open_in_memory().unwrap();
        kv.set("bad", "not-a-record!!", 300).unwrap();
        let v2 = Vault::new(Arc::new(kv), "test-secret");
        assert!(matches!(
            v2.get_record::<Value>("bad").unwrap(),
            RecordRead::Corrupt
        ));
    }

    #[test]
    fn test_tail_records_skips_corrupt_entries() {
        let kv: Arc<dyn KvStore> = Arc::new(SqliteKv::open_in_memory().unwrap());
        let v = Vault::new(Arc::clone(&kv), "test-secret");
        v.push_record("log", &json!({"n": 1}), 300).unwrap();
        kv.list_push("log", "garbage", 300).unwrap();
        v.push_record("log", &json!({"n": 2}), 300).unwrap();

        let tail: Vec<Value> = v.tail_records("log", 10).unwrap();
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0]["n"], 1);
        assert_eq!(tail[1]["n"], 2);
        assert_eq!(v.corrupt_reads(), 1);
    }

    #[test]
    fn test_tail_records_returns_newest_oldest_first() {
        let v = vault();
        for n in 1..=8 {
            v.push_record("log", &json!({"n": n}), 300).unwrap();
        }
        let tail: Vec<Value> = v.tail_records("log", 5).unwrap();
        let ns: Vec<i64> = tail.iter().map(|e| e["n"].as_i64().unwrap()).collect();
        assert_eq!(ns, vec![4, 5, 6, 7, 8]);
    }
}
