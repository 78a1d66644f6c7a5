//! LMDB-backed cache of the last fetched user record
//!
//! Storage patterns:
//! - `records`: credential digest -> user record JSON
//! - `fetched`: credential digest -> fetch epoch (ms, big-endian)
//!
//! Credentials are never stored, only their SHA-256 digest.

use std::path::Path;
use std::time::Duration;

use heed::types::{Str, U64};
use heed::{Database, Env, EnvOpenOptions};
use sha2::{Digest, Sha256};

use crate::error::{err, Result};
use crate::record::UserRecord;

type DbU64 = Database<Str, U64<byteorder::BigEndian>>;

pub struct UserCache {
    env: Env,
    records: Database<Str, Str>,
    fetched: DbU64,
}

impl UserCache {
    /// Open (or create) the cache at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        std::fs::create_dir_all(path).map_err(err)?;
        // SAFETY: LMDB requires no other process to open this path concurrently with different options.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(64 << 20)
                .max_dbs(2)
                .open(path)
                .map_err(err)?
        };
        let mut tx = env.write_txn().map_err(err)?;
        let records = env.create_database(&mut tx, Some("records")).map_err(err)?;
        let fetched = env.create_database(&mut tx, Some("fetched")).map_err(err)?;
        tx.commit().map_err(err)?;
        Ok(UserCache { env, records, fetched })
    }

    /// Cached record for `credential` if it was fetched less than `ttl` ago
    pub fn get(&self, credential: &str, ttl: Duration) -> Result<Option<UserRecord>> {
        let k = digest(credential);
        let tx = self.env.read_txn().map_err(err)?;
        let Some(at) = self.fetched.get(&tx, &k).map_err(err)? else { return Ok(None) };
        if now_ms().saturating_sub(at) >= ttl.as_millis() as u64 {
            return Ok(None);
        }
        match self.records.get(&tx, &k).map_err(err)? {
            Some(json) => Ok(Some(UserRecord::from_json(json)?)),
            None => Ok(None),
        }
    }

    pub fn put(&self, credential: &str, user: &UserRecord) -> Result<()> {
        self.put_at(credential, user, now_ms())
    }

    /// Store with an explicit fetch time (epoch ms)
    pub fn put_at(&self, credential: &str, user: &UserRecord, fetched_at: u64) -> Result<()> {
        let k = digest(credential);
        let json = serde_json::to_string(user)?;
        let mut tx = self.env.write_txn().map_err(err)?;
        self.records.put(&mut tx, &k, &json).map_err(err)?;
        self.fetched.put(&mut tx, &k, &fetched_at).map_err(err)?;
        tx.commit().map_err(err)
    }

    pub fn evict(&self, credential: &str) -> Result<bool> {
        let k = digest(credential);
        let mut tx = self.env.write_txn().map_err(err)?;
        let r = self.records.delete(&mut tx, &k).map_err(err)?;
        self.fetched.delete(&mut tx, &k).map_err(err)?;
        tx.commit().map_err(err)?;
        Ok(r)
    }

    pub fn clear(&self) -> Result<()> {
        let mut tx = self.env.write_txn().map_err(err)?;
        self.records.clear(&mut tx).map_err(err)?;
        self.fetched.clear(&mut tx).map_err(err)?;
        tx.commit().map_err(err)
    }

    pub fn len(&self) -> Result<u64> {
        let tx = self.env.read_txn().map_err(err)?;
        self.records.len(&tx).map_err(err)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// Hex SHA-256 of a credential
fn digest(credential: &str) -> String {
    Sha256::digest(credential.as_bytes()).iter().map(|b| format!("{:02x}", b)).collect()
}

pub(crate) fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
