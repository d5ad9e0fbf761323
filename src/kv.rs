use anyhow::Context;
use rusqlite::{Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::rc::Rc;

/// Opaque blob storage keyed by slot name.
pub trait KvStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&self, key: &str, blob: &str) -> anyhow::Result<()>;
    fn remove(&self, key: &str) -> anyhow::Result<()>;
}

impl KvStore for Connection {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        self.query_row("SELECT value FROM kv_slots WHERE key = ?", [key], |r| {
            r.get::<_, String>(0)
        })
        .optional()
        .with_context(|| format!("failed to read slot {}", key))
    }

    fn set(&self, key: &str, blob: &str) -> anyhow::Result<()> {
        let updated_at = chrono::Utc::now().to_rfc3339();
        self.execute(
            "INSERT INTO kv_slots(key, value, updated_at)
             VALUES(?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET
               value = excluded.value,
               updated_at = excluded.updated_at",
            (key, blob, &updated_at),
        )
        .with_context(|| format!("failed to write slot {}", key))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.execute("DELETE FROM kv_slots WHERE key = ?", [key])
            .with_context(|| format!("failed to remove slot {}", key))?;
        Ok(())
    }
}

/// A single named slot in a [`KvStore`], holding one serialized value.
///
/// Reads degrade to `None` and writes are best-effort: failures are logged
/// and the caller's in-memory state stays authoritative.
#[derive(Clone)]
pub struct Slot {
    kv: Rc<dyn KvStore>,
    key: &'static str,
}

impl Slot {
    pub fn new(kv: Rc<dyn KvStore>, key: &'static str) -> Self {
        Self { kv, key }
    }

    pub fn load<T: DeserializeOwned>(&self) -> Option<T> {
        let raw = match self.kv.get(self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(slot = self.key, error = %format!("{e:#}"), "slot read failed; starting empty");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(slot = self.key, error = %e, "slot holds unreadable data; starting empty");
                None
            }
        }
    }

    pub fn save<T: Serialize + ?Sized>(&self, value: &T) {
        let blob = match serde_json::to_string(value) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(slot = self.key, error = %e, "failed to serialize slot");
                return;
            }
        };
        match self.kv.set(self.key, &blob) {
            Ok(()) => tracing::debug!(slot = self.key, bytes = blob.len(), "slot saved"),
            Err(e) => {
                tracing::warn!(slot = self.key, error = %format!("{e:#}"), "slot write failed")
            }
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.kv.remove(self.key) {
            tracing::warn!(slot = self.key, error = %format!("{e:#}"), "slot remove failed");
        }
    }
}
