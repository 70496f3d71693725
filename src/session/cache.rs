//! Session-scoped memoization
//!
//! Caches the result of a named lookup per distinct argument list, scoped to
//! one session. Two sessions never share entries; an entry lives until the
//! session is deleted or explicitly refreshed.
//!
//! Known limitation: the cache key is derived from the call *name*, not the
//! computation itself. If a computation's behavior changes while its name
//! stays the same, stale results are returned until the session is refreshed.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

use crate::error::ForgeResult;

/// Per-session memoization store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionCache {
    #[serde(default)]
    entries: HashMap<String, Value>,
}

impl SessionCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a cache key from a call name and its arguments
    ///
    /// The argument encoding is hashed (SHA256, truncated hex) so arbitrary
    /// argument strings cannot collide with each other or with other calls.
    pub fn key(call: &str, args: &[&str]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(call.as_bytes());
        for arg in args {
            hasher.update([0u8]);
            hasher.update(arg.as_bytes());
        }
        let digest = hasher.finalize();
        format!("{}.{}", call, hex::encode(&digest[..6]))
    }

    /// Return the cached value for a call, deserialized, if present
    pub fn lookup<T: DeserializeOwned>(&self, call: &str, args: &[&str]) -> ForgeResult<Option<T>> {
        match self.entries.get(&Self::key(call, args)) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    /// Store a computed value for a call
    pub fn store<T: Serialize>(&mut self, call: &str, args: &[&str], value: &T) -> ForgeResult<()> {
        self.entries
            .insert(Self::key(call, args), serde_json::to_value(value)?);
        Ok(())
    }

    /// Return the cached result for (call, args), computing it at most once
    ///
    /// A failed compute is propagated to the caller without being cached, so
    /// the next identical call attempts the computation again. No automatic
    /// retry happens here.
    pub fn get_or_compute<T, F>(&mut self, call: &str, args: &[&str], compute: F) -> ForgeResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> ForgeResult<T>,
    {
        if let Some(cached) = self.lookup(call, args)? {
            return Ok(cached);
        }

        let value = compute()?;
        self.store(call, args, &value)?;
        Ok(value)
    }

    /// Drop every entry (the refresh analog of reloading the page)
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
