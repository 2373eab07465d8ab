use std::collections::BTreeMap;

use crate::{KeyValueStore, StorageError};

/// 記憶體中的鍵值儲存，可模擬停用與配額。 / In-memory store that can simulate disabled storage and quotas.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    available: bool,
    quota: Option<usize>,
    writes: Vec<(String, String)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            available: true,
            quota: None,
            writes: Vec::new(),
        }
    }

    /// 以既有條目建立儲存。 / Creates a store seeded with entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut store = Self::new();
        store.entries = entries
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        store
    }

    /// 限制所有值的總位元組數。 / Caps the total byte size of stored keys and values.
    pub fn with_quota(mut self, limit: usize) -> Self {
        self.quota = Some(limit);
        self
    }

    /// 切換儲存是否可用（模擬私密瀏覽）。 / Toggles availability, e.g. to mimic private browsing.
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// 依序列出所有成功的寫入。 / Lists every successful write in order.
    pub fn writes(&self) -> &[(String, String)] {
        &self.writes
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(existing, _)| existing.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }

    fn ensure_available(&self) -> Result<(), StorageError> {
        if self.available {
            Ok(())
        } else {
            Err(StorageError::Unavailable)
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.ensure_available()?;
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.ensure_available()?;
        if let Some(limit) = self.quota {
            let required = self.used_bytes_without(key) + key.len() + value.len();
            if required > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    required,
                    limit,
                });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        self.writes.push((key.to_string(), value.to_string()));
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.ensure_available()?;
        self.entries.remove(key);
        Ok(())
    }
}
