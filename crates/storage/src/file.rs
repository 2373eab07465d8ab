use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::{KeyValueStore, StorageError};

/// 以 JSON 檔案保存某個來源的所有鍵值。 / Persists every key of one origin in a single JSON document.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    origin: String,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// 開啟 `root` 下指定來源的儲存；檔案不存在時回傳空集合。 /
    /// Opens the store of `origin` under `root`, starting empty when no file exists yet.
    pub fn open(root: impl AsRef<Path>, origin: &str) -> Result<Self, StorageError> {
        let path = root.as_ref().join(format!("{}.json", origin_file_stem(origin)));
        if !path.exists() {
            return Ok(Self {
                path,
                origin: origin.to_string(),
                entries: BTreeMap::new(),
            });
        }

        let contents = fs::read_to_string(&path).map_err(|source| StorageError::Read {
            path: path.clone(),
            source,
        })?;
        let entries: BTreeMap<String, String> = if contents.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_json::from_str(&contents).map_err(|source| StorageError::Parse {
                path: path.clone(),
                source,
            })?
        };
        log::debug!(
            "loaded {} entries for origin '{}' from {}",
            entries.len(),
            origin,
            path.display()
        );
        Ok(Self {
            path,
            origin: origin.to_string(),
            entries,
        })
    }

    /// 開啟儲存；檔案無法讀取時將其改名為 `.corrupt` 並以空集合開始。 /
    /// Opens the store, moving an unreadable file aside to `*.corrupt` and starting empty.
    pub fn open_or_recover(root: impl AsRef<Path>, origin: &str) -> Self {
        let root = root.as_ref();
        match Self::open(root, origin) {
            Ok(store) => store,
            Err(err) => {
                log::warn!("starting with empty storage for origin '{origin}': {err}");
                let path = root.join(format!("{}.json", origin_file_stem(origin)));
                let backup = path.with_extension("json.corrupt");
                if let Err(err) = fs::rename(&path, &backup) {
                    log::warn!("failed to move {} aside: {err}", path.display());
                }
                Self {
                    path,
                    origin: origin.to_string(),
                    entries: BTreeMap::new(),
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// 依鍵排序列出所有鍵。 / Lists every key in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    fn persist(&self) -> Result<(), StorageError> {
        let payload =
            serde_json::to_string_pretty(&self.entries).map_err(|source| {
                StorageError::Serialize {
                    path: self.path.clone(),
                    source,
                }
            })?;
        write_atomic(&self.path, payload.as_bytes()).map_err(|source| StorageError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let previous = self.entries.insert(key.to_string(), value.to_string());
        if let Err(err) = self.persist() {
            match previous {
                Some(previous) => self.entries.insert(key.to_string(), previous),
                None => self.entries.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let Some(previous) = self.entries.remove(key) else {
            return Ok(());
        };
        if let Err(err) = self.persist() {
            self.entries.insert(key.to_string(), previous);
            return Err(err);
        }
        Ok(())
    }
}

fn origin_file_stem(origin: &str) -> String {
    let stem: String = origin
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '.' {
                ch
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "default".to_string()
    } else {
        stem
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, data)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
