pub mod file;
pub mod keys;
pub mod memory;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use file::FileStore;
pub use keys::{code_key, FONT_SIZE_KEY, LANGUAGE_KEY, THEME_KEY};
pub use memory::MemoryStore;

/// 本機鍵值儲存操作的錯誤型別。 / Error type for local key/value storage access.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("quota exceeded while writing '{key}' ({required} bytes, limit {limit})")]
    QuotaExceeded {
        key: String,
        required: usize,
        limit: usize,
    },
    #[error("failed to read storage {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse storage {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize storage {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write storage {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// 同步、以來源劃分的字串鍵值儲存。 / Synchronous, origin-scoped string key/value storage.
///
/// 所有呼叫都可能失敗；呼叫端應記錄並繼續。 / Every call may fail; callers are expected to log and carry on.
pub trait KeyValueStore {
    /// 讀取指定鍵；不存在時回傳 `None`。 / Reads a key, returning `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// 寫入或覆寫指定鍵。 / Inserts or overwrites a key.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// 移除指定鍵；鍵不存在時視為成功。 / Removes a key; removing a missing key succeeds.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}
