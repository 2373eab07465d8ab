use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::font::{clamp_font_size, DEFAULT_FONT_SIZE};
use crate::preferences::{default_language, default_theme};
use crate::Preferences;

const CONFIG_VERSION: u32 = 1;
const DEFAULT_SAVE_DELAY_MS: u64 = 1000;
const MAX_SAVE_DELAY_MS: u64 = 60_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// 面板的執行設定。 / Runtime configuration of the editor panel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PanelConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    /// 儲存的來源範圍。 / Origin the local storage is scoped to.
    #[serde(default = "default_origin")]
    pub origin: String,
    /// 編輯後等待多久才寫入。 / Quiet interval before an edit is written.
    #[serde(default = "default_save_delay_ms")]
    pub save_delay_ms: u64,
    #[serde(default = "default_font_size")]
    pub default_font_size: u32,
    #[serde(default = "default_language")]
    pub default_language: String,
    #[serde(default = "default_theme")]
    pub default_theme: String,
    /// 自訂語言目錄（JSON）。 / Optional JSON language catalog replacing the built-in one.
    #[serde(default)]
    pub languages: Option<PathBuf>,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_origin() -> String {
    "localhost".to_string()
}

fn default_save_delay_ms() -> u64 {
    DEFAULT_SAVE_DELAY_MS
}

fn default_font_size() -> u32 {
    DEFAULT_FONT_SIZE
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            origin: default_origin(),
            save_delay_ms: DEFAULT_SAVE_DELAY_MS,
            default_font_size: DEFAULT_FONT_SIZE,
            default_language: default_language(),
            default_theme: default_theme(),
            languages: None,
        }
    }
}

impl PanelConfig {
    /// 讀取設定；檔案不存在時回傳預設值。 / Loads the config, returning defaults when the file is missing.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: PanelConfig =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.sanitize();
        Ok(config)
    }

    pub fn sanitize(&mut self) {
        if self.version == 0 {
            self.version = CONFIG_VERSION;
        }
        if self.origin.trim().is_empty() {
            self.origin = default_origin();
        }
        if self.save_delay_ms == 0 {
            self.save_delay_ms = DEFAULT_SAVE_DELAY_MS;
        }
        self.save_delay_ms = self.save_delay_ms.min(MAX_SAVE_DELAY_MS);
        self.default_font_size = clamp_font_size(i64::from(self.default_font_size));
        if self.default_language.trim().is_empty() {
            self.default_language = default_language();
        }
        if self.default_theme.trim().is_empty() {
            self.default_theme = default_theme();
        }
    }

    pub fn save_delay(&self) -> Duration {
        Duration::from_millis(self.save_delay_ms)
    }

    /// 啟動時尚未讀取任何持久化值前的偏好。 / Preferences in effect before anything persisted is restored.
    pub fn initial_preferences(&self) -> Preferences {
        Preferences::new(
            self.default_language.clone(),
            self.default_theme.clone(),
            self.default_font_size,
        )
    }
}
