use serde::{Deserialize, Serialize};

use crate::font::DEFAULT_FONT_SIZE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
}

pub(crate) fn default_language() -> String {
    "javascript".to_string()
}

pub(crate) fn default_theme() -> String {
    "vs-dark".to_string()
}

fn default_font_size() -> u32 {
    DEFAULT_FONT_SIZE
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            language: default_language(),
            theme: default_theme(),
            font_size: default_font_size(),
        }
    }
}

impl Preferences {
    pub fn new(language: impl Into<String>, theme: impl Into<String>, font_size: u32) -> Self {
        Self {
            language: language.into(),
            theme: theme.into(),
            font_size,
        }
    }
}
