//! 持久化鍵的配置。 / Persistence key layout.

/// 字型大小偏好的固定鍵。 / Fixed key holding the font-size preference.
pub const FONT_SIZE_KEY: &str = "editor-font-size";

/// 目前語言的固定鍵。 / Fixed key holding the active language.
pub const LANGUAGE_KEY: &str = "editor-language";

/// 目前主題的固定鍵。 / Fixed key holding the active theme.
pub const THEME_KEY: &str = "editor-theme";

const CODE_KEY_PREFIX: &str = "editor-code-";

/// 回傳某語言程式碼緩衝區的鍵。 / Returns the key of the code buffer saved for a language.
pub fn code_key(language: &str) -> String {
    format!("{CODE_KEY_PREFIX}{language}")
}
