use std::cell::RefCell;
use std::rc::Rc;

use codepanel_settings::{LanguageCatalog, Preferences};

/// 內嵌文字編輯元件所需提供的介面。 / Contract of the embedded text-editing widget.
pub trait EditorWidget {
    /// 取代整個緩衝區內容。 / Replaces the whole buffer.
    fn set_value(&mut self, text: &str);

    /// 目前緩衝區內容。 / Current buffer contents.
    fn value(&self) -> String;
}

/// 元件就緒後取得的把手。 / Handle yielded once the widget has mounted.
pub type EditorHandle = Rc<RefCell<dyn EditorWidget>>;

/// 純記憶體的編輯元件。 / Widget backed by a plain string, used headless and in tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    replacements: usize,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            replacements: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// `set_value` 被呼叫的次數。 / Number of times `set_value` replaced the buffer.
    pub fn replacements(&self) -> usize {
        self.replacements
    }

    /// 模擬使用者輸入：附加文字並回傳新內容。 / Appends typed text and returns the new contents.
    pub fn type_text(&mut self, text: &str) -> String {
        self.text.push_str(text);
        self.text.clone()
    }

    /// 模擬清空緩衝區。 / Clears the buffer as a user would.
    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// 包裝成共享把手。 / Wraps the buffer into a shareable handle.
    pub fn into_shared(self) -> Rc<RefCell<TextBuffer>> {
        Rc::new(RefCell::new(self))
    }
}

impl EditorWidget for TextBuffer {
    fn set_value(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
        self.replacements += 1;
    }

    fn value(&self) -> String {
        self.text.clone()
    }
}

/// 傳給元件的外觀設定；不影響行為。 / Cosmetic options handed to the widget.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetOptions {
    pub font_size: u32,
    pub theme: String,
    pub mode: String,
    pub font_family: String,
    pub font_ligatures: bool,
    pub line_height: f32,
    pub letter_spacing: f32,
    pub padding_top: u32,
    pub padding_bottom: u32,
    pub minimap: bool,
    pub scroll_beyond_last_line: bool,
    pub height_px: u32,
}

impl WidgetOptions {
    pub fn for_preferences(preferences: &Preferences, catalog: &LanguageCatalog) -> Self {
        let mode = catalog
            .get(&preferences.language)
            .map(|profile| profile.mode.clone())
            .filter(|mode| !mode.is_empty())
            .unwrap_or_else(|| preferences.language.clone());
        Self {
            font_size: preferences.font_size,
            theme: preferences.theme.clone(),
            mode,
            font_family: "\"Fira Code\", \"Cascadia Code\", Consolas, monospace".to_string(),
            font_ligatures: true,
            line_height: 1.6,
            letter_spacing: 0.5,
            padding_top: 16,
            padding_bottom: 16,
            minimap: false,
            scroll_beyond_last_line: false,
            height_px: 600,
        }
    }
}
