use std::fmt;

use crate::Preferences;

/// 偏好狀態變更的通知內容。 / Notification emitted when a preference changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceChange {
    LanguageChanged { previous: String, current: String },
    ThemeChanged(String),
    FontSizeChanged(u32),
    EditorAttached,
    EditorDetached,
}

/// 訂閱的識別碼，用於取消訂閱。 / Identifies a subscription so it can be removed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&PreferenceChange)>;

/// 保存語言、主題、字型大小與編輯器把手的狀態容器。 /
/// State container for language, theme, font size and the live editor handle.
///
/// 僅做記憶體內的狀態變更；持久化由訂閱者負責。 /
/// Setters only mutate memory; persistence is left to subscribers.
pub struct PreferenceStore<H> {
    preferences: Preferences,
    editor: Option<H>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl<H> PreferenceStore<H> {
    pub fn new(preferences: Preferences) -> Self {
        Self {
            preferences,
            editor: None,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn language(&self) -> &str {
        &self.preferences.language
    }

    pub fn theme(&self) -> &str {
        &self.preferences.theme
    }

    pub fn font_size(&self) -> u32 {
        self.preferences.font_size
    }

    pub fn editor(&self) -> Option<&H> {
        self.editor.as_ref()
    }

    /// 設定字型大小；不做驗證，範圍由呼叫端限制。 / Replaces the font size; callers clamp.
    pub fn set_font_size(&mut self, font_size: u32) {
        if self.preferences.font_size == font_size {
            return;
        }
        self.preferences.font_size = font_size;
        self.notify(&PreferenceChange::FontSizeChanged(font_size));
    }

    /// 切換目前語言並通知依賴者。 / Switches the active language and notifies dependents.
    pub fn set_language(&mut self, language: impl Into<String>) {
        let language = language.into();
        if self.preferences.language == language {
            return;
        }
        let previous = std::mem::replace(&mut self.preferences.language, language.clone());
        self.notify(&PreferenceChange::LanguageChanged {
            previous,
            current: language,
        });
    }

    pub fn set_theme(&mut self, theme: impl Into<String>) {
        let theme = theme.into();
        if self.preferences.theme == theme {
            return;
        }
        self.preferences.theme = theme.clone();
        self.notify(&PreferenceChange::ThemeChanged(theme));
    }

    /// 記錄編輯器把手；重複設定只會在第一次通知。 /
    /// Records the editor handle; only the first attachment is announced.
    pub fn set_editor(&mut self, handle: H) {
        let first = self.editor.is_none();
        self.editor = Some(handle);
        if first {
            self.notify(&PreferenceChange::EditorAttached);
        }
    }

    /// 移除編輯器把手（卸載時）。 / Drops the editor handle when the widget goes away.
    pub fn detach_editor(&mut self) -> Option<H> {
        let handle = self.editor.take();
        if handle.is_some() {
            self.notify(&PreferenceChange::EditorDetached);
        }
        handle
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&PreferenceChange) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    fn notify(&mut self, change: &PreferenceChange) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(change);
        }
    }
}

impl<H> Default for PreferenceStore<H> {
    fn default() -> Self {
        Self::new(Preferences::default())
    }
}

impl<H> fmt::Debug for PreferenceStore<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("preferences", &self.preferences)
            .field("editor_attached", &self.editor.is_some())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
