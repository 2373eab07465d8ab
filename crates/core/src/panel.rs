use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Instant;

use codepanel_settings::{
    clamp_font_size, parse_font_size, LanguageCatalog, PanelConfig, PreferenceChange,
    PreferenceStore, SubscriptionId,
};
use codepanel_storage::{
    code_key, KeyValueStore, StorageError, FONT_SIZE_KEY, LANGUAGE_KEY, THEME_KEY,
};

use crate::debounce::DebouncedSaver;
use crate::share::{ShareDialog, SharePayload};
use crate::widget::{EditorHandle, WidgetOptions};

/// 整個應用程式共用的偏好狀態。 / Preference state shared across the application.
pub type SharedStore = Rc<RefCell<PreferenceStore<EditorHandle>>>;

/// 元件就緒狀態。 / Widget readiness of the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Uninitialized,
    Ready,
    Unmounted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelHeader {
    pub language: String,
    pub logo_path: String,
    pub font_size: u32,
    pub share_dialog_open: bool,
}

/// 面板應呈現的內容。 / What the panel should currently render.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelView {
    /// 工作階段尚未載入，顯示骨架。 / Session not loaded yet; show a placeholder.
    Skeleton { header: PanelHeader },
    Editor {
        header: PanelHeader,
        options: WidgetOptions,
    },
}

/// 組合偏好狀態、本機儲存、延遲寫入與編輯元件的面板。 /
/// Editor panel wiring the preference store, local storage, the debounced saver and the widget.
///
/// 儲存失敗一律記錄後忽略，不會中斷使用者操作。 /
/// Storage failures are logged and otherwise ignored.
pub struct EditorPanel<S: KeyValueStore> {
    storage: S,
    catalog: LanguageCatalog,
    store: SharedStore,
    saver: DebouncedSaver,
    changes: Rc<RefCell<VecDeque<PreferenceChange>>>,
    subscription: Option<SubscriptionId>,
    /// 緩衝區目前內容所屬的語言。 / Language whose code the buffer currently holds.
    bound_language: Option<String>,
    readiness: Readiness,
    session_loaded: bool,
    share: ShareDialog,
}

impl<S: KeyValueStore> EditorPanel<S> {
    /// 建立面板並還原已保存的字型大小、語言與主題。 /
    /// Creates the panel and restores the persisted font size, language and theme.
    pub fn new(
        store: SharedStore,
        storage: S,
        catalog: LanguageCatalog,
        config: &PanelConfig,
    ) -> Self {
        let changes = Rc::new(RefCell::new(VecDeque::new()));
        let sink = Rc::clone(&changes);
        let subscription = store
            .borrow_mut()
            .subscribe(move |change| sink.borrow_mut().push_back(change.clone()));

        let mut panel = Self {
            storage,
            catalog,
            store,
            saver: DebouncedSaver::new(config.save_delay()),
            changes,
            subscription: Some(subscription),
            bound_language: None,
            readiness: Readiness::Uninitialized,
            session_loaded: false,
            share: ShareDialog::default(),
        };
        panel.restore_preferences();
        // Restored values came from storage; writing them back is pointless.
        panel.changes.borrow_mut().clear();
        panel
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn catalog(&self) -> &LanguageCatalog {
        &self.catalog
    }

    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    pub fn saver(&self) -> &DebouncedSaver {
        &self.saver
    }

    /// 設定工作階段是否已載入；未載入時僅顯示骨架。 / Gates the widget behind the session provider.
    pub fn set_session_loaded(&mut self, loaded: bool) {
        self.session_loaded = loaded;
    }

    /// 元件完成初始化。 / The widget finished initialising and yielded its handle.
    pub fn on_mount(&mut self, handle: EditorHandle) {
        if self.readiness == Readiness::Unmounted {
            log::debug!("ignoring mount of an unmounted panel");
            return;
        }
        self.store.borrow_mut().set_editor(handle);
        self.sync();
    }

    /// 套用偏好狀態的待處理變更。 / Reacts to every queued preference change.
    pub fn sync(&mut self) {
        if self.readiness == Readiness::Unmounted {
            return;
        }
        loop {
            let next = self.changes.borrow_mut().pop_front();
            let Some(change) = next else {
                break;
            };
            self.react(change);
        }
    }

    /// 切換語言。 / Switches the active language.
    pub fn select_language(&mut self, language: &str) {
        self.store.borrow_mut().set_language(language);
        self.sync();
    }

    pub fn select_theme(&mut self, theme: &str) {
        self.store.borrow_mut().set_theme(theme);
        self.sync();
    }

    /// 調整字型大小：限制在 [12, 24] 並立即保存。 / Clamps into [12, 24] and persists immediately.
    pub fn change_font_size(&mut self, requested: i64) -> u32 {
        let size = clamp_font_size(requested);
        if self.readiness == Readiness::Unmounted {
            return size;
        }
        self.sync();
        self.store.borrow_mut().set_font_size(size);
        // Persisted here so an unchanged size is still written.
        self.changes
            .borrow_mut()
            .retain(|change| !matches!(change, PreferenceChange::FontSizeChanged(_)));
        self.persist(FONT_SIZE_KEY, &size.to_string());
        size
    }

    /// 編輯內容變更；空值不會被保存。 / Buffer changed; empty or cleared values are never saved.
    pub fn on_change(&mut self, value: Option<&str>, now: Instant) {
        if self.readiness == Readiness::Unmounted {
            return;
        }
        // The edit belongs to the code the buffer was loaded with, not to a
        // language switch that is still queued.
        let key = match &self.bound_language {
            Some(language) => code_key(language),
            None => code_key(self.store.borrow().language()),
        };
        self.sync();
        let Some(value) = value.filter(|value| !value.is_empty()) else {
            return;
        };
        self.saver.schedule(key, value, now);
    }

    /// 寫入所有安靜期已過的編輯，回傳成功寫入數。 /
    /// Persists every edit whose quiet interval has elapsed and returns how many were written.
    pub fn tick(&mut self, now: Instant) -> usize {
        if self.readiness == Readiness::Unmounted {
            return 0;
        }
        self.sync();
        let mut written = 0;
        for write in self.saver.poll(now) {
            match self.storage.set(&write.key, &write.value) {
                Ok(()) => written += 1,
                Err(err) => log::warn!("failed to save code under '{}': {err}", write.key),
            }
        }
        written
    }

    /// 還原目前語言的預設程式碼並刪除保存的內容。 /
    /// Restores the default code of the current language and forgets its saved buffer.
    pub fn reset(&mut self) {
        if self.readiness == Readiness::Unmounted {
            return;
        }
        self.sync();
        let Some(handle) = self.editor_handle() else {
            log::debug!("reset skipped: editor not ready");
            return;
        };
        let language = self.store.borrow().language().to_string();
        handle
            .borrow_mut()
            .set_value(self.catalog.default_code(&language));
        self.bound_language = Some(language.clone());

        let key = code_key(&language);
        self.saver.discard(&key);
        if let Err(err) = self.storage.remove(&key) {
            log::warn!("failed to remove saved code for '{language}': {err}");
        }
    }

    /// 某語言會顯示的程式碼，不切換語言也不碰元件。 /
    /// Code the editor would show for `language`, without switching to it.
    pub fn code_for(&self, language: &str) -> String {
        match self.stored_code(language) {
            Ok(Some(code)) => code,
            Ok(None) => self.catalog.default_code(language).to_string(),
            Err(err) => {
                log::warn!("failed to load saved code for '{language}': {err}");
                self.catalog.default_code(language).to_string()
            }
        }
    }

    /// 目前緩衝區內容；元件未就緒時為 `None`。 / Current buffer, `None` until the widget is ready.
    pub fn current_code(&self) -> Option<String> {
        let handle = self.editor_handle()?;
        let code = handle.borrow().value();
        Some(code)
    }

    pub fn open_share_dialog(&mut self) {
        self.share.open();
    }

    pub fn close_share_dialog(&mut self) {
        self.share.close();
    }

    pub fn share_dialog(&self) -> &ShareDialog {
        &self.share
    }

    /// 提供給分享對話框的語言與程式碼。 / Language and code surfaced to the share dialog.
    pub fn share_payload(&self) -> Option<SharePayload> {
        let code = self.current_code()?;
        Some(SharePayload {
            language: self.store.borrow().language().to_string(),
            code,
        })
    }

    pub fn view(&self) -> PanelView {
        let store = self.store.borrow();
        let preferences = store.preferences();
        let header = PanelHeader {
            language: preferences.language.clone(),
            logo_path: self
                .catalog
                .get(&preferences.language)
                .map(|profile| profile.logo_path.clone())
                .unwrap_or_else(|| format!("/{}.png", preferences.language)),
            font_size: preferences.font_size,
            share_dialog_open: self.share.is_open(),
        };
        if !self.session_loaded {
            return PanelView::Skeleton { header };
        }
        PanelView::Editor {
            header,
            options: WidgetOptions::for_preferences(preferences, &self.catalog),
        }
    }

    /// 卸載：取消待寫入內容（直接丟棄）並釋放元件把手。 /
    /// Unmounts: pending saves are dropped, not flushed, and the widget handle is released.
    pub fn unmount(&mut self) {
        if self.readiness == Readiness::Unmounted {
            return;
        }
        let dropped = self.saver.cancel_all();
        if dropped > 0 {
            log::debug!("dropped {dropped} pending save(s) on unmount");
        }
        {
            let mut store = self.store.borrow_mut();
            if let Some(id) = self.subscription.take() {
                store.unsubscribe(id);
            }
            store.detach_editor();
        }
        self.changes.borrow_mut().clear();
        self.bound_language = None;
        self.share.close();
        self.readiness = Readiness::Unmounted;
    }

    /// 取回儲存實例（通常在卸載後）。 / Hands the storage back, typically after unmounting.
    pub fn into_storage(mut self) -> S {
        self.unmount();
        self.storage
    }

    fn react(&mut self, change: PreferenceChange) {
        match change {
            PreferenceChange::LanguageChanged { current, .. } => {
                self.persist(LANGUAGE_KEY, &current);
                if self.readiness == Readiness::Ready {
                    self.load_code(&current);
                }
            }
            PreferenceChange::ThemeChanged(theme) => self.persist(THEME_KEY, &theme),
            PreferenceChange::FontSizeChanged(size) => {
                self.persist(FONT_SIZE_KEY, &size.to_string())
            }
            PreferenceChange::EditorAttached => {
                self.readiness = Readiness::Ready;
                let language = self.store.borrow().language().to_string();
                self.load_code(&language);
            }
            PreferenceChange::EditorDetached => {
                self.bound_language = None;
                if self.readiness == Readiness::Ready {
                    self.readiness = Readiness::Uninitialized;
                }
            }
        }
    }

    fn load_code(&mut self, language: &str) {
        let Some(handle) = self.editor_handle() else {
            return;
        };
        let code = match self.stored_code(language) {
            Ok(saved) => saved.unwrap_or_else(|| self.catalog.default_code(language).to_string()),
            Err(err) => {
                log::warn!("failed to load saved code for '{language}': {err}");
                return;
            }
        };
        handle.borrow_mut().set_value(&code);
        self.bound_language = Some(language.to_string());
    }

    /// 未寫入的編輯優先，其次為已保存內容；空字串視為無。 /
    /// Unsaved edit first, then the stored buffer; empty values count as absent.
    fn stored_code(&self, language: &str) -> Result<Option<String>, StorageError> {
        let key = code_key(language);
        let saved = match self.saver.pending_value(&key) {
            Some(unsaved) => Some(unsaved.to_string()),
            None => self.storage.get(&key)?,
        };
        Ok(saved.filter(|code| !code.is_empty()))
    }

    fn restore_preferences(&mut self) {
        match self.storage.get(FONT_SIZE_KEY) {
            Ok(Some(raw)) => match parse_font_size(&raw) {
                Some(size) => self.store.borrow_mut().set_font_size(clamp_font_size(size)),
                None => log::warn!("ignoring malformed font size '{raw}'"),
            },
            Ok(None) => {}
            Err(err) => log::warn!("failed to load font size: {err}"),
        }

        match self.storage.get(LANGUAGE_KEY) {
            Ok(Some(language)) if self.catalog.contains(&language) => {
                self.store.borrow_mut().set_language(language)
            }
            Ok(Some(language)) => log::warn!("ignoring unknown saved language '{language}'"),
            Ok(None) => {}
            Err(err) => log::warn!("failed to load language: {err}"),
        }

        match self.storage.get(THEME_KEY) {
            Ok(Some(theme)) if !theme.trim().is_empty() => {
                self.store.borrow_mut().set_theme(theme)
            }
            Ok(_) => {}
            Err(err) => log::warn!("failed to load theme: {err}"),
        }
    }

    fn persist(&mut self, key: &str, value: &str) {
        if let Err(err) = self.storage.set(key, value) {
            log::warn!("failed to persist '{key}': {err}");
        }
    }

    fn editor_handle(&self) -> Option<EditorHandle> {
        self.store.borrow().editor().cloned()
    }
}
