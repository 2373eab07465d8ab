use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use codepanel_core::{EditorHandle, EditorPanel, Readiness, SharedStore, TextBuffer};
use codepanel_settings::{LanguageCatalog, PanelConfig, PreferenceStore};
use codepanel_storage::{code_key, KeyValueStore, MemoryStore, FONT_SIZE_KEY};

const QUIET: Duration = Duration::from_millis(1000);

struct Harness {
    panel: EditorPanel<MemoryStore>,
    buffer: Rc<RefCell<TextBuffer>>,
}

impl Harness {
    fn mount(storage: MemoryStore) -> Self {
        let store: SharedStore = Rc::new(RefCell::new(PreferenceStore::default()));
        let mut panel = EditorPanel::new(
            store,
            storage,
            LanguageCatalog::builtin(),
            &PanelConfig::default(),
        );
        let buffer = TextBuffer::new().into_shared();
        let handle: EditorHandle = buffer.clone();
        panel.on_mount(handle);
        Self { panel, buffer }
    }

    /// 模擬重新載入頁面。 / Simulates a page reload over the same storage.
    fn reload(self) -> Self {
        Self::mount(self.panel.into_storage())
    }

    fn text(&self) -> String {
        self.buffer.borrow().text().to_string()
    }

    fn type_and_notify(&mut self, value: &str, at: Instant) {
        self.buffer.borrow_mut().clear();
        let typed = self.buffer.borrow_mut().type_text(value);
        self.panel.on_change(Some(typed.as_str()), at);
    }

    fn code_writes(&self) -> Vec<(String, String)> {
        self.panel
            .storage()
            .writes()
            .iter()
            .filter(|(key, _)| key.starts_with("editor-code-"))
            .cloned()
            .collect()
    }
}

#[test]
fn languages_without_saved_code_restore_builtin_default() {
    let catalog = LanguageCatalog::builtin();
    let mut harness = Harness::mount(MemoryStore::new());

    for profile in catalog.iter() {
        harness.panel.select_language("plaintext");
        assert_eq!(harness.text(), "");
        harness.panel.select_language(&profile.id);
        assert_eq!(
            harness.text(),
            profile.default_code,
            "default code mismatch for {}",
            profile.id
        );
    }
}

#[test]
fn saved_code_is_restored_after_switching_away_and_back() {
    let start = Instant::now();
    let mut harness = Harness::mount(MemoryStore::new());
    harness.panel.select_language("python");

    harness.type_and_notify("print('saved')\n", start);
    assert_eq!(harness.panel.tick(start + QUIET), 1);

    harness.panel.select_language("go");
    assert_eq!(harness.text(), LanguageCatalog::builtin().default_code("go"));
    harness.panel.select_language("python");
    assert_eq!(harness.text(), "print('saved')\n");

    let mut reloaded = harness.reload();
    reloaded.panel.select_language("python");
    assert_eq!(reloaded.text(), "print('saved')\n");
}

#[test]
fn saving_the_same_value_twice_stores_it_once() {
    let start = Instant::now();
    let mut harness = Harness::mount(MemoryStore::new());

    harness.type_and_notify("let a = 1;", start);
    harness.panel.tick(start + QUIET);
    harness.type_and_notify("let a = 1;", start + QUIET * 2);
    harness.panel.tick(start + QUIET * 3);

    let storage = harness.panel.storage();
    assert_eq!(storage.len(), 1);
    assert_eq!(
        storage.get(&code_key("javascript")).unwrap().as_deref(),
        Some("let a = 1;")
    );
}

#[test]
fn rapid_edits_produce_a_single_write_of_the_last_value() {
    let start = Instant::now();
    let mut harness = Harness::mount(MemoryStore::new());

    harness.type_and_notify("v1", start);
    assert_eq!(harness.panel.tick(start + Duration::from_millis(200)), 0);
    harness.type_and_notify("v2", start + Duration::from_millis(300));
    harness.type_and_notify("v3", start + Duration::from_millis(600));

    assert_eq!(harness.panel.tick(start + Duration::from_millis(1500)), 0);
    assert_eq!(harness.panel.tick(start + Duration::from_millis(1599)), 0);
    assert_eq!(harness.panel.tick(start + Duration::from_millis(1600)), 1);
    assert_eq!(harness.panel.tick(start + Duration::from_secs(10)), 0);

    assert_eq!(
        harness.code_writes(),
        vec![(code_key("javascript"), "v3".to_string())]
    );
}

#[test]
fn empty_or_cleared_buffers_are_never_saved() {
    let start = Instant::now();
    let mut harness = Harness::mount(MemoryStore::with_entries([(
        code_key("javascript"),
        "keep me",
    )]));

    harness.panel.on_change(None, start);
    harness.panel.on_change(Some(""), start);
    assert!(harness.panel.saver().is_idle());
    harness.panel.tick(start + QUIET);

    assert_eq!(
        harness
            .panel
            .storage()
            .get(&code_key("javascript"))
            .unwrap()
            .as_deref(),
        Some("keep me")
    );
}

#[test]
fn reset_discards_saved_code_for_current_language() {
    let start = Instant::now();
    let mut harness = Harness::mount(MemoryStore::new());
    harness.panel.select_language("rust");
    harness.type_and_notify("fn main() { todo() }", start);
    harness.panel.tick(start + QUIET);

    harness.panel.reset();
    let default = LanguageCatalog::builtin().default_code("rust").to_string();
    assert_eq!(harness.text(), default);
    assert!(!harness.panel.storage().contains_key(&code_key("rust")));

    let mut reloaded = harness.reload();
    reloaded.panel.select_language("rust");
    assert_eq!(reloaded.text(), default);
}

#[test]
fn reset_also_drops_a_pending_save() {
    let start = Instant::now();
    let mut harness = Harness::mount(MemoryStore::new());
    harness.type_and_notify("discard me", start);

    harness.panel.reset();
    assert_eq!(harness.panel.tick(start + QUIET), 0);
    assert!(!harness
        .panel
        .storage()
        .contains_key(&code_key("javascript")));
}

#[test]
fn font_size_is_clamped_applied_and_persisted() {
    let mut harness = Harness::mount(MemoryStore::new());

    for (requested, expected) in [(5, 12), (99, 24), (18, 18)] {
        assert_eq!(harness.panel.change_font_size(requested), expected);
        assert_eq!(harness.panel.store().borrow().font_size(), expected);
        assert_eq!(
            harness.panel.storage().get(FONT_SIZE_KEY).unwrap(),
            Some(expected.to_string())
        );
    }
}

#[test]
fn persisted_font_size_is_adopted_at_startup() {
    let harness = Harness::mount(MemoryStore::with_entries([(FONT_SIZE_KEY, "20")]));
    assert_eq!(harness.panel.store().borrow().font_size(), 20);
    assert!(
        harness.panel.storage().writes().is_empty(),
        "restoring preferences must not write them back"
    );
}

#[test]
fn malformed_font_size_keeps_default() {
    let harness = Harness::mount(MemoryStore::with_entries([(FONT_SIZE_KEY, "huge")]));
    assert_eq!(harness.panel.store().borrow().font_size(), 16);
}

#[test]
fn unmount_drops_pending_save() {
    let start = Instant::now();
    let mut harness = Harness::mount(MemoryStore::new());
    harness.type_and_notify("unsaved work", start);

    harness.panel.unmount();
    assert_eq!(harness.panel.readiness(), Readiness::Unmounted);
    assert_eq!(harness.panel.tick(start + QUIET * 5), 0);
    harness
        .panel
        .on_change(Some("typed after unmount"), start + QUIET * 6);
    assert_eq!(harness.panel.tick(start + QUIET * 10), 0);

    assert!(harness.code_writes().is_empty());
    assert!(harness.panel.store().borrow().editor().is_none());
    assert_eq!(harness.panel.store().borrow().subscriber_count(), 0);
}

#[test]
fn pending_save_keeps_the_language_it_was_typed_in() {
    let start = Instant::now();
    let mut harness = Harness::mount(MemoryStore::new());
    harness.panel.select_language("python");
    harness.type_and_notify("print('python')", start);

    harness.panel.select_language("ruby");
    harness.panel.tick(start + QUIET);

    let storage = harness.panel.storage();
    assert_eq!(
        storage.get(&code_key("python")).unwrap().as_deref(),
        Some("print('python')")
    );
    assert!(!storage.contains_key(&code_key("ruby")));
}

#[test]
fn storage_failures_are_swallowed() {
    let start = Instant::now();
    let mut storage = MemoryStore::with_entries([(FONT_SIZE_KEY, "22")]);
    storage.set_available(false);
    let mut harness = Harness::mount(storage);

    assert_eq!(harness.panel.readiness(), Readiness::Ready);
    assert_eq!(harness.panel.store().borrow().font_size(), 16);
    assert_eq!(harness.text(), "", "failed load leaves the buffer untouched");

    assert_eq!(harness.panel.change_font_size(20), 20);
    assert_eq!(harness.panel.store().borrow().font_size(), 20);

    harness.type_and_notify("lost", start);
    assert_eq!(harness.panel.tick(start + QUIET), 0);
    harness.panel.reset();
    assert_eq!(
        harness.text(),
        LanguageCatalog::builtin().default_code("javascript")
    );

    harness.panel.storage_mut().set_available(true);
    assert!(harness.panel.storage().writes().is_empty());
}

#[test]
fn quota_failure_keeps_previous_saved_code() {
    let start = Instant::now();
    let mut harness = Harness::mount(MemoryStore::new().with_quota(64));
    harness.type_and_notify("short", start);
    assert_eq!(harness.panel.tick(start + QUIET), 1);

    harness.type_and_notify(&"x".repeat(128), start + QUIET * 2);
    assert_eq!(harness.panel.tick(start + QUIET * 3), 0);
    assert_eq!(
        harness
            .panel
            .storage()
            .get(&code_key("javascript"))
            .unwrap()
            .as_deref(),
        Some("short")
    );
}

#[test]
fn share_payload_reflects_current_buffer() {
    let start = Instant::now();
    let mut harness = Harness::mount(MemoryStore::new());
    harness.panel.select_language("go");
    harness.type_and_notify("package main", start);

    harness.panel.open_share_dialog();
    assert!(harness.panel.share_dialog().is_open());
    let payload = harness.panel.share_payload().expect("editor is ready");
    assert_eq!(payload.language, "go");
    assert_eq!(payload.code, "package main");

    harness.panel.close_share_dialog();
    assert!(!harness.panel.share_dialog().is_open());
}

#[test]
fn external_store_changes_apply_on_next_sync() {
    let mut harness = Harness::mount(MemoryStore::new());
    let store = Rc::clone(harness.panel.store());

    store.borrow_mut().set_language("java");
    assert_eq!(
        harness.text(),
        LanguageCatalog::builtin().default_code("javascript")
    );

    harness.panel.sync();
    assert_eq!(harness.text(), LanguageCatalog::builtin().default_code("java"));
}

#[test]
fn edit_arriving_after_external_switch_keeps_its_language() {
    let start = Instant::now();
    let mut harness = Harness::mount(MemoryStore::new());
    let store = Rc::clone(harness.panel.store());
    let typed = harness.buffer.borrow_mut().type_text("\n// js edit");

    store.borrow_mut().set_language("java");
    harness.panel.on_change(Some(typed.as_str()), start);
    assert_eq!(harness.text(), LanguageCatalog::builtin().default_code("java"));
    assert_eq!(harness.panel.tick(start + QUIET), 1);

    let storage = harness.panel.storage();
    assert_eq!(
        storage.get(&code_key("javascript")).unwrap(),
        Some(typed.clone())
    );
    assert!(!storage.contains_key(&code_key("java")));

    let mut reloaded = harness.reload();
    reloaded.panel.select_language("java");
    assert_eq!(reloaded.text(), LanguageCatalog::builtin().default_code("java"));
    reloaded.panel.select_language("javascript");
    assert_eq!(reloaded.text(), typed);
}

#[test]
fn choosing_the_current_font_size_still_persists_it() {
    let mut harness = Harness::mount(MemoryStore::new());

    assert_eq!(harness.panel.change_font_size(16), 16);
    assert_eq!(
        harness.panel.storage().get(FONT_SIZE_KEY).unwrap().as_deref(),
        Some("16")
    );
}

#[test]
fn repeating_a_font_size_retries_a_failed_write() {
    let mut harness = Harness::mount(MemoryStore::new());

    harness.panel.storage_mut().set_available(false);
    assert_eq!(harness.panel.change_font_size(20), 20);
    harness.panel.storage_mut().set_available(true);
    assert_eq!(harness.panel.storage().get(FONT_SIZE_KEY).unwrap(), None);

    assert_eq!(harness.panel.change_font_size(20), 20);
    assert_eq!(
        harness.panel.storage().get(FONT_SIZE_KEY).unwrap().as_deref(),
        Some("20")
    );
    assert_eq!(
        harness.panel.storage().writes(),
        &[(FONT_SIZE_KEY.to_string(), "20".to_string())][..]
    );
}

#[test]
fn code_for_reads_without_switching_language() {
    let mut harness = Harness::mount(MemoryStore::with_entries([(
        code_key("python"),
        "print('kept')",
    )]));

    assert_eq!(harness.panel.code_for("python"), "print('kept')");
    assert_eq!(
        harness.panel.code_for("go"),
        LanguageCatalog::builtin().default_code("go")
    );
    assert_eq!(harness.panel.store().borrow().language(), "javascript");
    assert_eq!(
        harness.text(),
        LanguageCatalog::builtin().default_code("javascript")
    );
    assert!(harness.panel.storage().writes().is_empty());

    harness.panel.storage_mut().set_available(false);
    assert_eq!(
        harness.panel.code_for("python"),
        LanguageCatalog::builtin().default_code("python")
    );
}
