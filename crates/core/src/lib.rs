pub mod debounce;
pub mod panel;
pub mod share;
pub mod widget;

pub use debounce::{DebouncedSaver, PendingWrite};
pub use panel::{EditorPanel, PanelHeader, PanelView, Readiness, SharedStore};
pub use share::{ShareDialog, SharePayload};
pub use widget::{EditorHandle, EditorWidget, TextBuffer, WidgetOptions};
