use serde::Serialize;

/// 分享對話框需要的內容。 / Content surfaced to the share dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharePayload {
    pub language: String,
    pub code: String,
}

/// 分享對話框的開關狀態。 / Visibility state of the share dialog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShareDialog {
    open: bool,
}

impl ShareDialog {
    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}
