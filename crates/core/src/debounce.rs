use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// 已到期、等待寫入的內容。 / A write whose quiet interval has elapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWrite {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone)]
struct Scheduled {
    value: String,
    deadline: Instant,
}

/// 合併快速連續的編輯，只在安靜期後寫入最新值。 /
/// Coalesces rapid edits and only releases the latest value once a quiet interval has passed.
///
/// 每個鍵各自計時，因此切換語言不會讓待寫入的內容改寫到其他鍵。 /
/// Keys are timed independently, so a language switch never retargets a pending write.
#[derive(Debug, Clone)]
pub struct DebouncedSaver {
    delay: Duration,
    pending: BTreeMap<String, Scheduled>,
}

impl DebouncedSaver {
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(1000);

    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: BTreeMap::new(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// 排程寫入；同一鍵的新事件會取代舊值並重新計時。 /
    /// Schedules a write; a newer event for the same key replaces the value and restarts the timer.
    pub fn schedule(&mut self, key: impl Into<String>, value: impl Into<String>, now: Instant) {
        self.pending.insert(
            key.into(),
            Scheduled {
                value: value.into(),
                deadline: now + self.delay,
            },
        );
    }

    /// 取出所有已到期的寫入。 / Takes every write whose deadline has been reached.
    pub fn poll(&mut self, now: Instant) -> Vec<PendingWrite> {
        let due: Vec<String> = self
            .pending
            .iter()
            .filter(|(_, scheduled)| scheduled.deadline <= now)
            .map(|(key, _)| key.clone())
            .collect();

        due.into_iter()
            .filter_map(|key| {
                self.pending
                    .remove(&key)
                    .map(|scheduled| PendingWrite {
                        key,
                        value: scheduled.value,
                    })
            })
            .collect()
    }

    /// 尚未寫入的最新值。 / Latest value still waiting for its quiet interval.
    pub fn pending_value(&self, key: &str) -> Option<&str> {
        self.pending.get(key).map(|scheduled| scheduled.value.as_str())
    }

    /// 丟棄某鍵的待寫入內容。 / Drops the pending write of one key.
    pub fn discard(&mut self, key: &str) -> Option<PendingWrite> {
        self.pending.remove(key).map(|scheduled| PendingWrite {
            key: key.to_string(),
            value: scheduled.value,
        })
    }

    /// 取消所有計時器；待寫入內容直接丟棄，不會補寫。 /
    /// Cancels every timer; pending values are dropped, not flushed.
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|scheduled| scheduled.deadline).min()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Default for DebouncedSaver {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY)
    }
}
