//! Long-lived editor state: the bounded submission history.
//!
//! `HistoryLog` is created once at startup and lives as long as its `LineEditor`. It is a strict
//! FIFO: appending past `capacity` evicts the oldest entry unconditionally.
//!
//! Navigation model:
//! * `index == None` is the *live* position: the user is editing their own line.
//! * Moving into history from live stashes the in-progress line in the draft slot.
//! * Moving forward past the newest entry returns to live and hands the draft back.
//! * Any append resets navigation to live and discards the draft slot.
//!
//! History navigation never fails: at either boundary the call is a silent no-op (`None`).

use std::collections::VecDeque;
use tracing::trace;

/// Default number of retained entries.
pub const HISTORY_CAPACITY_DEFAULT: usize = 100;

#[derive(Debug, Clone)]
pub struct HistoryLog {
    entries: VecDeque<String>,
    capacity: usize,
    /// Position while browsing; `None` when live.
    index: Option<usize>,
    /// In-progress line stashed when browsing started.
    draft: Option<String>,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY_DEFAULT)
    }
}

impl HistoryLog {
    /// Create an empty log holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            index: None,
            draft: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// True while a history entry (not the live line) is being shown.
    pub fn is_browsing(&self) -> bool {
        self.index.is_some()
    }

    /// Stashed in-progress line, if browsing started from a live line.
    pub fn draft(&self) -> Option<&str> {
        self.draft.as_deref()
    }

    /// Push `line` as the newest entry, evicting the oldest when over capacity.
    pub fn append(&mut self, line: impl Into<String>) {
        self.entries.push_back(line.into());
        let mut evicted = 0usize;
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
            evicted += 1;
        }
        self.index = None;
        self.draft = None;
        trace!(target: "edit.history", len = self.entries.len(), evicted, "append");
    }

    /// Step one entry older.
    ///
    /// From live, `current` is stashed as the draft and the newest entry is returned. Returns
    /// `None` (no-op) when history is empty or the oldest entry is already shown.
    pub fn previous(&mut self, current: &str) -> Option<&str> {
        let next_index = match self.index {
            None => {
                if self.entries.is_empty() {
                    return None;
                }
                self.draft = Some(current.to_string());
                self.entries.len() - 1
            }
            Some(0) => return None,
            Some(i) => i - 1,
        };
        self.index = Some(next_index);
        trace!(target: "edit.history", index = next_index, "previous");
        self.entries.get(next_index).map(String::as_str)
    }

    /// Step one entry newer.
    ///
    /// * Browsing an older entry: returns the next newer one.
    /// * Browsing the newest entry: returns to live and hands back the stashed draft. An edited
    ///   recall (`current` non-empty and different from the entry) is appended first.
    /// * Live with a non-empty `current`: `current` is appended to history so it can be recalled
    ///   later, and an empty line is returned.
    /// * Live with an empty `current`: no-op.
    pub fn next(&mut self, current: &str) -> Option<String> {
        match self.index {
            Some(i) if i + 1 < self.entries.len() => {
                self.index = Some(i + 1);
                trace!(target: "edit.history", index = i + 1, "next");
                self.entries.get(i + 1).cloned()
            }
            Some(i) => {
                let draft = self.draft.take().unwrap_or_default();
                let edited = !current.is_empty()
                    && self.entries.get(i).is_some_and(|entry| entry != current);
                if edited {
                    self.append(current);
                }
                self.index = None;
                trace!(target: "edit.history", edited, "next_to_live");
                Some(draft)
            }
            None if !current.is_empty() => {
                self.append(current);
                trace!(target: "edit.history", "next_stash_live_line");
                Some(String::new())
            }
            None => None,
        }
    }

    /// Abandon browsing without touching entries (used on submit / reset).
    pub fn reset_navigation(&mut self) {
        self.index = None;
        self.draft = None;
    }
}
