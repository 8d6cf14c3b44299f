//! Browser history stack.
//!
//! The partial-update layer only ever [`push`](History::push)es or
//! [`replace`](History::replace)s entries; nothing in atoll removes one.
//! Pushing after going back drops the forward entries, exactly like the
//! browser does.

use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub url: Url,
    pub scroll_y: u32,
}

#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    index: usize,
}

impl History {
    /// A history holding the initial page load.
    pub fn new(url: Url) -> Self {
        Self {
            entries: vec![HistoryEntry { url, scroll_y: 0 }],
            index: 0,
        }
    }

    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.index]
    }

    pub fn url(&self) -> &Url {
        &self.current().url
    }

    pub fn push(&mut self, url: Url) {
        self.entries.truncate(self.index + 1);
        self.entries.push(HistoryEntry { url, scroll_y: 0 });
        self.index = self.entries.len() - 1;
    }

    pub fn replace(&mut self, url: Url) {
        let scroll_y = self.current().scroll_y;
        self.entries[self.index] = HistoryEntry { url, scroll_y };
    }

    pub fn set_scroll(&mut self, scroll_y: u32) {
        self.entries[self.index].scroll_y = scroll_y;
    }

    /// Step back one entry. Returns the entry now current, if the step moved.
    pub fn back(&mut self) -> Option<&HistoryEntry> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(self.current())
    }

    pub fn forward(&mut self) -> Option<&HistoryEntry> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(self.current())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
