//! Bounded, timestamped command history.

use chrono::{DateTime, Utc};

/// Default maximum number of retained commands.
const DEFAULT_CAP: usize = 1000;

/// One executed command.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub command: String,
    pub time: DateTime<Utc>,
}

/// An ordered, bounded list of commands plus a navigation cursor.
///
/// The cursor is `None` while editing the live line. The first
/// up-arrow saves the live line so navigating past the newest entry
/// restores it.
#[derive(Debug)]
pub struct History {
    entries: Vec<HistoryEntry>,
    cap: usize,
    cursor: Option<usize>,
    saved_live: String,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_CAP)
    }
}

impl History {
    #[must_use]
    pub fn new(cap: usize) -> Self {
        Self {
            entries: Vec::new(),
            cap,
            cursor: None,
            saved_live: String::new(),
        }
    }

    /// Append a command. Empty commands and immediate repeats are
    /// skipped. Navigation state resets either way.
    pub fn push(&mut self, command: &str) {
        self.cursor = None;
        self.saved_live.clear();
        let command = command.trim();
        if command.is_empty() {
            return;
        }
        if self
            .entries
            .last()
            .is_some_and(|entry| entry.command == command)
        {
            return;
        }
        self.entries.push(HistoryEntry {
            command: command.to_string(),
            time: Utc::now(),
        });
        if self.entries.len() > self.cap {
            let excess = self.entries.len() - self.cap;
            self.entries.drain(..excess);
        }
    }

    /// Step back in history. On the first step the in-progress line is
    /// saved for later restoration. Returns the command to display, or
    /// `None` when already at the oldest entry (or history is empty).
    pub fn up(&mut self, live_line: &str) -> Option<String> {
        match self.cursor {
            None => {
                if self.entries.is_empty() {
                    return None;
                }
                self.saved_live = live_line.to_string();
                self.cursor = Some(self.entries.len() - 1);
            }
            Some(0) => return None,
            Some(index) => self.cursor = Some(index - 1),
        }
        self.cursor
            .and_then(|index| self.entries.get(index))
            .map(|entry| entry.command.clone())
    }

    /// Step forward in history. Past the newest entry the saved live
    /// line comes back and the cursor returns to the live state.
    /// A no-op while already on the live line.
    pub fn down(&mut self) -> Option<String> {
        let index = self.cursor?;
        if index + 1 < self.entries.len() {
            self.cursor = Some(index + 1);
            self.entries.get(index + 1).map(|e| e.command.clone())
        } else {
            self.cursor = None;
            Some(std::mem::take(&mut self.saved_live))
        }
    }

    /// All retained entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }
}
