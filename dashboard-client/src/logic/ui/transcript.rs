//! Ticket chat transcript (append-only)

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Role {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptEntry {
    pub role: Role,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// Unbounded chat log, auto-scrolled to the newest entry
#[derive(Debug, Clone, Default, Serialize)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    scroll_to: Option<usize>,
}

impl Transcript {
    pub fn append(&mut self, role: Role, text: impl Into<String>) {
        self.entries.push(TranscriptEntry {
            role,
            text: text.into(),
            at: Utc::now(),
        });
        self.scroll_to = Some(self.entries.len() - 1);
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index the view is scrolled to
    pub fn scroll_to(&self) -> Option<usize> {
        self.scroll_to
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }
}
