//! # Message Log
//!
//! Append-only record of the conversation. Entries are never edited or removed;
//! the typing indicator is derived from the session state and never lands here.

use crate::core::session::{QuickOption, labels};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Bot,
}

/// How closely the backend matched the user's term against its catalog.
/// Presentation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchQuality {
    Exact,
    Fuzzy,
}

/// A single location in a geographic result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub name: String,
    pub address: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    Text {
        body: String,
    },
    AnsweredText {
        body: String,
        latency_seconds: Option<f64>,
        match_quality: Option<MatchQuality>,
        matched_name: Option<String>,
    },
    GeoResult {
        caption: String,
        markers: Vec<Marker>,
        /// Fallback view center, only used when `markers` is empty.
        center: Option<(f64, f64)>,
    },
    QuickOptions {
        prompt: String,
        options: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
}

impl Message {
    pub fn user(body: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text { body: body.into() },
        }
    }

    pub fn bot(body: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            content: MessageContent::Text { body: body.into() },
        }
    }

    pub fn options(prompt: impl Into<String>, options: &[QuickOption]) -> Self {
        Self {
            role: Role::Bot,
            content: MessageContent::QuickOptions {
                prompt: prompt.into(),
                options: labels(options),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageLog {
    entries: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message and returns its index.
    pub fn push(&mut self, message: Message) -> usize {
        self.entries.push(message);
        self.entries.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Message> {
        self.entries.get(index)
    }

    pub fn last(&self) -> Option<&Message> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[Message] {
        &self.entries
    }
}
