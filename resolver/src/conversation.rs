//! A running chat transcript over any [`Responder`].

use std::fmt;

use crate::responder::Responder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Bot,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::User => write!(f, "user"),
            Speaker::Bot => write!(f, "bot"),
        }
    }
}

/// One transcript line. Text is kept verbatim, newlines included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub speaker: Speaker,
    pub text: String,
}

pub struct Conversation<R> {
    responder: R,
    entries: Vec<Entry>,
}

impl<R: Responder> Conversation<R> {
    pub fn new(responder: R) -> Self {
        Self {
            responder,
            entries: Vec::new(),
        }
    }

    /// Record `input`, ask the responder, record and return its reply.
    ///
    /// Blank input is ignored and returns `None`.
    pub async fn send(&mut self, input: &str) -> Option<&Entry> {
        if input.trim().is_empty() {
            return None;
        }
        self.entries.push(Entry {
            speaker: Speaker::User,
            text: input.to_string(),
        });
        let reply = self.responder.respond(input).await;
        self.entries.push(Entry {
            speaker: Speaker::Bot,
            text: reply,
        });
        self.entries.last()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Render the transcript as `speaker: text` blocks.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{}: {}", e.speaker, e.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
