//! Append-only conversation transcript
//!
//! The transcript is the only shared mutable state in a session. It exposes
//! no way to edit, remove or reorder a turn once it has been appended.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::slice;

/// Identifies one dispatched submission.
///
/// A USER turn and the SYSTEM turn that resolves it carry the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubmissionId(u64);

impl SubmissionId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[allow(dead_code)] // Used in tests
    pub fn get(self) -> u64 {
        self.0
    }

    /// The id that follows this one
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    /// Replies from the endpoint and error notices alike
    System,
}

/// One immutable entry in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    sender: Sender,
    text: String,
    submission: SubmissionId,
    created_at: DateTime<Utc>,
}

impl Turn {
    pub fn new(sender: Sender, text: impl Into<String>, submission: SubmissionId) -> Self {
        Self {
            sender,
            text: text.into(),
            submission,
            created_at: Utc::now(),
        }
    }

    #[allow(dead_code)] // Used in tests
    pub fn user(text: impl Into<String>, submission: SubmissionId) -> Self {
        Self::new(Sender::User, text, submission)
    }

    #[allow(dead_code)] // Used in tests
    pub fn system(text: impl Into<String>, submission: SubmissionId) -> Self {
        Self::new(Sender::System, text, submission)
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn submission(&self) -> SubmissionId {
        self.submission
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}

/// Ordered, append-only sequence of turns
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a turn at the end and return its index
    pub fn append(&mut self, turn: Turn) -> usize {
        self.turns.push(turn);
        self.turns.len() - 1
    }

    /// Read-only view of the turns in insertion order.
    ///
    /// The view borrows the transcript, so it cannot observe a mutation.
    /// Clone it (or call `current` again) to restart iteration.
    pub fn current(&self) -> Turns<'_> {
        Turns {
            inner: self.turns.iter(),
        }
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    #[allow(dead_code)] // Used in tests
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }
}

/// Iterator returned by [`Transcript::current`]
#[derive(Debug, Clone)]
pub struct Turns<'a> {
    inner: slice::Iter<'a, Turn>,
}

impl<'a> Iterator for Turns<'a> {
    type Item = &'a Turn;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Turns<'_> {}

impl DoubleEndedIterator for Turns<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}
