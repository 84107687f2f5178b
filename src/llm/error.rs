//! Inference client error types

use thiserror::Error;

/// Error from one call to the inference endpoint
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Transport, message)
    }

    pub fn status(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Status, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Malformed, message)
    }
}

/// Error classification, used for logging only.
///
/// Every kind renders the same notice in the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    /// Unreachable, refused, timed out, or the body could not be read
    Transport,
    /// The endpoint answered with a non-success status
    Status,
    /// Success status but the payload has no reply
    Malformed,
}

impl ChatErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChatErrorKind::Transport => "transport",
            ChatErrorKind::Status => "status",
            ChatErrorKind::Malformed => "malformed",
        }
    }
}

impl std::fmt::Display for ChatErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
