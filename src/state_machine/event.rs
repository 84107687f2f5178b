//! Events that drive the dispatch controller

use crate::llm::{ChatError, ChatErrorKind};
use crate::transcript::SubmissionId;
use std::fmt;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    Submit {
        submission: SubmissionId,
        /// Raw input buffer contents; validated by the transition
        text: String,
        trigger: SubmitTrigger,
    },

    // Network events
    Resolved {
        submission: SubmissionId,
        outcome: Outcome,
    },

    // Lifecycle events
    Teardown,
}

/// What caused a submit. Both triggers are equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    Enter,
    SendButton,
}

impl fmt::Display for SubmitTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitTrigger::Enter => f.write_str("enter"),
            SubmitTrigger::SendButton => f.write_str("send_button"),
        }
    }
}

/// Result of one outbound request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Reply(String),
    Failed {
        kind: ChatErrorKind,
        message: String,
    },
}

impl From<Result<String, ChatError>> for Outcome {
    fn from(result: Result<String, ChatError>) -> Self {
        match result {
            Ok(reply) => Outcome::Reply(reply),
            Err(e) => Outcome::Failed {
                kind: e.kind,
                message: e.message,
            },
        }
    }
}
