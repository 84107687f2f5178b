//! Effects produced by state transitions

use crate::transcript::{Sender, SubmissionId};

/// Effects to be executed, in order, after a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append a turn to the transcript
    AppendTurn {
        sender: Sender,
        text: String,
        submission: SubmissionId,
    },

    /// Empty the input buffer
    ClearInput,

    /// Issue one outbound request (spawns as background task)
    SendRequest {
        submission: SubmissionId,
        query: String,
    },
}

impl Effect {
    pub fn append_user(text: impl Into<String>, submission: SubmissionId) -> Self {
        Effect::AppendTurn {
            sender: Sender::User,
            text: text.into(),
            submission,
        }
    }

    pub fn append_system(text: impl Into<String>, submission: SubmissionId) -> Self {
        Effect::AppendTurn {
            sender: Sender::System,
            text: text.into(),
            submission,
        }
    }
}
