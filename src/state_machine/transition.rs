//! Pure state transition function
//!
//! Given the same state, context and event this always produces the same
//! new state and effects. All I/O happens in the runtime that executes the
//! effects.

use super::{DispatchContext, DispatchPolicy, DispatchState, Effect, Event, Outcome};
use crate::transcript::SubmissionId;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: DispatchState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: DispatchState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("A reply is still pending, wait for it before sending another message")]
    Busy,
    #[error("Session is closed")]
    SessionClosed,
    #[error("No pending submission {0}")]
    UnknownSubmission(SubmissionId),
    #[error("Submission {0} is already in flight")]
    DuplicateSubmission(SubmissionId),
}

/// Pure transition function
pub fn transition(
    state: &DispatchState,
    context: &DispatchContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Teardown
        // ============================================================

        (DispatchState::Closed, Event::Submit { .. }) => Err(TransitionError::SessionClosed),

        // Late resolution after teardown: discard
        (DispatchState::Closed, Event::Resolved { .. } | Event::Teardown) => {
            Ok(TransitionResult::new(DispatchState::Closed))
        }

        (_, Event::Teardown) => Ok(TransitionResult::new(DispatchState::Closed)),

        // ============================================================
        // Validating
        // ============================================================

        // Blank input is a guard, not an error: nothing changes
        (state, Event::Submit { text, .. }) if text.trim().is_empty() => {
            Ok(TransitionResult::new(state.clone()))
        }

        (DispatchState::Dispatching { .. }, Event::Submit { .. })
            if context.policy == DispatchPolicy::Serialized =>
        {
            Err(TransitionError::Busy)
        }

        (state, Event::Submit { submission, .. }) if state.is_pending(submission) => {
            Err(TransitionError::DuplicateSubmission(submission))
        }

        // ============================================================
        // Dispatching
        // ============================================================

        (DispatchState::Idle, Event::Submit { submission, text, .. }) => Ok(dispatch(
            DispatchState::dispatching(submission),
            submission,
            &text,
        )),

        (DispatchState::Dispatching { in_flight }, Event::Submit { submission, text, .. }) => {
            let mut in_flight = in_flight.clone();
            in_flight.insert(submission);
            Ok(dispatch(
                DispatchState::Dispatching { in_flight },
                submission,
                &text,
            ))
        }

        // ============================================================
        // Reconciling
        // ============================================================

        (DispatchState::Dispatching { in_flight }, Event::Resolved { submission, outcome })
            if in_flight.contains(&submission) =>
        {
            let mut in_flight = in_flight.clone();
            in_flight.remove(&submission);

            let text = match outcome {
                Outcome::Reply(reply) => reply,
                Outcome::Failed { .. } => context.error_notice.clone(),
            };

            Ok(TransitionResult::new(DispatchState::from_in_flight(in_flight))
                .with_effect(Effect::append_system(text, submission)))
        }

        (DispatchState::Idle | DispatchState::Dispatching { .. }, Event::Resolved { submission, .. }) => {
            Err(TransitionError::UnknownSubmission(submission))
        }
    }
}

// The user turn must land before the request goes out.
// The turn shows what was typed; only the outbound query is trimmed.
fn dispatch(new_state: DispatchState, submission: SubmissionId, text: &str) -> TransitionResult {
    TransitionResult::new(new_state)
        .with_effect(Effect::append_user(text, submission))
        .with_effect(Effect::ClearInput)
        .with_effect(Effect::SendRequest {
            submission,
            query: text.trim().to_string(),
        })
}
