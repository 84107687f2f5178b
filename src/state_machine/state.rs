//! Dispatch state types

use crate::transcript::SubmissionId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Fixed notice shown when a dispatch fails for any reason
pub const SERVER_ERROR_NOTICE: &str = "⚠️ Server error! Try again.";

/// Dispatch controller state
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DispatchState {
    /// No submission in flight
    #[default]
    Idle,

    /// One or more requests in flight, each awaiting its own resolution.
    /// Never constructed with an empty set.
    Dispatching { in_flight: BTreeSet<SubmissionId> },

    /// Session torn down; late resolutions are discarded
    Closed,
}

impl DispatchState {
    pub fn dispatching(submission: SubmissionId) -> Self {
        DispatchState::Dispatching {
            in_flight: BTreeSet::from([submission]),
        }
    }

    /// Build the state for a set of pending submissions, collapsing to Idle when empty
    pub fn from_in_flight(in_flight: BTreeSet<SubmissionId>) -> Self {
        if in_flight.is_empty() {
            DispatchState::Idle
        } else {
            DispatchState::Dispatching { in_flight }
        }
    }

    pub fn is_pending(&self, submission: SubmissionId) -> bool {
        match self {
            DispatchState::Dispatching { in_flight } => in_flight.contains(&submission),
            _ => false,
        }
    }

    pub fn in_flight_count(&self) -> usize {
        match self {
            DispatchState::Dispatching { in_flight } => in_flight.len(),
            _ => 0,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, DispatchState::Closed)
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            DispatchState::Idle => "idle",
            DispatchState::Dispatching { .. } => "dispatching",
            DispatchState::Closed => "closed",
        }
    }
}

/// How a new submission is treated while others are still in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPolicy {
    /// Dispatch immediately; every submission is reconciled on its own
    #[default]
    Concurrent,
    /// Reject a submit while any request is pending
    Serialized,
}

impl DispatchPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "concurrent" => Some(DispatchPolicy::Concurrent),
            "serialized" | "serialised" => Some(DispatchPolicy::Serialized),
            _ => None,
        }
    }
}

/// Immutable configuration for a session's dispatch controller
#[derive(Debug, Clone)]
pub struct DispatchContext {
    pub policy: DispatchPolicy,
    /// Text of the SYSTEM turn appended on any failure
    pub error_notice: String,
}

impl DispatchContext {
    pub fn new(policy: DispatchPolicy) -> Self {
        Self {
            policy,
            error_notice: SERVER_ERROR_NOTICE.to_string(),
        }
    }
}

impl Default for DispatchContext {
    fn default() -> Self {
        Self::new(DispatchPolicy::default())
    }
}
