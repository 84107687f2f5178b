//! Runtime for executing a chat session
//!
//! Applies the effects produced by the state machine: transcript appends,
//! input clearing, and outbound requests spawned as background tasks.

mod executor;
mod input;

#[cfg(test)]
pub mod testing;

pub use executor::{ChatSession, SubmitOutcome};
pub use input::InputBuffer;
