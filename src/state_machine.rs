//! Dispatch controller state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;


pub use effect::Effect;
pub use event::{Event, Outcome, SubmitTrigger};
pub use state::{DispatchContext, DispatchPolicy, DispatchState, SERVER_ERROR_NOTICE};
pub use transition::{transition, TransitionError};
