//! Chat session executor

use super::InputBuffer;
use crate::llm::ChatService;
use crate::state_machine::{
    transition, DispatchContext, DispatchState, Effect, Event, Outcome, SubmitTrigger,
    TransitionError,
};
use crate::transcript::{SubmissionId, Transcript, Turn};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// What a submit action did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A user turn was appended and a request issued
    Dispatched(SubmissionId),
    /// Blank input; nothing happened
    Ignored,
}

/// One single-user chat session.
///
/// Owns the transcript, the input buffer and the dispatch state. Outbound
/// calls run as spawned tasks that report back through the session's own
/// event channel; the session itself is only ever touched from the task
/// that owns it.
pub struct ChatSession<S>
where
    S: ChatService + 'static,
{
    session_id: String,
    context: DispatchContext,
    state: DispatchState,
    transcript: Transcript,
    input: InputBuffer,
    service: Arc<S>,
    next_submission: SubmissionId,
    event_tx: mpsc::UnboundedSender<Event>,
    event_rx: mpsc::UnboundedReceiver<Event>,
}

impl<S> ChatSession<S>
where
    S: ChatService + 'static,
{
    pub fn new(context: DispatchContext, service: S) -> Self {
        Self::with_shared(context, Arc::new(service))
    }

    pub fn with_shared(context: DispatchContext, service: Arc<S>) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let session_id = Uuid::new_v4().to_string();
        tracing::info!(
            session_id = %session_id,
            endpoint = %service.endpoint(),
            policy = ?context.policy,
            "Starting chat session"
        );

        Self {
            session_id,
            context,
            state: DispatchState::Idle,
            transcript: Transcript::new(),
            input: InputBuffer::new(),
            service,
            next_submission: SubmissionId::new(1),
            event_tx,
            event_rx,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn input(&self) -> &InputBuffer {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputBuffer {
        &mut self.input
    }

    pub fn state(&self) -> &DispatchState {
        &self.state
    }

    pub fn in_flight(&self) -> usize {
        self.state.in_flight_count()
    }

    /// Submit the current input buffer
    pub fn submit(&mut self, trigger: SubmitTrigger) -> Result<SubmitOutcome, TransitionError> {
        let submission = self.next_submission;
        let event = Event::Submit {
            submission,
            text: self.input.text().to_string(),
            trigger,
        };

        if self.process_event(event)? {
            self.next_submission = submission.next();
            tracing::info!(
                session_id = %self.session_id,
                submission = %submission,
                trigger = %trigger,
                "Submission dispatched"
            );
            Ok(SubmitOutcome::Dispatched(submission))
        } else {
            tracing::debug!(session_id = %self.session_id, trigger = %trigger, "Ignoring blank submission");
            Ok(SubmitOutcome::Ignored)
        }
    }

    /// Wait for the next resolution from an outbound call.
    ///
    /// The session holds a sender of its own, so this only returns `None`
    /// if the channel has been closed explicitly.
    pub async fn next_event(&mut self) -> Option<Event> {
        self.event_rx.recv().await
    }

    /// Feed an event produced by `next_event` back into the state machine
    pub fn handle_event(&mut self, event: Event) -> Result<(), TransitionError> {
        if let Event::Resolved { submission, .. } = &event {
            if self.state.is_closed() {
                tracing::debug!(
                    session_id = %self.session_id,
                    submission = %submission,
                    "Discarding resolution after teardown"
                );
            }
        }
        self.process_event(event).map(|_| ())
    }

    /// Tear the session down. In-flight requests keep running; their
    /// results are discarded when they arrive.
    pub fn close(&mut self) {
        let in_flight = self.in_flight();
        if let Err(e) = self.process_event(Event::Teardown) {
            tracing::warn!(session_id = %self.session_id, error = %e, "Teardown rejected");
        }
        tracing::info!(
            session_id = %self.session_id,
            abandoned = in_flight,
            turns = self.transcript.len(),
            "Chat session closed"
        );
    }

    /// Run one transition and its effects. Returns whether a request was issued.
    fn process_event(&mut self, event: Event) -> Result<bool, TransitionError> {
        let result = transition(&self.state, &self.context, event).inspect_err(|e| {
            tracing::warn!(session_id = %self.session_id, state = self.state.name(), error = %e, "Transition rejected");
        })?;

        self.state = result.new_state;

        let mut dispatched = false;
        for effect in result.effects {
            dispatched |= matches!(effect, Effect::SendRequest { .. });
            self.execute_effect(effect);
        }
        Ok(dispatched)
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::AppendTurn {
                sender,
                text,
                submission,
            } => {
                let index = self.transcript.append(Turn::new(sender, text, submission));
                tracing::debug!(
                    session_id = %self.session_id,
                    submission = %submission,
                    sender = ?sender,
                    index,
                    "Turn appended"
                );
            }

            Effect::ClearInput => self.input.clear(),

            Effect::SendRequest { submission, query } => {
                let service = self.service.clone();
                let event_tx = self.event_tx.clone();
                let session_id = self.session_id.clone();

                tokio::spawn(async move {
                    tracing::debug!(
                        session_id = %session_id,
                        submission = %submission,
                        query_len = query.len(),
                        "Sending chat request (background)"
                    );

                    let outcome = Outcome::from(service.ask(&query).await);
                    if let Outcome::Failed { kind, message } = &outcome {
                        tracing::warn!(
                            session_id = %session_id,
                            submission = %submission,
                            error_kind = %kind,
                            error = %message,
                            "Chat request failed, reporting server error"
                        );
                    }

                    // The session may already be gone; nothing to reconcile then
                    let _ = event_tx.send(Event::Resolved {
                        submission,
                        outcome,
                    });
                });
            }
        }
    }
}
