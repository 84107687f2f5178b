//! Mock implementations for testing
//!
//! These mocks enable session testing without real I/O.

use crate::llm::{ChatError, ChatService};
use crate::runtime::ChatSession;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::oneshot;

// ============================================================================
// Mock Chat Service
// ============================================================================

/// Mock service that returns queued results in order
#[allow(dead_code)]
pub struct MockChatService {
    responses: Mutex<VecDeque<Result<String, ChatError>>>,
    /// Record of all queries sent
    queries: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl MockChatService {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply
    pub fn queue_reply(&self, reply: impl Into<String>) {
        self.responses.lock().unwrap().push_back(Ok(reply.into()));
    }

    /// Queue a failure
    pub fn queue_error(&self, error: ChatError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl Default for MockChatService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatService for MockChatService {
    async fn ask(&self, query: &str) -> Result<String, ChatError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ChatError::transport("No mock response queued")))
    }

    fn endpoint(&self) -> &str {
        "mock://chat"
    }
}

// ============================================================================
// Gated Chat Service (for ordering tests)
// ============================================================================

type Gate = oneshot::Sender<Result<String, ChatError>>;

/// Mock service where each query blocks until the test opens its gate.
///
/// Lets a test resolve concurrent requests in any order it likes.
pub struct GatedChatService {
    pending: Mutex<HashMap<String, oneshot::Receiver<Result<String, ChatError>>>>,
}

impl GatedChatService {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Register a gate for `query`; sending on it resolves that request
    pub fn gate(&self, query: &str) -> Gate {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().insert(query.to_string(), rx);
        tx
    }
}

impl Default for GatedChatService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatService for GatedChatService {
    async fn ask(&self, query: &str) -> Result<String, ChatError> {
        let gate = self.pending.lock().unwrap().remove(query);
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(ChatError::transport("Gate dropped"))),
            None => Err(ChatError::transport(format!("No gate for query: {query}"))),
        }
    }

    fn endpoint(&self) -> &str {
        "gated://chat"
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Pump resolutions into the session until nothing is in flight.
/// Returns false if `timeout` elapses first.
pub async fn settle<S: ChatService + 'static>(
    session: &mut ChatSession<S>,
    timeout: Duration,
) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while session.in_flight() > 0 {
        match tokio::time::timeout_at(deadline, session.next_event()).await {
            Ok(Some(event)) => {
                let _ = session.handle_event(event);
            }
            _ => return false,
        }
    }
    true
}

/// Wait for exactly one resolution and apply it
pub async fn pump_one<S: ChatService + 'static>(session: &mut ChatSession<S>) {
    let event = tokio::time::timeout(Duration::from_secs(2), session.next_event())
        .await
        .expect("timed out waiting for resolution")
        .expect("event channel closed");
    session.handle_event(event).expect("resolution rejected");
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatErrorKind, HttpChatService};
    use crate::runtime::SubmitOutcome;
    use crate::state_machine::{
        DispatchContext, DispatchPolicy, DispatchState, SubmitTrigger, TransitionError,
        SERVER_ERROR_NOTICE,
    };
    use crate::transcript::{Sender, SubmissionId, Turn};
    use std::sync::Arc;

    fn turns<S: ChatService + 'static>(session: &ChatSession<S>) -> Vec<(Sender, String)> {
        session
            .transcript()
            .current()
            .map(|t| (t.sender(), t.text().to_string()))
            .collect()
    }

    fn type_text<S: ChatService + 'static>(session: &mut ChatSession<S>, text: &str) {
        session.input_mut().insert_str(text);
    }

    #[tokio::test]
    async fn test_mock_chat_service() {
        let mock = MockChatService::new();
        mock.queue_reply("Hello");

        assert_eq!(mock.ask("hi").await.unwrap(), "Hello");

        // Second call should fail (no more responses)
        let result = mock.ask("hi again").await;
        assert_eq!(result.unwrap_err().kind, ChatErrorKind::Transport);
        assert_eq!(mock.recorded_queries(), vec!["hi", "hi again"]);
    }

    /// Integration test: successful reply
    #[tokio::test]
    async fn test_success_path() {
        let mock = MockChatService::new();
        mock.queue_reply("hi there");

        let mut session = ChatSession::new(DispatchContext::default(), mock);
        type_text(&mut session, "hello");
        let outcome = session.submit(SubmitTrigger::Enter).unwrap();
        assert_eq!(outcome, SubmitOutcome::Dispatched(SubmissionId::new(1)));

        assert!(settle(&mut session, Duration::from_secs(2)).await);
        assert_eq!(
            turns(&session),
            vec![
                (Sender::User, "hello".to_string()),
                (Sender::System, "hi there".to_string()),
            ]
        );
        assert_eq!(session.state(), &DispatchState::Idle);
    }

    /// Integration test: failure becomes a visible notice
    #[tokio::test]
    async fn test_failure_path() {
        let mock = MockChatService::new();
        mock.queue_error(ChatError::status("HTTP 500: boom"));

        let mut session = ChatSession::new(DispatchContext::default(), mock);
        type_text(&mut session, "hello");
        session.submit(SubmitTrigger::SendButton).unwrap();

        assert!(settle(&mut session, Duration::from_secs(2)).await);
        assert_eq!(
            turns(&session),
            vec![
                (Sender::User, "hello".to_string()),
                (Sender::System, SERVER_ERROR_NOTICE.to_string()),
            ]
        );
    }

    /// Integration test: real HTTP client against a closed port
    #[tokio::test]
    async fn test_unreachable_endpoint_path() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let service =
            HttpChatService::new(format!("http://{addr}/chat"), Duration::from_secs(2)).unwrap();
        let mut session = ChatSession::new(DispatchContext::default(), service);
        type_text(&mut session, "hello");
        session.submit(SubmitTrigger::Enter).unwrap();

        assert!(settle(&mut session, Duration::from_secs(5)).await);
        assert_eq!(
            turns(&session),
            vec![
                (Sender::User, "hello".to_string()),
                (Sender::System, "⚠️ Server error! Try again.".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let mock = Arc::new(MockChatService::new());
        let mut session = ChatSession::with_shared(DispatchContext::default(), mock.clone());

        assert_eq!(
            session.submit(SubmitTrigger::Enter).unwrap(),
            SubmitOutcome::Ignored
        );

        type_text(&mut session, "   ");
        assert_eq!(
            session.submit(SubmitTrigger::SendButton).unwrap(),
            SubmitOutcome::Ignored
        );

        assert!(session.transcript().is_empty());
        assert_eq!(session.input().text(), "   ");
        assert_eq!(session.in_flight(), 0);
        assert!(mock.recorded_queries().is_empty());
    }

    #[tokio::test]
    async fn test_user_turn_and_cleared_buffer_precede_reply() {
        let gated = Arc::new(GatedChatService::new());
        let gate = gated.gate("hello");

        let mut session = ChatSession::with_shared(DispatchContext::default(), gated);
        type_text(&mut session, "  hello  ");
        session.submit(SubmitTrigger::Enter).unwrap();

        // Before the request resolves
        assert!(session.input().is_empty());
        assert_eq!(turns(&session), vec![(Sender::User, "  hello  ".to_string())]);
        assert_eq!(session.in_flight(), 1);

        gate.send(Err(ChatError::transport("refused"))).unwrap();
        pump_one(&mut session).await;

        // Buffer stays empty after a failure too
        assert!(session.input().is_empty());
        assert_eq!(session.transcript().len(), 2);
    }

    #[tokio::test]
    async fn test_out_of_order_resolution() {
        let gated = Arc::new(GatedChatService::new());
        let first_gate = gated.gate("first");
        let second_gate = gated.gate("second");

        let mut session = ChatSession::with_shared(DispatchContext::default(), gated);
        type_text(&mut session, "first");
        session.submit(SubmitTrigger::Enter).unwrap();
        type_text(&mut session, "second");
        session.submit(SubmitTrigger::Enter).unwrap();
        assert_eq!(session.in_flight(), 2);

        second_gate.send(Ok("second reply".to_string())).unwrap();
        pump_one(&mut session).await;
        first_gate.send(Ok("first reply".to_string())).unwrap();
        pump_one(&mut session).await;

        let log: Vec<_> = session
            .transcript()
            .current()
            .map(|t| (t.sender(), t.submission().get(), t.text().to_string()))
            .collect();
        assert_eq!(
            log,
            vec![
                (Sender::User, 1, "first".to_string()),
                (Sender::User, 2, "second".to_string()),
                (Sender::System, 2, "second reply".to_string()),
                (Sender::System, 1, "first reply".to_string()),
            ]
        );
        assert_eq!(session.state(), &DispatchState::Idle);
    }

    #[tokio::test]
    async fn test_serialized_policy_rejects_second_submit() {
        let gated = Arc::new(GatedChatService::new());
        let gate = gated.gate("first");

        let context = DispatchContext::new(DispatchPolicy::Serialized);
        let mut session = ChatSession::with_shared(context, gated);
        type_text(&mut session, "first");
        session.submit(SubmitTrigger::Enter).unwrap();

        type_text(&mut session, "second");
        let err = session.submit(SubmitTrigger::Enter).unwrap_err();
        assert_eq!(err, TransitionError::Busy);
        assert_eq!(session.input().text(), "second");
        assert_eq!(session.transcript().len(), 1);

        gate.send(Ok("done".to_string())).unwrap();
        pump_one(&mut session).await;

        // Now idle again, the held text goes through
        assert!(matches!(
            session.submit(SubmitTrigger::Enter),
            Ok(SubmitOutcome::Dispatched(_))
        ));
    }

    #[tokio::test]
    async fn test_resolution_after_close_is_discarded() {
        let gated = Arc::new(GatedChatService::new());
        let gate = gated.gate("hello");

        let mut session = ChatSession::with_shared(DispatchContext::default(), gated);
        type_text(&mut session, "hello");
        session.submit(SubmitTrigger::Enter).unwrap();
        session.close();
        assert!(session.state().is_closed());

        gate.send(Ok("late".to_string())).unwrap();
        let event = tokio::time::timeout(Duration::from_secs(2), session.next_event())
            .await
            .unwrap()
            .unwrap();
        assert!(session.handle_event(event).is_ok());
        assert_eq!(session.transcript().len(), 1);

        type_text(&mut session, "more");
        assert_eq!(
            session.submit(SubmitTrigger::Enter).unwrap_err(),
            TransitionError::SessionClosed
        );
    }

    /// Hands the inner service's result to the test once `ask` returns
    struct ReportingService {
        inner: GatedChatService,
        done: Mutex<Option<oneshot::Sender<Result<String, ChatError>>>>,
    }

    #[async_trait]
    impl ChatService for ReportingService {
        async fn ask(&self, query: &str) -> Result<String, ChatError> {
            let result = self.inner.ask(query).await;
            if let Some(done) = self.done.lock().unwrap().take() {
                let _ = done.send(result.clone());
            }
            result
        }

        fn endpoint(&self) -> &str {
            self.inner.endpoint()
        }
    }

    #[tokio::test]
    async fn test_request_outlives_dropped_session() {
        let inner = GatedChatService::new();
        let gate = inner.gate("hello");
        let (done_tx, done_rx) = oneshot::channel();
        let service = ReportingService {
            inner,
            done: Mutex::new(Some(done_tx)),
        };

        let mut session = ChatSession::new(DispatchContext::default(), service);
        type_text(&mut session, "hello");
        session.submit(SubmitTrigger::Enter).unwrap();
        drop(session);

        // Nobody is listening for the resolution any more
        gate.send(Ok("orphan".to_string())).unwrap();
        let result = tokio::time::timeout(Duration::from_secs(2), done_rx)
            .await
            .expect("request task never finished")
            .expect("request task dropped its report");
        assert_eq!(result.unwrap(), "orphan");

        // Let the task attempt its send into the closed channel
        tokio::task::yield_now().await;
    }

    #[tokio::test]
    async fn test_submission_ids_skip_blank_submits() {
        let mock = MockChatService::new();
        mock.queue_reply("a");
        mock.queue_reply("b");

        let mut session = ChatSession::new(DispatchContext::default(), mock);
        type_text(&mut session, "one");
        session.submit(SubmitTrigger::Enter).unwrap();
        session.submit(SubmitTrigger::Enter).unwrap();
        type_text(&mut session, "two");
        let second = session.submit(SubmitTrigger::Enter).unwrap();
        assert_eq!(second, SubmitOutcome::Dispatched(SubmissionId::new(2)));

        assert!(settle(&mut session, Duration::from_secs(2)).await);
        let users: Vec<_> = session
            .transcript()
            .current()
            .filter(|t| t.is_user())
            .map(Turn::submission)
            .collect();
        assert_eq!(users, vec![SubmissionId::new(1), SubmissionId::new(2)]);
    }

    #[tokio::test]
    async fn test_queries_are_trimmed() {
        let mock = Arc::new(MockChatService::new());
        mock.queue_reply("ok");

        let mut session = ChatSession::with_shared(DispatchContext::default(), mock.clone());
        type_text(&mut session, "\t what is rust? ");
        session.submit(SubmitTrigger::Enter).unwrap();
        assert!(settle(&mut session, Duration::from_secs(2)).await);

        assert_eq!(mock.recorded_queries(), vec!["what is rust?"]);
    }
}
