//! ChatEngine - per-session chat orchestration.
//!
//! One engine per signed-in session. Exactly one turn may be in flight at a
//! time; the submit guard enforces this across agents. A turn targets the
//! agent captured at submit time even if the UI selection changes while the
//! stream is open.

use std::sync::{Arc, Mutex as StdMutex};

use futures_util::StreamExt;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use chat_core::{
    AgentId, ChatConfig, ConversationStore, Message, QueryHistory, QueryHistoryEntry, RagSources,
    TokenLedger, TurnUsage,
};
use chat_state::{StateMachine, TurnEvent, TurnState};
use gemini_client::{Content, GenerateContentRequest, GenerativeClient};
use session_manager::{AuthUser, SessionStore};
use upload_manager::UploadPipeline;

use crate::error::EngineError;
use crate::events::ChatEvent;
use crate::request::build_contents;

/// Fixed assistant reply appended when a turn fails before any chunk
/// arrived.
pub const FALLBACK_ASSISTANT_REPLY: &str = "Sorry, I encountered an error. Please try again.";

/// Result of one submit call.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Input was blank after trimming; nothing happened.
    EmptyInput,
    /// Another turn is in flight; nothing happened.
    Busy,
    /// The turn ran to completion.
    Completed(TurnUsage),
    /// The turn aborted; the transcript already holds the fallback reply or
    /// the partial content.
    Failed(String),
}

struct EngineState {
    conversations: ConversationStore,
    ledger: TokenLedger,
    history: QueryHistory,
    machine: StateMachine,
    user: Option<AuthUser>,
}

pub struct ChatEngine {
    config: ChatConfig,
    client: Arc<dyn GenerativeClient>,
    uploads: UploadPipeline,
    events: mpsc::Sender<ChatEvent>,
    state: Mutex<EngineState>,
    /// The submit guard. Checked-and-set synchronously so interleaved
    /// submissions cannot both pass.
    in_flight: StdMutex<Option<AgentId>>,
}

impl ChatEngine {
    pub fn new(
        config: ChatConfig,
        client: Arc<dyn GenerativeClient>,
        uploads: UploadPipeline,
        events: mpsc::Sender<ChatEvent>,
    ) -> Self {
        let ledger = TokenLedger::new(config.total_token_limit);
        Self {
            config,
            client,
            uploads,
            events,
            state: Mutex::new(EngineState {
                conversations: ConversationStore::new(),
                ledger,
                history: QueryHistory::new(),
                machine: StateMachine::new(),
                user: None,
            }),
            in_flight: StdMutex::new(None),
        }
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn uploads(&self) -> &UploadPipeline {
        &self.uploads
    }

    /// The agent owning the in-flight turn, if any. UIs show the streaming
    /// affordance only when the selected agent matches this.
    pub fn in_flight_agent(&self) -> Option<AgentId> {
        *self.in_flight.lock().expect("in-flight guard")
    }

    pub async fn turn_state(&self) -> TurnState {
        self.state.lock().await.machine.state().clone()
    }

    pub async fn transcript(&self, agent: AgentId) -> Vec<Message> {
        self.state.lock().await.conversations.messages(agent).to_vec()
    }

    pub async fn tokens_used(&self) -> u64 {
        self.state.lock().await.ledger.used()
    }

    pub async fn ledger(&self) -> TokenLedger {
        self.state.lock().await.ledger.clone()
    }

    pub async fn history_entries(&self) -> Vec<QueryHistoryEntry> {
        self.state.lock().await.history.iter().cloned().collect()
    }

    pub async fn signed_in_user(&self) -> Option<AuthUser> {
        self.state.lock().await.user.clone()
    }

    /// React to an identity change. Welcome messages are seeded exactly once
    /// per no-user -> user transition; sign-out clears every transcript and
    /// attachment.
    pub async fn handle_auth_change(&self, user: Option<AuthUser>) {
        let mut state = self.state.lock().await;
        let was_signed_in = state.user.is_some();
        match user {
            Some(user) => {
                if !was_signed_in {
                    state.conversations.initialize_if_empty(&user.display_name);
                    tracing::info!(user = %user.email, "session initialized");
                }
                state.user = Some(user);
            }
            None => {
                if was_signed_in {
                    state.user = None;
                    state.conversations.clear();
                    drop(state);
                    self.uploads.clear().await;
                    tracing::info!("session cleared on sign-out");
                }
            }
        }
    }

    /// Submit one turn. Guarded: blank input and in-flight turns are
    /// no-ops. Returns once the turn has completed or aborted; streamed
    /// progress is reported through the event channel.
    pub async fn submit(
        &self,
        agent: AgentId,
        input: &str,
        rag: RagSources,
        cancel: CancellationToken,
    ) -> SubmitOutcome {
        let input = input.trim();
        if input.is_empty() {
            return SubmitOutcome::EmptyInput;
        }
        {
            let mut guard = self.in_flight.lock().expect("in-flight guard");
            if guard.is_some() {
                return SubmitOutcome::Busy;
            }
            *guard = Some(agent);
        }

        // Entry actions happen before any network call resolves: the user
        // sees their own message without delay.
        {
            let mut state = self.state.lock().await;
            state.conversations.append_user(agent, input);
            state
                .history
                .record(input, agent.profile().display_name);
            state.machine.handle_event(TurnEvent::SubmissionAccepted);
        }
        let _ = self.events.send(ChatEvent::Submitted { agent }).await;

        let result = self.run_turn(agent, input, rag, &cancel).await;

        // Cleanup runs on every path; a stuck guard would deadlock the
        // session.
        let outcome = match result {
            Ok(usage) => SubmitOutcome::Completed(usage),
            Err(err) => {
                let message = err.to_string();
                let mut state = self.state.lock().await;
                state.machine.handle_event(TurnEvent::TurnFailed {
                    error: message.clone(),
                });
                let partial_exists = state
                    .conversations
                    .last_message(agent)
                    .is_some_and(|m| m.is_assistant());
                if !partial_exists && !matches!(err, EngineError::Cancelled) {
                    state
                        .conversations
                        .append_assistant(agent, FALLBACK_ASSISTANT_REPLY);
                }
                tracing::warn!(error = %message, partial = partial_exists, "turn aborted");
                SubmitOutcome::Failed(message)
            }
        };
        *self.in_flight.lock().expect("in-flight guard") = None;

        match &outcome {
            SubmitOutcome::Completed(usage) => {
                let _ = self.events.send(ChatEvent::Complete { usage: *usage }).await;
            }
            SubmitOutcome::Failed(message) => {
                let _ = self
                    .events
                    .send(ChatEvent::Error {
                        message: message.clone(),
                    })
                    .await;
            }
            _ => {}
        }
        outcome
    }

    async fn run_turn(
        &self,
        agent: AgentId,
        input: &str,
        rag: RagSources,
        cancel: &CancellationToken,
    ) -> Result<TurnUsage, EngineError> {
        let files = self.uploads.ready_files().await;

        let contents = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;
            let messages = state.conversations.messages(agent);
            // The just-appended user message is folded into the new turn's
            // parts instead of being sent as a bare prior turn.
            let prior = &messages[..messages.len().saturating_sub(1)];
            let contents = build_contents(prior, &rag, input, &files);
            state.machine.handle_event(TurnEvent::RequestPrepared);
            contents
        };

        // A token-count failure here is fatal for the turn: the generation
        // request is never issued.
        let input_tokens = self.client.count_tokens(&contents).await?;
        {
            let mut state = self.state.lock().await;
            state.ledger.add(input_tokens);
            state.machine.handle_event(TurnEvent::InputTokensCounted {
                tokens: input_tokens,
            });
        }

        let request = GenerateContentRequest::new(contents)
            .with_system_instruction(agent.profile().system_instruction);
        let mut stream = self.client.stream_generate(request).await?;

        let mut accumulated = String::new();
        let mut first = true;
        while let Some(chunk) = stream.next().await {
            if cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }
            let text = chunk?;
            if text.is_empty() {
                continue;
            }
            {
                let mut state = self.state.lock().await;
                state
                    .conversations
                    .append_or_extend_assistant(agent, &text, first);
                state.machine.handle_event(TurnEvent::ChunkReceived);
            }
            accumulated.push_str(&text);
            first = false;
            let _ = self.events.send(ChatEvent::Token { content: text }).await;
        }

        {
            let mut state = self.state.lock().await;
            state.machine.handle_event(TurnEvent::StreamEnded);
        }

        let output_tokens = self
            .client
            .count_tokens(&[Content::model_text(accumulated)])
            .await?;
        let mut state = self.state.lock().await;
        state.ledger.add(output_tokens);
        state.machine.handle_event(TurnEvent::OutputTokensCounted {
            tokens: output_tokens,
        });

        Ok(TurnUsage {
            input_tokens,
            output_tokens,
        })
    }

    /// Best-effort hydration of transcripts from persisted storage. Missing
    /// keys are normal; other failures are logged and skipped.
    pub async fn hydrate_from_store(&self, store: &dyn SessionStore) {
        let Some(email) = self.signed_in_user().await.map(|u| u.email) else {
            return;
        };
        for agent in AgentId::ALL {
            match store.load_transcript(&email, agent).await {
                Ok(messages) if !messages.is_empty() => {
                    let mut state = self.state.lock().await;
                    state.conversations.replace(agent, messages);
                }
                Ok(_) => {}
                Err(session_manager::SessionError::NotFound) => {}
                Err(err) => {
                    tracing::warn!(agent = agent.role_key(), error = %err, "transcript load failed");
                }
            }
        }
    }

    /// Best-effort persistence of transcripts. Failures are logged, never
    /// fatal.
    pub async fn persist_to_store(&self, store: &dyn SessionStore) {
        let Some(email) = self.signed_in_user().await.map(|u| u.email) else {
            return;
        };
        for agent in AgentId::ALL {
            let messages = self.transcript(agent).await;
            if messages.is_empty() {
                continue;
            }
            if let Err(err) = store.save_transcript(&email, agent, &messages).await {
                tracing::warn!(agent = agent.role_key(), error = %err, "transcript save failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use futures::stream;
    use tokio_stream::wrappers::ReceiverStream;

    use chat_core::Role;
    use gemini_client::{GeminiError, TextChunkStream};
    use upload_manager::{IncomingFile, UploadTimings};

    use super::*;

    const AGENT: AgentId = AgentId::DisciplineHead;

    fn user(name: &str) -> AuthUser {
        AuthUser {
            id: name.to_string(),
            email: format!("{name}@example.com"),
            display_name: name.to_string(),
            avatar_url: None,
            access_token: "token".to_string(),
        }
    }

    fn api_error(message: &str) -> GeminiError {
        GeminiError::Api {
            status: 500,
            message: message.to_string(),
        }
    }

    /// Plays back a scripted sequence of count results and chunk streams.
    struct ScriptedClient {
        counts: StdMutex<VecDeque<Result<u32, GeminiError>>>,
        streams: StdMutex<VecDeque<Vec<Result<String, GeminiError>>>>,
        last_request: StdMutex<Option<GenerateContentRequest>>,
        stream_requested: AtomicBool,
    }

    impl ScriptedClient {
        fn new(
            counts: Vec<Result<u32, GeminiError>>,
            streams: Vec<Vec<Result<String, GeminiError>>>,
        ) -> Arc<Self> {
            Arc::new(Self {
                counts: StdMutex::new(counts.into()),
                streams: StdMutex::new(streams.into()),
                last_request: StdMutex::new(None),
                stream_requested: AtomicBool::new(false),
            })
        }
    }

    #[async_trait]
    impl GenerativeClient for ScriptedClient {
        async fn count_tokens(&self, _contents: &[Content]) -> gemini_client::Result<u32> {
            self.counts
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(1))
        }

        async fn stream_generate(
            &self,
            request: GenerateContentRequest,
        ) -> gemini_client::Result<TextChunkStream> {
            self.stream_requested.store(true, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request);
            let chunks = self
                .streams
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_default();
            Ok(Box::pin(stream::iter(chunks)))
        }
    }

    /// Streams whatever the test feeds through a channel; used to hold a
    /// turn open while assertions run.
    struct ChannelClient {
        rx: StdMutex<Option<tokio::sync::mpsc::Receiver<Result<String, GeminiError>>>>,
    }

    #[async_trait]
    impl GenerativeClient for ChannelClient {
        async fn count_tokens(&self, _contents: &[Content]) -> gemini_client::Result<u32> {
            Ok(7)
        }

        async fn stream_generate(
            &self,
            _request: GenerateContentRequest,
        ) -> gemini_client::Result<TextChunkStream> {
            let rx = self.rx.lock().unwrap().take().expect("single stream");
            Ok(Box::pin(ReceiverStream::new(rx)))
        }
    }

    fn engine_with(
        client: Arc<dyn GenerativeClient>,
    ) -> (Arc<ChatEngine>, mpsc::Receiver<ChatEvent>) {
        let (tx, rx) = mpsc::channel(64);
        let uploads = UploadPipeline::new(UploadTimings {
            progress_tick: std::time::Duration::from_millis(1),
            progress_step: 50,
            settle: std::time::Duration::from_millis(1),
        });
        let engine = Arc::new(ChatEngine::new(ChatConfig::default(), client, uploads, tx));
        (engine, rx)
    }

    async fn signed_in_engine(
        client: Arc<dyn GenerativeClient>,
    ) -> (Arc<ChatEngine>, mpsc::Receiver<ChatEvent>) {
        let (engine, rx) = engine_with(client);
        engine.handle_auth_change(Some(user("dana"))).await;
        (engine, rx)
    }

    #[tokio::test]
    async fn sign_in_seeds_one_welcome_per_agent_exactly_once() {
        let client = ScriptedClient::new(vec![], vec![]);
        let (engine, _rx) = signed_in_engine(client).await;

        for agent in AgentId::ALL {
            let transcript = engine.transcript(agent).await;
            assert_eq!(transcript.len(), 1);
            assert_eq!(transcript[0].role, Role::Assistant);
            assert_eq!(transcript[0].content, agent.welcome_message("dana"));
        }

        // A repeated some-user notification must not reseed.
        engine.handle_auth_change(Some(user("dana"))).await;
        assert_eq!(engine.transcript(AGENT).await.len(), 1);
    }

    #[tokio::test]
    async fn sign_out_clears_conversations_and_uploads() {
        let client = ScriptedClient::new(vec![], vec![]);
        let (engine, _rx) = signed_in_engine(client).await;
        engine
            .uploads()
            .add_files(vec![IncomingFile {
                name: "a.txt".into(),
                mime_type: "text/plain".into(),
                bytes: vec![1, 2],
            }])
            .await
            .unwrap();

        engine.handle_auth_change(None).await;

        for agent in AgentId::ALL {
            assert!(engine.transcript(agent).await.is_empty());
        }
        assert!(engine.uploads().is_empty().await);
    }

    #[tokio::test]
    async fn chunks_apply_in_order_and_complete_reports_usage() {
        let client = ScriptedClient::new(
            vec![Ok(11), Ok(5)],
            vec![vec![
                Ok("Hel".to_string()),
                Ok("lo".to_string()),
                Ok(", world".to_string()),
            ]],
        );
        let (engine, mut rx) = signed_in_engine(client).await;

        let outcome = engine
            .submit(AGENT, "greet me", RagSources::default(), CancellationToken::new())
            .await;

        let usage = match outcome {
            SubmitOutcome::Completed(usage) => usage,
            other => panic!("expected completion, got {other:?}"),
        };
        assert_eq!(usage.input_tokens, 11);
        assert_eq!(usage.output_tokens, 5);

        let transcript = engine.transcript(AGENT).await;
        // welcome + user + assistant
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[1].role, Role::User);
        assert_eq!(transcript[1].content, "greet me");
        assert_eq!(transcript[2].role, Role::Assistant);
        assert_eq!(transcript[2].content, "Hello, world");

        // Event order: Submitted, three Tokens in arrival order, Complete.
        assert!(matches!(rx.recv().await, Some(ChatEvent::Submitted { agent }) if agent == AGENT));
        for expected in ["Hel", "lo", ", world"] {
            match rx.recv().await {
                Some(ChatEvent::Token { content }) => assert_eq!(content, expected),
                other => panic!("expected token, got {other:?}"),
            }
        }
        assert!(matches!(rx.recv().await, Some(ChatEvent::Complete { .. })));

        assert_eq!(engine.tokens_used().await, 16);
        assert!(engine.in_flight_agent().is_none());
        assert_eq!(engine.turn_state().await, TurnState::Idle);
    }

    #[tokio::test]
    async fn empty_chunks_are_skipped_without_terminating() {
        let client = ScriptedClient::new(
            vec![Ok(1), Ok(1)],
            vec![vec![
                Ok("Hel".to_string()),
                Ok(String::new()),
                Ok("lo".to_string()),
            ]],
        );
        let (engine, _rx) = signed_in_engine(client).await;

        engine
            .submit(AGENT, "hi", RagSources::default(), CancellationToken::new())
            .await;

        let transcript = engine.transcript(AGENT).await;
        assert_eq!(transcript.last().unwrap().content, "Hello");
    }

    #[tokio::test]
    async fn blank_input_is_a_no_op() {
        let client = ScriptedClient::new(vec![], vec![]);
        let (engine, _rx) = signed_in_engine(client).await;

        let outcome = engine
            .submit(AGENT, "   ", RagSources::default(), CancellationToken::new())
            .await;

        assert!(matches!(outcome, SubmitOutcome::EmptyInput));
        assert_eq!(engine.transcript(AGENT).await.len(), 1);
        assert!(engine.history_entries().await.is_empty());
    }

    #[tokio::test]
    async fn submitting_while_in_flight_is_a_no_op() {
        let (tx, stream_rx) = tokio::sync::mpsc::channel(8);
        let client = Arc::new(ChannelClient {
            rx: StdMutex::new(Some(stream_rx)),
        });
        let (engine, _rx) = signed_in_engine(client).await;

        let first = tokio::spawn({
            let engine = Arc::clone(&engine);
            async move {
                engine
                    .submit(AGENT, "first", RagSources::default(), CancellationToken::new())
                    .await
            }
        });

        // Wait for the first submission to claim the guard.
        while engine.in_flight_agent().is_none() {
            tokio::task::yield_now().await;
        }
        assert_eq!(engine.in_flight_agent(), Some(AGENT));

        let second = engine
            .submit(
                AgentId::SubseaEngineer,
                "second",
                RagSources::default(),
                CancellationToken::new(),
            )
            .await;
        assert!(matches!(second, SubmitOutcome::Busy));
        // The rejected submission must not have touched any transcript.
        assert_eq!(engine.transcript(AgentId::SubseaEngineer).await.len(), 1);

        tx.send(Ok("done".to_string())).await.unwrap();
        drop(tx);
        assert!(matches!(
            first.await.unwrap(),
            SubmitOutcome::Completed(_)
        ));
        // conversation length increased exactly once
        assert_eq!(engine.transcript(AGENT).await.len(), 3);
        assert!(engine.in_flight_agent().is_none());
    }

    #[tokio::test]
    async fn failure_before_any_chunk_appends_exactly_one_fallback() {
        let client = ScriptedClient::new(
            vec![Ok(3)],
            vec![vec![Err(api_error("stream exploded"))]],
        );
        let (engine, mut rx) = signed_in_engine(client).await;

        let outcome = engine
            .submit(AGENT, "hi", RagSources::default(), CancellationToken::new())
            .await;
        assert!(matches!(outcome, SubmitOutcome::Failed(_)));

        let transcript = engine.transcript(AGENT).await;
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[2].content, FALLBACK_ASSISTANT_REPLY);

        // guard released: a retry goes through
        assert!(engine.in_flight_agent().is_none());
        assert!(matches!(
            engine
                .submit(AGENT, "retry", RagSources::default(), CancellationToken::new())
                .await,
            SubmitOutcome::Completed(_)
        ));

        // drain: Submitted then Error for the failed turn
        assert!(matches!(rx.recv().await, Some(ChatEvent::Submitted { .. })));
        assert!(matches!(rx.recv().await, Some(ChatEvent::Error { .. })));
    }

    #[tokio::test]
    async fn failure_after_partial_chunks_preserves_partial_verbatim() {
        let client = ScriptedClient::new(
            vec![Ok(3)],
            vec![vec![
                Ok("partial ans".to_string()),
                Err(api_error("connection reset")),
            ]],
        );
        let (engine, _rx) = signed_in_engine(client).await;

        let outcome = engine
            .submit(AGENT, "hi", RagSources::default(), CancellationToken::new())
            .await;
        assert!(matches!(outcome, SubmitOutcome::Failed(_)));

        let transcript = engine.transcript(AGENT).await;
        // welcome + user + partial assistant, nothing more
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[2].content, "partial ans");
        assert!(matches!(
            engine.turn_state().await,
            TurnState::Failed { .. }
        ));
    }

    #[tokio::test]
    async fn input_count_failure_is_fatal_and_skips_generation() {
        let client = ScriptedClient::new(
            vec![Err(api_error("counter down"))],
            vec![vec![Ok("never".to_string())]],
        );
        let (engine, _rx) = signed_in_engine(Arc::clone(&client) as Arc<dyn GenerativeClient>).await;

        let outcome = engine
            .submit(AGENT, "hi", RagSources::default(), CancellationToken::new())
            .await;

        assert!(matches!(outcome, SubmitOutcome::Failed(_)));
        assert!(!client.stream_requested.load(Ordering::SeqCst));
        assert_eq!(engine.tokens_used().await, 0);
        let transcript = engine.transcript(AGENT).await;
        assert_eq!(transcript[2].content, FALLBACK_ASSISTANT_REPLY);
    }

    #[tokio::test]
    async fn token_ledger_grows_monotonically_across_turns() {
        let client = ScriptedClient::new(
            vec![Ok(10), Ok(4), Ok(20), Ok(6)],
            vec![
                vec![Ok("one".to_string())],
                vec![Ok("two".to_string())],
            ],
        );
        let (engine, _rx) = signed_in_engine(client).await;

        let mut last = 0;
        for input in ["first", "second"] {
            engine
                .submit(AGENT, input, RagSources::default(), CancellationToken::new())
                .await;
            let used = engine.tokens_used().await;
            assert!(used > last);
            last = used;
        }
        assert_eq!(last, 40);
    }

    #[tokio::test]
    async fn query_history_records_newest_first_with_agent_name() {
        let client = ScriptedClient::new(
            vec![Ok(1), Ok(1), Ok(1), Ok(1)],
            vec![
                vec![Ok("a".to_string())],
                vec![Ok("b".to_string())],
            ],
        );
        let (engine, _rx) = signed_in_engine(client).await;

        engine
            .submit(AGENT, "first", RagSources::default(), CancellationToken::new())
            .await;
        engine
            .submit(
                AgentId::SubseaEngineer,
                "second",
                RagSources::default(),
                CancellationToken::new(),
            )
            .await;

        let entries = engine.history_entries().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].query, "second");
        assert_eq!(entries[0].agent_name, "Subsea Engineer");
        assert_eq!(entries[1].query, "first");
    }

    #[tokio::test]
    async fn request_carries_system_instruction_mapped_roles_and_preamble() {
        let client = ScriptedClient::new(
            vec![Ok(1), Ok(1)],
            vec![vec![Ok("ok".to_string())]],
        );
        let (engine, _rx) = signed_in_engine(Arc::clone(&client) as Arc<dyn GenerativeClient>).await;

        let rag = RagSources {
            sensors: true,
            ..Default::default()
        };
        engine
            .submit(AGENT, "pump 4 vibration", rag, CancellationToken::new())
            .await;

        let request = client.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(
            request.system_instruction.as_ref().unwrap().text(),
            AGENT.profile().system_instruction
        );
        // prior turn: the welcome message, role-mapped to "model"
        assert_eq!(request.contents[0].role, "model");
        // new turn: preamble + literal input in the trailing text part
        let last = request.contents.last().unwrap();
        assert_eq!(last.role, "user");
        let text = last.parts.last().unwrap().as_text().unwrap();
        assert!(text.contains("Live Sensor Data"));
        assert!(text.ends_with("pump 4 vibration"));
    }

    #[tokio::test]
    async fn cancellation_stops_at_chunk_boundary_and_keeps_partial() {
        let (tx, stream_rx) = tokio::sync::mpsc::channel(8);
        let client = Arc::new(ChannelClient {
            rx: StdMutex::new(Some(stream_rx)),
        });
        let (engine, _rx) = signed_in_engine(client).await;
        let cancel = CancellationToken::new();

        let turn = tokio::spawn({
            let engine = Arc::clone(&engine);
            let cancel = cancel.clone();
            async move {
                engine
                    .submit(AGENT, "long answer", RagSources::default(), cancel)
                    .await
            }
        });

        tx.send(Ok("partial".to_string())).await.unwrap();
        // Wait for the chunk to land in the transcript before cancelling.
        loop {
            let transcript = engine.transcript(AGENT).await;
            if transcript.last().map(|m| m.is_assistant()).unwrap_or(false) {
                break;
            }
            tokio::task::yield_now().await;
        }
        cancel.cancel();
        tx.send(Ok(" never applied".to_string())).await.unwrap();
        drop(tx);

        let outcome = turn.await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Failed(message) if message.contains("cancelled")));

        let transcript = engine.transcript(AGENT).await;
        assert_eq!(transcript.last().unwrap().content, "partial");
        assert!(engine.in_flight_agent().is_none());
    }

    #[tokio::test]
    async fn mid_stream_turn_targets_agent_captured_at_submit() {
        let (tx, stream_rx) = tokio::sync::mpsc::channel(8);
        let client = Arc::new(ChannelClient {
            rx: StdMutex::new(Some(stream_rx)),
        });
        let (engine, _rx) = signed_in_engine(client).await;

        let turn = tokio::spawn({
            let engine = Arc::clone(&engine);
            async move {
                engine
                    .submit(AGENT, "question", RagSources::default(), CancellationToken::new())
                    .await
            }
        });
        while engine.in_flight_agent().is_none() {
            tokio::task::yield_now().await;
        }

        // "Switching the selected agent" is a UI concern; the stream keeps
        // mutating the transcript of the agent captured at submit time.
        tx.send(Ok("answer".to_string())).await.unwrap();
        drop(tx);
        turn.await.unwrap();

        assert_eq!(engine.transcript(AGENT).await.last().unwrap().content, "answer");
        assert_eq!(engine.transcript(AgentId::MethodsSpecialist).await.len(), 1);
    }
}
