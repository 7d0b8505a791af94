//! Exchange controller: orchestrates one full panel turn.
//!
//! A turn moves through `Idle -> Submitting -> AwaitingReply ->
//! Finalizing -> Idle`. The only suspension point is the response
//! provider call; everything else is synchronous, so the processing
//! flag is the sole concurrency guard needed.

use std::sync::Arc;

use tracing::warn;

use crate::conversation::Conversation;
use crate::message::Message;
use crate::provider::{ProviderError, ResponseProvider};
use crate::storage::MessageStore;

/// Reply substituted when reply resolution fails unexpectedly.
///
/// The turn still completes and persists; no failure leaves the panel
/// without an AI reply.
pub const ERROR_REPLY: &str = "Xin lỗi, đã có lỗi xảy ra. Vui lòng thử lại.";

/// Stage of the current turn (single source of truth for busy state).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TurnStage {
    /// No turn in flight; submissions are accepted.
    #[default]
    Idle,
    /// User message being appended, input cleared.
    Submitting,
    /// Waiting on the response provider.
    AwaitingReply,
    /// Appending the reply and persisting.
    Finalizing,
}

/// Result of a submit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Guard rejected the submission (empty input or turn in flight).
    Ignored,
    /// The turn ran to completion and was persisted.
    Completed,
}

/// Owns the conversation for a panel session and runs its turns.
pub struct ExchangeController {
    conversation: Conversation,
    provider: Arc<dyn ResponseProvider>,
    store: Arc<dyn MessageStore>,
    processing: bool,
    stage: TurnStage,
}

impl ExchangeController {
    /// Create a controller with the given reply strategy and store.
    pub fn new(provider: Arc<dyn ResponseProvider>, store: Arc<dyn MessageStore>) -> Self {
        Self {
            conversation: Conversation::new(),
            provider,
            store,
            processing: false,
            stage: TurnStage::Idle,
        }
    }

    /// Populate the conversation from storage at panel start.
    ///
    /// A storage failure is logged and leaves the conversation empty;
    /// the panel still comes up.
    pub async fn load_history(&mut self) {
        match self.store.load().await {
            Ok(raw) => self.conversation.load(raw),
            Err(e) => warn!(error = %e, "failed to load conversation history"),
        }
    }

    /// Run one full turn: guard, append, resolve, append reply, persist.
    ///
    /// Used by headless callers; the TUI splits the same turn into
    /// [`begin_turn`](Self::begin_turn) and
    /// [`finish_turn`](Self::finish_turn) so it can keep drawing while
    /// the reply resolves.
    pub async fn submit(&mut self, input: &str) -> SubmitOutcome {
        let Some(trimmed) = self.begin_turn(input) else {
            return SubmitOutcome::Ignored;
        };
        let result = self.provider.reply(&trimmed).await;
        self.finish_turn(result).await;
        SubmitOutcome::Completed
    }

    /// Start a turn: append the user message and mark the panel busy.
    ///
    /// Returns the trimmed input to resolve a reply for, or `None` when
    /// the submission is a silent no-op (blank input, or a turn already
    /// in flight).
    pub fn begin_turn(&mut self, input: &str) -> Option<String> {
        let trimmed = input.trim();
        if trimmed.is_empty() || self.processing {
            return None;
        }

        self.stage = TurnStage::Submitting;
        self.processing = true;
        self.conversation.append(Message::user(trimmed));
        self.stage = TurnStage::AwaitingReply;
        Some(trimmed.to_string())
    }

    /// Finish the in-flight turn with the provider's result.
    ///
    /// A provider error is replaced by the fixed error reply. The
    /// persist and the flag clear run unconditionally, so the panel
    /// always returns to idle.
    pub async fn finish_turn(&mut self, result: Result<String, ProviderError>) {
        if !self.processing {
            // Nothing in flight; stale completion.
            return;
        }
        self.stage = TurnStage::Finalizing;

        let reply = match result {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "reply resolution failed, substituting error reply");
                ERROR_REPLY.to_string()
            }
        };
        self.conversation.append(Message::ai(reply));

        if let Err(e) = self.store.save(self.conversation.to_persisted()).await {
            // Logged only; the in-memory conversation stands.
            warn!(error = %e, "failed to persist conversation");
        }

        self.processing = false;
        self.stage = TurnStage::Idle;
    }

    /// The conversation owned by this controller.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Whether a turn is currently in flight.
    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// Stage of the current turn.
    pub fn stage(&self) -> TurnStage {
        self.stage
    }

    /// The reply strategy, for callers that resolve replies off-loop.
    pub fn provider(&self) -> Arc<dyn ResponseProvider> {
        Arc::clone(&self.provider)
    }
}
