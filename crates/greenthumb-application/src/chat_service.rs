//! Chat use case.
//!
//! Owns the in-memory conversation, persists it after every change and
//! turns remote failures into error turns. Only one send may be in flight;
//! overlapping submissions are suppressed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;
use tracing::{error, info, warn};

use greenthumb_core::conversation::{Conversation, Turn};
use greenthumb_core::prompts::CHAT_FAILURE_MESSAGE;

use crate::conversation_store::ConversationStore;
use crate::pending::PendingGuard;
use crate::session_gateway::SessionGateway;

/// Result of [`ChatService::send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The model replied; holds the appended model turn.
    Replied(Turn),
    /// The send failed; holds the appended error turn.
    Failed(Turn),
    /// Another send was still in flight. Nothing was appended.
    Suppressed,
    /// The input was blank. Nothing was appended.
    Empty,
}

pub struct ChatService {
    store: ConversationStore,
    gateway: Arc<SessionGateway>,
    conversation: Mutex<Conversation>,
    pending: AtomicBool,
}

impl ChatService {
    /// Restores the persisted conversation and opens a session seeded with it.
    ///
    /// A failed open (typically a missing API key) is only logged here; the
    /// error shows up as an error turn at the first send.
    pub async fn start(store: ConversationStore, gateway: Arc<SessionGateway>) -> Self {
        let conversation = store.load().await;

        let history = ConversationStore::to_remote_history(&conversation);
        if let Err(e) = gateway.open(history).await {
            warn!("Chat session not opened at startup: {}", e);
        }

        Self {
            store,
            gateway,
            conversation: Mutex::new(conversation),
            pending: AtomicBool::new(false),
        }
    }

    /// Snapshot of the current conversation.
    pub async fn conversation(&self) -> Conversation {
        self.conversation.lock().await.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    /// Sends one user message.
    ///
    /// The user turn is appended and saved before the remote call; the model
    /// reply (or an error turn) is appended and saved after it. The pending
    /// flag is cleared on every path.
    pub async fn send(&self, text: &str) -> SendOutcome {
        if text.trim().is_empty() {
            return SendOutcome::Empty;
        }

        let Some(_pending) = PendingGuard::acquire(&self.pending) else {
            return SendOutcome::Suppressed;
        };

        self.append(Turn::user(text)).await;

        match self.gateway.send(text).await {
            Ok(reply) => SendOutcome::Replied(self.append(Turn::model(reply)).await),
            Err(e) => {
                error!("Chat send failed: {}", e);
                SendOutcome::Failed(self.append(Turn::error(CHAT_FAILURE_MESSAGE)).await)
            }
        }
    }

    /// Replaces the conversation with the greeting, clears storage and
    /// restarts the remote session.
    pub async fn reset(&self) -> Conversation {
        let snapshot = {
            let mut conversation = self.conversation.lock().await;
            if let Err(e) = self.store.reset(&mut conversation).await {
                warn!("Failed to clear stored chat history: {}", e);
            }
            conversation.clone()
        };

        self.gateway.reset().await;
        info!("Conversation reset");
        snapshot
    }

    async fn append(&self, turn: Turn) -> Turn {
        let mut conversation = self.conversation.lock().await;
        let appended = conversation.push(turn).clone();
        if let Err(e) = self.store.save(&conversation).await {
            warn!("Failed to save chat history: {}", e);
        }
        appended
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{InMemoryConversationRepository, MockGenerationService};
    use greenthumb_core::GreenThumbError;
    use greenthumb_core::conversation::{Role, WELCOME_TURN_ID};
    use greenthumb_core::generation::RemoteTurn;
    use std::time::Duration;
    use tokio::sync::Notify;

    async fn service_with(
        generation: Arc<MockGenerationService>,
        repository: Arc<InMemoryConversationRepository>,
    ) -> ChatService {
        let store = ConversationStore::new(repository);
        let gateway = Arc::new(SessionGateway::new(generation));
        ChatService::start(store, gateway).await
    }

    #[tokio::test]
    async fn test_n_sends_yield_one_plus_two_n_turns() {
        let generation = Arc::new(MockGenerationService::with_replies(vec![
            Ok("Full sun.".into()),
            Ok("Every other day.".into()),
            Ok("Use compost.".into()),
        ]));
        let repository = Arc::new(InMemoryConversationRepository::default());
        let service = service_with(generation, repository.clone()).await;

        for question in ["Light?", "Water?", "Soil?"] {
            let outcome = service.send(question).await;
            assert!(matches!(outcome, SendOutcome::Replied(_)));
        }

        let conversation = service.conversation().await;
        assert_eq!(conversation.len(), 7);
        assert_eq!(conversation.turns()[0].id, WELCOME_TURN_ID);
        let texts: Vec<&str> = conversation.turns()[1..]
            .iter()
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(
            texts,
            vec!["Light?", "Full sun.", "Water?", "Every other day.", "Soil?", "Use compost."]
        );
        assert_eq!(repository.stored().unwrap(), conversation);
        assert_eq!(repository.save_count(), 6);
        assert!(!service.is_pending());
    }

    #[tokio::test]
    async fn test_failure_appends_one_error_turn_and_clears_pending() {
        let generation = Arc::new(MockGenerationService::with_replies(vec![Err(
            GreenThumbError::remote_with_status(500, "internal"),
        )]));
        let repository = Arc::new(InMemoryConversationRepository::default());
        let service = service_with(generation, repository.clone()).await;

        let outcome = service.send("Why are my leaves yellow?").await;
        let SendOutcome::Failed(turn) = outcome.clone() else {
            panic!("expected failure, got {:?}", outcome);
        };
        assert!(turn.is_error);
        assert_eq!(turn.role, Role::Model);
        assert_eq!(turn.text, CHAT_FAILURE_MESSAGE);

        let conversation = service.conversation().await;
        assert_eq!(conversation.len(), 3);
        assert_eq!(conversation.turns().iter().filter(|t| t.is_error).count(), 1);
        assert!(!service.is_pending());
        assert_eq!(
            conversation.to_remote_history(),
            vec![RemoteTurn::user("Why are my leaves yellow?")]
        );
    }

    #[tokio::test]
    async fn test_missing_credentials_surface_as_error_turn() {
        let generation = Arc::new(MockGenerationService::without_credentials());
        let repository = Arc::new(InMemoryConversationRepository::default());
        let service = service_with(generation, repository).await;

        let outcome = service.send("Hello").await;
        assert!(matches!(outcome, SendOutcome::Failed(_)));
        assert_eq!(service.conversation().await.len(), 3);
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let generation = Arc::new(MockGenerationService::with_replies(Vec::new()));
        let repository = Arc::new(InMemoryConversationRepository::default());
        let service = service_with(generation.clone(), repository).await;

        assert_eq!(service.send("   \n").await, SendOutcome::Empty);
        assert_eq!(service.conversation().await.len(), 1);
        assert_eq!(generation.send_count(), 0);
    }

    #[tokio::test]
    async fn test_user_text_is_stored_as_typed() {
        let generation = Arc::new(MockGenerationService::with_replies(vec![Ok("Yes.".into())]));
        let repository = Arc::new(InMemoryConversationRepository::default());
        let service = service_with(generation, repository.clone()).await;

        service.send("  Can I grow mint indoors?  ").await;

        let stored = repository.stored().unwrap();
        assert_eq!(stored.turns()[1].text, "  Can I grow mint indoors?  ");
    }

    #[tokio::test]
    async fn test_second_send_while_pending_is_suppressed() {
        let gate = Arc::new(Notify::new());
        let generation = Arc::new(MockGenerationService::gated(
            vec![Ok("Prune after flowering.".into())],
            gate.clone(),
        ));
        let repository = Arc::new(InMemoryConversationRepository::default());
        let service = Arc::new(service_with(generation.clone(), repository).await);

        let first = {
            let service = service.clone();
            tokio::spawn(async move { service.send("When to prune lilacs?").await })
        };

        while generation.send_count() == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(service.is_pending());
        assert_eq!(service.send("Hello?").await, SendOutcome::Suppressed);

        gate.notify_one();
        let outcome = first.await.unwrap();
        assert!(matches!(outcome, SendOutcome::Replied(_)));
        assert!(!service.is_pending());
        assert_eq!(service.conversation().await.len(), 3);
        assert_eq!(generation.send_count(), 1);
    }

    #[tokio::test]
    async fn test_start_restores_history_into_session() {
        let mut stored = Conversation::default();
        stored.push(Turn::user("Do succulents need fertilizer?"));
        stored.push(Turn::model("Rarely."));
        stored.push(Turn::error("Sorry"));
        let repository = Arc::new(InMemoryConversationRepository::with_conversation(stored));
        let generation = Arc::new(MockGenerationService::with_replies(Vec::new()));

        let service = service_with(generation.clone(), repository).await;
        assert_eq!(service.conversation().await.len(), 4);
        assert_eq!(
            generation.opened_histories()[0],
            vec![
                RemoteTurn::user("Do succulents need fertilizer?"),
                RemoteTurn::model("Rarely.")
            ]
        );
    }

    #[tokio::test]
    async fn test_corrupt_storage_starts_fresh() {
        let repository = Arc::new(InMemoryConversationRepository::corrupt());
        let generation = Arc::new(MockGenerationService::with_replies(Vec::new()));
        let service = service_with(generation, repository).await;
        assert!(service.conversation().await.is_pristine());
    }

    #[tokio::test]
    async fn test_reset_restores_greeting_and_clears_storage() {
        let generation = Arc::new(MockGenerationService::with_replies(vec![Ok("Yes.".into())]));
        let repository = Arc::new(InMemoryConversationRepository::default());
        let service = service_with(generation.clone(), repository.clone()).await;

        service.send("Can I compost eggshells?").await;
        assert!(repository.stored().is_some());

        let conversation = service.reset().await;
        assert!(conversation.is_pristine());
        assert!(repository.stored().is_none());
        assert_eq!(generation.open_count(), 2);
        assert!(generation.opened_histories()[1].is_empty());
    }
}
