//! Hand-written doubles for the core traits.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use greenthumb_core::conversation::{Conversation, ConversationRepository};
use greenthumb_core::generation::{ChatSession, GenerationService, RemoteTurn};
use greenthumb_core::image::ImagePayload;
use greenthumb_core::{GreenThumbError, Result};

type Replies = Arc<Mutex<VecDeque<Result<String>>>>;

/// Scripted generation service. Replies are consumed in order by both chat
/// sends and analysis calls; an exhausted script answers `"ok"`.
pub struct MockGenerationService {
    credentials: bool,
    replies: Replies,
    gate: Option<Arc<Notify>>,
    sends: Arc<AtomicUsize>,
    opened: Mutex<Vec<Vec<RemoteTurn>>>,
    analyzed: Mutex<Vec<(ImagePayload, String)>>,
}

impl MockGenerationService {
    pub fn with_replies(replies: Vec<Result<String>>) -> Self {
        Self {
            credentials: true,
            replies: Arc::new(Mutex::new(replies.into())),
            gate: None,
            sends: Arc::new(AtomicUsize::new(0)),
            opened: Mutex::new(Vec::new()),
            analyzed: Mutex::new(Vec::new()),
        }
    }

    pub fn without_credentials() -> Self {
        Self {
            credentials: false,
            ..Self::with_replies(Vec::new())
        }
    }

    /// Every remote call waits for a permit on `gate` before answering.
    pub fn gated(replies: Vec<Result<String>>, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::with_replies(replies)
        }
    }

    pub fn open_count(&self) -> usize {
        self.opened.lock().unwrap().len()
    }

    pub fn opened_histories(&self) -> Vec<Vec<RemoteTurn>> {
        self.opened.lock().unwrap().clone()
    }

    pub fn send_count(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }

    pub fn analyzed(&self) -> Vec<(ImagePayload, String)> {
        self.analyzed.lock().unwrap().clone()
    }

    fn check_credentials(&self) -> Result<()> {
        if self.credentials {
            Ok(())
        } else {
            Err(GreenThumbError::configuration(
                "API_KEY environment variable is not set",
            ))
        }
    }
}

fn next_reply(replies: &Replies) -> Result<String> {
    replies
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Ok("ok".to_string()))
}

#[async_trait]
impl GenerationService for MockGenerationService {
    async fn open_chat(&self, history: Vec<RemoteTurn>) -> Result<Box<dyn ChatSession>> {
        self.check_credentials()?;
        self.opened.lock().unwrap().push(history.clone());
        Ok(Box::new(MockChatSession {
            replies: self.replies.clone(),
            gate: self.gate.clone(),
            sends: self.sends.clone(),
            history,
        }))
    }

    async fn analyze_image(&self, image: &ImagePayload, prompt: &str) -> Result<String> {
        self.check_credentials()?;
        self.analyzed
            .lock()
            .unwrap()
            .push((image.clone(), prompt.to_string()));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        next_reply(&self.replies)
    }
}

pub struct MockChatSession {
    replies: Replies,
    gate: Option<Arc<Notify>>,
    sends: Arc<AtomicUsize>,
    history: Vec<RemoteTurn>,
}

#[async_trait]
impl ChatSession for MockChatSession {
    async fn send_message(&mut self, text: &str) -> Result<String> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let reply = next_reply(&self.replies)?;
        self.history.push(RemoteTurn::user(text));
        self.history.push(RemoteTurn::model(reply.clone()));
        Ok(reply)
    }

    fn history(&self) -> &[RemoteTurn] {
        &self.history
    }
}

/// Repository keeping the conversation in memory.
#[derive(Default)]
pub struct InMemoryConversationRepository {
    stored: Mutex<Option<Conversation>>,
    corrupt: bool,
    saves: AtomicUsize,
}

impl InMemoryConversationRepository {
    /// A repository whose stored data always fails to decode.
    pub fn corrupt() -> Self {
        Self {
            corrupt: true,
            ..Self::default()
        }
    }

    pub fn with_conversation(conversation: Conversation) -> Self {
        Self {
            stored: Mutex::new(Some(conversation)),
            ..Self::default()
        }
    }

    pub fn stored(&self) -> Option<Conversation> {
        self.stored.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn load(&self) -> Result<Option<Conversation>> {
        if self.corrupt {
            return Err(GreenThumbError::persistence("Duplicate turn id: a"));
        }
        Ok(self.stored.lock().unwrap().clone())
    }

    async fn save(&self, conversation: &Conversation) -> Result<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.stored.lock().unwrap() = Some(conversation.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.stored.lock().unwrap() = None;
        Ok(())
    }
}
