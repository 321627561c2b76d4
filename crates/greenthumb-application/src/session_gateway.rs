//! Session gateway.
//!
//! Owns the single outstanding chat session on the remote service and
//! mediates every send. Analysis calls pass straight through; they never
//! touch the session.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use greenthumb_core::Result;
use greenthumb_core::generation::{ChatSession, GenerationService, RemoteTurn};
use greenthumb_core::image::ImagePayload;

/// Holder of at most one live [`ChatSession`].
pub struct SessionGateway {
    service: Arc<dyn GenerationService>,
    session: Mutex<Option<Box<dyn ChatSession>>>,
}

impl SessionGateway {
    pub fn new(service: Arc<dyn GenerationService>) -> Self {
        Self {
            service,
            session: Mutex::new(None),
        }
    }

    /// Opens a new session seeded with `history`, replacing any current one.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: A session is now held
    /// - `Err(GreenThumbError::Configuration)`: Credentials are missing; the
    ///   previous session (if any) is kept
    pub async fn open(&self, history: Vec<RemoteTurn>) -> Result<()> {
        let opened = self.service.open_chat(history).await?;
        *self.session.lock().await = Some(opened);
        Ok(())
    }

    /// Sends one utterance on the current session, opening an empty one first
    /// when none exists. Never retries.
    pub async fn send(&self, text: &str) -> Result<String> {
        let mut guard = self.session.lock().await;
        let mut session = match guard.take() {
            Some(session) => session,
            None => {
                debug!("No chat session held, opening one with empty history");
                self.service.open_chat(Vec::new()).await?
            }
        };

        let result = session.send_message(text).await;
        *guard = Some(session);
        result
    }

    /// One-shot image analysis, independent of the chat session.
    pub async fn analyze(&self, image: &ImagePayload, prompt: &str) -> Result<String> {
        self.service.analyze_image(image, prompt).await
    }

    /// Drops the current session and opens a fresh empty one.
    ///
    /// When opening fails the gateway stays without a session and the next
    /// [`SessionGateway::send`] tries again.
    pub async fn reset(&self) {
        let mut guard = self.session.lock().await;
        *guard = None;

        match self.service.open_chat(Vec::new()).await {
            Ok(session) => {
                info!("Chat session reset");
                *guard = Some(session);
            }
            Err(e) => warn!("Could not reopen chat session after reset: {}", e),
        }
    }

    pub async fn has_session(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// Length of the history the current session replays, if one is held.
    pub async fn session_history_len(&self) -> Option<usize> {
        self.session
            .lock()
            .await
            .as_ref()
            .map(|session| session.history().len())
    }
}
