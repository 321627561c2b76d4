//! GeminiApiClient - Direct REST API implementation for Gemini.
//!
//! Calls the `generateContent` endpoint for both chat sessions and one-shot
//! image analysis. The API key is resolved through a [`SecretService`] at the
//! first remote action, never at construction.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use greenthumb_core::config::GeminiSettings;
use greenthumb_core::generation::{ChatSession, GenerationService, RemoteTurn};
use greenthumb_core::image::ImagePayload;
use greenthumb_core::prompts::{EMPTY_ANALYSIS_REPLY, EMPTY_CHAT_REPLY, GARDENING_SYSTEM_INSTRUCTION};
use greenthumb_core::secret::SecretService;
use greenthumb_core::{GreenThumbError, Result};

/// Generation service that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiApiClient {
    client: Client,
    settings: GeminiSettings,
    secrets: Arc<dyn SecretService>,
    system_instruction: String,
}

impl GeminiApiClient {
    /// Creates a client using `settings` for the endpoint and timeout.
    pub fn new(settings: GeminiSettings, secrets: Arc<dyn SecretService>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| {
                GreenThumbError::configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            settings,
            secrets,
            system_instruction: GARDENING_SYSTEM_INSTRUCTION.to_string(),
        })
    }

    async fn transport(&self) -> Result<GeminiTransport> {
        let gemini = self.secrets.load_secrets().await.gemini.ok_or_else(|| {
            GreenThumbError::configuration("API_KEY environment variable is not set")
        })?;

        Ok(GeminiTransport {
            client: self.client.clone(),
            base_url: self.settings.base_url.trim_end_matches('/').to_string(),
            model: self.settings.model.clone(),
            api_key: gemini.api_key,
        })
    }
}

#[async_trait]
impl GenerationService for GeminiApiClient {
    async fn open_chat(&self, history: Vec<RemoteTurn>) -> Result<Box<dyn ChatSession>> {
        let transport = self.transport().await?;
        info!(model = %transport.model, history_len = history.len(), "Opened Gemini chat session");

        Ok(Box::new(GeminiChatSession {
            transport,
            system_instruction: self.system_instruction.clone(),
            history,
        }))
    }

    async fn analyze_image(&self, image: &ImagePayload, prompt: &str) -> Result<String> {
        let transport = self.transport().await?;
        debug!(bytes = image.len(), mime_type = %image.mime_type, "Sending image analysis request");

        let request = build_analysis_request(image, prompt);
        let text = transport.generate(&request).await?;
        Ok(text.unwrap_or_else(|| EMPTY_ANALYSIS_REPLY.to_string()))
    }
}

/// An open chat context. Each request replays the accumulated history.
pub struct GeminiChatSession {
    transport: GeminiTransport,
    system_instruction: String,
    history: Vec<RemoteTurn>,
}

#[async_trait]
impl ChatSession for GeminiChatSession {
    async fn send_message(&mut self, text: &str) -> Result<String> {
        debug!(history_len = self.history.len(), "Sending chat message");

        let request = build_chat_request(&self.system_instruction, &self.history, text);
        let reply = self
            .transport
            .generate(&request)
            .await?
            .unwrap_or_else(|| EMPTY_CHAT_REPLY.to_string());

        self.history.push(RemoteTurn::user(text));
        self.history.push(RemoteTurn::model(reply.clone()));
        Ok(reply)
    }

    fn history(&self) -> &[RemoteTurn] {
        &self.history
    }
}

#[derive(Clone)]
struct GeminiTransport {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiTransport {
    /// Posts a request and returns the reply text, `None` when the reply has no text.
    async fn generate(&self, body: &GenerateContentRequest) -> Result<Option<String>> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            self.base_url,
            model = self.model,
            api_key = self.api_key
        );

        let response = self.client.post(url).json(body).send().await.map_err(|err| {
            // Strip the URL: it carries the key.
            let err = err.without_url();
            error!("Gemini API request failed: {}", err);
            GreenThumbError::remote(format!("Gemini API request failed: {err}"))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            let err = map_http_error(status, &body_text);
            error!("Gemini API returned an error: {}", err);
            return Err(err);
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|err| {
            GreenThumbError::remote(format!(
                "Failed to parse Gemini response: {}",
                err.without_url()
            ))
        })?;

        Ok(extract_text_response(parsed))
    }
}

fn build_chat_request(
    system_instruction: &str,
    history: &[RemoteTurn],
    text: &str,
) -> GenerateContentRequest {
    let mut contents: Vec<Content> = history
        .iter()
        .map(|turn| Content {
            role: turn.role.as_str().to_string(),
            parts: vec![Part::Text {
                text: turn.text.clone(),
            }],
        })
        .collect();
    contents.push(Content {
        role: "user".to_string(),
        parts: vec![Part::Text {
            text: text.to_string(),
        }],
    });

    GenerateContentRequest {
        contents,
        system_instruction: Some(Content {
            role: "system".to_string(),
            parts: vec![Part::Text {
                text: system_instruction.to_string(),
            }],
        }),
    }
}

fn build_analysis_request(image: &ImagePayload, prompt: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user".to_string(),
            parts: vec![
                Part::InlineData {
                    inline_data: InlineDataPayload {
                        mime_type: image.mime_type.clone(),
                        data: image.to_base64(),
                    },
                },
                Part::Text {
                    text: prompt.to_string(),
                },
            ],
        }],
        system_instruction: None,
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[allow(dead_code)]
    code: Option<i32>,
    message: Option<String>,
    status: Option<String>,
}

/// Joins the text parts of the first candidate, skipping thought summaries.
fn extract_text_response(response: GenerateContentResponse) -> Option<String> {
    let content = response
        .candidates?
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)?;

    let text: String = content
        .parts
        .into_iter()
        .filter(|part| !part.thought)
        .filter_map(|part| part.text)
        .collect();

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

fn map_http_error(status: StatusCode, body: &str) -> GreenThumbError {
    let message = serde_json::from_str::<ErrorWrapper>(body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.to_string());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.to_string());

    GreenThumbError::remote_with_status(status.as_u16(), message)
}
