//! Plant identification use case.
//!
//! Normalizes an uploaded photo off the async runtime, then asks the model
//! to identify the plant. Failures become one of three fixed user messages.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{error, info, warn};

use greenthumb_core::image::ImagePayload;
use greenthumb_core::prompts::{
    ANALYSIS_FAILURE_MESSAGE, IMAGE_PROCESSING_FAILURE_MESSAGE, IMAGE_TOO_LARGE_MESSAGE,
    PLANT_IDENTIFICATION_PROMPT,
};
use greenthumb_core::{GreenThumbError, Result};
use greenthumb_infrastructure::ImageNormalizer;

use crate::pending::PendingGuard;
use crate::session_gateway::SessionGateway;

/// Result of an analysis request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    /// Markdown produced by the model.
    Identified(String),
    /// User-facing failure message.
    Failed(&'static str),
    /// Another analysis was still in flight.
    Suppressed,
}

pub struct PlantAnalyzerService {
    gateway: Arc<SessionGateway>,
    normalizer: ImageNormalizer,
    pending: AtomicBool,
}

impl PlantAnalyzerService {
    pub fn new(gateway: Arc<SessionGateway>, normalizer: ImageNormalizer) -> Self {
        Self {
            gateway,
            normalizer,
            pending: AtomicBool::new(false),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    /// Normalizes a photo on disk.
    pub async fn prepare_file(&self, path: PathBuf) -> Result<ImagePayload> {
        let normalizer = self.normalizer.clone();
        tokio::task::spawn_blocking(move || normalizer.normalize_file(&path))
            .await
            .map_err(|e| GreenThumbError::decode(format!("Image task failed: {}", e)))?
    }

    /// Normalizes raw uploaded bytes.
    pub async fn prepare_bytes(&self, raw: Vec<u8>) -> Result<ImagePayload> {
        let normalizer = self.normalizer.clone();
        tokio::task::spawn_blocking(move || normalizer.normalize(&raw))
            .await
            .map_err(|e| GreenThumbError::decode(format!("Image task failed: {}", e)))?
    }

    /// Identifies the plant in an already normalized image.
    pub async fn analyze(&self, image: &ImagePayload) -> AnalysisOutcome {
        let Some(_pending) = PendingGuard::acquire(&self.pending) else {
            return AnalysisOutcome::Suppressed;
        };
        self.identify(image).await
    }

    /// Normalizes a photo on disk and identifies the plant in it.
    pub async fn analyze_file(&self, path: PathBuf) -> AnalysisOutcome {
        let Some(_pending) = PendingGuard::acquire(&self.pending) else {
            return AnalysisOutcome::Suppressed;
        };

        match self.prepare_file(path).await {
            Ok(image) => self.identify(&image).await,
            Err(e) => {
                warn!("Image rejected: {}", e);
                AnalysisOutcome::Failed(preparation_failure_message(&e))
            }
        }
    }

    async fn identify(&self, image: &ImagePayload) -> AnalysisOutcome {
        info!(width = image.width, height = image.height, "Analyzing plant photo");
        match self.gateway.analyze(image, PLANT_IDENTIFICATION_PROMPT).await {
            Ok(markdown) => AnalysisOutcome::Identified(markdown),
            Err(e) => {
                error!("Plant analysis failed: {}", e);
                AnalysisOutcome::Failed(ANALYSIS_FAILURE_MESSAGE)
            }
        }
    }
}

/// Message shown when a photo cannot be prepared for analysis.
pub fn preparation_failure_message(error: &GreenThumbError) -> &'static str {
    if error.is_too_large() {
        IMAGE_TOO_LARGE_MESSAGE
    } else {
        IMAGE_PROCESSING_FAILURE_MESSAGE
    }
}
