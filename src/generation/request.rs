use std::sync::Arc;
use uuid::Uuid;

use crate::catalog::TransformMode;
use crate::common::{GeneratedImage, SourceImage};
use crate::error::GenerationError;

/// One call to the image generator: a source photo and the transform to apply.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub batch: Uuid,
    pub label: String,
    pub description: String,
    pub mode: TransformMode,
    pub source: Arc<SourceImage>,
}

impl GenerationRequest {
    pub fn prompt(&self) -> String {
        self.mode.prompt(&self.description)
    }
}

/// Result of one request, delivered back to the UI.
#[derive(Debug)]
pub struct GenerationEvent {
    pub batch: Uuid,
    pub label: String,
    pub outcome: Result<GeneratedImage, GenerationError>,
}

impl GenerationEvent {
    pub fn new(request: &GenerationRequest, outcome: Result<GeneratedImage, GenerationError>) -> Self {
        Self {
            batch: request.batch,
            label: request.label.clone(),
            outcome,
        }
    }
}
