use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use tower::limit::ConcurrencyLimit;
use tower::{Service, ServiceBuilder};

use crate::common::GeneratedImage;
use crate::error::GenerationError;
use crate::generation::request::GenerationRequest;

/// The external image API, behind a seam so tests can script responses.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage, GenerationError>;

    fn name(&self) -> &str;
}

#[derive(Clone)]
pub struct GenerationService {
    generator: Arc<dyn ImageGenerator>,
}

impl GenerationService {
    pub fn new(generator: Arc<dyn ImageGenerator>) -> Self {
        Self { generator }
    }
}

impl Service<GenerationRequest> for GenerationService {
    type Response = GeneratedImage;
    type Error = GenerationError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: GenerationRequest) -> Self::Future {
        let generator = self.generator.clone();
        Box::pin(async move {
            tracing::debug!("Generating '{}' with {}", request.label, generator.name());
            generator.generate(&request).await
        })
    }
}

/// Generation service whose clones share a single in-flight limit.
pub type LimitedGenerationService = ConcurrencyLimit<GenerationService>;

pub fn limited_service(
    generator: Arc<dyn ImageGenerator>,
    concurrency: usize,
) -> LimitedGenerationService {
    ServiceBuilder::new()
        .concurrency_limit(concurrency.max(1))
        .service(GenerationService::new(generator))
}


#[cfg(test)]
mod tests {
    use super::scripted::ScriptedGenerator;
    use super::*;
    use crate::catalog::TransformMode;
    use crate::common::portrait::fixtures::png_bytes;
    use crate::common::SourceImage;
    use std::time::Duration;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn request(label: &str) -> GenerationRequest {
        GenerationRequest {
            batch: Uuid::new_v4(),
            label: label.to_string(),
            description: "a test".to_string(),
            mode: TransformMode::Creative,
            source: Arc::new(SourceImage::from_bytes(png_bytes(4, 4, [0, 0, 0])).unwrap()),
        }
    }

    #[tokio::test]
    async fn test_generation_service_calls_generator() {
        let generator = Arc::new(ScriptedGenerator::new(Duration::from_millis(1), &["Bad"]));
        let mut service = GenerationService::new(generator.clone());

        let ok = service.ready().await.unwrap().call(request("Good")).await;
        assert!(ok.is_ok());
        let err = service.ready().await.unwrap().call(request("Bad")).await;
        assert!(matches!(err, Err(GenerationError::NoImage(_))));
        assert_eq!(generator.calls_for("Good"), 1);
    }

    #[tokio::test]
    async fn test_limited_clones_share_the_limit() {
        let generator = Arc::new(ScriptedGenerator::new(Duration::from_millis(30), &[]));
        let service = limited_service(generator.clone(), 2);

        let tasks: Vec<_> = (0..6)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move { service.oneshot(request(&format!("L{i}"))).await })
            })
            .collect();
        for task in tasks {
            assert!(task.await.unwrap().is_ok());
        }
        assert_eq!(generator.max_in_flight(), 2);
    }
}
