pub mod gemini;
pub mod queue;
pub mod request;
pub mod service;

pub use gemini::GeminiClient;
pub use queue::{regenerate, EventSender, GenerationQueue};
pub use request::{GenerationEvent, GenerationRequest};
pub use service::{limited_service, GenerationService, ImageGenerator, LimitedGenerationService};
