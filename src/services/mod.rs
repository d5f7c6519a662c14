//! Provider plumbing: wire types, prompt text and the Gemini HTTP client.

pub mod envelope;
pub mod gemini_client;
pub mod prompts;
pub mod request;

pub use envelope::{Candidate, Content, GenerateContentResponse, Part, UsageMetadata};
pub use gemini_client::{GeminiClient, DEFAULT_BASE_URL};
pub use request::{GenerateContentRequest, GenerationConfig};

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Sends one generation request and returns the provider's envelope.
///
/// Implementations must be safe to share between concurrent callers.
#[async_trait]
pub trait ContentGenerator: Send + Sync + std::fmt::Debug {
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
        timeout: Duration,
    ) -> Result<GenerateContentResponse>;
}
