//! Completion service interface and provider implementations

pub mod openai_compat;

// Re-export for convenience
pub use openai_compat::ChatClient;

use async_trait::async_trait;

/// Black-box text generation.
///
/// Implementations return the model's text or a provider error. They
/// must not retry on their own; the router surfaces failures as-is.
#[async_trait]
pub trait CompletionService: Send + Sync
{   /// Run one completion
    async fn complete(
      &self
    , request: crate::request::CompletionRequest
    ) -> Result<String, crate::error::Error>;

    /// Short name for logs
    fn name(&self) -> &str;
}
