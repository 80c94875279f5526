use async_trait::async_trait;

use crate::domain::DomainError;

/// An interface for sending a single text prompt to an LLM and receiving the
/// raw text completion.
///
/// Implementors encapsulate transport, serialization, and vendor-specific API
/// details. Consumers (e.g. [`crate::RequestModerationUseCase`]) remain
/// decoupled from any particular provider or HTTP client library.
///
/// The credential is a per-call argument rather than construction state
/// because the operator may change it in the settings panel at any time and
/// every request must see the current value.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Submit `prompt` and return the completion text, or an upstream failure
    /// (network, auth, quota, malformed request).
    async fn complete(&self, api_key: &str, prompt: &str) -> Result<String, DomainError>;
}
