use std::sync::Arc;

use tracing::debug;

use crate::application::CompletionClient;
use crate::domain::{interpret, DomainError, ModerationDecision, SessionConfig};

/// Asks the model whether a moderator comment should be injected after the
/// last message.
///
/// Only the last message is ever sent — no conversation history. Moderation
/// decisions are stateless given the last message alone; that is a fixed
/// constraint of the behavior, not a tuning choice.
///
/// Failure surfacing is single-channel: this use case only returns errors to
/// the caller, and the [`crate::SessionController`] failure branch is the one
/// place that turns them into visible error state.
pub struct RequestModerationUseCase {
    client: Arc<dyn CompletionClient>,
}

impl RequestModerationUseCase {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Run one moderation exchange.
    ///
    /// Fails with [`DomainError::Configuration`] when the API key is empty at
    /// request time, and with [`DomainError::Upstream`] when the completion
    /// call itself fails. Interpretation of the completion never fails.
    pub async fn execute(
        &self,
        last_message_text: &str,
        config: &SessionConfig,
    ) -> Result<ModerationDecision, DomainError> {
        if !config.has_api_key() {
            return Err(DomainError::configuration("API key is missing"));
        }

        // Template, newline, literal message text. No escaping of either.
        let prompt = format!("{}\n{}", config.prompt_template, last_message_text);

        let raw = self
            .client
            .complete(&config.api_key, &prompt)
            .await
            .map_err(|e| {
                DomainError::upstream(format!("Failed to get response from LLM. Details: {e}"))
            })?;

        debug!("raw moderation completion: {raw}");
        Ok(interpret(&raw))
    }
}
