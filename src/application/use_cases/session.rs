use tracing::{info, warn};

use crate::application::RequestModerationUseCase;
use crate::domain::{
    DomainError, Message, ModerationDecision, Sender, SessionConfig, Transcript,
};

/// Result of starting a submission.
#[derive(Debug)]
pub enum BeginOutcome {
    /// Empty or whitespace-only text; nothing happened.
    Ignored,
    /// A moderation request is already in flight. Rejected, never queued.
    Busy,
    /// The user's message was appended and the session entered the
    /// `Submitting` state; the caller must run the request and [`settle`] it.
    ///
    /// [`settle`]: SessionController::settle
    Accepted(PendingModeration),
}

/// Inputs for the in-flight moderation request, captured when the submission
/// was accepted (which is when the config is read — there is no re-reading
/// mid-flight).
#[derive(Debug, Clone)]
pub struct PendingModeration {
    pub last_message_text: String,
    pub config: SessionConfig,
}

/// How a full submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input; no-op.
    Ignored,
    /// Rejected because a request was already pending.
    Busy,
    /// Request settled and the moderator stayed silent.
    Silent,
    /// Request settled and a moderator message was appended.
    Moderated,
    /// The moderation request failed; the error is surfaced on the session.
    Failed,
}

impl SubmitOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmitOutcome::Ignored => "ignored",
            SubmitOutcome::Busy => "busy",
            SubmitOutcome::Silent => "silent",
            SubmitOutcome::Moderated => "moderated",
            SubmitOutcome::Failed => "failed",
        }
    }
}

/// Owns all per-session state — transcript, config, pending flag, last
/// error — so the submission state machine is testable without any
/// rendering layer.
///
/// State machine per submission:
///
/// ```text
/// Idle -> Submitting (begin) -> Idle + maybe moderator message (settle Ok)
///                            -> Idle + surfaced error          (settle Err)
/// ```
///
/// At most one moderation request may be outstanding; while pending, further
/// submissions are rejected, not queued. The user's own message is appended
/// immediately on acceptance, never gated on the moderation result.
#[derive(Debug, Default)]
pub struct SessionController {
    transcript: Transcript,
    config: SessionConfig,
    pending: bool,
    error: Option<String>,
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn messages(&self) -> &[Message] {
        self.transcript.messages()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.config.api_key = api_key.into();
    }

    pub fn set_prompt_template(&mut self, template: impl Into<String>) {
        self.config.prompt_template = template.into();
    }

    /// Start a submission: validate, append the user's message, and enter the
    /// `Submitting` state.
    ///
    /// Returns the inputs for the moderation request; the caller runs it
    /// (releasing any lock on this controller while suspended) and then calls
    /// [`settle`](Self::settle) with the result.
    pub fn begin(&mut self, sender: Sender, text: &str) -> BeginOutcome {
        if text.trim().is_empty() {
            return BeginOutcome::Ignored;
        }
        if self.pending {
            warn!("submission rejected: a moderation request is already pending");
            return BeginOutcome::Busy;
        }

        self.transcript.append(sender, text);
        self.pending = true;
        info!("accepted message from {}", sender.as_str());

        BeginOutcome::Accepted(PendingModeration {
            last_message_text: text.to_string(),
            config: self.config.clone(),
        })
    }

    /// Finish a submission with the moderation result, returning to `Idle`.
    ///
    /// On success the moderator message is appended only when the decision
    /// asks for one, and any previous error is cleared. On failure nothing is
    /// appended, the user's message stays, and the error becomes visible.
    pub fn settle(&mut self, result: Result<ModerationDecision, DomainError>) -> SubmitOutcome {
        self.pending = false;
        match result {
            Ok(decision) if decision.wants_response() => {
                self.transcript
                    .append(Sender::Moderator, decision.response_text);
                self.error = None;
                SubmitOutcome::Moderated
            }
            Ok(_) => {
                self.error = None;
                SubmitOutcome::Silent
            }
            Err(e) => {
                warn!("moderation request failed: {e}");
                self.error = Some(e.to_string());
                SubmitOutcome::Failed
            }
        }
    }

    /// Convenience for single-owner callers (tests, CLI): run the whole
    /// exchange in one call.
    pub async fn submit(
        &mut self,
        sender: Sender,
        text: &str,
        requester: &RequestModerationUseCase,
    ) -> SubmitOutcome {
        let pending = match self.begin(sender, text) {
            BeginOutcome::Ignored => return SubmitOutcome::Ignored,
            BeginOutcome::Busy => return SubmitOutcome::Busy,
            BeginOutcome::Accepted(pending) => pending,
        };

        let result = requester
            .execute(&pending.last_message_text, &pending.config)
            .await;
        self.settle(result)
    }
}
