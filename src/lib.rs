pub mod application;
pub mod connector;
pub mod domain;

pub use application::{
    BeginOutcome, CompletionClient, PendingModeration, RequestModerationUseCase,
    SessionController, SubmitOutcome,
};

pub use connector::{router, serve, AppState, GeminiClient, MockCompletionClient, SubmissionStatus};

pub use domain::{
    interpret, DomainError, Message, ModerationDecision, Sender, SessionConfig, Transcript,
    DEFAULT_PROMPT_TEMPLATE, FORMAT_ERROR_INTERVENTION,
};
