use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::application::{BeginOutcome, RequestModerationUseCase, SessionController};
use crate::domain::{DomainError, Sender};

/// How the HTTP layer answered a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    /// Blank text; nothing happened.
    Ignored,
    /// A moderation request was already in flight; rejected, not queued.
    Busy,
    /// The message was appended and the moderation exchange is running;
    /// poll the session for the result.
    Accepted,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Ignored => "ignored",
            SubmissionStatus::Busy => "busy",
            SubmissionStatus::Accepted => "accepted",
        }
    }
}

/// Shared state behind the HTTP surface.
///
/// The controller sits behind a synchronous mutex that is never held across
/// an await: a submission locks to `begin`, runs the completion call on a
/// detached task, and re-locks to `settle`. A second submission arriving
/// mid-flight therefore sees the pending flag and is rejected instead of
/// waiting in line, which is the admission-control policy the session
/// requires.
pub struct AppState {
    controller: Mutex<SessionController>,
    requester: RequestModerationUseCase,
}

impl AppState {
    pub fn new(controller: SessionController, requester: RequestModerationUseCase) -> Self {
        Self {
            controller: Mutex::new(controller),
            requester,
        }
    }

    fn session(&self) -> MutexGuard<'_, SessionController> {
        self.controller.lock().expect("session state lock poisoned")
    }

    /// Start a submission and, when accepted, run the moderation exchange on
    /// a spawned task.
    ///
    /// Settlement must not ride on the request future: axum drops that future
    /// if the client disconnects mid-flight, and a submission begun but never
    /// settled would leave the session pending forever. The spawned task
    /// always settles, so the session returns to idle whether or not anyone
    /// is still around to read the answer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(self: &Arc<Self>, sender: Sender, text: &str) -> SubmissionStatus {
        let pending = match self.session().begin(sender, text) {
            BeginOutcome::Ignored => return SubmissionStatus::Ignored,
            BeginOutcome::Busy => return SubmissionStatus::Busy,
            BeginOutcome::Accepted(pending) => pending,
        };

        let state = Arc::clone(self);
        tokio::spawn(async move {
            let result = state
                .requester
                .execute(&pending.last_message_text, &pending.config)
                .await;
            state.session().settle(result);
        });

        SubmissionStatus::Accepted
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/session", get(get_session))
        .route("/api/messages", axum::routing::post(submit_message))
        .route("/api/settings", get(get_settings).put(put_settings))
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(host: &str, port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("modchat listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(include_str!("index.html"))
}

fn session_view(session: &SessionController) -> serde_json::Value {
    json!({
        "messages": session.messages(),
        "is_pending": session.is_pending(),
        "error": session.error(),
    })
}

async fn get_session(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(session_view(&state.session()))
}

#[derive(Deserialize)]
struct SubmitRequest {
    sender: String,
    text: String,
}

/// Only the two users may submit; the moderator speaks through decisions.
fn parse_submitting_sender(raw: &str) -> Result<Sender, DomainError> {
    let sender = Sender::parse(raw)?;
    if sender.is_moderator() {
        return Err(DomainError::invalid_input(
            "the moderator cannot submit messages",
        ));
    }
    Ok(sender)
}

async fn submit_message(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SubmitRequest>,
) -> Response {
    let sender = match parse_submitting_sender(&request.sender) {
        Ok(sender) => sender,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() })))
                .into_response()
        }
    };

    let status = state.submit(sender, &request.text);
    match status {
        SubmissionStatus::Ignored => StatusCode::NO_CONTENT.into_response(),
        SubmissionStatus::Busy => (
            StatusCode::CONFLICT,
            Json(json!({
                "outcome": status.as_str(),
                "session": session_view(&state.session()),
            })),
        )
            .into_response(),
        SubmissionStatus::Accepted => (
            StatusCode::ACCEPTED,
            Json(json!({
                "outcome": status.as_str(),
                "session": session_view(&state.session()),
            })),
        )
            .into_response(),
    }
}

fn settings_view(session: &SessionController) -> serde_json::Value {
    // The key itself never goes back over the wire; only its presence.
    json!({
        "has_api_key": session.config().has_api_key(),
        "prompt_template": session.config().prompt_template,
    })
}

async fn get_settings(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(settings_view(&state.session()))
}

#[derive(Deserialize)]
struct SettingsUpdate {
    api_key: Option<String>,
    prompt_template: Option<String>,
}

async fn put_settings(
    State(state): State<Arc<AppState>>,
    Json(update): Json<SettingsUpdate>,
) -> Json<serde_json::Value> {
    let mut session = state.session();
    if let Some(api_key) = update.api_key {
        session.set_api_key(api_key);
    }
    if let Some(template) = update.prompt_template {
        session.set_prompt_template(template);
    }
    Json(settings_view(&session))
}
