//! Integration tests for modchat.
//!
//! These drive a full submission — controller, requester, interpreter —
//! against the mock completion client.

use std::sync::Arc;

use modchat::{
    MockCompletionClient, RequestModerationUseCase, Sender, SessionConfig, SessionController,
    SubmitOutcome, DEFAULT_PROMPT_TEMPLATE, FORMAT_ERROR_INTERVENTION,
};

const EXAMPLE_COMPLETION: &str = "```json\n{ \"shouldRespond\": \"true\", \"responseText\": \"Let's keep the conversation respectful, please.\" }\n```";

fn session_with_key() -> SessionController {
    SessionController::with_config(SessionConfig::new("test-key"))
}

fn requester(client: MockCompletionClient) -> (Arc<MockCompletionClient>, RequestModerationUseCase)
{
    let client = Arc::new(client);
    let use_case = RequestModerationUseCase::new(client.clone());
    (client, use_case)
}

#[tokio::test]
async fn submission_appends_exactly_one_user_message() {
    let (_, use_case) = requester(MockCompletionClient::new());
    let mut session = session_with_key();

    let outcome = session.submit(Sender::UserA, "Hello there!", &use_case).await;

    assert_eq!(outcome, SubmitOutcome::Silent);
    assert_eq!(session.messages().len(), 1);
    assert_eq!(session.messages()[0].sender(), Sender::UserA);
    assert_eq!(session.messages()[0].text(), "Hello there!");
    assert!(!session.is_pending());
}

#[tokio::test]
async fn documented_example_appends_the_documented_moderator_message() {
    let (client, use_case) = requester(
        MockCompletionClient::new().with_completion(EXAMPLE_COMPLETION),
    );
    let mut session = session_with_key();

    let outcome = session
        .submit(Sender::UserB, "That's not very nice.", &use_case)
        .await;

    assert_eq!(outcome, SubmitOutcome::Moderated);
    assert_eq!(session.messages().len(), 2);

    let moderator = &session.messages()[1];
    assert_eq!(moderator.sender(), Sender::Moderator);
    assert_eq!(
        moderator.text(),
        "Let's keep the conversation respectful, please."
    );

    // Prompt is template, newline, the literal last message.
    assert_eq!(
        client.last_prompt().unwrap(),
        format!("{DEFAULT_PROMPT_TEMPLATE}\nThat's not very nice.")
    );
    assert_eq!(client.last_api_key().as_deref(), Some("test-key"));
}

#[tokio::test]
async fn false_decisions_append_no_moderator_message() {
    let completions = [
        // Fenced.
        "```json\n{ \"shouldRespond\": \"false\", \"responseText\": \"\" }\n```",
        // Bare object.
        r#"{ "shouldRespond": "false", "responseText": "" }"#,
        // False with non-empty text: responseText is disregarded.
        r#"{ "shouldRespond": "false", "responseText": "should not appear" }"#,
    ];

    for completion in completions {
        let (_, use_case) = requester(MockCompletionClient::new().with_completion(completion));
        let mut session = session_with_key();

        let outcome = session.submit(Sender::UserA, "hi", &use_case).await;

        assert_eq!(outcome, SubmitOutcome::Silent, "completion: {completion}");
        assert_eq!(session.messages().len(), 1);
        assert!(session.error().is_none());
    }
}

#[tokio::test]
async fn heuristic_recovery_appends_format_error_message() {
    let (_, use_case) = requester(
        MockCompletionClient::new()
            .with_completion("I really think I should respond: true! But here is no JSON."),
    );
    let mut session = session_with_key();

    let outcome = session.submit(Sender::UserA, "whatever", &use_case).await;

    assert_eq!(outcome, SubmitOutcome::Moderated);
    let moderator = &session.messages()[1];
    assert_eq!(moderator.text(), FORMAT_ERROR_INTERVENTION);
}

#[tokio::test]
async fn unparseable_completion_without_hints_is_silent_and_errorless() {
    let (_, use_case) =
        requester(MockCompletionClient::new().with_completion("Hello there! {not json"));
    let mut session = session_with_key();

    let outcome = session.submit(Sender::UserA, "hey", &use_case).await;

    assert_eq!(outcome, SubmitOutcome::Silent);
    assert_eq!(session.messages().len(), 1);
    assert!(session.error().is_none());
}

#[tokio::test]
async fn missing_api_key_fails_without_calling_upstream() {
    let (client, use_case) = requester(MockCompletionClient::new());
    let mut session = SessionController::new();

    let outcome = session.submit(Sender::UserA, "hello", &use_case).await;

    assert_eq!(outcome, SubmitOutcome::Failed);
    assert_eq!(session.messages().len(), 1, "user message must remain");
    assert!(session.error().unwrap().contains("API key is missing"));
    assert!(client.last_prompt().is_none(), "no upstream call was made");
    assert!(!session.is_pending());
}

#[tokio::test]
async fn upstream_failure_surfaces_wrapped_error() {
    let (_, use_case) = requester(MockCompletionClient::new().with_failure("connection refused"));
    let mut session = session_with_key();

    let outcome = session.submit(Sender::UserA, "hello", &use_case).await;

    assert_eq!(outcome, SubmitOutcome::Failed);
    let error = session.error().unwrap();
    assert!(error.starts_with("Failed to get response from LLM."));
    assert!(error.contains("connection refused"));
    assert_eq!(session.messages().len(), 1);
}

#[tokio::test]
async fn blank_submission_is_a_no_op() {
    let (client, use_case) = requester(MockCompletionClient::new());
    let mut session = session_with_key();

    let outcome = session.submit(Sender::UserB, "   ", &use_case).await;

    assert_eq!(outcome, SubmitOutcome::Ignored);
    assert!(session.messages().is_empty());
    assert!(client.last_prompt().is_none());
}

#[tokio::test]
async fn config_edits_between_requests_take_effect() {
    let (client, use_case) = requester(MockCompletionClient::new());
    let mut session = session_with_key();

    session.submit(Sender::UserA, "one", &use_case).await;
    session.set_prompt_template("Custom template:");
    session.submit(Sender::UserA, "two", &use_case).await;

    assert_eq!(client.last_prompt().unwrap(), "Custom template:\ntwo");
}

#[tokio::test]
async fn offline_mock_mode_moderates_rude_messages_out_of_the_box() {
    // The wiring `serve --mock` builds: canned mock client plus the
    // placeholder key, so submissions pass the credential check unconfigured.
    let (_, use_case) = requester(MockCompletionClient::new());
    let mut session = SessionController::with_config(SessionConfig::new("mock"));

    let outcome = session
        .submit(Sender::UserA, "you are so stupid", &use_case)
        .await;

    assert_eq!(outcome, SubmitOutcome::Moderated);
    assert_eq!(session.messages().len(), 2);
    assert_eq!(
        session.messages()[1].text(),
        "Let's keep the conversation respectful, please."
    );

    assert_eq!(
        session.submit(Sender::UserB, "good morning", &use_case).await,
        SubmitOutcome::Silent
    );
    assert!(session.error().is_none());
}

#[tokio::test]
async fn conversation_survives_mixed_outcomes() {
    let client = MockCompletionClient::new()
        .with_completion(EXAMPLE_COMPLETION)
        .with_failure("quota exceeded")
        .with_completion(r#"{ "shouldRespond": "false", "responseText": "" }"#);
    let (_, use_case) = requester(client);
    let mut session = session_with_key();

    assert_eq!(
        session.submit(Sender::UserA, "That's not very nice.", &use_case).await,
        SubmitOutcome::Moderated
    );
    assert_eq!(
        session.submit(Sender::UserB, "sorry", &use_case).await,
        SubmitOutcome::Failed
    );
    assert!(session.error().is_some());

    // A later success clears the surfaced error.
    assert_eq!(
        session.submit(Sender::UserB, "all good now", &use_case).await,
        SubmitOutcome::Silent
    );
    assert!(session.error().is_none());

    // user A, moderator, user B (failed exchange keeps the user message), user B.
    let senders: Vec<Sender> = session.messages().iter().map(|m| m.sender()).collect();
    assert_eq!(
        senders,
        vec![Sender::UserA, Sender::Moderator, Sender::UserB, Sender::UserB]
    );

    // Ids stay strictly increasing across the whole session.
    let ids: Vec<u64> = session.messages().iter().map(|m| m.id()).collect();
    for pair in ids.windows(2) {
        assert!(pair[0] < pair[1]);
    }
}
