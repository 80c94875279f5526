use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::CompletionClient;
use crate::domain::DomainError;

/// Keywords that make the canned moderator speak up in offline demo mode.
const INTERVENTION_HINTS: &[&str] = &["stupid", "idiot", "hate", "shut up", "dumb"];

enum MockReply {
    Completion(String),
    Failure(String),
}

/// A [`CompletionClient`] that never leaves the process.
///
/// Replies from an explicit queue when one was scripted (tests), otherwise
/// falls back to a deterministic keyword check over the prompt (the
/// `--mock` demo mode): rude-looking input gets the documented intervention
/// JSON, everything else the silent decision.
#[derive(Default)]
pub struct MockCompletionClient {
    queued: Mutex<VecDeque<MockReply>>,
    last_prompt: Mutex<Option<String>>,
    last_api_key: Mutex<Option<String>>,
}

impl MockCompletionClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw completion to return for an upcoming call.
    pub fn with_completion(self, text: impl Into<String>) -> Self {
        self.queued
            .lock()
            .expect("mock queue lock poisoned")
            .push_back(MockReply::Completion(text.into()));
        self
    }

    /// Queue an upstream failure for an upcoming call.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.queued
            .lock()
            .expect("mock queue lock poisoned")
            .push_back(MockReply::Failure(message.into()));
        self
    }

    /// The prompt of the most recent call, for asserting prompt assembly.
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt
            .lock()
            .expect("mock prompt lock poisoned")
            .clone()
    }

    /// The API key of the most recent call.
    pub fn last_api_key(&self) -> Option<String> {
        self.last_api_key
            .lock()
            .expect("mock key lock poisoned")
            .clone()
    }

    fn canned(prompt: &str) -> String {
        let lower = prompt.to_lowercase();
        if INTERVENTION_HINTS.iter().any(|hint| lower.contains(hint)) {
            "```json\n{ \"shouldRespond\": \"true\", \"responseText\": \"Let's keep the conversation respectful, please.\" }\n```"
                .to_string()
        } else {
            "```json\n{ \"shouldRespond\": \"false\", \"responseText\": \"\" }\n```".to_string()
        }
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, api_key: &str, prompt: &str) -> Result<String, DomainError> {
        *self.last_prompt.lock().expect("mock prompt lock poisoned") = Some(prompt.to_string());
        *self.last_api_key.lock().expect("mock key lock poisoned") = Some(api_key.to_string());

        let scripted = self
            .queued
            .lock()
            .expect("mock queue lock poisoned")
            .pop_front();

        match scripted {
            Some(MockReply::Completion(text)) => Ok(text),
            Some(MockReply::Failure(message)) => Err(DomainError::upstream(message)),
            None => Ok(Self::canned(prompt)),
        }
    }
}
