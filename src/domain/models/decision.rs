use serde::{Deserialize, Serialize};

/// Moderator text substituted when the model clearly wanted to intervene but
/// failed to produce parseable JSON.
pub const FORMAT_ERROR_INTERVENTION: &str =
    "Moderator intervention needed (response format error).";

/// The two-field decision object the model is asked to produce.
///
/// `should_respond` is a boolean-as-string (`"true"` / `"false"`) because
/// that is the wire schema the prompt documents; anything other than the
/// literal `"true"` means no moderator message, regardless of what
/// `response_text` contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationDecision {
    #[serde(rename = "shouldRespond")]
    pub should_respond: String,

    #[serde(rename = "responseText")]
    pub response_text: String,
}

impl ModerationDecision {
    /// The "stay silent" decision.
    pub fn silent() -> Self {
        Self {
            should_respond: "false".to_string(),
            response_text: String::new(),
        }
    }

    pub fn respond(text: impl Into<String>) -> Self {
        Self {
            should_respond: "true".to_string(),
            response_text: text.into(),
        }
    }

    /// Whether this decision produces a moderator message: `should_respond`
    /// must be exactly `"true"` and the text must be non-empty.
    pub fn wants_response(&self) -> bool {
        self.should_respond == "true" && !self.response_text.is_empty()
    }
}
