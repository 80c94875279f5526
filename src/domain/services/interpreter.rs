use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use crate::domain::models::{ModerationDecision, FORMAT_ERROR_INTERVENTION};

/// Interpret a raw model completion as a [`ModerationDecision`].
///
/// The upstream model is not guaranteed to emit strict JSON, so this is a
/// total function: it always returns a decision, degrading gracefully.
/// Extraction strategies are tried in order, first success wins:
///
/// 1. a fenced ```` ```json ```` block,
/// 2. the first `{...}` span anywhere in the text,
/// 3. the full trimmed text.
///
/// The candidate is then parsed and validated against the two-field schema.
/// When that fails, a narrow heuristic recovers an intervention the model
/// clearly intended but mis-formatted; everything else is treated as
/// silence rather than fabricating a moderator message.
///
/// Pure function of its input, so interpreting the same text twice yields
/// identical decisions.
pub fn interpret(raw: &str) -> ModerationDecision {
    let candidate = fenced_json_block(raw)
        .or_else(|| first_object_span(raw))
        .unwrap_or_else(|| raw.trim());

    match serde_json::from_str::<ModerationDecision>(candidate) {
        Ok(decision) => decision,
        Err(e) => {
            warn!("could not parse moderation reply as JSON ({e}): {raw}");
            recover(raw)
        }
    }
}

/// Strategy 1: the object literal inside a fenced block labeled as JSON.
pub fn fenced_json_block(raw: &str) -> Option<&str> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN.get_or_init(|| {
        Regex::new(r"(?s)```json\n(\{.*?\})\n```").expect("fenced block pattern is valid")
    });
    re.captures(raw).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// Strategy 2: the first `{...}` span, greedy, newlines allowed.
pub fn first_object_span(raw: &str) -> Option<&str> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN
        .get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("object span pattern is valid"));
    re.find(raw).map(|m| m.as_str())
}

/// Recovery for unparseable output. If the text still talks about responding
/// affirmatively, assume the model wanted to intervene and formatting alone
/// failed; otherwise bias toward silence.
fn recover(raw: &str) -> ModerationDecision {
    let lower = raw.to_lowercase();
    if lower.contains("respond") && lower.contains("true") {
        ModerationDecision::respond(FORMAT_ERROR_INTERVENTION)
    } else {
        ModerationDecision::silent()
    }
}
