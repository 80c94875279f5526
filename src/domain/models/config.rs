/// Default moderator prompt. Sent verbatim (schema description and examples
/// included) with the last message appended after a newline.
pub const DEFAULT_PROMPT_TEMPLATE: &str = r#"You are a chat moderator LLM.
You will receive the last message sent in a conversation between User 1 and User 2.
Your task is to decide if you need to add a comment to the conversation based on the last message.
Respond ONLY with a JSON object matching this Zod schema:
```typescript
{
  shouldRespond: z.string(), // "true" if you want to add a message, "false" otherwise
  responseText: z.string() // Your message text if shouldRespond is "true", otherwise an empty string
}
```

Examples:

Last message: "That's not very nice."
Your JSON response: { "shouldRespond": "true", "responseText": "Let's keep the conversation respectful, please." }

Last message: "Hello there!"
Your JSON response: { "shouldRespond": "false", "responseText": "" }

---

Now, analyze the following last message:"#;

/// User-editable session settings.
///
/// Read fresh at the start of every moderation request; there is no
/// snapshotting of a request's config once it is in flight, so edits made
/// between requests always take effect on the next one.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Credential for the completion API. Initially empty; a request made
    /// with an empty key fails with a configuration error.
    pub api_key: String,
    /// Prompt prepended to the last message on every request.
    pub prompt_template: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
        }
    }
}

impl SessionConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_no_key() {
        let config = SessionConfig::default();
        assert!(!config.has_api_key());
        assert_eq!(config.prompt_template, DEFAULT_PROMPT_TEMPLATE);
    }

    #[test]
    fn test_default_prompt_documents_the_schema() {
        assert!(DEFAULT_PROMPT_TEMPLATE.contains("shouldRespond"));
        assert!(DEFAULT_PROMPT_TEMPLATE.contains("responseText"));
        assert!(DEFAULT_PROMPT_TEMPLATE.ends_with("Now, analyze the following last message:"));
    }
}
