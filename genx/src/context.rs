//! Model context for LLM requests.
//!
//! A context bundles everything a generator needs besides the model name:
//! system prompts, the message list, sampling parameters and the safety
//! policy to apply.

use serde::{Deserialize, Serialize};

use crate::safety::SafetySetting;
use crate::types::{Message, Role};

/// A prompt with a name and text content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    /// Name/identifier for this prompt
    pub name: String,
    /// Text content of the prompt
    pub text: String,
}

impl Prompt {
    /// Create a new prompt.
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Parameters for model generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    /// Maximum number of tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i32>,

    /// Temperature (0.0 to 2.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Top-p sampling (0.0 to 1.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// Top-k sampling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<i32>,
}

impl ModelParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_tokens(mut self, max_tokens: i32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_top_k(mut self, top_k: i32) -> Self {
        self.top_k = Some(top_k);
        self
    }
}

/// Trait for accessing model context.
pub trait ModelContext: Send + Sync {
    /// Iterate over prompts.
    fn prompts(&self) -> Box<dyn Iterator<Item = &Prompt> + '_>;

    /// Iterate over messages.
    fn messages(&self) -> Box<dyn Iterator<Item = &Message> + '_>;

    /// Get model parameters.
    fn params(&self) -> Option<&ModelParams>;

    /// Safety settings to send with the request.
    fn safety_settings(&self) -> &[SafetySetting];
}

/// Builder for constructing model context.
#[derive(Debug, Default)]
pub struct ModelContextBuilder {
    prompts: Vec<Prompt>,
    messages: Vec<Message>,
    params: Option<ModelParams>,
    safety: Vec<SafetySetting>,
}

impl ModelContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the model context.
    pub fn build(self) -> BuiltModelContext {
        BuiltModelContext {
            prompts: self.prompts,
            messages: self.messages,
            params: self.params,
            safety: self.safety,
        }
    }

    /// Set model parameters.
    pub fn set_params(&mut self, params: ModelParams) -> &mut Self {
        self.params = Some(params);
        self
    }

    /// Replace the safety settings.
    pub fn set_safety(&mut self, safety: Vec<SafetySetting>) -> &mut Self {
        self.safety = safety;
        self
    }

    /// Add a prompt. Consecutive prompts with the same name are merged.
    pub fn add_prompt(&mut self, prompt: Prompt) -> &mut Self {
        if let Some(last) = self.prompts.last_mut()
            && last.name == prompt.name
        {
            if !last.text.is_empty() {
                last.text.push('\n');
            }
            last.text.push_str(&prompt.text);
            return self;
        }
        self.prompts.push(prompt);
        self
    }

    /// Add a prompt with name and text.
    pub fn prompt_text(&mut self, name: impl Into<String>, text: impl Into<String>) -> &mut Self {
        self.add_prompt(Prompt::new(name, text))
    }

    /// Add a message.
    pub fn add_message(&mut self, msg: Message) -> &mut Self {
        self.messages.push(msg);
        self
    }

    /// Add a user text message.
    pub fn user_text(&mut self, name: impl Into<String>, text: impl Into<String>) -> &mut Self {
        self.add_message(Message::new(Role::User, text).with_name(name))
    }

    /// Add a model text message.
    pub fn model_text(&mut self, name: impl Into<String>, text: impl Into<String>) -> &mut Self {
        self.add_message(Message::new(Role::Model, text).with_name(name))
    }
}

/// Context produced by [`ModelContextBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct BuiltModelContext {
    prompts: Vec<Prompt>,
    messages: Vec<Message>,
    params: Option<ModelParams>,
    safety: Vec<SafetySetting>,
}

impl ModelContext for BuiltModelContext {
    fn prompts(&self) -> Box<dyn Iterator<Item = &Prompt> + '_> {
        Box::new(self.prompts.iter())
    }

    fn messages(&self) -> Box<dyn Iterator<Item = &Message> + '_> {
        Box::new(self.messages.iter())
    }

    fn params(&self) -> Option<&ModelParams> {
        self.params.as_ref()
    }

    fn safety_settings(&self) -> &[SafetySetting] {
        &self.safety
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::safety::{HarmBlockThreshold, HarmCategory};

    #[test]
    fn test_prompts_merge_same_name() {
        let mut builder = ModelContextBuilder::new();
        builder.prompt_text("system", "line one");
        builder.prompt_text("system", "line two");
        builder.prompt_text("persona", "other");

        let ctx = builder.build();
        let prompts: Vec<_> = ctx.prompts().collect();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0].text, "line one\nline two");
        assert_eq!(prompts[1].name, "persona");
    }

    #[test]
    fn test_messages_keep_order() {
        let mut builder = ModelContextBuilder::new();
        builder.user_text("user", "first");
        builder.model_text("bot", "second");
        builder.user_text("user", "third");

        let ctx = builder.build();
        let texts: Vec<_> = ctx.messages().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_params_and_safety() {
        let mut builder = ModelContextBuilder::new();
        builder.set_params(ModelParams::new().with_temperature(0.5));
        builder.set_safety(vec![SafetySetting::new(
            HarmCategory::Harassment,
            HarmBlockThreshold::BlockOnlyHigh,
        )]);

        let ctx = builder.build();
        assert_eq!(ctx.params().unwrap().temperature, Some(0.5));
        assert_eq!(ctx.safety_settings().len(), 1);
    }

    #[test]
    fn test_params_serde_skips_unset() {
        let params = ModelParams::new().with_max_tokens(64);
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"max_tokens":64}"#);
    }
}
