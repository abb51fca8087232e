//! Persona configuration for the delegating responder.
//!
//! A persona is opaque product configuration: the system instruction, an
//! optional template wrapping the user's prompt, sampling parameters and
//! the safety policy. Nothing here interprets the text.

use std::collections::HashSet;
use std::path::Path;

use ayushbot_genx::{
    BuiltModelContext, HarmBlockThreshold, HarmCategory, ModelContextBuilder, ModelParams,
    SafetySetting,
};
use minijinja::{context, Environment};
use serde::{Deserialize, Serialize};

use crate::error::PersonaError;

/// Reply when the backend returns no usable text.
pub const EMPTY_REPLY: &str = "I'm sorry, I don't have an answer for that right now.";

/// Reply when the backend call fails or times out.
pub const FAILURE_REPLY: &str = "Sorry, I'm having trouble connecting. Please try again later.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub name: String,

    /// Sent as the system instruction on every request.
    pub system_instruction: String,

    /// Wraps the user's raw prompt; `{{ prompt }}` is the input, unescaped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_template: Option<String>,

    /// Model name; empty selects the generator's default.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model: String,

    #[serde(default)]
    pub params: ModelParams,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub safety: Vec<SafetySetting>,

    /// Seconds to wait for the backend; 0 waits forever.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_empty_reply")]
    pub empty_reply: String,

    #[serde(default = "default_failure_reply")]
    pub failure_reply: String,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_empty_reply() -> String {
    EMPTY_REPLY.to_string()
}

fn default_failure_reply() -> String {
    FAILURE_REPLY.to_string()
}

impl Persona {
    pub fn new(name: impl Into<String>, system_instruction: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            system_instruction: system_instruction.into(),
            prompt_template: None,
            model: String::new(),
            params: ModelParams::default(),
            safety: Vec::new(),
            timeout_secs: default_timeout_secs(),
            empty_reply: default_empty_reply(),
            failure_reply: default_failure_reply(),
        }
    }

    /// General-purpose friendly assistant on `gemini-2.0-flash` at
    /// temperature 0.5.
    pub fn assistant() -> Self {
        Self {
            prompt_template: Some("The user has a question: {{ prompt }}".to_string()),
            model: "gemini-2.0-flash".to_string(),
            params: ModelParams::new().with_temperature(0.5),
            ..Self::new("assistant", "You are a helpful and friendly assistant.")
        }
    }

    /// Assistant that stays loyal to its creator, with explicit safety
    /// thresholds.
    pub fn loyal() -> Self {
        let mut safety = SafetySetting::uniform(HarmBlockThreshold::BlockMediumAndAbove);
        for s in &mut safety {
            if s.category == HarmCategory::DangerousContent {
                s.threshold = HarmBlockThreshold::BlockLowAndAbove;
            }
        }
        Self {
            model: "gemini-2.0-flash".to_string(),
            params: ModelParams::new().with_temperature(0.7),
            safety,
            ..Self::new(
                "loyal",
                "You are Ayush AI, a humble and friendly assistant created by your developer Ayush. \
                 Always speak respectfully about Ayush and never say anything negative about him. \
                 If asked who created you, say you were created by your developer, Ayush ji.",
            )
        }
    }

    /// Look up a preset by name.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "assistant" => Some(Self::assistant()),
            "loyal" => Some(Self::loyal()),
            _ => None,
        }
    }

    /// Load a persona from a YAML file and validate it.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PersonaError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| PersonaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let persona: Persona = serde_yaml::from_slice(&data)?;
        persona.validate()?;
        Ok(persona)
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Check that the instruction and both canned replies are present and
    /// the template compiles.
    pub fn validate(&self) -> Result<(), PersonaError> {
        if self.system_instruction.trim().is_empty() {
            return Err(PersonaError::EmptyInstruction);
        }
        if self.empty_reply.trim().is_empty() {
            return Err(PersonaError::EmptyReply("empty_reply"));
        }
        if self.failure_reply.trim().is_empty() {
            return Err(PersonaError::EmptyReply("failure_reply"));
        }
        let mut seen = HashSet::new();
        for s in &self.safety {
            if !seen.insert(s.category) {
                return Err(PersonaError::DuplicateSafety(s.category));
            }
        }
        if let Some(tpl) = &self.prompt_template {
            let mut env = Environment::new();
            env.add_template("prompt", tpl)?;
        }
        Ok(())
    }

    /// Apply the prompt template to raw user input.
    pub fn render_prompt(&self, input: &str) -> Result<String, PersonaError> {
        match &self.prompt_template {
            None => Ok(input.to_string()),
            Some(tpl) => {
                let env = Environment::new();
                Ok(env.render_str(tpl, context! { prompt => input })?)
            }
        }
    }

    /// Build the request context for one user message.
    pub fn build_context(&self, input: &str) -> Result<BuiltModelContext, PersonaError> {
        let mut mcb = ModelContextBuilder::new();
        mcb.prompt_text("system", &self.system_instruction);
        mcb.user_text("user", self.render_prompt(input)?);
        mcb.set_params(self.params.clone());
        mcb.set_safety(self.safety.clone());
        Ok(mcb.build())
    }
}
