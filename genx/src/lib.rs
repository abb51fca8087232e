//! GenX - a narrow interface to generative text backends.
//!
//! A [`Generator`] takes a model name and a [`ModelContext`] (system prompts,
//! messages, sampling parameters, safety policy) and returns one finished
//! [`Generated`] reply. The only concrete backend shipped here is Google
//! Gemini ([`gemini::GeminiGenerator`]).
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use ayushbot_genx::{Generator, ModelContextBuilder, ModelParams};
//!
//! let mut builder = ModelContextBuilder::new();
//! builder.prompt_text("system", "You are a helpful assistant.");
//! builder.user_text("user", "What's the weather?");
//! builder.set_params(ModelParams::new().with_temperature(0.5));
//!
//! let reply = generator.generate("", &builder.build()).await?;
//! ```
//!
//! # Modules
//!
//! - [`types`]: Message and role types
//! - [`context`]: Model context building
//! - [`safety`]: Safety settings forwarded to the backend
//! - [`error`]: Error, status and usage types
//! - [`gemini`]: Gemini REST generator

pub mod context;
pub mod error;
pub mod gemini;
pub mod safety;
pub mod types;

pub use context::{BuiltModelContext, ModelContext, ModelContextBuilder, ModelParams, Prompt};
pub use error::{GenxError, Status, Usage};
pub use safety::{HarmBlockThreshold, HarmCategory, SafetySetting};
pub use types::{Message, Role};

use std::sync::Arc;

use async_trait::async_trait;

/// One finished generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    /// Concatenated text of the reply, possibly empty.
    pub text: String,
    pub usage: Usage,
    pub status: Status,
}

impl Generated {
    /// A completed reply with the given text.
    pub fn done(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: Usage::default(),
            status: Status::Done,
        }
    }

    /// A reply withheld by the backend's safety filter.
    pub fn blocked() -> Self {
        Self {
            text: String::new(),
            usage: Usage::default(),
            status: Status::Blocked,
        }
    }

    /// True when there is no usable text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Trait for LLM generators.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a single reply.
    ///
    /// # Arguments
    ///
    /// * `model` - The model identifier (empty selects the generator's default)
    /// * `ctx` - The model context containing prompts, messages and policy
    async fn generate(&self, model: &str, ctx: &dyn ModelContext)
        -> Result<Generated, GenxError>;
}

#[async_trait]
impl<G: Generator + ?Sized> Generator for Arc<G> {
    async fn generate(
        &self,
        model: &str,
        ctx: &dyn ModelContext,
    ) -> Result<Generated, GenxError> {
        (**self).generate(model, ctx).await
    }
}

#[async_trait]
impl<G: Generator + ?Sized> Generator for Box<G> {
    async fn generate(
        &self,
        model: &str,
        ctx: &dyn ModelContext,
    ) -> Result<Generated, GenxError> {
        (**self).generate(model, ctx).await
    }
}

/// Render a model context for debugging.
pub fn inspect_model_context(ctx: &dyn ModelContext) -> String {
    let mut output = String::new();

    output.push_str("## Params\n");
    if let Some(params) = ctx.params() {
        if let Some(max_tokens) = params.max_tokens {
            output.push_str(&format!("MaxTokens: {}\n", max_tokens));
        }
        if let Some(temp) = params.temperature {
            output.push_str(&format!("Temperature: {:.2}\n", temp));
        }
        if let Some(top_p) = params.top_p {
            output.push_str(&format!("TopP: {:.2}\n", top_p));
        }
        if let Some(top_k) = params.top_k {
            output.push_str(&format!("TopK: {}\n", top_k));
        }
    }
    output.push('\n');

    output.push_str("## Safety\n");
    for s in ctx.safety_settings() {
        output.push_str(&format!("{:?}: {:?}\n", s.category, s.threshold));
    }
    output.push('\n');

    output.push_str("## Prompts\n");
    for prompt in ctx.prompts() {
        output.push_str(&format!("### {}\n{}\n\n", prompt.name, prompt.text));
    }

    output.push_str("## Messages\n");
    for msg in ctx.messages() {
        output.push_str(&format!("### {}\n", msg.role));
        if let Some(name) = &msg.name {
            output.push_str(name);
            output.push('\n');
        }
        output.push_str(&msg.text);
        output.push_str("\n\n");
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_is_empty() {
        assert!(Generated::done("  \n").is_empty());
        assert!(Generated::blocked().is_empty());
        assert!(!Generated::done("hi").is_empty());
    }

    #[test]
    fn test_inspect_model_context() {
        let mut builder = ModelContextBuilder::new();
        builder.prompt_text("system", "You are helpful.");
        builder.user_text("user", "Hello");
        builder.set_params(ModelParams::new().with_temperature(0.5));
        builder.set_safety(SafetySetting::uniform(HarmBlockThreshold::BlockOnlyHigh));

        let output = inspect_model_context(&builder.build());
        assert!(output.contains("Temperature: 0.50"));
        assert!(output.contains("## Safety"));
        assert!(output.contains("BlockOnlyHigh"));
        assert!(output.contains("### system\nYou are helpful."));
        assert!(output.contains("### user\nuser\nHello"));
    }
}
