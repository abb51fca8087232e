//! Responder that hands the prompt to a generative backend.

use std::time::Duration;

use async_trait::async_trait;
use ayushbot_genx::{inspect_model_context, Generated, Generator, GenxError};
use tracing::{debug, enabled, warn, Level};

use crate::error::PersonaError;
use crate::persona::Persona;
use crate::responder::Responder;

/// Why a delegated reply fell back to a canned string.
#[derive(Debug)]
pub enum Fallback {
    /// The backend answered with no usable text (including safety blocks).
    Empty(Generated),
    /// The backend call failed or timed out.
    Failed(GenxError),
    /// The persona template could not be rendered for this input.
    Prompt(PersonaError),
}

/// Sends every message to a [`Generator`] with a fixed [`Persona`].
///
/// Single attempt, no retries. Failures are logged and replaced with the
/// persona's failure reply; they never reach the caller.
pub struct DelegatingResponder<G> {
    generator: G,
    persona: Persona,
}

impl<G: Generator> DelegatingResponder<G> {
    pub fn new(generator: G, persona: Persona) -> Result<Self, PersonaError> {
        persona.validate()?;
        Ok(Self { generator, persona })
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    /// Call the backend once and report why a canned reply would be used.
    pub async fn try_respond(&self, input: &str) -> Result<String, Fallback> {
        let ctx = self
            .persona
            .build_context(input)
            .map_err(Fallback::Prompt)?;
        if enabled!(Level::DEBUG) {
            debug!(
                persona = %self.persona.name,
                "request context:\n{}",
                inspect_model_context(&ctx)
            );
        }

        let call = self.generator.generate(&self.persona.model, &ctx);
        let result = if self.persona.timeout_secs == 0 {
            call.await
        } else {
            let limit = Duration::from_secs(self.persona.timeout_secs);
            tokio::time::timeout(limit, call)
                .await
                .unwrap_or(Err(GenxError::Timeout(limit)))
        };

        match result {
            Ok(generated) if generated.is_empty() => Err(Fallback::Empty(generated)),
            Ok(generated) => {
                debug!(
                    persona = %self.persona.name,
                    status = %generated.status,
                    usage = %generated.usage,
                    "delegated reply"
                );
                Ok(generated.text)
            }
            Err(err) => Err(Fallback::Failed(err)),
        }
    }
}

#[async_trait]
impl<G: Generator> Responder for DelegatingResponder<G> {
    async fn respond(&self, input: &str) -> String {
        match self.try_respond(input).await {
            Ok(text) => text,
            Err(Fallback::Empty(generated)) => {
                warn!(
                    persona = %self.persona.name,
                    status = %generated.status,
                    "backend returned no text"
                );
                self.persona.empty_reply.clone()
            }
            Err(Fallback::Failed(err)) => {
                warn!(persona = %self.persona.name, error = %err, "backend call failed");
                self.persona.failure_reply.clone()
            }
            Err(Fallback::Prompt(err)) => {
                warn!(persona = %self.persona.name, error = %err, "prompt rendering failed");
                self.persona.failure_reply.clone()
            }
        }
    }
}
