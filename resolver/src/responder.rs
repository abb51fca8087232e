//! The [`Responder`] seam and its rule-based implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::ruleset::RuleSet;

/// Anything that turns one user message into one reply.
///
/// Implementations never fail: every input yields a non-empty string.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, input: &str) -> String;
}

#[async_trait]
impl<R: Responder + ?Sized> Responder for Box<R> {
    async fn respond(&self, input: &str) -> String {
        (**self).respond(input).await
    }
}

#[async_trait]
impl<R: Responder + ?Sized> Responder for Arc<R> {
    async fn respond(&self, input: &str) -> String {
        (**self).respond(input).await
    }
}

/// Replies from a [`RuleSet`], optionally after a short pause.
#[derive(Debug, Clone)]
pub struct RuleResponder {
    rules: Arc<RuleSet>,
    delay: Duration,
}

impl RuleResponder {
    /// Pause used to make the bot look like it is thinking.
    pub const THINKING_DELAY: Duration = Duration::from_millis(500);

    pub fn new(rules: Arc<RuleSet>) -> Self {
        Self {
            rules,
            delay: Duration::ZERO,
        }
    }

    /// Sleep for `delay` before each reply.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}

#[async_trait]
impl Responder for RuleResponder {
    async fn respond(&self, input: &str) -> String {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let resolution = self.rules.resolve(input);
        debug!(
            rule_set = %self.rules.name(),
            matched = ?resolution.matched,
            "rule responder replied"
        );
        resolution.response.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin;

    #[tokio::test]
    async fn test_rule_responder() {
        let responder = RuleResponder::new(builtin::loyal());
        assert_eq!(
            responder.respond("Who created you").await,
            builtin::ATTRIBUTION_RESPONSE
        );
        assert_eq!(responder.respond("").await, builtin::DEFAULT_RESPONSE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_thinking_delay() {
        let responder =
            RuleResponder::new(builtin::loyal()).with_delay(RuleResponder::THINKING_DELAY);
        let start = tokio::time::Instant::now();
        let reply = responder.respond("how are you").await;
        assert!(start.elapsed() >= RuleResponder::THINKING_DELAY);
        assert!(reply.contains("Ayush"));
    }

    #[tokio::test]
    async fn test_boxed_responder() {
        let boxed: Box<dyn Responder> = Box::new(RuleResponder::new(builtin::loyal()));
        assert_eq!(boxed.respond("who made you").await, "Ayush is my creator.");
    }
}
