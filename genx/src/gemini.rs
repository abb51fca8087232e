//! Google Gemini Generator implementation.
//!
//! Calls the `generateContent` REST endpoint once per request and maps the
//! first candidate back into a [`Generated`] value.
//!
//! # Example
//!
//! ```rust,ignore
//! use ayushbot_genx::{Generator, ModelContextBuilder};
//! use ayushbot_genx::gemini::{GeminiConfig, GeminiGenerator};
//!
//! let generator = GeminiGenerator::new(GeminiConfig {
//!     api_key: "AIza...".to_string(),
//!     ..Default::default()
//! });
//!
//! let mut builder = ModelContextBuilder::new();
//! builder.prompt_text("system", "You are helpful.");
//! builder.user_text("user", "Hello!");
//!
//! let reply = generator.generate("", &builder.build()).await?;
//! println!("{}", reply.text);
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::context::{ModelContext, ModelParams};
use crate::error::{GenxError, Status, Usage};
use crate::safety::SafetySetting;
use crate::types::Role;
use crate::{Generated, Generator};

/// Header carrying the API key. The key never appears in the URL, so it
/// cannot leak through error messages.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Default Gemini REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Gemini Generator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key for authentication
    pub api_key: String,
    /// Model name (e.g., "gemini-2.0-flash", "gemini-1.5-pro")
    pub model: String,
    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds (0 disables the limit)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Parameters used when the context carries none
    #[serde(default)]
    pub generate_params: Option<ModelParams>,
    /// Safety settings used when the context carries none
    #[serde(default)]
    pub safety_settings: Vec<SafetySetting>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            generate_params: None,
            safety_settings: Vec::new(),
        }
    }
}

/// Gemini Generator.
pub struct GeminiGenerator {
    client: Client,
    config: GeminiConfig,
}

impl GeminiGenerator {
    /// Create a new Gemini generator.
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Convert model context to a Gemini request body.
    fn convert_request(&self, ctx: &dyn ModelContext) -> Value {
        let mut contents: Vec<Value> = Vec::new();

        // Consecutive messages from the same role share one content entry.
        let mut current_role: Option<&str> = None;
        let mut current_parts: Vec<Value> = Vec::new();
        for msg in ctx.messages() {
            let role = match msg.role {
                Role::User => "user",
                Role::Model => "model",
            };
            if let Some(prev) = current_role
                && prev != role
                && !current_parts.is_empty()
            {
                contents.push(json!({
                    "role": prev,
                    "parts": std::mem::take(&mut current_parts),
                }));
            }
            current_role = Some(role);
            current_parts.push(json!({ "text": msg.text }));
        }
        if let Some(role) = current_role
            && !current_parts.is_empty()
        {
            contents.push(json!({ "role": role, "parts": current_parts }));
        }

        let mut generation_config = json!({});
        if let Some(p) = ctx.params().or(self.config.generate_params.as_ref()) {
            if let Some(max) = p.max_tokens {
                generation_config["maxOutputTokens"] = json!(max);
            }
            if let Some(temp) = p.temperature {
                generation_config["temperature"] = json!(temp);
            }
            if let Some(top_p) = p.top_p {
                generation_config["topP"] = json!(top_p);
            }
            if let Some(top_k) = p.top_k {
                generation_config["topK"] = json!(top_k);
            }
        }

        let mut body = json!({
            "contents": contents,
            "generationConfig": generation_config,
        });

        let prompt_texts: Vec<&str> = ctx.prompts().map(|p| p.text.as_str()).collect();
        if !prompt_texts.is_empty() {
            body["systemInstruction"] = json!({
                "parts": [{ "text": prompt_texts.join("\n") }]
            });
        }

        let safety = if ctx.safety_settings().is_empty() {
            self.config.safety_settings.as_slice()
        } else {
            ctx.safety_settings()
        };
        if !safety.is_empty() {
            body["safetySettings"] = json!(safety);
        }

        body
    }

    fn api_url(&self, model: &str) -> String {
        let model = if model.is_empty() {
            self.config.model.as_str()
        } else {
            model
        };
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model,
        )
    }

    async fn send(&self, model: &str, body: &Value) -> Result<Value, GenxError> {
        let response = self
            .client
            .post(self.api_url(model))
            .header(API_KEY_HEADER, &self.config.api_key)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| GenxError::Http(e.without_url()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            return Err(GenxError::Api {
                status,
                message: api_error_message(&text),
            });
        }

        response
            .json()
            .await
            .map_err(|e| GenxError::Http(e.without_url()))
    }
}

/// Pull `error.message` out of an API error body, or return it whole.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

/// Map a `generateContent` response body to a [`Generated`].
pub fn parse_response(json: &Value) -> Result<Generated, GenxError> {
    let meta = &json["usageMetadata"];
    let usage = Usage::with_counts(
        meta["promptTokenCount"].as_i64().unwrap_or(0),
        meta["cachedContentTokenCount"].as_i64().unwrap_or(0),
        meta["candidatesTokenCount"].as_i64().unwrap_or(0),
    );

    if let Some(message) = json["error"]["message"].as_str() {
        return Err(GenxError::Generation {
            usage,
            message: message.to_string(),
        });
    }

    let Some(candidate) = json["candidates"].as_array().and_then(|c| c.first()) else {
        // A prompt rejected by the safety filter comes back without candidates.
        if let Some(reason) = json["promptFeedback"]["blockReason"].as_str() {
            debug!(reason, "gemini: prompt blocked");
            return Ok(Generated {
                text: String::new(),
                usage,
                status: Status::Blocked,
            });
        }
        return Err(GenxError::Generation {
            usage,
            message: "no candidates in response".to_string(),
        });
    };

    let text: String = candidate["content"]["parts"]
        .as_array()
        .map(|parts| parts.iter().filter_map(|p| p["text"].as_str()).collect())
        .unwrap_or_default();

    let status = match candidate["finishReason"].as_str() {
        Some("MAX_TOKENS") => Status::Truncated,
        Some("SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII") => {
            Status::Blocked
        }
        _ => Status::Done,
    };

    Ok(Generated {
        text,
        usage,
        status,
    })
}

#[async_trait]
impl Generator for GeminiGenerator {
    async fn generate(
        &self,
        model: &str,
        ctx: &dyn ModelContext,
    ) -> Result<Generated, GenxError> {
        if self.config.api_key.is_empty() {
            return Err(GenxError::InvalidArguments {
                message: "gemini api_key is empty".to_string(),
            });
        }

        let body = self.convert_request(ctx);
        let json = if self.config.timeout_secs == 0 {
            self.send(model, &body).await?
        } else {
            let limit = Duration::from_secs(self.config.timeout_secs);
            tokio::time::timeout(limit, self.send(model, &body))
                .await
                .map_err(|_| GenxError::Timeout(limit))??
        };

        let generated = parse_response(&json)?;
        debug!(status = %generated.status, usage = %generated.usage, "gemini: generated");
        Ok(generated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ModelContextBuilder;
    use crate::safety::{HarmBlockThreshold, HarmCategory};

    fn generator() -> GeminiGenerator {
        GeminiGenerator::new(GeminiConfig {
            api_key: "test-key".into(),
            ..Default::default()
        })
    }

    #[test]
    fn test_convert_request_full() {
        let mut builder = ModelContextBuilder::new();
        builder.prompt_text("system", "You are helpful.");
        builder.user_text("user", "Hello");
        builder.set_params(ModelParams::new()
                .with_temperature(0.5)
                .with_top_p(0.75)
                .with_top_k(40));
        builder.set_safety(vec![SafetySetting::new(
            HarmCategory::DangerousContent,
            HarmBlockThreshold::BlockLowAndAbove,
        )]);
        let body = generator().convert_request(&builder.build());

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "You are helpful.");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Hello");
        assert_eq!(body["generationConfig"]["temperature"], 0.5);
        assert_eq!(body["generationConfig"]["topP"], 0.75);
        assert_eq!(body["generationConfig"]["topK"], 40);
        assert_eq!(
            body["safetySettings"][0]["category"],
            "HARM_CATEGORY_DANGEROUS_CONTENT"
        );
        assert_eq!(body["safetySettings"][0]["threshold"], "BLOCK_LOW_AND_ABOVE");
    }

    #[test]
    fn test_convert_request_groups_roles() {
        let mut builder = ModelContextBuilder::new();
        builder.user_text("user", "a");
        builder.user_text("user", "b");
        builder.model_text("bot", "c");
        let body = generator().convert_request(&builder.build());

        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0]["parts"].as_array().unwrap().len(), 2);
        assert_eq!(contents[1]["role"], "model");
    }

    #[test]
    fn test_convert_request_config_defaults() {
        let generator = GeminiGenerator::new(GeminiConfig {
            api_key: "k".into(),
            generate_params: Some(ModelParams::new().with_max_tokens(128)),
            safety_settings: SafetySetting::uniform(HarmBlockThreshold::BlockOnlyHigh),
            ..Default::default()
        });
        let mut builder = ModelContextBuilder::new();
        builder.user_text("user", "hi");
        let body = generator.convert_request(&builder.build());

        assert_eq!(body["generationConfig"]["maxOutputTokens"], 128);
        assert_eq!(body["safetySettings"].as_array().unwrap().len(), 4);
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn test_api_url() {
        let g = generator();
        assert_eq!(
            g.api_url(""),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
        assert!(!g.api_url("").contains("test-key"));
        assert!(g.api_url("gemini-1.5-pro").contains("/models/gemini-1.5-pro:"));
    }

    #[test]
    fn test_parse_response_text() {
        let json = json!({
            "candidates": [{
                "content": {"parts": [{"text": "Hello "}, {"text": "there"}], "role": "model"},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 4, "candidatesTokenCount": 2}
        });
        let generated = parse_response(&json).unwrap();
        assert_eq!(generated.text, "Hello there");
        assert_eq!(generated.status, Status::Done);
        assert_eq!(generated.usage.total(), 6);
    }

    #[test]
    fn test_parse_response_truncated() {
        let json = json!({
            "candidates": [{
                "content": {"parts": [{"text": "partial"}]},
                "finishReason": "MAX_TOKENS"
            }]
        });
        assert_eq!(parse_response(&json).unwrap().status, Status::Truncated);
    }

    #[test]
    fn test_parse_response_candidate_blocked() {
        let json = json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        });
        let generated = parse_response(&json).unwrap();
        assert_eq!(generated.status, Status::Blocked);
        assert!(generated.text.is_empty());
    }

    #[test]
    fn test_parse_response_prompt_blocked() {
        let json = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        let generated = parse_response(&json).unwrap();
        assert_eq!(generated.status, Status::Blocked);
    }

    #[test]
    fn test_parse_response_no_candidates() {
        let err = parse_response(&json!({})).unwrap_err();
        assert!(err.to_string().contains("no candidates"));
    }

    #[test]
    fn test_api_error_message() {
        let body = r#"{"error":{"code":400,"message":"API key not valid"}}"#;
        assert_eq!(api_error_message(body), "API key not valid");
        assert_eq!(api_error_message("bad gateway"), "bad gateway");
    }

    #[tokio::test]
    async fn test_generate_requires_api_key() {
        let generator = GeminiGenerator::new(GeminiConfig::default());
        let ctx = ModelContextBuilder::new().build();
        let err = generator.generate("", &ctx).await.unwrap_err();
        assert!(matches!(err, GenxError::InvalidArguments { .. }));
    }

    #[tokio::test]
    async fn test_transport_error_hides_api_key() {
        let generator = GeminiGenerator::new(GeminiConfig {
            api_key: "SUPERSECRETKEY123".into(),
            base_url: "http://127.0.0.1:1".into(),
            timeout_secs: 5,
            ..Default::default()
        });
        let mut builder = ModelContextBuilder::new();
        builder.user_text("user", "hello");

        let err = generator.generate("", &builder.build()).await.unwrap_err();
        assert!(err.is_transport(), "unexpected: {:?}", err);
        assert!(!err.to_string().contains("SUPERSECRETKEY123"));
        assert!(!format!("{:?}", err).contains("SUPERSECRETKEY123"));
    }
}
