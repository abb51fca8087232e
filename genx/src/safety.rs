//! Safety policy sent alongside generation requests.
//!
//! Serialized names follow the Gemini REST API so the same values can be
//! written in YAML configs and forwarded verbatim.

use serde::{Deserialize, Serialize};

/// Category of potentially harmful content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HarmCategory {
    #[serde(rename = "HARM_CATEGORY_HARASSMENT", alias = "harassment")]
    Harassment,
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH", alias = "hate_speech")]
    HateSpeech,
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT", alias = "sexually_explicit")]
    SexuallyExplicit,
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT", alias = "dangerous_content")]
    DangerousContent,
    #[serde(rename = "HARM_CATEGORY_CIVIC_INTEGRITY", alias = "civic_integrity")]
    CivicIntegrity,
}

/// Probability at or above which content is blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HarmBlockThreshold {
    #[serde(rename = "BLOCK_LOW_AND_ABOVE", alias = "low_and_above")]
    BlockLowAndAbove,
    #[serde(rename = "BLOCK_MEDIUM_AND_ABOVE", alias = "medium_and_above")]
    BlockMediumAndAbove,
    #[serde(rename = "BLOCK_ONLY_HIGH", alias = "only_high")]
    BlockOnlyHigh,
    #[serde(rename = "BLOCK_NONE", alias = "none")]
    BlockNone,
    #[serde(rename = "OFF", alias = "off")]
    Off,
}

/// One (category, threshold) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmBlockThreshold,
}

impl SafetySetting {
    pub fn new(category: HarmCategory, threshold: HarmBlockThreshold) -> Self {
        Self {
            category,
            threshold,
        }
    }

    /// Apply the same threshold to every category.
    pub fn uniform(threshold: HarmBlockThreshold) -> Vec<SafetySetting> {
        [
            HarmCategory::Harassment,
            HarmCategory::HateSpeech,
            HarmCategory::SexuallyExplicit,
            HarmCategory::DangerousContent,
        ]
        .into_iter()
        .map(|category| SafetySetting::new(category, threshold))
        .collect()
    }
}
