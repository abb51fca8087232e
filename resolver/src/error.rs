//! Errors raised while loading configuration.
//!
//! Resolving a reply never fails; these only surface when a rule set or a
//! persona is built.

use std::path::PathBuf;

use ayushbot_genx::HarmCategory;
use thiserror::Error;

/// Error building or loading a [`RuleSet`](crate::RuleSet).
#[derive(Error, Debug)]
pub enum RuleSetError {
    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported rule file: {0} (want .yaml, .yml or .json)")]
    UnsupportedFormat(PathBuf),

    #[error("default response is empty")]
    EmptyDefault,

    #[error("exact key is empty")]
    EmptyKey,

    #[error("duplicate exact key after normalization: {0:?}")]
    DuplicateKey(String),

    #[error("duplicate rule name: {0}")]
    DuplicateRule(String),

    #[error("empty response for {0:?}")]
    EmptyResponse(String),

    #[error("rule {rule}: {message}")]
    InvalidPredicate { rule: String, message: String },
}

/// Error building a [`Persona`](crate::Persona).
#[derive(Error, Debug)]
pub enum PersonaError {
    #[error("system instruction is empty")]
    EmptyInstruction,

    #[error("{0} is empty")]
    EmptyReply(&'static str),

    #[error("safety category listed twice: {0:?}")]
    DuplicateSafety(HarmCategory),

    #[error("prompt template: {0}")]
    Template(#[from] minijinja::Error),

    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
