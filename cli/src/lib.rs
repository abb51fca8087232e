//! CLI utilities for ayushbot.
//!
//! Holds the kubectl-style context configuration shared by the binary.

pub mod config;

pub use config::{Config, Context, expand_env, load_config, mask_api_key};
