//! CLI commands module.

mod ask;
mod chat;
mod config;
mod rules;
mod util;

pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use config::ConfigCommand;
pub use rules::RulesCommand;

pub(crate) use util::*;
