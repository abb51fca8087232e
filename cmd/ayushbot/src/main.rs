//! Ayush Bot CLI - chat with the rule-based bot or its generative variant.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{AskCommand, ChatCommand, ConfigCommand, RulesCommand};

/// Ayush Bot CLI.
///
/// Replies come from a fixed rule set by default. Pass `--llm` to forward
/// messages to Gemini with a persona instead.
///
/// Configuration is stored in ~/.ayushbot/ayushbot/ and supports multiple
/// contexts, similar to kubectl's context management.
#[derive(Parser)]
#[command(name = "ayushbot")]
#[command(about = "Chat with Ayush Bot")]
#[command(version)]
pub struct Cli {
    /// Config file (default is ~/.ayushbot/ayushbot/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Context name to use
    #[arg(short = 'c', long, global = true)]
    pub context: Option<String>,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send one message and print the reply
    Ask(AskCommand),
    /// Interactive chat over stdin
    Chat(ChatCommand),
    /// Print or check the effective rule set
    Rules(RulesCommand),
    /// Manage CLI configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Ask(cmd) => cmd.run(&cli).await,
        Commands::Chat(cmd) => cmd.run(&cli).await,
        Commands::Rules(cmd) => cmd.run(&cli).await,
        Commands::Config(cmd) => cmd.run(&cli).await,
    }
}
