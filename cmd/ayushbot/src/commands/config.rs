//! Configuration management commands.

use clap::{Args, Subcommand};

use ayushbot_cli::config::{mask_api_key, Context as CliContext};

use super::{get_config, print_success};
use crate::Cli;

/// Manage CLI configuration.
///
/// Contexts hold backend credentials and defaults, similar to kubectl's
/// context management.
///
/// Configuration is stored in ~/.ayushbot/ayushbot/config.yaml
#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// Add or replace a context
    #[command(name = "add-context")]
    AddContext {
        /// Context name
        name: String,
        /// API key, or $VAR to read it from the environment
        #[arg(long)]
        api_key: Option<String>,
        /// Model name
        #[arg(long)]
        model: Option<String>,
        /// API base URL
        #[arg(long)]
        base_url: Option<String>,
        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
        /// Sampling temperature
        #[arg(long)]
        temperature: Option<f32>,
        /// Persona preset or file
        #[arg(long)]
        persona: Option<String>,
        /// Rule-set file
        #[arg(long)]
        rules: Option<String>,
    },
    /// Delete a context
    #[command(name = "delete-context")]
    DeleteContext {
        /// Context name
        name: String,
    },
    /// Set the current context
    #[command(name = "use-context")]
    UseContext {
        /// Context name
        name: String,
    },
    /// Display the current context
    #[command(name = "get-context")]
    GetContext,
    /// List all contexts
    #[command(name = "list-contexts", alias = "get-contexts")]
    ListContexts,
    /// View the current configuration
    View,
}

impl ConfigCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            ConfigSubcommand::AddContext {
                name,
                api_key,
                model,
                base_url,
                timeout,
                temperature,
                persona,
                rules,
            } => {
                let mut cfg = get_config(cli)?;
                let ctx = CliContext {
                    api_key: api_key.clone().unwrap_or_default(),
                    model: model.clone().unwrap_or_default(),
                    base_url: base_url.clone().unwrap_or_default(),
                    timeout: timeout.unwrap_or(0),
                    temperature: *temperature,
                    persona: persona.clone().unwrap_or_default(),
                    rules: rules.clone().unwrap_or_default(),
                    ..Default::default()
                };
                cfg.add_context(name, ctx)?;
                print_success(&format!("Context \"{}\" added successfully", name));
                Ok(())
            }

            ConfigSubcommand::DeleteContext { name } => {
                let mut cfg = get_config(cli)?;
                cfg.delete_context(name)?;
                print_success(&format!("Context \"{}\" deleted", name));
                Ok(())
            }

            ConfigSubcommand::UseContext { name } => {
                let mut cfg = get_config(cli)?;
                cfg.use_context(name)?;
                print_success(&format!("Switched to context \"{}\"", name));
                Ok(())
            }

            ConfigSubcommand::GetContext => {
                let cfg = get_config(cli)?;
                if cfg.current_context.is_empty() {
                    println!("No current context set");
                } else {
                    println!("{}", cfg.current_context);
                }
                Ok(())
            }

            ConfigSubcommand::ListContexts => {
                let cfg = get_config(cli)?;
                if cfg.contexts.is_empty() {
                    println!("No contexts configured");
                    return Ok(());
                }

                println!("{:<8} {:<20} {:<24} {}", "CURRENT", "NAME", "MODEL", "PERSONA");
                for name in cfg.list_contexts() {
                    let Some(ctx) = cfg.contexts.get(name) else {
                        continue;
                    };
                    let current = if name == cfg.current_context { "*" } else { "" };
                    let model = if ctx.model.is_empty() { "(default)" } else { &ctx.model };
                    let persona = if ctx.persona.is_empty() { "(default)" } else { &ctx.persona };
                    println!("{:<8} {:<20} {:<24} {}", current, name, model, persona);
                }
                Ok(())
            }

            ConfigSubcommand::View => {
                let cfg = get_config(cli)?;

                println!("Config file: {}", cfg.path().display());
                println!("Current context: {}", cfg.current_context);
                println!("Contexts: {}", cfg.contexts.len());

                for name in cfg.list_contexts() {
                    let Some(ctx) = cfg.contexts.get(name) else {
                        continue;
                    };
                    println!("\n  {}:", name);
                    if ctx.api_key.starts_with('$') {
                        println!("    API Key: {}", ctx.api_key);
                    } else {
                        println!("    API Key: {}", mask_api_key(&ctx.api_key));
                    }
                    if !ctx.model.is_empty() {
                        println!("    Model: {}", ctx.model);
                    }
                    if !ctx.base_url.is_empty() {
                        println!("    Base URL: {}", ctx.base_url);
                    }
                    if ctx.timeout > 0 {
                        println!("    Timeout: {}s", ctx.timeout);
                    }
                    if let Some(t) = ctx.temperature {
                        println!("    Temperature: {}", t);
                    }
                    if !ctx.persona.is_empty() {
                        println!("    Persona: {}", ctx.persona);
                    }
                    if !ctx.rules.is_empty() {
                        println!("    Rules: {}", ctx.rules);
                    }
                }
                Ok(())
            }
        }
    }
}
