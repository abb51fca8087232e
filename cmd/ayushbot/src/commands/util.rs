//! Utility functions for CLI commands.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;

use ayushbot_cli::config::{load_config, Config, Context};
use ayushbot_genx::gemini::{GeminiConfig, GeminiGenerator};
use ayushbot_resolver::{builtin, DelegatingResponder, Persona, Responder, RuleResponder, RuleSet};

use crate::Cli;

const APP_NAME: &str = "ayushbot";

/// Persona used with `--llm` when neither the flag nor the context names one.
const DEFAULT_PERSONA: &str = "assistant";

/// Flags shared by commands that produce replies.
#[derive(Args, Debug, Clone, Default)]
pub struct ResponderArgs {
    /// Forward messages to Gemini instead of the rule set
    #[arg(long)]
    pub llm: bool,

    /// Rule-set file (YAML or JSON) or built-in name
    #[arg(long)]
    pub rules: Option<String>,

    /// Persona preset (assistant, loyal) or persona YAML file
    #[arg(long)]
    pub persona: Option<String>,

    /// Pause before each rule-based reply, in milliseconds
    #[arg(long, default_value_t = 0)]
    pub delay_ms: u64,
}

/// Gets the global configuration.
pub fn get_config(cli: &Cli) -> anyhow::Result<Config> {
    load_config(APP_NAME, cli.config.as_deref())
}

/// Gets the context to use, if any.
///
/// Unlike the API tools, every command works without a context.
pub fn get_context(cli: &Cli) -> anyhow::Result<Option<Context>> {
    let cfg = get_config(cli)?;
    Ok(cfg.resolve_context(cli.context.as_deref())?.cloned())
}

/// Prints a success message.
pub fn print_success(msg: &str) {
    println!("✓ {}", msg);
}

/// Resolves the rule set from the flag, then the context, then the built-in.
pub fn load_rules(flag: Option<&str>, ctx: Option<&Context>) -> anyhow::Result<Arc<RuleSet>> {
    let source = flag
        .filter(|s| !s.is_empty())
        .or_else(|| ctx.map(|c| c.rules.as_str()).filter(|s| !s.is_empty()));

    match source {
        None => Ok(builtin::loyal()),
        Some(name) => match builtin::by_name(name) {
            Some(set) => Ok(set),
            None => Ok(Arc::new(RuleSet::from_path(name)?)),
        },
    }
}

/// Resolves the persona and applies the context's overrides.
pub fn load_persona(flag: Option<&str>, ctx: Option<&Context>) -> anyhow::Result<Persona> {
    let source = flag
        .filter(|s| !s.is_empty())
        .or_else(|| ctx.map(|c| c.persona.as_str()).filter(|s| !s.is_empty()))
        .unwrap_or(DEFAULT_PERSONA);

    let mut persona = match Persona::preset(source) {
        Some(p) => p,
        None => Persona::from_path(source)?,
    };

    if let Some(ctx) = ctx {
        if !ctx.model.is_empty() {
            persona.model = ctx.model.clone();
        }
        if ctx.timeout > 0 {
            persona.timeout_secs = ctx.timeout;
        }
        if let Some(t) = ctx.temperature {
            persona.params.temperature = Some(t);
        }
    }
    Ok(persona)
}

/// Builds the responder selected by the flags and context.
pub fn build_responder(cli: &Cli, args: &ResponderArgs) -> anyhow::Result<Box<dyn Responder>> {
    let ctx = get_context(cli)?;
    if let Some(ctx) = &ctx {
        tracing::debug!(context = %ctx.name, "using context");
    }

    if !args.llm {
        let rules = load_rules(args.rules.as_deref(), ctx.as_ref())?;
        tracing::debug!(rules = %rules.name(), "rule-based responder");
        let responder = RuleResponder::new(rules).with_delay(Duration::from_millis(args.delay_ms));
        return Ok(Box::new(responder));
    }

    let persona = load_persona(args.persona.as_deref(), ctx.as_ref())?;
    let ctx = ctx.unwrap_or_default();
    let api_key = ctx.resolved_api_key();
    if api_key.is_empty() {
        anyhow::bail!(
            "no API key. Set {} or add a context with 'ayushbot config add-context'",
            ayushbot_cli::config::API_KEY_ENV
        );
    }

    let config = gemini_config(api_key, &ctx, &persona);
    tracing::debug!(persona = %persona.name, model = %config.model, "delegating responder");
    let responder = DelegatingResponder::new(GeminiGenerator::new(config), persona)?;
    Ok(Box::new(responder))
}

/// Gemini settings for one persona. The responder enforces the persona's
/// timeout, so the generator runs without its own.
fn gemini_config(api_key: String, ctx: &Context, persona: &Persona) -> GeminiConfig {
    let mut config = GeminiConfig {
        api_key,
        timeout_secs: 0,
        ..Default::default()
    };
    if !ctx.base_url.is_empty() {
        config.base_url = ctx.base_url.clone();
    }
    if !persona.model.is_empty() {
        config.model = persona.model.clone();
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_default_to_builtin() {
        let rules = load_rules(None, None).unwrap();
        assert_eq!(rules.name(), "loyal");
        let rules = load_rules(Some("loyal"), None).unwrap();
        assert_eq!(rules.name(), "loyal");
    }

    #[test]
    fn test_rules_from_context_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("polite.yaml");
        std::fs::write(&path, "default: Hello.\nexact:\n  hi: Hi there.\n").unwrap();

        let ctx = Context {
            rules: path.to_string_lossy().into_owned(),
            ..Default::default()
        };
        let rules = load_rules(None, Some(&ctx)).unwrap();
        assert_eq!(rules.name(), "polite");
        assert_eq!(rules.respond("HI"), "Hi there.");

        // The flag wins over the context.
        assert_eq!(load_rules(Some("loyal"), Some(&ctx)).unwrap().name(), "loyal");
    }

    #[test]
    fn test_rules_missing_file() {
        assert!(load_rules(Some("/nonexistent/rules.yaml"), None).is_err());
    }

    #[test]
    fn test_persona_overrides() {
        let ctx = Context {
            persona: "loyal".into(),
            model: "gemini-1.5-pro".into(),
            timeout: 10,
            temperature: Some(0.2),
            ..Default::default()
        };
        let p = load_persona(None, Some(&ctx)).unwrap();
        assert_eq!(p.name, "loyal");
        assert_eq!(p.model, "gemini-1.5-pro");
        assert_eq!(p.timeout_secs, 10);
        assert_eq!(p.params.temperature, Some(0.2));

        let p = load_persona(None, None).unwrap();
        assert_eq!(p.name, "assistant");
        assert_eq!(p.params.temperature, Some(0.5));
    }

    #[test]
    fn test_persona_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pirate.yaml");
        std::fs::write(
            &path,
            "name: pirate\nsystem_instruction: Talk like a pirate.\nprompt_template: \"Arr: {{ prompt }}\"\n",
        )
        .unwrap();
        let p = load_persona(Some(path.to_str().unwrap()), None).unwrap();
        assert_eq!(p.name, "pirate");
        assert_eq!(p.render_prompt("hi").unwrap(), "Arr: hi");
    }

    #[test]
    fn test_gemini_config_single_timeout() {
        let ctx = Context {
            base_url: "http://localhost:8080".into(),
            timeout: 12,
            ..Default::default()
        };
        let persona = load_persona(Some("loyal"), Some(&ctx)).unwrap();
        let config = gemini_config("k".into(), &ctx, &persona);

        assert_eq!(persona.timeout_secs, 12);
        assert_eq!(config.timeout_secs, 0);
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.model, "gemini-2.0-flash");
    }
}
