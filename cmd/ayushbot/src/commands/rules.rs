//! Rule-set inspection.

use clap::Args;

use ayushbot_resolver::Matched;

use super::{get_context, load_rules, print_success};
use crate::Cli;

/// Print the effective rule set as YAML.
#[derive(Args)]
pub struct RulesCommand {
    /// Rule-set file (YAML or JSON) or built-in name
    #[arg(long)]
    rules: Option<String>,

    /// Only validate, print a summary
    #[arg(long)]
    check: bool,

    /// Show which entry answers this text instead of printing the rules
    #[arg(long, value_name = "TEXT")]
    explain: Option<String>,
}

impl RulesCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = get_context(cli)?;
        let set = load_rules(self.rules.as_deref(), ctx.as_ref())?;

        if let Some(text) = &self.explain {
            let r = set.resolve(text);
            let source = match r.matched {
                Matched::Exact(key) => format!("exact \"{}\"", key),
                Matched::Rule(name) => format!("rule {}", name),
                Matched::Default => "default".to_string(),
            };
            println!("{}\n{}", source, r.response);
            return Ok(());
        }

        if self.check {
            set.validate()?;
            print_success(&format!(
                "Rule set \"{}\" is valid ({} exact, {} rules)",
                set.name(),
                set.exact_len(),
                set.rules().len()
            ));
            return Ok(());
        }

        print!("{}", serde_yaml::to_string(&set.to_file())?);
        Ok(())
    }
}
