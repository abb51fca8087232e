//! One-shot question.

use clap::Args;

use ayushbot_resolver::Responder;

use super::{build_responder, ResponderArgs};
use crate::Cli;

/// Send one message and print the reply on stdout.
#[derive(Args)]
pub struct AskCommand {
    /// Message text; multiple words are joined with spaces
    #[arg(required = true, num_args = 1..)]
    text: Vec<String>,

    #[command(flatten)]
    responder: ResponderArgs,
}

impl AskCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let responder = build_responder(cli, &self.responder)?;
        let reply = responder.respond(&self.text.join(" ")).await;
        println!("{}", reply);
        Ok(())
    }
}
