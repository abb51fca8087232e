//! Interactive chat.

use std::io::Write;

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};

use ayushbot_resolver::Conversation;

use super::{build_responder, ResponderArgs};
use crate::Cli;

/// Chat line by line over stdin.
///
/// Blank lines are ignored. `/history` prints the transcript, `/clear`
/// forgets it and `/quit` exits.
#[derive(Args)]
pub struct ChatCommand {
    #[command(flatten)]
    responder: ResponderArgs,
}

enum Line<'a> {
    Blank,
    Quit,
    History,
    Clear,
    Message(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    match line.trim() {
        "" => Line::Blank,
        "/quit" | "/exit" => Line::Quit,
        "/history" => Line::History,
        "/clear" => Line::Clear,
        _ => Line::Message(line),
    }
}

impl ChatCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let responder = build_responder(cli, &self.responder)?;
        let mut conv = Conversation::new(responder);

        eprintln!("Ayush Bot. Type /quit to exit.");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            prompt()?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            match classify(&line) {
                Line::Blank => continue,
                Line::Quit => break,
                Line::History => println!("{}", conv.render()),
                Line::Clear => conv.clear(),
                Line::Message(text) => {
                    if let Some(reply) = conv.send(text).await {
                        println!("{}", reply.text);
                    }
                }
            }
        }
        Ok(())
    }
}

fn prompt() -> anyhow::Result<()> {
    let mut stderr = std::io::stderr();
    write!(stderr, "> ")?;
    stderr.flush()?;
    Ok(())
}
