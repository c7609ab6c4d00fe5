use super::{report, ui};
use crate::core::{InputField, Session, StockDataProvider};
use anyhow::{Result, anyhow, bail};
use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

const HELP: &str = "Commands:
  search [TICKER]      fetch inputs for TICKER (or the current ticker)
  ticker <TEXT>        set the ticker to search for
  set <KEY> <VALUE>    edit an input (keys: price, fcf, rf, beta, mrp)
  reset                restore the example inputs
  show                 print the current valuation
  help                 print this help
  quit                 leave the session";

/// One line of user input in an interactive session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Search(Option<String>),
    Ticker(String),
    Set(InputField, String),
    Reset,
    Show,
    Help,
    Quit,
}

impl FromStr for SessionCommand {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let command = parts
            .next()
            .ok_or_else(|| anyhow!("Empty command"))?
            .to_lowercase();
        let rest: Vec<&str> = parts.collect();

        match (command.as_str(), rest.as_slice()) {
            ("search" | "s", []) => Ok(SessionCommand::Search(None)),
            ("search" | "s", [ticker]) => Ok(SessionCommand::Search(Some(ticker.to_string()))),
            ("ticker" | "t", [ticker]) => Ok(SessionCommand::Ticker(ticker.to_string())),
            ("set", [field, value]) => Ok(SessionCommand::Set(field.parse()?, value.to_string())),
            ("reset", []) => Ok(SessionCommand::Reset),
            ("show", []) => Ok(SessionCommand::Show),
            ("help" | "?", []) => Ok(SessionCommand::Help),
            ("quit" | "exit" | "q", []) => Ok(SessionCommand::Quit),
            ("search" | "s" | "ticker" | "t" | "set", _) => {
                bail!("Wrong number of arguments for '{}'. Type 'help'.", command)
            }
            _ => bail!("Unknown command '{}'. Type 'help'.", command),
        }
    }
}

/// Looks up the session's ticker behind a spinner.
pub async fn search(session: &mut Session, provider: &(dyn StockDataProvider + Send + Sync)) {
    let pb = ui::new_spinner(&format!("Searching {}...", session.ticker().trim()));
    session.search(provider).await;
    pb.finish_and_clear();
}

/// Applies one command. Returns false once the session should end.
pub async fn apply(
    session: &mut Session,
    command: SessionCommand,
    provider: &(dyn StockDataProvider + Send + Sync),
) -> bool {
    debug!(?command, "Applying session command");
    match command {
        SessionCommand::Search(ticker) => {
            if let Some(ticker) = ticker {
                session.set_ticker(&ticker);
            }
            if session.can_search() {
                search(session, provider).await;
                println!("{}", report::render_session(session, provider.name()));
            } else {
                println!(
                    "{}",
                    ui::style_text("Enter a ticker first, e.g. 'search AAPL'.", ui::StyleType::Error)
                );
            }
        }
        SessionCommand::Ticker(ticker) => session.set_ticker(&ticker),
        SessionCommand::Set(field, value) => {
            if session.edit_field(field, &value) {
                println!("{}", report::render_valuation(session.inputs(), &session.valuation()));
            }
        }
        SessionCommand::Reset => {
            session.reset();
            println!("{}", report::render_session(session, provider.name()));
        }
        SessionCommand::Show => println!("{}", report::render_session(session, provider.name())),
        SessionCommand::Help => println!("{HELP}"),
        SessionCommand::Quit => return false,
    }
    true
}

/// Reads commands line by line until `quit` or end of input.
pub async fn run<R>(
    session: &mut Session,
    provider: &(dyn StockDataProvider + Send + Sync),
    reader: R,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    println!("{}", report::render_session(session, provider.name()));
    println!("\n{}", ui::style_text("Type 'help' for commands.", ui::StyleType::Subtle));

    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<SessionCommand>() {
            Ok(command) => {
                if !apply(session, command, provider).await {
                    break;
                }
            }
            Err(e) => println!("{}", ui::style_text(&e.to_string(), ui::StyleType::Error)),
        }
        ui::print_separator();
    }
    Ok(())
}
