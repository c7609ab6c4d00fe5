pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::{FinancialInputs, Session, StockDataProvider};
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    /// Value manually supplied inputs once.
    Calc(FinancialInputs),
    /// Look up a ticker once.
    Fetch { ticker: String, show_raw: bool },
    /// Line driven session on stdin.
    Interactive,
}

fn load_provider(config_path: Option<&str>) -> Result<Box<dyn StockDataProvider + Send + Sync>> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    Ok(providers::from_config(&config))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Implicit growth calculator starting...");

    match command {
        AppCommand::Calc(inputs) => cli::calc::run(&inputs),
        AppCommand::Fetch { ticker, show_raw } => {
            let provider = load_provider(config_path)?;
            cli::fetch::run(provider.as_ref(), &ticker, show_raw).await
        }
        AppCommand::Interactive => {
            let provider = load_provider(config_path)?;
            let mut session = Session::new();
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            cli::interactive::run(&mut session, provider.as_ref(), stdin).await
        }
    }
}
