use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use igcalc::core::FinancialInputs;
use igcalc::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Model inputs; anything left out comes from the built-in example.
#[derive(Args)]
struct CalcArgs {
    /// Ticker shown in the report
    #[arg(long)]
    ticker: Option<String>,
    /// Current stock price
    #[arg(long)]
    price: Option<f64>,
    /// Trailing twelve months free cash flow per share
    #[arg(long, allow_negative_numbers = true)]
    fcf: Option<f64>,
    /// Beta against the market
    #[arg(long, allow_negative_numbers = true)]
    beta: Option<f64>,
    /// Risk free rate as a decimal, e.g. 0.042
    #[arg(long)]
    rf: Option<f64>,
    /// Market risk premium as a decimal, e.g. 0.055
    #[arg(long)]
    mrp: Option<f64>,
    /// Currency of the price
    #[arg(long)]
    currency: Option<String>,
}

impl From<CalcArgs> for FinancialInputs {
    fn from(args: CalcArgs) -> FinancialInputs {
        let defaults = FinancialInputs::default();
        FinancialInputs {
            ticker: args.ticker.map_or(defaults.ticker, |t| t.to_uppercase()),
            price: args.price.unwrap_or(defaults.price),
            fcf_per_share: args.fcf.unwrap_or(defaults.fcf_per_share),
            beta: args.beta.unwrap_or(defaults.beta),
            risk_free_rate: args.rf.unwrap_or(defaults.risk_free_rate),
            market_risk_premium: args.mrp.unwrap_or(defaults.market_risk_premium),
            currency: args.currency.unwrap_or(defaults.currency),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Compute the implied growth rate from manual inputs
    Calc(CalcArgs),
    /// Fetch inputs for a ticker and compute its implied growth rate
    Fetch {
        /// Stock ticker, e.g. AAPL
        ticker: String,
        /// Also print the raw search answer
        #[arg(long)]
        raw: bool,
    },
    /// Start an interactive session (default)
    Interactive,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let command = match cli.command {
        Some(Commands::Setup) => {
            let result = igcalc::cli::setup::setup();
            if let Err(e) = &result {
                tracing::error!(error = %e, "Setup failed");
            }
            return result;
        }
        Some(Commands::Calc(args)) => igcalc::AppCommand::Calc(args.into()),
        Some(Commands::Fetch { ticker, raw }) => igcalc::AppCommand::Fetch {
            ticker,
            show_raw: raw,
        },
        Some(Commands::Interactive) | None => igcalc::AppCommand::Interactive,
    };

    let result = igcalc::run_command(command, cli.config_path.as_deref()).await;

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
