use super::{report, ui};
use crate::core::{Session, StockDataProvider};
use anyhow::{Result, anyhow, bail};

/// Looks up a ticker once and prints the resulting valuation.
///
/// A failed or empty lookup is reported as an error so the exit status reflects it.
pub async fn run(
    provider: &(dyn StockDataProvider + Send + Sync),
    ticker: &str,
    show_raw: bool,
) -> Result<()> {
    if ticker.trim().is_empty() {
        bail!("Ticker must not be empty");
    }

    let pb = ui::new_spinner(&format!("Searching {}...", ticker.trim()));
    let result = provider.fetch(ticker.trim()).await;
    pb.finish_and_clear();

    if show_raw
        && let Some(text) = result.as_ref().ok().and_then(|o| o.raw_text.as_deref())
    {
        println!("{}\n\n{text}\n", ui::style_text("Raw Answer", ui::StyleType::Title));
    }

    let mut session = Session::new();
    session.set_ticker(ticker);
    session.apply_result(result);

    if let Some(alert) = session.alert() {
        return Err(anyhow!(alert));
    }

    println!("{}", report::render_session(&session, provider.name()));
    Ok(())
}
