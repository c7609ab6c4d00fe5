//! State of one interactive calculator session.

use crate::core::alert::FetchAlert;
use crate::core::fetch::{CitationSource, FetchOutcome, StockDataProvider};
use crate::core::valuation::{
    self, FinancialInputs, InputField, SensitivityPoint, ValuationResult,
};
use anyhow::Result;
use tracing::{debug, error, info};

/// Most citations shown for one lookup.
pub const MAX_DISPLAYED_SOURCES: usize = 5;

/// Single source of truth for the presentation layer.
///
/// The valuation is never cached; every read recomputes it from `inputs`.
#[derive(Debug, Default)]
pub struct Session {
    inputs: FinancialInputs,
    ticker: String,
    loading: bool,
    alert: Option<FetchAlert>,
    outcome: Option<FetchOutcome>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inputs(&self) -> &FinancialInputs {
        &self.inputs
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn alert(&self) -> Option<FetchAlert> {
        self.alert
    }

    pub fn outcome(&self) -> Option<&FetchOutcome> {
        self.outcome.as_ref()
    }

    pub fn valuation(&self) -> ValuationResult {
        valuation::calculate(&self.inputs)
    }

    pub fn sensitivity(&self) -> Vec<SensitivityPoint> {
        valuation::sensitivity(&self.inputs, &self.valuation())
    }

    /// Citations from the last successful lookup, capped for display.
    pub fn sources(&self) -> &[CitationSource] {
        match &self.outcome {
            Some(outcome) => {
                let len = outcome.sources.len().min(MAX_DISPLAYED_SOURCES);
                &outcome.sources[..len]
            }
            None => &[],
        }
    }

    pub fn set_ticker(&mut self, ticker: &str) {
        self.ticker = ticker.to_string();
    }

    /// True when a ticker has been entered.
    ///
    /// `search` holds `&mut self` until the lookup completes, so no second search can
    /// start meanwhile. The CLI shows a spinner for that window.
    pub fn can_search(&self) -> bool {
        !self.ticker.trim().is_empty()
    }

    /// Applies a manual edit. Text that is not a number leaves the field as it was.
    pub fn edit_field(&mut self, field: InputField, text: &str) -> bool {
        match text.trim().parse::<f64>() {
            Ok(value) if !value.is_nan() => {
                debug!(%field, value, "Field edited");
                self.inputs.set(field, value);
                true
            }
            _ => {
                debug!(%field, text, "Ignoring non-numeric edit");
                false
            }
        }
    }

    /// Restores the example inputs and forgets the last lookup.
    pub fn reset(&mut self) {
        self.inputs = FinancialInputs::default();
        self.ticker.clear();
        self.outcome = None;
        self.alert = None;
    }

    /// Looks up the current ticker. Failures only ever touch the alert.
    pub async fn search(&mut self, provider: &(dyn StockDataProvider + Send + Sync)) {
        let ticker = self.ticker.trim().to_string();
        if ticker.is_empty() {
            return;
        }

        self.loading = true;
        self.alert = None;
        self.outcome = None;

        let result = provider.fetch(&ticker).await;
        self.apply_result(result);
    }

    /// Folds the result of a lookup into the session and ends the loading state.
    pub fn apply_result(&mut self, result: Result<FetchOutcome>) {
        self.loading = false;
        self.alert = None;
        self.outcome = None;

        match result {
            Ok(outcome) => match outcome.inputs.clone() {
                Some(inputs) => {
                    info!(ticker = %inputs.ticker, sources = outcome.sources.len(), "Inputs updated from lookup");
                    self.inputs = inputs;
                    self.outcome = Some(outcome);
                }
                None => {
                    debug!(raw_text = ?outcome.raw_text, "Lookup returned no usable data");
                    self.alert = Some(FetchAlert::InsufficientData);
                }
            },
            Err(e) => {
                let message = format!("{e:#}");
                error!(error = %message, "Lookup failed");
                self.alert = Some(FetchAlert::from_error(&e));
            }
        }
    }
}
