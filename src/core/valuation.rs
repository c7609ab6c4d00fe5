//! Reverse DCF valuation: the growth rate a price implies under CAPM.

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Number of intervals in the sensitivity sweep. The sweep has one more point.
pub const SENSITIVITY_STEPS: usize = 20;
/// Index of the unshifted current price within the sweep.
pub const SENSITIVITY_CURRENT_INDEX: usize = SENSITIVITY_STEPS / 2;
/// Fraction of the current price swept on each side.
const SENSITIVITY_RANGE: f64 = 0.5;

/// Inputs for a single valuation. Rates are decimal fractions (0.042 is 4.2%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialInputs {
    pub ticker: String,
    pub price: f64,
    pub fcf_per_share: f64,
    pub beta: f64,
    pub risk_free_rate: f64,
    pub market_risk_premium: f64,
    pub currency: String,
}

impl Default for FinancialInputs {
    fn default() -> Self {
        FinancialInputs {
            ticker: "EXAMPLE".to_string(),
            price: 150.00,
            fcf_per_share: 7.50,
            beta: 1.10,
            risk_free_rate: 0.042,
            market_risk_premium: 0.055,
            currency: "USD".to_string(),
        }
    }
}

impl FinancialInputs {
    /// True while the inputs are still the built-in example rather than a real ticker.
    pub fn is_example(&self) -> bool {
        self.ticker == FinancialInputs::default().ticker
    }

    pub fn get(&self, field: InputField) -> f64 {
        match field {
            InputField::Price => self.price,
            InputField::FcfPerShare => self.fcf_per_share,
            InputField::Beta => self.beta,
            InputField::RiskFreeRate => self.risk_free_rate,
            InputField::MarketRiskPremium => self.market_risk_premium,
        }
    }

    pub fn set(&mut self, field: InputField, value: f64) {
        let slot = match field {
            InputField::Price => &mut self.price,
            InputField::FcfPerShare => &mut self.fcf_per_share,
            InputField::Beta => &mut self.beta,
            InputField::RiskFreeRate => &mut self.risk_free_rate,
            InputField::MarketRiskPremium => &mut self.market_risk_premium,
        };
        *slot = value;
    }
}

/// The numeric fields a user can edit by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputField {
    Price,
    FcfPerShare,
    Beta,
    RiskFreeRate,
    MarketRiskPremium,
}

impl InputField {
    pub const ALL: [InputField; 5] = [
        InputField::Price,
        InputField::FcfPerShare,
        InputField::RiskFreeRate,
        InputField::Beta,
        InputField::MarketRiskPremium,
    ];

    /// Short human label shown next to the value.
    pub fn label(&self) -> &'static str {
        match self {
            InputField::Price => "Stock Price",
            InputField::FcfPerShare => "FCF per Share (TTM)",
            InputField::Beta => "Beta",
            InputField::RiskFreeRate => "Risk Free Rate",
            InputField::MarketRiskPremium => "Market Risk Premium",
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            InputField::Price => "Current price",
            InputField::FcfPerShare => "Trailing 12 Months",
            InputField::Beta => "5Y Monthly",
            InputField::RiskFreeRate => "US 10Y Treasury",
            InputField::MarketRiskPremium => "Rm - Rf",
        }
    }
}

impl Display for InputField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                InputField::Price => "price",
                InputField::FcfPerShare => "fcf",
                InputField::Beta => "beta",
                InputField::RiskFreeRate => "rf",
                InputField::MarketRiskPremium => "mrp",
            }
        )
    }
}

impl FromStr for InputField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "price" | "p" => Ok(InputField::Price),
            "fcf" | "fcfpershare" | "fcf_per_share" => Ok(InputField::FcfPerShare),
            "beta" => Ok(InputField::Beta),
            "rf" | "riskfreerate" | "risk_free_rate" => Ok(InputField::RiskFreeRate),
            "mrp" | "marketriskpremium" | "market_risk_premium" => {
                Ok(InputField::MarketRiskPremium)
            }
            _ => Err(anyhow!("Invalid input field: {}", s)),
        }
    }
}

/// Derived figures for a set of inputs. Never stored, always recomputed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValuationResult {
    pub cost_of_equity: f64,
    pub implied_growth: f64,
    pub fcf_yield: f64,
}

/// One sample of the implied growth curve at a hypothetical price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensitivityPoint {
    pub price: f64,
    pub growth: f64,
}

/// CAPM required return: `rf + beta * mrp`.
pub fn cost_of_equity(inputs: &FinancialInputs) -> f64 {
    inputs.risk_free_rate + inputs.beta * inputs.market_risk_premium
}

/// `fcf / price`, defined as 0 for a zero price.
pub fn fcf_yield(fcf_per_share: f64, price: f64) -> f64 {
    if price == 0.0 {
        0.0
    } else {
        fcf_per_share / price
    }
}

/// Evaluates `g = Ke - FCF / P`. Degenerate inputs give degenerate numbers, never an error.
pub fn calculate(inputs: &FinancialInputs) -> ValuationResult {
    let cost_of_equity = cost_of_equity(inputs);
    let fcf_yield = fcf_yield(inputs.fcf_per_share, inputs.price);

    ValuationResult {
        cost_of_equity,
        implied_growth: cost_of_equity - fcf_yield,
        fcf_yield,
    }
}

/// Sweeps the price over +/-50% of its current value, holding Ke and FCF fixed.
pub fn sensitivity(inputs: &FinancialInputs, result: &ValuationResult) -> Vec<SensitivityPoint> {
    let start = inputs.price * (1.0 - SENSITIVITY_RANGE);
    let step = inputs.price * SENSITIVITY_RANGE * 2.0 / SENSITIVITY_STEPS as f64;

    (0..=SENSITIVITY_STEPS)
        .map(|i| {
            let price = start + i as f64 * step;
            SensitivityPoint {
                price,
                growth: result.cost_of_equity - fcf_yield(inputs.fcf_per_share, price),
            }
        })
        .collect()
}
