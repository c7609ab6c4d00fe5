use super::report;
use crate::core::{FinancialInputs, valuation};
use anyhow::Result;
use tracing::debug;

/// Prints the valuation of manually supplied inputs.
pub fn run(inputs: &FinancialInputs) -> Result<()> {
    debug!(?inputs, "Manual calculation");
    let result = valuation::calculate(inputs);
    let points = valuation::sensitivity(inputs, &result);

    println!("{}", report::render_valuation(inputs, &result));
    println!("\n{}", report::render_inputs(inputs));
    println!("\n{}", report::render_sensitivity(inputs, &points));
    println!("\n{}", report::render_footer(None));
    Ok(())
}
