use super::ui;
use crate::core::valuation::SENSITIVITY_CURRENT_INDEX;
use crate::core::{
    CitationSource, FinancialInputs, InputField, SensitivityPoint, Session, ValuationResult,
};
use comfy_table::{Attribute, Cell};

fn headline_label(inputs: &FinancialInputs) -> String {
    if inputs.is_example() {
        "Implied Growth (Example)".to_string()
    } else {
        format!("Implied Growth ({})", inputs.ticker)
    }
}

/// The headline figure, its explanation and the two components.
pub fn render_valuation(inputs: &FinancialInputs, result: &ValuationResult) -> String {
    let growth = ui::percent(result.implied_growth);
    let styled_growth = if result.implied_growth < 0.0 {
        ui::style_text(&growth, ui::StyleType::Negative)
    } else {
        ui::style_text(&growth, ui::StyleType::Headline)
    };

    let mut output = format!(
        "{}\n\n  {} perpetuity\n\n",
        ui::style_text(&headline_label(inputs), ui::StyleType::Title),
        styled_growth
    );
    output.push_str(&format!(
        "The market is currently pricing {} as if its Free Cash Flow will grow at {} annually forever.\n\n",
        inputs.ticker, growth
    ));

    let mut table = ui::new_styled_table();
    table.add_row(vec![
        Cell::new("Cost of Equity (Ke)"),
        ui::number_cell(ui::percent(result.cost_of_equity)),
    ]);
    table.add_row(vec![
        Cell::new("FCF Yield"),
        ui::number_cell(ui::percent(result.fcf_yield)),
    ]);
    table.add_row(vec![
        Cell::new("g = Ke - (FCF / P)"),
        Cell::new("Ke = Rf + β × MRP"),
    ]);
    output.push_str(&table.to_string());
    output
}

fn format_input(inputs: &FinancialInputs, field: InputField) -> String {
    let value = inputs.get(field);
    match field {
        InputField::Price => format!("{value:.2} {}", inputs.currency),
        InputField::FcfPerShare | InputField::Beta => format!("{value:.2}"),
        InputField::RiskFreeRate | InputField::MarketRiskPremium => {
            format!("{value:.3} ({})", ui::percent(value))
        }
    }
}

/// Editable model inputs with the key `set` expects for each.
pub fn render_inputs(inputs: &FinancialInputs) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Key"),
        ui::header_cell("Input"),
        ui::header_cell("Value"),
        ui::header_cell("Note"),
    ]);

    for field in InputField::ALL {
        table.add_row(vec![
            Cell::new(field.to_string()),
            Cell::new(field.label()),
            ui::number_cell(format_input(inputs, field)),
            Cell::new(field.hint()),
        ]);
    }

    format!(
        "{}\n\n{}",
        ui::style_text("Model Inputs", ui::StyleType::Title),
        table
    )
}

/// Implied growth across the swept prices, current price highlighted.
pub fn render_sensitivity(inputs: &FinancialInputs, points: &[SensitivityPoint]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell(&format!("Stock Price ({})", inputs.currency)),
        ui::header_cell("Implied Growth"),
        ui::header_cell(""),
    ]);

    for (i, point) in points.iter().enumerate() {
        let mut price = ui::number_cell(format!("{:.2}", point.price));
        let marker = if i == SENSITIVITY_CURRENT_INDEX {
            price = price.add_attribute(Attribute::Bold);
            Cell::new("current").add_attribute(Attribute::Bold)
        } else {
            Cell::new("")
        };
        table.add_row(vec![price, ui::growth_cell(point.growth), marker]);
    }

    format!(
        "{}\n\n{}",
        ui::style_text("Sensitivity: Growth (g) vs Stock Price", ui::StyleType::Title),
        table
    )
}

pub fn render_sources(sources: &[CitationSource]) -> String {
    if sources.is_empty() {
        return ui::style_text(
            "Search for a stock ticker to automatically fetch sources and data.",
            ui::StyleType::Subtle,
        );
    }

    let mut output = format!(
        "{}\n",
        ui::style_text("Data Sources", ui::StyleType::Title)
    );
    for source in sources {
        output.push_str(&format!(
            "\n  {}\n  {}\n",
            source.title,
            ui::style_text(&source.hostname(), ui::StyleType::Subtle)
        ));
    }
    output
}

/// Disclaimer line; names the provider when the inputs came from a lookup.
pub fn render_footer(fetched_by: Option<&str>) -> String {
    let mode = match fetched_by {
        Some(provider) => format!("Data provided by {provider} via Google Search."),
        None => "Manual Calculation Mode.".to_string(),
    };
    ui::style_text(
        &format!(
            "{mode} Financial figures are estimates and should not be used for investment advice."
        ),
        ui::StyleType::Subtle,
    )
}

/// Full view of a session: alert, valuation, inputs, sensitivity, sources, footer.
pub fn render_session(session: &Session, provider_name: &str) -> String {
    let inputs = session.inputs();
    let mut sections = Vec::new();

    if let Some(alert) = session.alert() {
        sections.push(ui::style_text(alert.message(), ui::StyleType::Error));
    }
    sections.push(render_valuation(inputs, &session.valuation()));
    sections.push(render_inputs(inputs));
    sections.push(render_sensitivity(inputs, &session.sensitivity()));
    sections.push(render_sources(session.sources()));
    sections.push(render_footer(session.outcome().map(|_| provider_name)));

    sections.join("\n\n")
}
