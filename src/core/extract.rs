//! Best-effort extraction of financial inputs from loosely structured search output.
//!
//! Everything coming back from the search is treated as untrusted. Numeric fields
//! are coerced permissively and fall back to fixed defaults instead of failing.

use crate::core::fetch::CitationSource;
use crate::core::valuation::FinancialInputs;
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

pub const DEFAULT_PRICE: f64 = 0.0;
pub const DEFAULT_FCF_PER_SHARE: f64 = 0.0;
pub const DEFAULT_BETA: f64 = 1.0;
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.04;
pub const DEFAULT_MARKET_RISK_PREMIUM: f64 = 0.05;
pub const DEFAULT_CURRENCY: &str = "USD";

const CODE_FENCE_JSON: &str = "```json";
const CODE_FENCE: &str = "```";

/// Pulls a JSON value out of free text.
///
/// A fenced json block wins. Otherwise everything between the first `{` and the
/// last `}` is tried. Returns `None` when neither parses.
pub fn parse_code_block(text: &str) -> Option<Value> {
    if let Some(start) = text.find(CODE_FENCE_JSON) {
        let body_start = start + CODE_FENCE_JSON.len();
        if let Some(len) = text[body_start..].find(CODE_FENCE) {
            let body = text[body_start..body_start + len].trim();
            match serde_json::from_str(body) {
                Ok(value) => return Some(value),
                Err(e) => debug!("Failed to parse JSON from code block: {}", e),
            }
        }
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    match serde_json::from_str(&text[start..=end]) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Failed to parse loose JSON: {}", e);
            None
        }
    }
}

/// Reads a number out of an untrusted JSON value.
///
/// Numbers and numeric strings are accepted, booleans count as 1 and 0. A missing,
/// unparsable, non-finite or zero value yields `default`.
pub fn coerce_number(value: Option<&Value>, default: f64) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };

    match parsed {
        Some(n) if n.is_finite() && n != 0.0 => n,
        _ => default,
    }
}

fn coerce_currency(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => DEFAULT_CURRENCY.to_string(),
    }
}

/// Builds inputs from an extracted payload. The ticker always comes from the caller.
pub fn coerce_inputs(ticker: &str, data: &Value) -> FinancialInputs {
    FinancialInputs {
        ticker: ticker.trim().to_uppercase(),
        price: coerce_number(data.get("price"), DEFAULT_PRICE),
        fcf_per_share: coerce_number(data.get("fcfPerShare"), DEFAULT_FCF_PER_SHARE),
        beta: coerce_number(data.get("beta"), DEFAULT_BETA),
        risk_free_rate: coerce_number(data.get("riskFreeRate"), DEFAULT_RISK_FREE_RATE),
        market_risk_premium: coerce_number(
            data.get("marketRiskPremium"),
            DEFAULT_MARKET_RISK_PREMIUM,
        ),
        currency: coerce_currency(data.get("currency")),
    }
}

/// Keeps sources that carry both a title and a URI, first one per URI, in order.
pub fn dedup_sources<I>(sources: I) -> Vec<CitationSource>
where
    I: IntoIterator<Item = (Option<String>, Option<String>)>,
{
    let mut seen = HashSet::new();
    sources
        .into_iter()
        .filter_map(|(title, uri)| match (title, uri) {
            (Some(title), Some(uri)) if !title.is_empty() && !uri.is_empty() => {
                Some(CitationSource { title, uri })
            }
            _ => None,
        })
        .filter(|source| seen.insert(source.uri.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_fenced_block() {
        let text = r#"
Here is the data I found:

```json
{"price": 227.5, "fcfPerShare": 6.9, "currency": "USD"}
```

Values are estimates.
"#;
        let value = parse_code_block(text).unwrap();
        assert_eq!(value["price"], json!(227.5));
        assert_eq!(value["currency"], json!("USD"));
    }

    #[test]
    fn test_parse_loose_object() {
        let text = r#"The numbers are {"price": 10, "beta": 1.3} based on search."#;
        let value = parse_code_block(text).unwrap();
        assert_eq!(value["beta"], json!(1.3));
    }

    #[test]
    fn test_broken_fence_falls_back_to_braces() {
        let text = "```json\n{price: oops}\n```\nActually: {\"price\": 42}";
        // The braces span from the broken block to the valid one, which fails too.
        assert!(parse_code_block(text).is_none());

        let text = "```json\nnot json\n```\n{\"price\": 42}";
        let value = parse_code_block(text).unwrap();
        assert_eq!(value["price"], json!(42));
    }

    #[test]
    fn test_parse_without_json() {
        assert!(parse_code_block("I could not find data for that ticker.").is_none());
        assert!(parse_code_block("} backwards {").is_none());
        assert!(parse_code_block("").is_none());
    }

    #[test]
    fn test_coerce_price() {
        assert_eq!(coerce_number(Some(&json!(150.25)), DEFAULT_PRICE), 150.25);
        assert_eq!(coerce_number(Some(&json!("150.25")), DEFAULT_PRICE), 150.25);
        assert_eq!(coerce_number(Some(&json!("abc")), DEFAULT_PRICE), 0.0);
        assert_eq!(coerce_number(None, DEFAULT_PRICE), 0.0);
    }

    #[test]
    fn test_coerce_fcf_per_share() {
        assert_eq!(coerce_number(Some(&json!(-1.5)), DEFAULT_FCF_PER_SHARE), -1.5);
        assert_eq!(coerce_number(Some(&json!(null)), DEFAULT_FCF_PER_SHARE), 0.0);
        assert_eq!(coerce_number(Some(&json!("n/a")), DEFAULT_FCF_PER_SHARE), 0.0);
    }

    #[test]
    fn test_coerce_beta() {
        assert_eq!(coerce_number(Some(&json!(1.24)), DEFAULT_BETA), 1.24);
        assert_eq!(coerce_number(Some(&json!("unknown")), DEFAULT_BETA), 1.0);
        assert_eq!(coerce_number(Some(&json!(0)), DEFAULT_BETA), 1.0);
        assert_eq!(coerce_number(None, DEFAULT_BETA), 1.0);
    }

    #[test]
    fn test_coerce_risk_free_rate() {
        assert_eq!(
            coerce_number(Some(&json!(" 0.0431 ")), DEFAULT_RISK_FREE_RATE),
            0.0431
        );
        assert_eq!(coerce_number(Some(&json!([])), DEFAULT_RISK_FREE_RATE), 0.04);
        assert_eq!(coerce_number(None, DEFAULT_RISK_FREE_RATE), 0.04);
    }

    #[test]
    fn test_coerce_market_risk_premium() {
        assert_eq!(
            coerce_number(Some(&json!(0.055)), DEFAULT_MARKET_RISK_PREMIUM),
            0.055
        );
        assert_eq!(
            coerce_number(Some(&json!("NaN")), DEFAULT_MARKET_RISK_PREMIUM),
            0.05
        );
        assert_eq!(
            coerce_number(Some(&json!({"value": 0.06})), DEFAULT_MARKET_RISK_PREMIUM),
            0.05
        );
    }

    #[test]
    fn test_coerce_bool() {
        assert_eq!(coerce_number(Some(&json!(true)), DEFAULT_BETA), 1.0);
        assert_eq!(coerce_number(Some(&json!(false)), DEFAULT_RISK_FREE_RATE), 0.04);
    }

    #[test]
    fn test_coerce_inputs() {
        let data = json!({
            "ticker": "SOMETHING-ELSE",
            "price": "abc",
            "fcfPerShare": 6.9,
            "beta": "1.24",
            "currency": "EUR"
        });
        let inputs = coerce_inputs("aapl", &data);

        assert_eq!(inputs.ticker, "AAPL");
        assert_eq!(inputs.price, 0.0);
        assert_eq!(inputs.fcf_per_share, 6.9);
        assert_eq!(inputs.beta, 1.24);
        assert_eq!(inputs.risk_free_rate, 0.04);
        assert_eq!(inputs.market_risk_premium, 0.05);
        assert_eq!(inputs.currency, "EUR");
    }

    #[test]
    fn test_coerce_currency_default() {
        assert_eq!(coerce_inputs("x", &json!({"currency": ""})).currency, "USD");
        assert_eq!(coerce_inputs("x", &json!({"currency": 12})).currency, "USD");
        assert_eq!(coerce_inputs("x", &json!({})).currency, "USD");
    }

    #[test]
    fn test_dedup_sources_keeps_first_per_uri() {
        let sources = vec![
            (Some("t1".to_string()), Some("u1".to_string())),
            (Some("t2".to_string()), Some("u1".to_string())),
            (Some("t3".to_string()), Some("u2".to_string())),
        ];
        let result = dedup_sources(sources);

        assert_eq!(
            result,
            vec![
                CitationSource {
                    title: "t1".to_string(),
                    uri: "u1".to_string()
                },
                CitationSource {
                    title: "t3".to_string(),
                    uri: "u2".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_dedup_sources_drops_incomplete() {
        let sources = vec![
            (None, Some("u1".to_string())),
            (Some("t2".to_string()), None),
            (Some("".to_string()), Some("u3".to_string())),
            (Some("t4".to_string()), Some("u4".to_string())),
        ];
        let result = dedup_sources(sources);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].uri, "u4");
    }
}
