//! Direct lookup through the Gemini API with Google Search grounding.
//!
//! Used when no proxy is deployed. The API key is resolved in this order:
//! - `api_key` from the config file
//! - `API_KEY` environment variable
//! - `GEMINI_API_KEY` environment variable

use crate::core::config::GeminiProviderConfig;
use crate::core::extract::{coerce_inputs, dedup_sources, parse_code_block};
use crate::core::fetch::{FetchOutcome, StockDataProvider};
use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

pub struct GeminiProvider {
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiProvider {
    pub fn new(base_url: &str, model: &str, api_key: Option<String>) -> Self {
        GeminiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        }
    }

    pub fn from_config(config: &GeminiProviderConfig) -> Self {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("API_KEY").ok())
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .filter(|key| !key.trim().is_empty());
        Self::new(&config.base_url, &config.model, api_key)
    }
}

fn build_prompt(ticker: &str) -> String {
    format!(
        r#"I need to calculate the implicit growth rate for the stock "{ticker}".
Please search specifically for the following latest financial data for {ticker}:
1. Current Stock Price.
2. Free Cash Flow (FCF) per share (Trailing Twelve Months - TTM). If FCF per share is not explicitly stated, look for Total Free Cash Flow and Shares Outstanding to calculate it.
3. Beta (5-year Monthly).
4. Current Risk Free Rate (use the US 10-Year Treasury Yield).
5. Equity Risk Premium (Market Risk Premium) for the appropriate market (default to US if not specified, typically around 4.5% to 6.0%).

Return the data in a JSON object strictly following this schema inside a markdown code block:
```json
{{
  "price": number,
  "fcfPerShare": number,
  "beta": number,
  "riskFreeRate": number (decimal, e.g. 0.042 for 4.2%),
  "marketRiskPremium": number (decimal, e.g. 0.05 for 5%),
  "currency": string (e.g. "USD")
}}
```

If you cannot find an exact number, make a reasonable estimate based on the search results and recently available data."#
    )
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Option<Vec<GroundingChunk>>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebChunk>,
}

#[derive(Debug, Deserialize)]
struct WebChunk {
    uri: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[async_trait]
impl StockDataProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(
        name = "GeminiFetch",
        skip(self),
        fields(ticker = %ticker, model = %self.model)
    )]
    async fn fetch(&self, ticker: &str) -> Result<FetchOutcome> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            anyhow!("API Key is missing. Please configure the API_KEY environment variable.")
        })?;
        if ticker.trim().is_empty() {
            bail!("Ticker must not be empty");
        }

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        debug!("Requesting grounded search from {}", url);

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(ticker),
                }],
            }],
            tools: vec![Tool {
                google_search: serde_json::json!({}),
            }],
        };

        let client = reqwest::Client::builder().user_agent("igcalc/1.0").build()?;
        let response = client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for ticker: {}", e, ticker))?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("Request failed with status {}", status.as_u16()));
            return Err(anyhow!(message));
        }

        let data: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| anyhow!("Failed to parse Gemini response for {}: {}", ticker, e))?;

        let candidate = data.candidates.unwrap_or_default().into_iter().next();
        let text: String = candidate
            .as_ref()
            .and_then(|c| c.content.as_ref())
            .and_then(|content| content.parts.as_ref())
            .map(|parts| parts.iter().filter_map(|p| p.text.as_deref()).collect())
            .unwrap_or_default();

        let sources = dedup_sources(
            candidate
                .and_then(|c| c.grounding_metadata)
                .and_then(|m| m.grounding_chunks)
                .unwrap_or_default()
                .into_iter()
                .filter_map(|chunk| chunk.web)
                .map(|web| (web.title, web.uri)),
        );

        let inputs = match parse_code_block(&text) {
            Some(data @ Value::Object(_)) => Some(coerce_inputs(ticker, &data)),
            _ => None,
        };
        debug!(found = inputs.is_some(), sources = sources.len(), "Parsed Gemini answer");

        Ok(FetchOutcome {
            inputs,
            sources,
            raw_text: Some(text),
        })
    }
}
