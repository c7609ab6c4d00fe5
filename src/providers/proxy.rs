//! Client for the hosted lookup proxy that wraps the generative search API.

use crate::core::config::ProxyProviderConfig;
use crate::core::extract::{coerce_inputs, dedup_sources};
use crate::core::fetch::{FetchOutcome, StockDataProvider};
use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

pub struct ProxyProvider {
    url: String,
}

impl ProxyProvider {
    pub fn new(base_url: &str, path: &str) -> Self {
        ProxyProvider {
            url: format!("{}{}", base_url.trim_end_matches('/'), path),
        }
    }

    pub fn from_config(config: &ProxyProviderConfig) -> Self {
        Self::new(&config.base_url, &config.path)
    }
}

#[derive(Serialize, Debug)]
struct ProxyRequest<'a> {
    ticker: &'a str,
}

/// Everything here comes from a model's free text and is validated field by field.
#[derive(Deserialize, Debug)]
struct ProxyResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    sources: Option<Vec<Value>>,
    #[serde(default, rename = "rawText")]
    raw_text: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ProxyError {
    error: String,
}

fn source_field(source: &Value, key: &str) -> Option<String> {
    source.get(key).and_then(Value::as_str).map(str::to_string)
}

#[async_trait]
impl StockDataProvider for ProxyProvider {
    fn name(&self) -> &str {
        "proxy"
    }

    #[instrument(
        name = "ProxyFetch",
        skip(self),
        fields(ticker = %ticker)
    )]
    async fn fetch(&self, ticker: &str) -> Result<FetchOutcome> {
        if ticker.trim().is_empty() {
            bail!("Ticker must not be empty");
        }

        debug!("Requesting stock data from {}", self.url);
        let client = reqwest::Client::builder().user_agent("igcalc/1.0").build()?;
        let response = client
            .post(&self.url)
            .json(&ProxyRequest { ticker })
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for ticker: {}", e, ticker))?;

        let status = response.status();
        let text = response.text().await?;
        debug!(%status, "Received proxy response");

        if !status.is_success() {
            let message = serde_json::from_str::<ProxyError>(&text)
                .map(|body| body.error)
                .unwrap_or_else(|_| format!("Request failed with status {}", status.as_u16()));
            return Err(anyhow!(message));
        }

        let body: ProxyResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse proxy response for {}: {}", ticker, e))?;

        let inputs = match &body.data {
            Some(data @ Value::Object(_)) => Some(coerce_inputs(ticker, data)),
            _ => None,
        };
        let sources = dedup_sources(
            body.sources
                .unwrap_or_default()
                .iter()
                .map(|s| (source_field(s, "title"), source_field(s, "uri"))),
        );

        Ok(FetchOutcome {
            inputs,
            sources,
            raw_text: body.raw_text,
        })
    }
}
