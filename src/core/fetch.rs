//! Data fetch abstractions and core types

use crate::core::valuation::FinancialInputs;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A web page the search grounded its answer on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationSource {
    pub title: String,
    pub uri: String,
}

impl CitationSource {
    /// Host part of the URI, or the URI itself when it does not parse.
    pub fn hostname(&self) -> String {
        reqwest::Url::parse(&self.uri)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_else(|| self.uri.clone())
    }
}

/// Result of one fetch call. `inputs` is `None` when the search found nothing usable.
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    pub inputs: Option<FinancialInputs>,
    pub sources: Vec<CitationSource>,
    pub raw_text: Option<String>,
}

#[async_trait]
pub trait StockDataProvider: Send + Sync {
    /// Short name used in the footer and in logs.
    fn name(&self) -> &str;

    async fn fetch(&self, ticker: &str) -> Result<FetchOutcome>;
}
