pub mod gemini;
pub mod proxy;

use crate::core::StockDataProvider;
use crate::core::config::{AppConfig, ProviderKind};
use tracing::debug;

/// Builds the lookup backend selected in the config.
pub fn from_config(config: &AppConfig) -> Box<dyn StockDataProvider + Send + Sync> {
    debug!(provider = ?config.provider, "Selecting data provider");
    match config.provider {
        ProviderKind::Proxy => Box::new(proxy::ProxyProvider::from_config(&config.proxy())),
        ProviderKind::Gemini => Box::new(gemini::GeminiProvider::from_config(&config.gemini())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_selection() {
        let config = AppConfig::default();
        assert_eq!(from_config(&config).name(), "proxy");

        let config = AppConfig {
            provider: ProviderKind::Gemini,
            ..AppConfig::default()
        };
        assert_eq!(from_config(&config).name(), "gemini");
    }
}
