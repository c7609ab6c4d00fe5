use tracing::info;

// Mock proxy and config helpers shared by the tests below
mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const PROXY_PATH: &str = "/api/stock-data";

    pub async fn create_proxy_mock_server(status: u16, mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(PROXY_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn write_config(dir: &tempfile::TempDir, base_url: &str) -> std::path::PathBuf {
        let config_path = dir.path().join("config.yaml");
        let config_content = format!(
            r#"
provider: proxy
providers:
  proxy:
    base_url: "{base_url}"
    path: "{PROXY_PATH}"
"#
        );
        std::fs::write(&config_path, config_content).expect("Failed to write config file");
        config_path
    }
}

#[test_log::test(tokio::test)]
async fn test_full_fetch_flow_with_mock() {
    let mock_response = r#"{
        "data": {
            "price": 227.35,
            "fcfPerShare": 6.9,
            "beta": 1.24,
            "riskFreeRate": 0.0431,
            "marketRiskPremium": 0.05,
            "currency": "USD"
        },
        "sources": [{"title": "Apple Quote", "uri": "https://finance.yahoo.com/quote/AAPL"}],
        "rawText": "..."
    }"#;
    let mock_server = test_utils::create_proxy_mock_server(200, mock_response).await;

    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(&dir, &mock_server.uri());

    let result = igcalc::run_command(
        igcalc::AppCommand::Fetch {
            ticker: "aapl".to_string(),
            show_raw: true,
        },
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Fetch command failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_fetch_flow_with_no_data() {
    let mock_server =
        test_utils::create_proxy_mock_server(200, r#"{"data": null, "sources": []}"#).await;

    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(&dir, &mock_server.uri());

    let result = igcalc::run_command(
        igcalc::AppCommand::Fetch {
            ticker: "ZZZZ".to_string(),
            show_raw: false,
        },
        Some(config_path.to_str().unwrap()),
    )
    .await;

    let err = result.expect_err("A lookup without data should fail the command");
    info!(%err, "Fetch failed as expected");
    assert!(err.to_string().contains("Could not find sufficient data"));
}

#[test_log::test(tokio::test)]
async fn test_fetch_flow_with_missing_key_on_proxy() {
    let mock_server = test_utils::create_proxy_mock_server(
        500,
        r#"{"error": "API Key is missing. Please configure the API_KEY environment variable."}"#,
    )
    .await;

    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(&dir, &mock_server.uri());

    let err = igcalc::run_command(
        igcalc::AppCommand::Fetch {
            ticker: "AAPL".to_string(),
            show_raw: false,
        },
        Some(config_path.to_str().unwrap()),
    )
    .await
    .expect_err("A missing key should fail the command");

    assert!(err.to_string().starts_with("Configuration Error"));
}

#[test_log::test(tokio::test)]
async fn test_session_against_proxy_mock() {
    use igcalc::core::{InputField, Session};
    use igcalc::providers::proxy::ProxyProvider;

    let mock_response = r#"{
        "data": {"price": "abc", "fcfPerShare": 4.0, "beta": 1.5},
        "sources": [
            {"title": "t1", "uri": "https://u1.example.com"},
            {"title": "t2", "uri": "https://u1.example.com"},
            {"title": "t3", "uri": "https://u2.example.com"}
        ]
    }"#;
    let mock_server = test_utils::create_proxy_mock_server(200, mock_response).await;
    let provider = ProxyProvider::new(&mock_server.uri(), test_utils::PROXY_PATH);

    let mut session = Session::new();
    session.set_ticker("ibm");
    session.search(&provider).await;

    assert!(session.alert().is_none());
    let inputs = session.inputs().clone();
    assert_eq!(inputs.ticker, "IBM");
    assert_eq!(inputs.price, 0.0);
    assert_eq!(inputs.beta, 1.5);
    // Zero price means zero yield, so growth equals the cost of equity.
    let result = session.valuation();
    assert_eq!(result.fcf_yield, 0.0);
    assert_eq!(result.implied_growth, result.cost_of_equity);

    let titles: Vec<_> = session.sources().iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["t1", "t3"]);

    assert!(session.edit_field(InputField::Price, "100"));
    assert!((session.valuation().fcf_yield - 0.04).abs() < 1e-12);

    session.reset();
    assert!(session.inputs().is_example());
    assert!(session.sources().is_empty());
    assert!(session.alert().is_none());
}

#[test_log::test(tokio::test)]
async fn test_calc_command_needs_no_config() {
    let inputs = igcalc::core::FinancialInputs {
        ticker: "MANUAL".to_string(),
        price: 0.0,
        ..Default::default()
    };

    let result = igcalc::run_command(
        igcalc::AppCommand::Calc(inputs),
        Some("/definitely/not/a/config.yaml"),
    )
    .await;
    assert!(result.is_ok(), "Calc failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_missing_config_file_is_an_error() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = dir.path().join("missing.yaml");
    assert!(!config_path.exists());

    let result = igcalc::run_command(
        igcalc::AppCommand::Fetch {
            ticker: "AAPL".to_string(),
            show_raw: false,
        },
        Some(config_path.to_str().unwrap()),
    )
    .await;

    assert!(result.is_err());
}
