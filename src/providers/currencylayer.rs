use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::currency::{Currency, ExchangeRateSet, RateSource};
use crate::core::error::{FetchError, FetchResult};

/// Client for the currencylayer `/list` and `/live` endpoints
pub struct CurrencyLayerSource {
    base_url: String,
    access_key: String,
    client: reqwest::Client,
}

impl CurrencyLayerSource {
    pub fn new(base_url: &str, access_key: &str, timeout: Duration) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent("xrate/1.0")
            .timeout(timeout)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_key: access_key.to_string(),
            client,
        })
    }

    async fn get_envelope<T: DeserializeOwned>(&self, endpoint: &str) -> FetchResult<T> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("Requesting {} from {}", endpoint, self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("access_key", &self.access_key)])
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        // A failed status only counts as a provider error if it carries one
        if !status.is_success() {
            return match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(ErrorEnvelope { error: Some(error) }) => Err(error.into()),
                _ => Err(FetchError::Transport(format!("HTTP error: {status}"))),
            };
        }

        serde_json::from_str::<T>(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[derive(Deserialize, Debug)]
struct ErrorEnvelope {
    error: Option<ApiError>,
}

#[derive(Deserialize, Debug)]
struct ApiError {
    code: i64,
    info: String,
}

impl From<ApiError> for FetchError {
    fn from(err: ApiError) -> Self {
        FetchError::Provider {
            code: err.code,
            info: err.info,
        }
    }
}

#[derive(Deserialize, Debug)]
struct ListResponse {
    #[serde(default)]
    success: bool,
    currencies: Option<HashMap<String, String>>,
    error: Option<ApiError>,
}

#[derive(Deserialize, Debug)]
struct LiveResponse {
    #[serde(default)]
    success: bool,
    timestamp: Option<i64>,
    source: Option<String>,
    quotes: Option<BTreeMap<String, f64>>,
    error: Option<ApiError>,
}

fn missing(field: &str) -> FetchError {
    FetchError::Decode(format!("missing field `{field}`"))
}

#[async_trait]
impl RateSource for CurrencyLayerSource {
    #[instrument(name = "CurrencyListFetch", skip(self))]
    async fn fetch_currency_list(&self) -> FetchResult<Vec<Currency>> {
        let data: ListResponse = self.get_envelope("list").await?;
        debug!(success = data.success, "Received currency list");

        if let Some(error) = data.error {
            return Err(error.into());
        }

        let mut currencies: Vec<Currency> = data
            .currencies
            .ok_or_else(|| missing("currencies"))?
            .into_iter()
            .map(|(code, name)| Currency { code, name })
            .collect();
        currencies.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(currencies)
    }

    #[instrument(name = "LiveRatesFetch", skip(self))]
    async fn fetch_live_rates(&self) -> FetchResult<ExchangeRateSet> {
        let data: LiveResponse = self.get_envelope("live").await?;
        debug!(success = data.success, "Received live rates");

        if let Some(error) = data.error {
            return Err(error.into());
        }

        Ok(ExchangeRateSet {
            timestamp: data.timestamp.ok_or_else(|| missing("timestamp"))?,
            source: data.source.ok_or_else(|| missing("source"))?,
            quotes: data.quotes.ok_or_else(|| missing("quotes"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LIST_RESPONSE: &str = r#"{
        "success": true,
        "terms": "https://currencylayer.com/terms",
        "privacy": "https://currencylayer.com/privacy",
        "currencies": {
            "USD": "United States Dollar",
            "BRL": "Brazilian Real",
            "EUR": "Euro"
        }
    }"#;

    const LIVE_RESPONSE: &str = r#"{
        "success": true,
        "terms": "https://currencylayer.com/terms",
        "privacy": "https://currencylayer.com/privacy",
        "timestamp": 1700000000,
        "source": "USD",
        "quotes": {
            "USDBRL": 5.6,
            "USDEUR": 0.92
        }
    }"#;

    const ERROR_RESPONSE: &str = r#"{
        "success": false,
        "error": {
            "code": 101,
            "info": "You have not supplied a valid API Access Key."
        }
    }"#;

    async fn create_mock_server(endpoint: &str, status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/{endpoint}")))
            .and(query_param("access_key", "test-key"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }

    fn source(mock_server: &MockServer) -> CurrencyLayerSource {
        CurrencyLayerSource::new(&mock_server.uri(), "test-key", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_successful_currency_list_fetch() {
        let mock_server = create_mock_server("list", 200, LIST_RESPONSE).await;

        let currencies = source(&mock_server).fetch_currency_list().await.unwrap();
        let codes: Vec<_> = currencies.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["BRL", "EUR", "USD"]);
        assert_eq!(currencies[0].name, "Brazilian Real");
    }

    #[tokio::test]
    async fn test_successful_live_rates_fetch() {
        let mock_server = create_mock_server("live", 200, LIVE_RESPONSE).await;

        let rates = source(&mock_server).fetch_live_rates().await.unwrap();
        assert_eq!(rates.timestamp, 1_700_000_000);
        assert_eq!(rates.source, "USD");
        assert_eq!(rates.quotes.get("USDBRL"), Some(&5.6));
        assert_eq!(rates.quotes.get("USDEUR"), Some(&0.92));
    }

    #[tokio::test]
    async fn test_provider_error_on_list() {
        let mock_server = create_mock_server("list", 200, ERROR_RESPONSE).await;

        let result = source(&mock_server).fetch_currency_list().await;
        assert_eq!(
            result.unwrap_err(),
            FetchError::Provider {
                code: 101,
                info: "You have not supplied a valid API Access Key.".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_provider_error_takes_precedence_over_quotes() {
        let body = r#"{
            "success": false,
            "timestamp": 1700000000,
            "source": "USD",
            "quotes": {"USDBRL": 5.6},
            "error": {"code": 104, "info": "Monthly usage limit reached."}
        }"#;
        let mock_server = create_mock_server("live", 200, body).await;

        let result = source(&mock_server).fetch_live_rates().await;
        assert!(matches!(
            result,
            Err(FetchError::Provider { code: 104, .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_response_is_decode_error() {
        let mock_server = create_mock_server("live", 200, r#"{"quotes": "nope"}"#).await;

        let result = source(&mock_server).fetch_live_rates().await;
        assert!(matches!(result, Err(FetchError::Decode(_))));
    }

    #[tokio::test]
    async fn test_missing_quotes_is_decode_error() {
        let body = r#"{"success": true, "timestamp": 1700000000, "source": "USD"}"#;
        let mock_server = create_mock_server("live", 200, body).await;

        let result = source(&mock_server).fetch_live_rates().await;
        assert_eq!(
            result.unwrap_err(),
            FetchError::Decode("missing field `quotes`".to_string())
        );
    }

    #[tokio::test]
    async fn test_server_error_is_transport_error() {
        let mock_server = create_mock_server("list", 500, "").await;

        let result = source(&mock_server).fetch_currency_list().await;
        assert_eq!(
            result.unwrap_err(),
            FetchError::Transport("HTTP error: 500 Internal Server Error".to_string())
        );
    }

    #[tokio::test]
    async fn test_server_error_with_gateway_json_is_transport_error() {
        let mock_server =
            create_mock_server("list", 503, r#"{"message": "Service Unavailable"}"#).await;

        let result = source(&mock_server).fetch_currency_list().await;
        let error = result.unwrap_err();
        assert_eq!(
            error,
            FetchError::Transport("HTTP error: 503 Service Unavailable".to_string())
        );
        assert!(error.is_transient());
    }

    #[tokio::test]
    async fn test_server_error_with_provider_error_is_provider_error() {
        let mock_server = create_mock_server("live", 401, ERROR_RESPONSE).await;

        let result = source(&mock_server).fetch_live_rates().await;
        assert!(matches!(
            result,
            Err(FetchError::Provider { code: 101, .. })
        ));
    }

    #[tokio::test]
    async fn test_access_key_is_query_encoded() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/live"))
            .and(query_param("access_key", "a&b=c d"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LIVE_RESPONSE))
            .mount(&mock_server)
            .await;

        let source =
            CurrencyLayerSource::new(&mock_server.uri(), "a&b=c d", Duration::from_secs(5)).unwrap();
        let rates = source.fetch_live_rates().await.unwrap();
        assert_eq!(rates.source, "USD");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let mock_server = MockServer::start().await;
        let uri = mock_server.uri();
        drop(mock_server);

        let source = CurrencyLayerSource::new(&uri, "test-key", Duration::from_secs(1)).unwrap();
        let result = source.fetch_live_rates().await;
        assert!(matches!(result, Err(FetchError::Transport(_))));
    }
}
