//! HTTP fetcher for SDMX payloads.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header::ACCEPT};
use tracing::{debug, instrument, warn};

use fxrates_types::{
    ExchangeRateRequest, FetchError, ObservationPoint, RateSource, SourceError,
};

use crate::decode::decode_observations;
use crate::request::{DEFAULT_BASE_URL, RequestBuilder};

/// Content negotiation for the structure-specific XML variant.
pub const SDMX_ACCEPT: &str = "application/vnd.sdmx.structurespecificdata+xml;version=2.1";

/// Settings for [`SdmxClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Upstream dataflow base, e.g. the ECB `EXR` resource
    pub base_url: String,
    /// Deadline for the whole request, body included
    pub timeout: Duration,
    /// Skip TLS certificate validation. Never enable against production upstreams.
    pub accept_invalid_certs: bool,
    /// Optional static header sent with every request (name, value)
    pub static_header: Option<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            accept_invalid_certs: false,
            static_header: None,
        }
    }
}

/// Splits a `Name: value` header declaration into its parts.
///
/// Returns `None` when the separator is missing or the name is blank.
pub fn parse_header(raw: &str) -> Option<(String, String)> {
    let (name, value) = raw.split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}

/// SDMX REST client: builds the query, fetches it and decodes the payload.
pub struct SdmxClient {
    requests: RequestBuilder,
    static_header: Option<(String, String)>,
    http: Client,
}

impl SdmxClient {
    /// Creates a new client from explicit configuration.
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        if config.accept_invalid_certs {
            warn!(
                base_url = %config.base_url,
                "TLS certificate validation is disabled for the SDMX upstream"
            );
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .user_agent(concat!("fxrates/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            requests: RequestBuilder::new(config.base_url),
            static_header: config.static_header,
            http,
        })
    }

    /// Returns the request builder bound to this client's upstream.
    pub fn requests(&self) -> &RequestBuilder {
        &self.requests
    }

    /// Performs one GET and returns the raw payload.
    ///
    /// Any status other than 200 is an error. No retries.
    #[instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut request = self.http.get(url).header(ACCEPT, SDMX_ACCEPT);
        if let Some((name, value)) = &self.static_header {
            request = request.header(name.as_str(), value.as_str());
        }

        let resp = request.send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Transport(format!("request timed out: {}", e))
            } else {
                FetchError::Transport(e.to_string())
            }
        })?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(FetchError::UpstreamStatus {
                code: status.as_u16(),
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| FetchError::Read(e.to_string()))?;

        debug!(bytes = body.len(), "Fetched SDMX payload");
        Ok(body.to_vec())
    }
}

#[async_trait]
impl RateSource for SdmxClient {
    #[instrument(skip(self, req), fields(request = %req))]
    async fn fetch_observations(
        &self,
        req: &ExchangeRateRequest,
    ) -> Result<Vec<ObservationPoint>, SourceError> {
        let url = self.requests.url_for(req)?;
        debug!(%url, "Built SDMX query");

        let payload = self.fetch(&url).await?;
        Ok(decode_observations(&payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use fxrates_types::DecodeError;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SERIES_PATH: &str = "/EXR/D.USD.EUR.SP00.A";
    const MOCK_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<message:StructureSpecificData xmlns:message="http://www.sdmx.org/resources/sdmxml/schemas/v2_1/message">
  <message:DataSet>
    <Series FREQ="D" CURRENCY="USD" CURRENCY_DENOM="EUR">
      <Obs TIME_PERIOD="2024-05-02" OBS_VALUE="1.0702"/>
      <Obs TIME_PERIOD="2024-05-03" OBS_VALUE="1.0749"/>
    </Series>
  </message:DataSet>
</message:StructureSpecificData>"#;

    async fn create_mock_server(template: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(SERIES_PATH))
            .and(header("Accept", SDMX_ACCEPT))
            .respond_with(template)
            .mount(&mock_server)
            .await;

        mock_server
    }

    fn client_for(server: &MockServer) -> SdmxClient {
        SdmxClient::new(ClientConfig {
            base_url: format!("{}/EXR", server.uri()),
            ..ClientConfig::default()
        })
        .unwrap()
    }

    fn may_2024() -> ExchangeRateRequest {
        ExchangeRateRequest::new(
            "USD",
            "EUR",
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 31).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let server = create_mock_server(ResponseTemplate::new(200).set_body_string(MOCK_XML)).await;
        let client = client_for(&server);

        let url = format!("{}{}", server.uri(), SERIES_PATH);
        let body = client.fetch(&url).await.unwrap();

        assert_eq!(body, MOCK_XML.as_bytes());
    }

    #[tokio::test]
    async fn test_fetch_non_ok_status() {
        let server = create_mock_server(ResponseTemplate::new(404)).await;
        let client = client_for(&server);

        let url = format!("{}{}", server.uri(), SERIES_PATH);
        let result = client.fetch(&url).await;

        assert!(matches!(
            result,
            Err(FetchError::UpstreamStatus { code: 404 })
        ));
    }

    #[tokio::test]
    async fn test_fetch_rejects_other_success_codes() {
        let server = create_mock_server(ResponseTemplate::new(204)).await;
        let client = client_for(&server);

        let url = format!("{}{}", server.uri(), SERIES_PATH);
        let result = client.fetch(&url).await;

        assert!(matches!(
            result,
            Err(FetchError::UpstreamStatus { code: 204 })
        ));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let client = SdmxClient::new(ClientConfig::default()).unwrap();

        let result = client.fetch("http://127.0.0.1:1/EXR").await;

        assert!(matches!(result, Err(FetchError::Transport(_))));
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let server = create_mock_server(
            ResponseTemplate::new(200)
                .set_body_string(MOCK_XML)
                .set_delay(Duration::from_millis(500)),
        )
        .await;
        let client = SdmxClient::new(ClientConfig {
            base_url: format!("{}/EXR", server.uri()),
            timeout: Duration::from_millis(50),
            ..ClientConfig::default()
        })
        .unwrap();

        let url = format!("{}{}", server.uri(), SERIES_PATH);
        let result = client.fetch(&url).await;

        assert!(matches!(result, Err(FetchError::Transport(_))));
    }

    #[test]
    fn test_parse_header() {
        assert_eq!(
            parse_header("Authorization: Bearer a:b"),
            Some(("Authorization".to_string(), "Bearer a:b".to_string()))
        );
        assert_eq!(parse_header("token"), None);
        assert_eq!(parse_header(" : value"), None);
    }

    #[tokio::test]
    async fn test_static_header_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(SERIES_PATH))
            .and(header("X-Api-Key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MOCK_XML))
            .expect(1)
            .mount(&server)
            .await;

        let client = SdmxClient::new(ClientConfig {
            base_url: format!("{}/EXR", server.uri()),
            static_header: Some(("X-Api-Key".into(), "secret".into())),
            ..ClientConfig::default()
        })
        .unwrap();

        let points = client.fetch_observations(&may_2024()).await.unwrap();
        assert_eq!(points.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_observations_sends_period() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(SERIES_PATH))
            .and(query_param("startPeriod", "2024-05-01"))
            .and(query_param("endPeriod", "2024-05-31"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MOCK_XML))
            .mount(&server)
            .await;
        let client = client_for(&server);

        let points = client.fetch_observations(&may_2024()).await.unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        assert_eq!(points[1].value.to_string(), "1.0749");
    }

    #[tokio::test]
    async fn test_fetch_observations_surfaces_decode_errors() {
        let server =
            create_mock_server(ResponseTemplate::new(200).set_body_string("<html>oops")).await;
        let client = client_for(&server);

        let result = client.fetch_observations(&may_2024()).await;

        assert!(matches!(
            result,
            Err(SourceError::Decode(DecodeError::MalformedDocument(_)))
        ));
    }
}
