//! End-to-end ingestion tests: mock SDMX upstream -> SdmxClient -> RateService -> store.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fxrates_repo::{MemoryRepo, SqliteRepo};
use fxrates_sdmx::{ClientConfig, SdmxClient};
use fxrates_service::RateService;
use fxrates_types::{
    DecodeError, ExchangeRateRequest, IngestError, RatePoint, RateSeriesQuery, RateStore,
    SourceError,
};

fn payload(base: &str, target: &str, observations: &[(&str, &str)]) -> String {
    let obs: String = observations
        .iter()
        .map(|(day, value)| format!(r#"<Obs TIME_PERIOD="{day}" OBS_VALUE="{value}"/>"#))
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<message:StructureSpecificData xmlns:message="http://www.sdmx.org/resources/sdmxml/schemas/v2_1/message">
  <message:DataSet>
    <Series FREQ="D" CURRENCY="{base}" CURRENCY_DENOM="{target}">{obs}</Series>
  </message:DataSet>
</message:StructureSpecificData>"#
    )
}

async fn mount_series(server: &MockServer, base: &str, target: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/EXR/D.{base}.{target}.SP00.A")))
        .and(query_param("startPeriod", "2024-05-01"))
        .and(query_param("endPeriod", "2024-05-07"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn client_for(server: &MockServer) -> SdmxClient {
    SdmxClient::new(ClientConfig {
        base_url: format!("{}/EXR", server.uri()),
        ..ClientConfig::default()
    })
    .unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn first_week(target: &str) -> ExchangeRateRequest {
    ExchangeRateRequest::new("USD", target, date("2024-05-01"), date("2024-05-07")).unwrap()
}

async fn upstream() -> MockServer {
    let server = MockServer::start().await;
    mount_series(
        &server,
        "USD",
        "EUR",
        payload(
            "USD",
            "EUR",
            &[("2024-05-02", "1.0702"), ("2024-05-03", "1.0749")],
        ),
    )
    .await;
    mount_series(
        &server,
        "USD",
        "GBP",
        payload(
            "USD",
            "GBP",
            &[("2024-05-03", "0.8571"), ("2024-05-06", "0.8590")],
        ),
    )
    .await;
    server
}

async fn ingest_both_targets<R: RateStore>(service: &RateService<SdmxClient, R>) {
    let eur = service.ingest(&first_week("EUR")).await.unwrap();
    assert_eq!(eur.stored, 2);

    let gbp = service.ingest(&first_week("GBP")).await.unwrap();
    assert_eq!(gbp.stored, 2);
}

#[tokio::test]
async fn test_ingest_merges_targets_in_memory_store() {
    let server = upstream().await;
    let service = RateService::new(client_for(&server), MemoryRepo::new());

    ingest_both_targets(&service).await;

    let record = service
        .store()
        .get_record(date("2024-05-03"), "USD")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.rate("EUR"), Some(dec("1.0749")));
    assert_eq!(record.rate("GBP"), Some(dec("0.8571")));

    let series = service
        .rate_series(&RateSeriesQuery {
            base_currency: "USD".into(),
            target_currency: "GBP".into(),
            date_from: date("2024-05-01"),
            date_to: date("2024-05-07"),
        })
        .await
        .unwrap();
    assert_eq!(
        series,
        vec![
            RatePoint {
                date: date("2024-05-03"),
                rate: dec("0.8571")
            },
            RatePoint {
                date: date("2024-05-06"),
                rate: dec("0.8590")
            },
        ]
    );
}

#[tokio::test]
async fn test_ingest_merges_targets_in_sqlite_store() {
    let server = upstream().await;
    let repo = SqliteRepo::new("sqlite::memory:").await.unwrap();
    let service = RateService::new(client_for(&server), repo);

    ingest_both_targets(&service).await;

    assert_eq!(
        service
            .rate_on("usd", "eur", date("2024-05-02"))
            .await
            .unwrap(),
        Some(dec("1.0702"))
    );
    assert_eq!(
        service
            .rate_on("USD", "GBP", date("2024-05-02"))
            .await
            .unwrap(),
        None
    );

    let series = service
        .rate_series(&RateSeriesQuery {
            base_currency: "USD".into(),
            target_currency: "EUR".into(),
            date_from: date("2024-05-03"),
            date_to: date("2024-05-03"),
        })
        .await
        .unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].rate, dec("1.0749"));
}

#[tokio::test]
async fn test_reingest_overwrites_same_target() {
    let server = MockServer::start().await;
    mount_series(
        &server,
        "USD",
        "EUR",
        payload("USD", "EUR", &[("2024-05-02", "1.0800")]),
    )
    .await;

    let store = MemoryRepo::new();
    let mut seeded = fxrates_types::RateMap::new();
    seeded.insert("EUR".into(), dec("1.0702"));
    seeded.insert("JPY".into(), dec("154.2"));
    store
        .upsert(date("2024-05-02"), "USD", &seeded)
        .await
        .unwrap();

    let service = RateService::new(client_for(&server), store);
    service.ingest(&first_week("EUR")).await.unwrap();

    let record = service
        .store()
        .get_record(date("2024-05-02"), "USD")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.rate("EUR"), Some(dec("1.0800")));
    assert_eq!(record.rate("JPY"), Some(dec("154.2")));
}

#[tokio::test]
async fn test_malformed_observation_stores_nothing() {
    let server = MockServer::start().await;
    mount_series(
        &server,
        "USD",
        "EUR",
        payload(
            "USD",
            "EUR",
            &[("2024-05-02", "1.0702"), ("05/03/2024", "1.0749")],
        ),
    )
    .await;

    let service = RateService::new(client_for(&server), MemoryRepo::new());

    let result = service.ingest(&first_week("EUR")).await;

    assert!(matches!(
        result,
        Err(IngestError::Source(SourceError::Decode(
            DecodeError::MalformedObservation { .. }
        )))
    ));
    assert!(service.store().is_empty());
}

#[tokio::test]
async fn test_upstream_error_stores_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let service = RateService::new(client_for(&server), MemoryRepo::new());

    let result = service.ingest(&first_week("EUR")).await;

    assert!(matches!(result, Err(IngestError::Source(SourceError::Fetch(_)))));
    assert!(service.store().is_empty());
}
