//! The JSON endpoint adapter feeding the API feed.

use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use quartet_puzzle::{ApiFeed, FetchError, PuzzleSource, SourceError, respond};

use crate::common::{local_noon, manual_clock, mount_sheet, sheet, sheet_source};

async fn serve_api(status: u16, body: &serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/puzzle"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(&server)
        .await;
    server
}

fn api_source(server: &MockServer) -> PuzzleSource<ApiFeed> {
    let url = format!("{}/api/puzzle", server.uri()).parse().unwrap();
    let (clock, _) = manual_clock(local_noon(2026, 1, 5));
    PuzzleSource::new(ApiFeed::new(url, Duration::from_secs(5)).unwrap(), clock)
}

#[tokio::test]
async fn api_feed_reads_what_the_endpoint_serves() {
    let sheet_server = MockServer::start().await;
    mount_sheet(&sheet_server, &sheet(&[(4, "x"), (5, "a")])).await;
    let (clock, _) = manual_clock(local_noon(2026, 1, 5));
    let origin = sheet_source(&sheet_server, clock);

    let response = respond(&origin).await;
    assert!(response.is_success());
    assert_eq!(response.body["dayIndex"], 5);
    assert!(response.body["puzzleId"].as_str().unwrap().starts_with("1:ALPHA A:A01"));

    let api_server = serve_api(response.status, &response.body).await;
    let via_api = api_source(&api_server).fetch_daily_puzzle(false).await.unwrap();
    assert_eq!(*via_api, *origin.cached().unwrap());
}

#[tokio::test]
async fn endpoint_failure_is_a_fetch_error_downstream() {
    let sheet_server = MockServer::start().await;
    let (clock, _) = manual_clock(local_noon(2026, 1, 5));
    let origin = sheet_source(&sheet_server, clock);

    let response = respond(&origin).await;
    assert_eq!(response.status, 500);
    assert_eq!(response.body["error"], "Failed to load puzzle data");

    let api_server = serve_api(response.status, &response.body).await;
    assert_eq!(
        api_source(&api_server).fetch_daily_puzzle(false).await,
        Err(SourceError::Fetch(FetchError::Status(500)))
    );
}
