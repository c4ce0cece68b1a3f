//! Request coalescing and cache retention over real HTTP.

use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use quartet_puzzle::{FetchError, SourceError};

use crate::common::{SHEET_PATH, local_noon, manual_clock, sheet, sheet_source};

#[tokio::test]
async fn concurrent_fetches_share_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SHEET_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(sheet(&[(5, "a")]))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (clock, _) = manual_clock(local_noon(2026, 1, 5));
    let source = sheet_source(&server, clock);

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let source = source.clone();
            tokio::spawn(async move { source.fetch_daily_puzzle(i % 2 == 0).await })
        })
        .collect();

    let mut puzzles = Vec::new();
    for task in tasks {
        puzzles.push(task.await.unwrap().unwrap());
    }
    assert!(puzzles.iter().all(|p| Arc::ptr_eq(p, &puzzles[0])));
    assert_eq!(source.loads_started(), 1);

    // Memoized: no second request.
    source.fetch_daily_puzzle(false).await.unwrap();
    server.verify().await;
}

#[tokio::test]
async fn failed_refresh_keeps_cached_puzzle() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SHEET_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(sheet(&[(5, "a")])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SHEET_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (clock, _) = manual_clock(local_noon(2026, 1, 5));
    let source = sheet_source(&server, clock);

    let first = source.fetch_daily_puzzle(false).await.unwrap();
    let err = source.fetch_daily_puzzle(true).await.unwrap_err();
    assert_eq!(err, SourceError::Fetch(FetchError::Status(500)));

    let cached = source.cached().unwrap();
    assert!(Arc::ptr_eq(&cached, &first));
    let again = source.fetch_daily_puzzle(false).await.unwrap();
    assert!(Arc::ptr_eq(&again, &first));
}
