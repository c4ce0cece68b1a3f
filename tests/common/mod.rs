//! Fixtures for the end-to-end suite: a pinned civil clock, generated
//! puzzle sheets and a wiremock server that serves them.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use reqwest::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use quartet_core::{CivilClock, ManualTimeSource};
use quartet_puzzle::{PuzzleSource, SheetFeed};

pub const SHEET_PATH: &str = "/sheet.csv";

/// Asia/Almaty.
pub fn zone() -> FixedOffset {
    FixedOffset::east_opt(5 * 3600).unwrap()
}

/// Noon local time on the given civil date.
pub fn local_noon(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    zone()
        .with_ymd_and_hms(year, month, day, 12, 0, 0)
        .unwrap()
        .with_timezone(&Utc)
}

pub fn manual_clock(now: DateTime<Utc>) -> (CivilClock, Arc<ManualTimeSource>) {
    let time = Arc::new(ManualTimeSource::new(now));
    (CivilClock::new(zone(), time.clone()), time)
}

/// One sheet row. Category `c` of the row holds items `{prefix}{c}{1..=4}`.
pub fn sheet_row(day: u16, prefix: &str) -> String {
    let cells: Vec<String> = ["ALPHA", "BRAVO", "CHARLIE", "DELTA"]
        .iter()
        .enumerate()
        .map(|(c, name)| {
            let items: Vec<String> = (1..=4).map(|i| format!("{prefix}{c}{i}")).collect();
            format!("\"{name} {prefix}({})\"", items.join(", "))
        })
        .collect();
    format!("{day},{}", cells.join(","))
}

pub fn sheet(rows: &[(u16, &str)]) -> String {
    let mut text = String::from("Day,Level 1,Level 2,Level 3,Level 4\n");
    for (day, prefix) in rows {
        text.push_str(&sheet_row(*day, prefix));
        text.push('\n');
    }
    text
}

/// Serve `body` as the sheet for every request.
pub async fn mount_sheet(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path(SHEET_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

pub fn sheet_url(server: &MockServer) -> Url {
    Url::parse(&format!("{}{SHEET_PATH}", server.uri())).unwrap()
}

pub fn sheet_source(server: &MockServer, clock: CivilClock) -> PuzzleSource<SheetFeed> {
    let feed = SheetFeed::new(sheet_url(server), Duration::from_secs(5)).unwrap();
    PuzzleSource::new(feed, clock)
}
