//! Where puzzle data comes from.
//!
//! A [`PuzzleFeed`] turns a day-of-year into a validated [`Puzzle`]. The
//! sheet and file feeds parse the tabular source themselves; the API feed
//! trusts a server that already did, but re-checks what it receives.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{ACCEPT, CACHE_CONTROL};
use reqwest::{Client, Url};
use tracing::debug;

use quartet_types::Puzzle;

use crate::error::{FetchError, SourceError};
use crate::sheet::{parse_sheet, select_daily};

pub trait PuzzleFeed: Send + Sync + 'static {
    /// Today's puzzle, given today's ordinal in the civil calendar.
    fn load(&self, day_of_year: u16) -> impl Future<Output = Result<Puzzle, SourceError>> + Send;
}

fn http_client(timeout: Duration) -> Result<Client, SourceError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| SourceError::Fetch(FetchError::Transport(e.to_string())))
}

async fn get_text(client: &Client, url: &Url, accept: &str) -> Result<String, FetchError> {
    let response = client
        .get(url.clone())
        .header(CACHE_CONTROL, "no-store")
        .header(ACCEPT, accept)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }
    Ok(response.text().await?)
}

/// CSV export of the puzzle spreadsheet over HTTP.
#[derive(Debug, Clone)]
pub struct SheetFeed {
    client: Client,
    url: Url,
}

impl SheetFeed {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, SourceError> {
        Ok(Self {
            client: http_client(timeout)?,
            url,
        })
    }
}

impl PuzzleFeed for SheetFeed {
    async fn load(&self, day_of_year: u16) -> Result<Puzzle, SourceError> {
        let text = get_text(&self.client, &self.url, "text/csv").await?;
        let rows = parse_sheet(&text);
        debug!(rows = rows.len(), url = %self.url, "Parsed puzzle sheet");
        select_daily(rows, day_of_year)
    }
}

/// JSON puzzle endpoint. The server picks the day.
#[derive(Debug, Clone)]
pub struct ApiFeed {
    client: Client,
    url: Url,
}

impl ApiFeed {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, SourceError> {
        Ok(Self {
            client: http_client(timeout)?,
            url,
        })
    }
}

impl PuzzleFeed for ApiFeed {
    async fn load(&self, _day_of_year: u16) -> Result<Puzzle, SourceError> {
        let text = get_text(&self.client, &self.url, "application/json").await?;
        serde_json::from_str(&text).map_err(|e| SourceError::Parse(e.to_string()))
    }
}

/// A local copy of the sheet.
#[derive(Debug, Clone)]
pub struct FileFeed {
    path: PathBuf,
}

impl FileFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PuzzleFeed for FileFeed {
    async fn load(&self, day_of_year: u16) -> Result<Puzzle, SourceError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| FetchError::Read {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })?;
        select_daily(parse_sheet(&text), day_of_year)
    }
}
