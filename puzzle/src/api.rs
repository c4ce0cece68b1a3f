//! JSON endpoint adapter: the body and status a puzzle `GET` should answer with.

use serde_json::{Value, json};
use tracing::error;

use crate::error::SourceError;
use crate::feed::PuzzleFeed;
use crate::source::PuzzleSource;

pub const STATUS_OK: u16 = 200;
pub const STATUS_SERVER_ERROR: u16 = 500;

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// `{ categories, puzzleId, dayIndex }` for today, or a 500 with a fixed
/// error body. Failure details go to the log, not the client.
pub async fn respond<F: PuzzleFeed>(source: &PuzzleSource<F>) -> ApiResponse {
    let result = source
        .fetch_daily_puzzle(false)
        .await
        .and_then(|puzzle| {
            serde_json::to_value(&*puzzle).map_err(|e| SourceError::Parse(e.to_string()))
        });

    match result {
        Ok(body) => ApiResponse {
            status: STATUS_OK,
            body,
        },
        Err(e) => {
            error!("Failed to serve puzzle: {e}");
            ApiResponse {
                status: STATUS_SERVER_ERROR,
                body: json!({ "error": "Failed to load puzzle data" }),
            }
        }
    }
}
