use thiserror::Error;

/// Why the transport could not deliver puzzle data.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("could not read {path}: {message}")]
    Read { path: String, message: String },
}

/// Failure to produce today's puzzle.
///
/// `Clone` so one failed load can be handed to every caller that joined it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("failed to fetch puzzle data: {0}")]
    Fetch(#[from] FetchError),
    #[error("malformed puzzle data: {0}")]
    Parse(String),
    #[error("no valid puzzle rows available")]
    NoPuzzleAvailable,
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => Self::Status(status.as_u16()),
            None => Self::Transport(e.to_string()),
        }
    }
}
