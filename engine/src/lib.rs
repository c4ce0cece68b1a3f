//! Game orchestration for Quartet.
//!
//! Ties the synchronous engine in `quartet-core` to the async world: the
//! puzzle source, a durable session file and the midnight rollover task.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use quartet_core::{MemoryBackend, RecordStore, SessionStore};

mod file_backend;
mod host;
mod rollover;
#[cfg(test)]
mod testing;

pub use file_backend::{FileBackend, FileStore};
pub use host::GameHost;
pub use rollover::RolloverHandle;

/// The session store for `path`, or an in-memory one when persistence is off.
#[must_use]
pub fn session_store(path: Option<PathBuf>) -> Arc<dyn SessionStore> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "Persisting sessions to disk");
            Arc::new(RecordStore::new(FileBackend::new(path)))
        }
        None => {
            info!("Session persistence disabled");
            Arc::new(RecordStore::new(MemoryBackend::new()))
        }
    }
}
