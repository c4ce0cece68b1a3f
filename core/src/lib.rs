//! Core state machine and domain logic for Quartet.
//!
//! - [`clock`]: civil date and next-midnight in one fixed timezone
//! - [`game`]: selection, guess evaluation, win/loss transitions
//! - [`store`]: session persistence contract and record validation
//!
//! Everything here is synchronous; IO-bound collaborators (puzzle fetching,
//! timers, files) live in `quartet-puzzle` and `quartet-engine`.

pub mod clock;
pub mod game;
mod session;
pub mod store;

pub use clock::{CivilClock, ManualTimeSource, SystemTimeSource, TimeSource};
pub use game::{Game, GameView, PreconditionError};
pub use session::Session;
pub use store::{MemoryBackend, RecordStore, SessionStore, StorageBackend, StorageError};
