//! Shared infrastructure utilities for Quartet.
//!
//! - **`atomic_write`**: crash-safe replacement of the session file.

pub mod atomic_write;

pub use atomic_write::{atomic_write, recover_bak_file, remove_if_exists};
