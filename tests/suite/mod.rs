//! Integration test suites, grouped by the flow they exercise.

mod coalescing;
mod daily_flow;
mod endpoint;
mod invariants;
