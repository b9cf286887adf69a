//! Domain model and ports for the geography-guessing client.
//!
//! Nothing here performs network or disk I/O directly: the HTTP API, the token
//! provider and the local key/value store are traits implemented by the
//! infrastructure and interaction crates.

pub mod api;
pub mod auth;
pub mod background;
pub mod config;
pub mod country;
pub mod duel;
pub mod error;
pub mod high_score;
pub mod leaderboard;
pub mod prefetch;
pub mod round;
pub mod session;
pub mod store;

// Re-export common error type
pub use error::{GeoError, Result};
