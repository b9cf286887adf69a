//! Device-local persistence and configuration loading.

pub mod key_value_store;
pub mod paths;
pub mod repository;
pub mod storage;

pub use crate::key_value_store::FileKeyValueStore;
pub use crate::paths::GeoPaths;
pub use crate::repository::{BackgroundCacheRepository, HighScoreRepository, SessionIdRepository};
pub use crate::storage::ConfigStorage;
