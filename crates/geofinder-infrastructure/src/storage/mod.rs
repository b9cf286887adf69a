//! Storage layer for atomic file operations.

mod atomic_file;
mod config_storage;

pub use atomic_file::AtomicTextFile;
pub use config_storage::{
    ConfigStorage, ENV_API_BASE_URL, ENV_APP_CHECK_TOKEN, apply_env_overrides,
};
