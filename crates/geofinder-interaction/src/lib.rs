//! HTTP client for the Remote Game API.

pub mod client;
pub mod dto;
pub mod error;
pub mod token;

pub use client::{APP_CHECK_HEADER, GeoApiClient};
pub use error::{classify_http_error, classify_transport_error};
pub use token::{EnvTokenProvider, StaticTokenProvider};
