//! App-attestation token providers.

use async_trait::async_trait;
use geofinder_core::api::ApiError;
use geofinder_core::auth::TokenProvider;

pub const ENV_APP_CHECK_TOKEN: &str = "GEOFINDER_APP_CHECK_TOKEN";

/// Hands out one preconfigured token.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn fetch_token(&self) -> Result<String, ApiError> {
        if self.token.trim().is_empty() {
            return Err(ApiError::Auth("No attestation token configured".into()));
        }
        Ok(self.token.clone())
    }
}

/// Reads the token from `GEOFINDER_APP_CHECK_TOKEN` on every refresh, so a
/// rotated token is picked up once the cached one expires.
#[derive(Default)]
pub struct EnvTokenProvider;

impl EnvTokenProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TokenProvider for EnvTokenProvider {
    async fn fetch_token(&self) -> Result<String, ApiError> {
        std::env::var(ENV_APP_CHECK_TOKEN)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Auth(format!("{} is not set", ENV_APP_CHECK_TOKEN)))
    }
}
