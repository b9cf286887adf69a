//! App-attestation token handling.
//!
//! [`AuthContext`] is passed explicitly to whatever makes authenticated calls.
//! It caches one token together with its expiry and asks its
//! [`TokenProvider`] for a new one when the cached token is empty or expired.

use crate::api::ApiError;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Lifetime assumed for tokens whose expiry cannot be read.
fn fallback_token_lifetime() -> Duration {
    Duration::hours(1)
}

/// Source of fresh attestation tokens.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn fetch_token(&self) -> Result<String, ApiError>;
}

/// A token and the instant it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthToken {
    /// Reads the expiry from the token's JWT `exp` claim, falling back to
    /// one hour from `now`.
    pub fn from_jwt(token: impl Into<String>, now: DateTime<Utc>) -> Self {
        let token = token.into();
        let expires_at = jwt_expiry(&token).unwrap_or_else(|| {
            warn!("[Auth] Could not read token expiry, assuming one hour");
            now + fallback_token_lifetime()
        });
        Self { token, expires_at }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.token.is_empty() && now < self.expires_at
    }
}

pub struct AuthContext {
    provider: Arc<dyn TokenProvider>,
    current: Mutex<Option<AuthToken>>,
}

impl AuthContext {
    pub fn new(provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            provider,
            current: Mutex::new(None),
        }
    }

    /// Returns the cached token, refreshing it first if it is missing or expired.
    pub async fn get_valid_token(&self) -> Result<String, ApiError> {
        self.get_valid_token_at(Utc::now()).await
    }

    pub async fn get_valid_token_at(&self, now: DateTime<Utc>) -> Result<String, ApiError> {
        let mut current = self.current.lock().await;
        if let Some(token) = current.as_ref().filter(|t| t.is_valid_at(now)) {
            return Ok(token.token.clone());
        }

        debug!("[Auth] Refreshing attestation token");
        let fresh = self.provider.fetch_token().await?;
        if fresh.trim().is_empty() {
            return Err(ApiError::Auth("token provider returned an empty token".into()));
        }
        let token = AuthToken::from_jwt(fresh, now);
        let value = token.token.clone();
        *current = Some(token);
        Ok(value)
    }

    /// Drops the cached token so the next call refreshes.
    pub async fn invalidate(&self) {
        *self.current.lock().await = None;
    }

    pub async fn current(&self) -> Option<AuthToken> {
        self.current.lock().await.clone()
    }
}

fn jwt_expiry(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    let exp = claims.get("exp")?.as_i64()?;
    DateTime::from_timestamp(exp, 0)
}
