//! GeoApiClient - HTTP implementation of the Remote Game API ports.

use crate::dto::{DuelGuessRequest, ImageResponse};
use crate::error::{classify_http_error, classify_transport_error};
use crate::token::{EnvTokenProvider, StaticTokenProvider};
use async_trait::async_trait;
use geofinder_core::api::{ApiError, DuelApi, GameApi, GameSessionTicket, ScoreSubmission};
use geofinder_core::auth::{AuthContext, TokenProvider};
use geofinder_core::config::ApiConfig;
use geofinder_core::duel::{GuessResult, MatchStart};
use geofinder_core::leaderboard::LeaderboardEntry;
use geofinder_core::round::{GameMode, Round};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};

/// Header carrying the app-attestation token.
pub const APP_CHECK_HEADER: &str = "X-Firebase-AppCheck";

#[derive(Clone)]
pub struct GeoApiClient {
    client: Client,
    base_url: String,
    auth: Option<Arc<AuthContext>>,
}

impl GeoApiClient {
    pub fn new(config: &ApiConfig, auth: Option<Arc<AuthContext>>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|err| ApiError::network(format!("Failed to build HTTP client: {err}"), false))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    /// Builds a client whose tokens come from `api.app_check_token` when set,
    /// otherwise from the environment.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        let provider: Arc<dyn TokenProvider> = match &config.app_check_token {
            Some(token) => Arc::new(StaticTokenProvider::new(token.clone())),
            None => Arc::new(EnvTokenProvider::new()),
        };
        Self::new(config, Some(Arc::new(AuthContext::new(provider))))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Token for endpoints that refuse unattested calls.
    async fn required_token(&self) -> Result<String, ApiError> {
        match &self.auth {
            Some(auth) => auth.get_valid_token().await,
            None => Err(ApiError::Auth("No attestation token provider configured".into())),
        }
    }

    /// Token for endpoints where the server decides; a failed refresh sends
    /// the request unattested.
    async fn optional_token(&self) -> Option<String> {
        let auth = self.auth.as_ref()?;
        match auth.get_valid_token().await {
            Ok(token) => Some(token),
            Err(err) => {
                warn!(error = %err, "[Api] Sending request without attestation token");
                None
            }
        }
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|err| classify_transport_error(&err))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error body".to_string());
        let err = classify_http_error(status, &body);
        debug!(status = status.as_u16(), error = %err, "[Api] Request failed");

        if err.is_auth() {
            if let Some(auth) = &self.auth {
                auth.invalidate().await;
            }
        }
        Err(err)
    }

    async fn execute_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        self.execute(request)
            .await?
            .json::<T>()
            .await
            .map_err(|err| ApiError::invalid_response(format!("Failed to parse response: {err}")))
    }
}

fn attest(request: RequestBuilder, token: Option<String>) -> RequestBuilder {
    match token {
        Some(token) => request.header(APP_CHECK_HEADER, token),
        None => request,
    }
}

#[async_trait]
impl GameApi for GeoApiClient {
    async fn fetch_round(&self, mode: GameMode) -> Result<Round, ApiError> {
        let request = self.client.get(self.url(mode.image_path()));
        let body: ImageResponse = self.execute_json(request).await?;
        body.into_round(mode)
    }

    async fn start_session(&self) -> Result<GameSessionTicket, ApiError> {
        let token = self.required_token().await?;
        let request = self
            .client
            .post(self.url("game/start"))
            .header(APP_CHECK_HEADER, token)
            .json(&serde_json::json!({}));
        self.execute_json(request).await
    }

    async fn submit_score(&self, submission: &ScoreSubmission) -> Result<(), ApiError> {
        let token = self.required_token().await?;
        let request = self
            .client
            .post(self.url("game/submit"))
            .header(APP_CHECK_HEADER, token)
            .json(submission);
        self.execute(request).await?;
        Ok(())
    }

    async fn leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, ApiError> {
        let request = self
            .client
            .get(self.url("leaderboard/top"))
            .query(&[("limit", limit)]);
        self.execute_json(request).await
    }
}

#[async_trait]
impl DuelApi for GeoApiClient {
    async fn start_match(&self) -> Result<MatchStart, ApiError> {
        let token = self.optional_token().await;
        let request = attest(self.client.post(self.url("ai-duel/start")), token)
            .json(&serde_json::json!({}));
        self.execute_json(request).await
    }

    async fn submit_guess(
        &self,
        match_id: &str,
        round_index: u32,
        guess: &str,
    ) -> Result<GuessResult, ApiError> {
        let token = self.optional_token().await;
        let request = attest(self.client.post(self.url("ai-duel/guess")), token).json(
            &DuelGuessRequest {
                match_id,
                round_index,
                guess,
            },
        );
        self.execute_json(request).await
    }
}
