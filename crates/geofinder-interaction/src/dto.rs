//! Wire shapes of the Remote Game API that are not already core types.
//!
//! Duel responses and leaderboard rows deserialize straight into the core
//! types; the image endpoints need validation, so they go through
//! [`ImageResponse`] first.

use geofinder_core::api::ApiError;
use geofinder_core::round::{Coordinates, CountryAnswer, GameMode, Round};
use serde::Deserialize;
use serde_json::Value;

/// Body of `GET getImage` / `GET getPano`.
///
/// Fields are kept loose so a wrong type is reported as an invalid response
/// naming the field rather than a generic decode failure.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    #[serde(default)]
    pub image_url: Option<Value>,
    #[serde(default)]
    pub coordinates: Option<Value>,
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub contributor: Option<String>,
}

impl ImageResponse {
    /// Validates the payload into a [`Round`]. Missing or malformed
    /// `imageUrl` or `coordinates` is a hard failure.
    pub fn into_round(self, mode: GameMode) -> Result<Round, ApiError> {
        let image_url = match self.image_url {
            Some(Value::String(url)) if !url.trim().is_empty() => url,
            _ => return Err(ApiError::invalid_response("Invalid image URL")),
        };

        let coordinates = self
            .coordinates
            .as_ref()
            .and_then(|c| Some(Coordinates::new(c.get("lat")?.as_f64()?, c.get("lon")?.as_f64()?)))
            .ok_or_else(|| ApiError::invalid_response("Invalid coordinates"))?;

        Ok(Round {
            mode,
            image_url,
            coordinates,
            answer: CountryAnswer::from_api(
                self.country_name.as_deref(),
                self.country_code.as_deref(),
            ),
            contributor: self.contributor.filter(|c| !c.trim().is_empty()),
        })
    }
}

/// Body of `POST ai-duel/guess`.
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuelGuessRequest<'a> {
    pub match_id: &'a str,
    pub round_index: u32,
    pub guess: &'a str,
}
