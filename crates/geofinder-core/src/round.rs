//! Round domain model.
//!
//! A [`Round`] is one image-guess-answer cycle. Rounds are produced by the
//! Remote Game API and are immutable once returned.

use crate::country::normalize;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumString};

/// Which kind of imagery a session is played with.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameMode {
    /// Flat street-level photo.
    #[default]
    Photo,
    /// 360° panorama.
    Panorama,
}

impl GameMode {
    /// Remote API path serving a random located image for this mode.
    pub fn image_path(&self) -> &'static str {
        match self {
            GameMode::Photo => "getImage",
            GameMode::Panorama => "getPano",
        }
    }

    /// Local store key holding the high score for this mode.
    pub fn high_score_key(&self) -> &'static str {
        match self {
            GameMode::Photo => "highScore",
            GameMode::Panorama => "highScorePano",
        }
    }
}

/// Latitude/longitude of the depicted location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Renders as `lat, lon` with four decimals.
impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// The country a round's image was taken in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryAnswer {
    /// Canonical name in normalized form (see [`normalize`]). May be empty
    /// when only a code is known.
    pub name: String,
    /// ISO-style code, upper-cased.
    pub code: Option<String>,
    /// Human-facing name used in feedback.
    pub display_name: String,
}

impl CountryAnswer {
    /// Builds an answer from the raw name/code the API returned.
    ///
    /// Returns `None` when neither a usable name nor a code is present; such a
    /// round can only be resolved by running out of attempts.
    pub fn from_api(country_name: Option<&str>, country_code: Option<&str>) -> Option<Self> {
        let raw_name = country_name.map(str::trim).unwrap_or_default();
        let name = normalize(raw_name);
        let code = country_code
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty());

        if name.is_empty() && code.is_none() {
            return None;
        }

        let display_name = if !raw_name.is_empty() {
            raw_name.to_string()
        } else {
            code.clone().unwrap_or_else(|| UNKNOWN_COUNTRY.to_string())
        };

        let name = if name.is_empty() {
            code.as_deref().map(str::to_lowercase).unwrap_or_default()
        } else {
            name
        };

        Some(Self {
            name,
            code,
            display_name,
        })
    }
}

/// Display name used when the API did not identify the country.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// One unit of play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub mode: GameMode,
    pub image_url: String,
    pub coordinates: Coordinates,
    pub answer: Option<CountryAnswer>,
    pub contributor: Option<String>,
}

impl Round {
    pub fn display_name(&self) -> &str {
        self.answer
            .as_ref()
            .map(|a| a.display_name.as_str())
            .unwrap_or(UNKNOWN_COUNTRY)
    }

    /// Attribution line required by the imagery licence.
    pub fn attribution(&self) -> String {
        attribution(self.contributor.as_deref())
    }
}

/// Attribution text for an optional contributor.
pub fn attribution(contributor: Option<&str>) -> String {
    match contributor.map(str::trim).filter(|c| !c.is_empty()) {
        Some(name) => format!("Image by {} at Mapillary, CC-BY-SA", name),
        None => "Images provided via Mapillary".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_coordinates_display_four_decimals() {
        let c = Coordinates::new(35.68123456, -139.7);
        assert_eq!(c.to_string(), "35.6812, -139.7000");
    }

    #[test]
    fn test_answer_from_name_only() {
        let answer = CountryAnswer::from_api(Some("  United States "), None).unwrap();
        assert_eq!(answer.name, "united states");
        assert_eq!(answer.display_name, "United States");
        assert!(answer.code.is_none());
    }

    #[test]
    fn test_answer_from_code_only() {
        let answer = CountryAnswer::from_api(None, Some("jp")).unwrap();
        assert_eq!(answer.name, "jp");
        assert_eq!(answer.code.as_deref(), Some("JP"));
        assert_eq!(answer.display_name, "JP");
    }

    #[test]
    fn test_answer_missing() {
        assert!(CountryAnswer::from_api(None, None).is_none());
        assert!(CountryAnswer::from_api(Some("   "), Some("")).is_none());
    }

    #[test]
    fn test_game_mode_keys_and_parsing() {
        assert_eq!(GameMode::Photo.high_score_key(), "highScore");
        assert_eq!(GameMode::Panorama.image_path(), "getPano");
        assert_eq!(GameMode::from_str("panorama").unwrap(), GameMode::Panorama);
        assert_eq!(GameMode::Photo.to_string(), "photo");
    }

    #[test]
    fn test_attribution() {
        assert_eq!(
            attribution(Some("alice")),
            "Image by alice at Mapillary, CC-BY-SA"
        );
        assert_eq!(attribution(Some("  ")), "Images provided via Mapillary");
    }
}
