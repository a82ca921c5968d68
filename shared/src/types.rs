//! Common types used across the platform

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// GPS coordinates supplied by the device's geolocation capability
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Validate)]
pub struct GeoCoordinate {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl GeoCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Supported UI languages
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(try_from = "String")]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "hi")]
    Hindi,
    #[serde(rename = "bn")]
    Bengali,
    #[serde(rename = "ta")]
    Tamil,
    #[serde(rename = "te")]
    Telugu,
    #[serde(rename = "mr")]
    Marathi,
    #[serde(rename = "gu")]
    Gujarati,
}

impl Language {
    pub const ALL: [Language; 8] = [
        Language::English,
        Language::Spanish,
        Language::Hindi,
        Language::Bengali,
        Language::Tamil,
        Language::Telugu,
        Language::Marathi,
        Language::Gujarati,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
            Language::Hindi => "hi",
            Language::Bengali => "bn",
            Language::Tamil => "ta",
            Language::Telugu => "te",
            Language::Marathi => "mr",
            Language::Gujarati => "gu",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when a language code is not one of the supported set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported language code: {0}")]
pub struct UnsupportedLanguage(pub String);

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|language| language.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnsupportedLanguage(s.to_string()))
    }
}

impl TryFrom<String> for Language {
    type Error = UnsupportedLanguage;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        code.parse()
    }
}
