//! Soil and climate inputs for crop prediction

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// The seven agronomic fields of the prediction form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgronomicField {
    #[serde(rename = "N")]
    Nitrogen,
    #[serde(rename = "P")]
    Phosphorus,
    #[serde(rename = "K")]
    Potassium,
    #[serde(rename = "temperature")]
    Temperature,
    #[serde(rename = "humidity")]
    Humidity,
    #[serde(rename = "ph")]
    Ph,
    #[serde(rename = "rainfall")]
    Rainfall,
}

impl AgronomicField {
    pub const ALL: [AgronomicField; 7] = [
        AgronomicField::Nitrogen,
        AgronomicField::Phosphorus,
        AgronomicField::Potassium,
        AgronomicField::Temperature,
        AgronomicField::Humidity,
        AgronomicField::Ph,
        AgronomicField::Rainfall,
    ];

    /// JSON key used on the wire and in the form
    pub fn key(&self) -> &'static str {
        match self {
            AgronomicField::Nitrogen => "N",
            AgronomicField::Phosphorus => "P",
            AgronomicField::Potassium => "K",
            AgronomicField::Temperature => "temperature",
            AgronomicField::Humidity => "humidity",
            AgronomicField::Ph => "ph",
            AgronomicField::Rainfall => "rainfall",
        }
    }
}

impl fmt::Display for AgronomicField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Form state for a crop prediction request.
///
/// Values stay as strings because they come from manual entry, speech
/// parsing or a weather lookup and may be partially filled. An empty string
/// means the field has not been provided yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgronomicInput {
    #[serde(rename = "N", default)]
    pub nitrogen: String,
    #[serde(rename = "P", default)]
    pub phosphorus: String,
    #[serde(rename = "K", default)]
    pub potassium: String,
    #[serde(default)]
    pub temperature: String,
    #[serde(default)]
    pub humidity: String,
    #[serde(default)]
    pub ph: String,
    #[serde(default)]
    pub rainfall: String,
}

impl AgronomicInput {
    pub fn get(&self, field: AgronomicField) -> &str {
        match field {
            AgronomicField::Nitrogen => &self.nitrogen,
            AgronomicField::Phosphorus => &self.phosphorus,
            AgronomicField::Potassium => &self.potassium,
            AgronomicField::Temperature => &self.temperature,
            AgronomicField::Humidity => &self.humidity,
            AgronomicField::Ph => &self.ph,
            AgronomicField::Rainfall => &self.rainfall,
        }
    }

    pub fn set(&mut self, field: AgronomicField, value: impl Into<String>) {
        let slot = match field {
            AgronomicField::Nitrogen => &mut self.nitrogen,
            AgronomicField::Phosphorus => &mut self.phosphorus,
            AgronomicField::Potassium => &mut self.potassium,
            AgronomicField::Temperature => &mut self.temperature,
            AgronomicField::Humidity => &mut self.humidity,
            AgronomicField::Ph => &mut self.ph,
            AgronomicField::Rainfall => &mut self.rainfall,
        };
        *slot = value.into();
    }

    /// Merge fields extracted from speech. Fields the speaker did not
    /// mention keep their current value.
    pub fn apply_partial(&mut self, partial: &PartialAgronomicInput) {
        for field in AgronomicField::ALL {
            if let Some(value) = partial.get(field) {
                self.set(field, value);
            }
        }
    }

    /// Overwrite the three weather-derived fields
    pub fn apply_weather(&mut self, reading: &WeatherReading) {
        self.temperature = reading.temperature.clone();
        self.humidity = reading.humidity.clone();
        self.rainfall = reading.rainfall.clone();
    }
}

/// Subset of agronomic fields extracted from a voice transcript.
///
/// Only keys the speaker mentioned are present; null or blank values count
/// as not mentioned.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartialAgronomicInput {
    #[serde(rename = "N", default, deserialize_with = "lenient_value", skip_serializing_if = "Option::is_none")]
    pub nitrogen: Option<String>,
    #[serde(rename = "P", default, deserialize_with = "lenient_value", skip_serializing_if = "Option::is_none")]
    pub phosphorus: Option<String>,
    #[serde(rename = "K", default, deserialize_with = "lenient_value", skip_serializing_if = "Option::is_none")]
    pub potassium: Option<String>,
    #[serde(default, deserialize_with = "lenient_value", skip_serializing_if = "Option::is_none")]
    pub temperature: Option<String>,
    #[serde(default, deserialize_with = "lenient_value", skip_serializing_if = "Option::is_none")]
    pub humidity: Option<String>,
    #[serde(default, deserialize_with = "lenient_value", skip_serializing_if = "Option::is_none")]
    pub ph: Option<String>,
    #[serde(default, deserialize_with = "lenient_value", skip_serializing_if = "Option::is_none")]
    pub rainfall: Option<String>,
}

impl PartialAgronomicInput {
    pub fn get(&self, field: AgronomicField) -> Option<&str> {
        match field {
            AgronomicField::Nitrogen => self.nitrogen.as_deref(),
            AgronomicField::Phosphorus => self.phosphorus.as_deref(),
            AgronomicField::Potassium => self.potassium.as_deref(),
            AgronomicField::Temperature => self.temperature.as_deref(),
            AgronomicField::Humidity => self.humidity.as_deref(),
            AgronomicField::Ph => self.ph.as_deref(),
            AgronomicField::Rainfall => self.rainfall.as_deref(),
        }
    }

    /// Fields present in this partial, in form order
    pub fn mentioned_fields(&self) -> Vec<AgronomicField> {
        AgronomicField::ALL
            .into_iter()
            .filter(|field| self.get(*field).is_some())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.mentioned_fields().is_empty()
    }
}

/// Current weather conditions as unit-free numeric strings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeatherReading {
    pub temperature: String,
    pub humidity: String,
    pub rainfall: String,
}

/// Accepts a string or bare number; null and blank strings become `None`
fn lenient_value<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string or number, found {}",
            other
        ))),
    }
}
