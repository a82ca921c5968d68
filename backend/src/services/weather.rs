//! Weather lookup service
//!
//! Current conditions at a coordinate, returned as unit-free numeric strings
//! ready to drop into the prediction form.

use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{validate_coordinates, GeoCoordinate, Language, WeatherReading};
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{AppResult, ExtractionError, Operation};
use crate::external::{GenerativeModel, ModelError, Schema};
use crate::services::structured::StructuredClient;

const WEATHER_INSTRUCTION: &str = "You are a weather data provider. Based on the user's geo-coordinates, provide the current weather data as numbers only, without any units or symbols (like °C, %, or mm). Respond ONLY with a valid JSON object matching the provided schema.";

/// Weather service backed by the generative model
#[derive(Clone)]
pub struct WeatherService {
    client: StructuredClient,
}

/// Raw reply before unit stripping
#[derive(Debug, Deserialize)]
struct RawWeather {
    temperature: String,
    humidity: String,
    rainfall: String,
}

impl WeatherService {
    /// Create a new WeatherService instance
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            client: StructuredClient::new(model),
        }
    }

    /// Fetch temperature, humidity and rainfall for a coordinate
    pub async fn request_weather(
        &self,
        coord: &GeoCoordinate,
        language: Language,
    ) -> AppResult<WeatherReading> {
        validate_coordinates(coord)?;

        let prompt = format!(
            "Coordinates: latitude={}, longitude={}.",
            coord.latitude, coord.longitude
        );

        let raw: RawWeather = self
            .client
            .generate(
                Operation::Weather,
                prompt,
                WEATHER_INSTRUCTION,
                weather_schema(),
                language,
            )
            .await?;

        let reading = normalize_reading(raw)
            .map_err(|source| ExtractionError::new(Operation::Weather, source))?;
        Ok(reading)
    }
}

pub fn weather_schema() -> Schema {
    Schema::object()
        .property(
            "temperature",
            Schema::string().describe("Current temperature in Celsius (number only)."),
        )
        .property(
            "humidity",
            Schema::string().describe("Current humidity percentage (number only)."),
        )
        .property(
            "rainfall",
            Schema::string().describe(
                "Today's predicted rainfall in mm (number only). If no rainfall is expected, this should be '0'.",
            ),
        )
        .require_all()
}

/// Unit suffixes the model sometimes appends despite the instruction
const UNIT_SUFFIXES: [&str; 5] = ["°C", "℃", "C", "%", "mm"];

/// Zero code points of the native digit blocks used by the UI languages
/// (Devanagari, Bengali, Gujarati, Tamil, Telugu)
const NATIVE_DIGIT_ZEROS: [u32; 5] = [0x0966, 0x09E6, 0x0AE6, 0x0BE6, 0x0C66];

fn ascii_digit(c: char) -> char {
    let code = c as u32;
    NATIVE_DIGIT_ZEROS
        .iter()
        .find(|&&zero| (zero..zero + 10).contains(&code))
        .and_then(|&zero| char::from_digit(code - zero, 10))
        .unwrap_or(c)
}

/// Map native digits to ASCII and drop trailing unit suffixes. Anything
/// else is left in place for the numeric check to reject.
fn strip_units(value: &str) -> String {
    let ascii: String = value.chars().map(ascii_digit).collect();
    let mut rest = ascii.trim();
    while let Some(stripped) = UNIT_SUFFIXES
        .iter()
        .find_map(move |unit| rest.strip_suffix(*unit))
    {
        rest = stripped.trim_end();
    }
    rest.to_string()
}

fn numeric(field: &str, value: &str) -> Result<Decimal, ModelError> {
    Decimal::from_str(value).map_err(|_| {
        ModelError::SchemaViolation(format!("{} value {:?} is not a number", field, value))
    })
}

fn normalize_reading(raw: RawWeather) -> Result<WeatherReading, ModelError> {
    let temperature = strip_units(&raw.temperature);
    let humidity = strip_units(&raw.humidity);
    let rainfall = strip_units(&raw.rainfall);

    numeric("temperature", &temperature)?;
    numeric("humidity", &humidity)?;

    let rainfall = if rainfall.is_empty() || numeric("rainfall", &rainfall)?.is_zero() {
        "0".to_string()
    } else {
        rainfall
    };

    Ok(WeatherReading {
        temperature,
        humidity,
        rainfall,
    })
}
