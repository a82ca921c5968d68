//! WebAssembly module for the AgroGenius form
//!
//! Provides client-side handling for:
//! - Merging voice-extracted fields into the prediction form
//! - Applying a weather reading to the form
//! - Readiness checks before a prediction is requested

use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str("AgroGenius form helpers loaded"));
}

fn parse_form(form_json: &str) -> Result<AgronomicInput, String> {
    serde_json::from_str(form_json).map_err(|e| format!("Invalid form JSON: {}", e))
}

fn to_json(form: &AgronomicInput) -> Result<String, String> {
    serde_json::to_string(form).map_err(|e| format!("Failed to encode form: {}", e))
}

fn merge_partial(form_json: &str, partial_json: &str) -> Result<String, String> {
    let mut form = parse_form(form_json)?;
    let partial: PartialAgronomicInput = serde_json::from_str(partial_json)
        .map_err(|e| format!("Invalid extracted fields JSON: {}", e))?;
    form.apply_partial(&partial);
    to_json(&form)
}

fn merge_weather(form_json: &str, reading_json: &str) -> Result<String, String> {
    let mut form = parse_form(form_json)?;
    let reading: WeatherReading = serde_json::from_str(reading_json)
        .map_err(|e| format!("Invalid weather JSON: {}", e))?;
    form.apply_weather(&reading);
    to_json(&form)
}

fn missing_keys(form_json: &str) -> Result<Vec<&'static str>, String> {
    let form = parse_form(form_json)?;
    Ok(missing_fields(&form).into_iter().map(|f| f.key()).collect())
}

/// Merge fields heard in speech into the form; unmentioned fields are kept
#[wasm_bindgen]
pub fn merge_speech_fields(form_json: &str, partial_json: &str) -> Result<String, JsValue> {
    merge_partial(form_json, partial_json).map_err(|e| JsValue::from_str(&e))
}

/// Overwrite temperature, humidity and rainfall with a weather reading
#[wasm_bindgen]
pub fn apply_weather_reading(form_json: &str, reading_json: &str) -> Result<String, JsValue> {
    merge_weather(form_json, reading_json).map_err(|e| JsValue::from_str(&e))
}

/// True when every field is filled with a number
#[wasm_bindgen]
pub fn is_form_ready(form_json: &str) -> bool {
    parse_form(form_json)
        .map(|form| is_ready_for_prediction(&form))
        .unwrap_or(false)
}

/// Keys of the empty fields, in form order
#[wasm_bindgen]
pub fn missing_prediction_fields(form_json: &str) -> Result<js_sys::Array, JsValue> {
    let keys = missing_keys(form_json).map_err(|e| JsValue::from_str(&e))?;
    Ok(keys.into_iter().map(JsValue::from_str).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORM: &str = r#"{"N":"90","P":"42","K":"43","temperature":"20.8","humidity":"82","ph":"6.5","rainfall":"202"}"#;

    #[test]
    fn test_merge_keeps_unmentioned_fields() {
        let merged = merge_partial(FORM, r#"{"N":"120","ph":6.8}"#).unwrap();
        let form: AgronomicInput = serde_json::from_str(&merged).unwrap();
        assert_eq!(form.nitrogen, "120");
        assert_eq!(form.ph, "6.8");
        assert_eq!(form.phosphorus, "42");
        assert_eq!(form.rainfall, "202");
    }

    #[test]
    fn test_weather_overwrites_three_fields() {
        let merged = merge_weather(
            FORM,
            r#"{"temperature":"31","humidity":"60","rainfall":"0"}"#,
        )
        .unwrap();
        let form: AgronomicInput = serde_json::from_str(&merged).unwrap();
        assert_eq!(form.temperature, "31");
        assert_eq!(form.humidity, "60");
        assert_eq!(form.rainfall, "0");
        assert_eq!(form.nitrogen, "90");
    }

    #[test]
    fn test_readiness() {
        assert!(is_form_ready(FORM));
        assert!(!is_form_ready(r#"{"N":"90"}"#));
        assert!(!is_form_ready("not json"));
        assert_eq!(
            missing_keys(r#"{"N":"90","P":"42","K":"43","ph":"6.5"}"#).unwrap(),
            vec!["temperature", "humidity", "rainfall"]
        );
    }

    #[test]
    fn test_invalid_partial_is_reported() {
        let err = merge_partial(FORM, r#"{"N":{"value":1}}"#).unwrap_err();
        assert!(err.starts_with("Invalid extracted fields JSON"));
    }
}
