//! Validation utilities for AgroGenius inputs
//!
//! Form values arrive as strings, so a prediction request is only issued
//! once every field parses as a decimal number.

use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;
use validator::Validate;

use crate::models::{AgronomicField, AgronomicInput};
use crate::types::GeoCoordinate;

/// Problems found in user-supplied input before any model call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputValidationError {
    #[error("Missing values for: {}", join_fields(.0))]
    MissingFields(Vec<AgronomicField>),

    #[error("Value {value:?} for {field} is not a number")]
    NotANumber { field: AgronomicField, value: String },

    #[error("Coordinates out of range: {0}")]
    CoordinatesOutOfRange(String),

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

fn join_fields(fields: &[AgronomicField]) -> String {
    fields
        .iter()
        .map(|f| f.key())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a single form value as a decimal
pub fn parse_field(field: AgronomicField, value: &str) -> Result<Decimal, InputValidationError> {
    Decimal::from_str(value.trim()).map_err(|_| InputValidationError::NotANumber {
        field,
        value: value.to_string(),
    })
}

/// Fields that are still blank, in form order
pub fn missing_fields(input: &AgronomicInput) -> Vec<AgronomicField> {
    AgronomicField::ALL
        .into_iter()
        .filter(|field| input.get(*field).trim().is_empty())
        .collect()
}

/// Validate that all seven fields are present and numeric
pub fn validate_agronomic_input(input: &AgronomicInput) -> Result<(), InputValidationError> {
    let missing = missing_fields(input);
    if !missing.is_empty() {
        return Err(InputValidationError::MissingFields(missing));
    }
    for field in AgronomicField::ALL {
        parse_field(field, input.get(field))?;
    }
    Ok(())
}

/// True when the form can be submitted for prediction
pub fn is_ready_for_prediction(input: &AgronomicInput) -> bool {
    validate_agronomic_input(input).is_ok()
}

/// Validate latitude and longitude bounds
pub fn validate_coordinates(coord: &GeoCoordinate) -> Result<(), InputValidationError> {
    if !coord.latitude.is_finite() || !coord.longitude.is_finite() {
        return Err(InputValidationError::CoordinatesOutOfRange(
            "latitude and longitude must be finite".to_string(),
        ));
    }
    coord
        .validate()
        .map_err(|e| InputValidationError::CoordinatesOutOfRange(e.to_string()))
}

/// Validate free text such as a transcript or chat message
pub fn validate_non_empty(label: &'static str, text: &str) -> Result<(), InputValidationError> {
    if text.trim().is_empty() {
        return Err(InputValidationError::Empty(label));
    }
    Ok(())
}
