//! Shared data structures for the calculators and converters.
//!
//! This module defines the error type returned by every tool, the small
//! enumerations reused across pages (sex, unit system, activity level) and the
//! per-call options that callers pass in as JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while running a tool.
///
/// The `Display` output of every variant is the single message shown to the
/// user; the library never classifies failures further than this.
#[derive(Debug, Error)]
pub enum ToolError {
    /// An input field is missing, non-numeric or otherwise unusable.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// A numeric input falls outside the range covered by the formula.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
    /// No tool is registered under the requested id.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    /// A file was rejected before upload.
    #[error("{0}")]
    UnsupportedFile(String),
    /// Encoded text could not be turned back into characters.
    #[error("Decode error: {0}")]
    Decode(String),
    /// A sitemap could not be read or written.
    #[error("XML error: {0}")]
    Xml(String),
    /// A request to one of the form endpoints failed.
    #[error("Request failed: {0}")]
    Network(String),
    /// A result could not be encoded as JSON.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        ToolError::Serialization(err.to_string())
    }
}

/// Biological sex used by the sex-specific formulas and reference tables.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

/// Unit system of the numbers typed into a form.
///
/// Imperial inputs are pounds and inches; metric inputs are kilograms and
/// centimetres.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

/// Activity level used to scale BMR into TDEE.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise.
    #[default]
    Sedentary,
    /// Light exercise 1-3 days a week.
    Light,
    /// Moderate exercise 3-5 days a week.
    Moderate,
    /// Hard exercise 6-7 days a week.
    Active,
    /// Physical job or training twice a day.
    VeryActive,
}

impl ActivityLevel {
    /// Multiplier applied to BMR.
    pub fn factor(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

/// Configuration options shared by every calculator.
///
/// All fields are optional. When not provided, sensible defaults are used.
///
/// # Examples
///
/// Default options (one decimal place, metric units):
/// ```json
/// {}
/// ```
///
/// Imperial form with two decimal places:
/// ```json
/// { "precision": 2, "units": "imperial" }
/// ```
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ToolOptions {
    /// Decimal places kept in every reported number. Defaults to 1.
    pub precision: Option<u32>,
    /// Unit system of length and mass inputs. Defaults to metric.
    pub units: Option<UnitSystem>,
}

impl Default for ToolOptions {
    fn default() -> Self {
        Self {
            precision: Some(1),
            units: Some(UnitSystem::Metric),
        }
    }
}

impl ToolOptions {
    /// Parses options from an optional JSON string.
    ///
    /// Missing or malformed JSON yields the defaults, so a page with a broken
    /// options payload still gets a result.
    pub fn from_json(options_json: Option<&str>) -> Self {
        match options_json {
            Some(s) => serde_json::from_str(s).unwrap_or_default(),
            None => ToolOptions::default(),
        }
    }

    pub fn precision(&self) -> u32 {
        self.precision.unwrap_or(1)
    }

    pub fn units(&self) -> UnitSystem {
        self.units.unwrap_or_default()
    }

    /// Rounds `value` to the configured precision.
    pub fn round(&self, value: f64) -> f64 {
        round_to(value, self.precision())
    }
}

/// Rounds half away from zero to `places` decimal places.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places.min(10) as i32);
    (value * factor).round() / factor
}

/// Rejects NaN, infinities and values that are not strictly positive.
///
/// This is the guard every form runs before evaluating its formula; an empty
/// field arrives here as `0` or NaN and produces no result.
pub fn require_positive(field: &str, value: f64) -> Result<f64, ToolError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ToolError::InvalidInput(format!(
            "{field} must be a positive number"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_to_uses_half_away_from_zero() {
        assert_eq!(round_to(2.25, 1), 2.3);
        assert_eq!(round_to(-2.25, 1), -2.3);
        assert_eq!(round_to(1234.5678, 0), 1235.0);
    }

    #[test]
    fn malformed_options_fall_back_to_defaults() {
        let opts = ToolOptions::from_json(Some("{not json"));
        assert_eq!(opts.precision(), 1);
        assert_eq!(opts.units(), UnitSystem::Metric);

        let opts = ToolOptions::from_json(Some(r#"{"precision": 3, "units": "imperial"}"#));
        assert_eq!(opts.precision(), 3);
        assert_eq!(opts.units(), UnitSystem::Imperial);
    }

    #[test]
    fn require_positive_rejects_nan_and_zero() {
        assert!(require_positive("weight", f64::NAN).is_err());
        assert!(require_positive("weight", 0.0).is_err());
        assert!(require_positive("weight", -4.0).is_err());
        assert_eq!(require_positive("weight", 70.0).unwrap(), 70.0);
    }

    #[test]
    fn activity_factors_match_published_multipliers() {
        assert_eq!(ActivityLevel::Sedentary.factor(), 1.2);
        assert_eq!(ActivityLevel::VeryActive.factor(), 1.9);
    }
}
