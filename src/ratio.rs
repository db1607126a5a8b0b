//! Aspect ratio parsing.
//!
//! A ratio can be written as `"W:H"`, `"W/H"`, a decimal string such as
//! `"1.91"`, or a plain number. Everything resolves to a single `f64`
//! (width divided by height) that is strictly positive and finite.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RatioError {
    #[error("Invalid ratio: \"{input}\". Expected \"W:H\", \"W/H\", or a positive number.")]
    InvalidRatio { input: String },
}

/// A ratio as the user wrote it.
///
/// Untagged so config files and JSON accept both `ratio = "16:9"` and
/// `ratio = 1.5`. The original spelling is kept for display and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RatioSpec {
    Number(f64),
    Text(String),
}

impl fmt::Display for RatioSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatioSpec::Number(n) => write!(f, "{}", n),
            RatioSpec::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for RatioSpec {
    fn from(value: f64) -> Self {
        RatioSpec::Number(value)
    }
}

impl From<&str> for RatioSpec {
    fn from(value: &str) -> Self {
        RatioSpec::Text(value.to_string())
    }
}

impl From<String> for RatioSpec {
    fn from(value: String) -> Self {
        RatioSpec::Text(value)
    }
}

fn positive_finite(value: f64) -> Option<f64> {
    (value.is_finite() && value > 0.0).then_some(value)
}

fn parse_component(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().and_then(positive_finite)
}

/// Parse a ratio specification into `width / height`.
///
/// ```
/// # use focal_crop::ratio::{parse_ratio, RatioSpec};
/// let r = parse_ratio(&RatioSpec::from("16:9")).unwrap();
/// assert!((r - 16.0 / 9.0).abs() < 1e-9);
/// assert!(parse_ratio(&RatioSpec::from(0.0)).is_err());
/// ```
pub fn parse_ratio(input: &RatioSpec) -> Result<f64, RatioError> {
    let invalid = || RatioError::InvalidRatio {
        input: input.to_string(),
    };

    match input {
        RatioSpec::Number(n) => positive_finite(*n).ok_or_else(invalid),
        RatioSpec::Text(text) => {
            let parts: Vec<&str> = text.split([':', '/']).collect();
            if let [w, h] = parts.as_slice() {
                if let (Some(w), Some(h)) = (parse_component(w), parse_component(h)) {
                    return positive_finite(w / h).ok_or_else(invalid);
                }
            }
            parse_component(text).ok_or_else(invalid)
        }
    }
}
