//! Canonical repeater record shared by every directory backend

use serde_json::Value;

use crate::geo::LatLon;

/// A value read from the directory, kept in its source text form.
///
/// Numbers keep the `.` decimal point they arrived with; the table emitters
/// switch to the device locale when writing.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FieldValue {
    #[default]
    Missing,
    /// Textual form of a finite number, e.g. "145.6875"
    Number(String),
    /// Anything that is not a number, passed through unchanged
    Text(String),
}

impl FieldValue {
    /// Classify a text value. Blank text counts as missing.
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return FieldValue::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => FieldValue::Number(trimmed.to_string()),
            _ => FieldValue::Text(raw.to_string()),
        }
    }

    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Missing,
            Value::Number(n) => FieldValue::Number(n.to_string()),
            Value::String(s) => FieldValue::from_text(s),
            other => FieldValue::Text(other.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }
}

/// Normalized repeater, independent of the backend it came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Repeater {
    pub callsign: String,
    pub rx_frequency: FieldValue,
    pub tx_frequency: FieldValue,
    pub latitude: FieldValue,
    pub longitude: FieldValue,
    /// Modes in source order, unfiltered
    pub modes: Vec<String>,
    pub rx_ctcss: Option<String>,
    pub tx_ctcss: Option<String>,
}

impl Repeater {
    /// Position, when both coordinates are numeric
    pub fn position(&self) -> Option<LatLon> {
        Some(LatLon::new(self.latitude.as_f64()?, self.longitude.as_f64()?))
    }
}
