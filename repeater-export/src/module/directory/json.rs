//! JSON directory backend (przemienniki.eu data export)
//!
//! The export returns a flat array of repeater objects:
//! `{"callsign": "SR9KR", "coordinates": [50.08, 19.90], "modes": ["fm", "dmr"], ...}`

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::error::DirectoryError;
use super::http::{DirectoryHttp, with_query};
use super::types::{FieldValue, Repeater};
use super::{BackendKind, DirectoryBackend};
use crate::config::{QueryParams, ZoneConfig};
use crate::module::codeplug::ModeTable;

pub const DEFAULT_JSON_ENDPOINT: &str = "https://przemienniki.eu/eksport-danych/json/";

/// Raw repeater object. Every field is optional and loosely typed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawJsonRepeater {
    pub callsign: Value,
    pub coordinates: Value,
    pub rx_frequency: Value,
    pub tx_frequency: Value,
    pub modes: Value,
    pub rx_ctcss: Value,
    pub tx_ctcss: Value,
}

/// Parse the export body into raw entries.
///
/// The body must be an array; elements that are not objects are logged and skipped.
pub fn parse_json_export(body: &str) -> Result<Vec<RawJsonRepeater>, DirectoryError> {
    let items: Vec<Value> =
        serde_json::from_str(body).map_err(|e| DirectoryError::parse_failure("JSON", e, body))?;

    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| {
            if !item.is_object() {
                tracing::warn!("Skipping export entry #{}: expected an object, got {}", index, item);
                return None;
            }
            match serde_json::from_value(item) {
                Ok(raw) => Some(raw),
                Err(e) => {
                    tracing::warn!("Skipping export entry #{}: {}", index, e);
                    None
                }
            }
        })
        .collect())
}

/// `false`, `"false"`, `""` and null all mean "no tone".
fn ctcss_tone(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() || s == "false" => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn modes(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

pub fn normalize_json(raw: RawJsonRepeater) -> Repeater {
    let (latitude, longitude) = match &raw.coordinates {
        Value::Array(pair) => (
            pair.first().map(FieldValue::from_json).unwrap_or_default(),
            pair.get(1).map(FieldValue::from_json).unwrap_or_default(),
        ),
        _ => (FieldValue::Missing, FieldValue::Missing),
    };

    Repeater {
        callsign: text(&raw.callsign),
        rx_frequency: FieldValue::from_json(&raw.rx_frequency),
        tx_frequency: FieldValue::from_json(&raw.tx_frequency),
        latitude,
        longitude,
        modes: modes(&raw.modes),
        rx_ctcss: ctcss_tone(&raw.rx_ctcss),
        tx_ctcss: ctcss_tone(&raw.tx_ctcss),
    }
}

pub struct JsonBackend {
    http: DirectoryHttp,
    endpoint: String,
    band: String,
    status: String,
    mode: Option<String>,
    modes: ModeTable,
}

impl JsonBackend {
    pub fn new(params: &QueryParams) -> Result<Self, DirectoryError> {
        Ok(Self {
            http: DirectoryHttp::new(params)?,
            endpoint: params
                .json_endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_JSON_ENDPOINT.to_string()),
            band: params.band.clone(),
            status: params.status.clone(),
            mode: params.mode.clone(),
            modes: ModeTable::standard(),
        })
    }

    pub fn request_url(&self, zone: &ZoneConfig) -> String {
        let mut query = format!(
            "band={}&status={}&coordinates={},{}&distance={}",
            urlencoding::encode(&self.band),
            urlencoding::encode(&self.status),
            zone.latitude,
            zone.longitude,
            zone.max_distance
        );
        if let Some(mode) = &self.mode {
            query.push_str(&format!("&mode={}", urlencoding::encode(mode)));
        }
        with_query(&self.endpoint, &query)
    }
}

#[async_trait]
impl DirectoryBackend for JsonBackend {
    type Entry = RawJsonRepeater;

    fn name(&self) -> &str {
        BackendKind::Json.as_str()
    }

    async fn fetch(&self, zone: &ZoneConfig) -> Result<Vec<RawJsonRepeater>, DirectoryError> {
        let url = self.request_url(zone);
        tracing::info!("Querying {} with URL: {}", zone.name, url);

        let body = self.http.get_text(&url).await?;
        parse_json_export(&body)
    }

    fn normalize(&self, entry: RawJsonRepeater) -> Repeater {
        normalize_json(entry)
    }

    fn modes(&self) -> &ModeTable {
        &self.modes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"callsign":"SR9KR","coordinates":[50.08,19.9],"rx_frequency":145.6875,"tx_frequency":145.0875,
         "modes":["fm","dmr"],"rx_ctcss":"127.3","tx_ctcss":false,"status":"working"},
        {"callsign":"SR9P","coordinates":null,"rx_frequency":"438.800","modes":["c4fm"],"rx_ctcss":"false","tx_ctcss":""}
    ]"#;

    #[test]
    fn test_parse_and_normalize() {
        let raw = parse_json_export(SAMPLE).unwrap();
        assert_eq!(raw.len(), 2);

        let first = normalize_json(raw[0].clone());
        assert_eq!(first.callsign, "SR9KR");
        assert_eq!(first.latitude, FieldValue::Number("50.08".into()));
        assert_eq!(first.longitude, FieldValue::Number("19.9".into()));
        assert_eq!(first.rx_frequency, FieldValue::Number("145.6875".into()));
        assert_eq!(first.tx_frequency, FieldValue::Number("145.0875".into()));
        assert_eq!(first.modes, vec!["fm", "dmr"]);
        assert_eq!(first.rx_ctcss.as_deref(), Some("127.3"));
        assert_eq!(first.tx_ctcss, None);

        let second = normalize_json(raw[1].clone());
        assert!(second.latitude.is_missing());
        assert!(second.longitude.is_missing());
        assert!(second.tx_frequency.is_missing());
        assert_eq!(second.rx_frequency, FieldValue::Number("438.800".into()));
        assert_eq!(second.modes, vec!["c4fm"]);
        assert_eq!(second.rx_ctcss, None);
        assert_eq!(second.tx_ctcss, None);
    }

    #[test]
    fn test_numeric_tone() {
        let raw: RawJsonRepeater =
            serde_json::from_str(r#"{"callsign":"SR9A","rx_ctcss":88.5,"tx_ctcss":null}"#).unwrap();
        let repeater = normalize_json(raw);
        assert_eq!(repeater.rx_ctcss.as_deref(), Some("88.5"));
        assert_eq!(repeater.tx_ctcss, None);
        assert!(repeater.modes.is_empty());
    }

    #[test]
    fn test_malformed_body() {
        let err = parse_json_export("<html>Service Unavailable</html>").unwrap_err();
        assert!(matches!(err, DirectoryError::ParseFailure { format: "JSON", .. }));
        assert_eq!(err.body(), Some("<html>Service Unavailable</html>"));
    }

    #[test]
    fn test_non_object_entries_are_skipped() {
        let body = r#"[{"callsign":"SR9KR","modes":["fm"]}, null, 42, {"callsign":"SR9P"}]"#;
        let raw = parse_json_export(body).unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(normalize_json(raw[0].clone()).callsign, "SR9KR");
        assert_eq!(normalize_json(raw[1].clone()).callsign, "SR9P");

        let err = parse_json_export(r#"{"callsign":"SR9KR"}"#).unwrap_err();
        assert!(matches!(err, DirectoryError::ParseFailure { format: "JSON", .. }));
    }

    #[test]
    fn test_request_url() {
        let params = QueryParams {
            band: "2m".into(),
            json_endpoint: Some("http://localhost:9000/json/".into()),
            ..Default::default()
        };
        let backend = JsonBackend::new(&params).unwrap();
        let zone = ZoneConfig {
            name: "Krakow".into(),
            latitude: 50.06,
            longitude: 19.94,
            max_distance: 50.0,
        };
        assert_eq!(
            backend.request_url(&zone),
            "http://localhost:9000/json/?band=2m&status=working&coordinates=50.06,19.94&distance=50"
        );
    }
}
