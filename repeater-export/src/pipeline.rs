//! Export pipeline: zones → repeaters → channels → zone groups → tables
//!
//! Zones are processed one after another. A zone whose fetch fails is
//! logged and skipped; it still gets its (empty) `-DIGI`/`-FM` pair.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::config::{ExportConfig, ZoneConfig};
use crate::geo::LatLon;
use crate::module::codeplug::{ChannelCounter, Zone, ZonedChannel, aggregate, emitter, expand};
use crate::module::directory::{
    BackendKind, DirectoryBackend, DirectoryError, JsonBackend, UnsupportedBackend, XmlBackend,
};

/// Per-run counters, logged once the run finishes
#[derive(Debug, Clone)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub backend: String,
    pub zones_total: usize,
    pub zones_fetched: usize,
    pub failed_zones: Vec<String>,
    pub repeaters_seen: usize,
    pub repeaters_out_of_range: usize,
    pub channels: usize,
}

/// Everything one run produced
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub channels: Vec<ZonedChannel>,
    pub zones: Vec<Zone>,
    pub report: RunReport,
}

/// Options that change which repeaters make it into the export
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Drop repeaters located beyond the zone radius
    pub strict_radius: bool,
}

/// Diagnostic for a zone that contributes nothing; the wording comes from the error kind.
fn skip_message(zone: &str, error: &DirectoryError) -> String {
    format!("Skipping {}: {}", zone, error)
}

/// Run the pipeline over `zones` against one backend.
pub async fn run<B: DirectoryBackend>(
    backend: &B,
    zones: &[ZoneConfig],
    options: RunOptions,
) -> ExportOutcome {
    let mut report = RunReport {
        started_at: Utc::now(),
        backend: backend.name().to_string(),
        zones_total: zones.len(),
        zones_fetched: 0,
        failed_zones: Vec::new(),
        repeaters_seen: 0,
        repeaters_out_of_range: 0,
        channels: 0,
    };
    let mut counter = ChannelCounter::new();
    let mut channels: Vec<ZonedChannel> = Vec::new();

    for zone in zones {
        let entries = match backend.fetch(zone).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!("{}", skip_message(&zone.name, &e));
                if let Some(body) = e.body() {
                    tracing::error!("Response content: {}", body);
                }
                report.failed_zones.push(zone.name.clone());
                continue;
            }
        };
        report.zones_fetched += 1;

        let before = channels.len();
        let center = LatLon::new(zone.latitude, zone.longitude);

        for entry in entries {
            let repeater = backend.normalize(entry);
            report.repeaters_seen += 1;

            if let Some(position) = repeater.position() {
                let distance = center.distance_km(position);
                tracing::debug!("{} is {:.1} km from {}", repeater.callsign, distance, zone.name);
                if options.strict_radius && distance > zone.max_distance {
                    report.repeaters_out_of_range += 1;
                    continue;
                }
            }

            channels.extend(expand(&repeater, &zone.name, backend.modes(), &mut counter));
        }

        tracing::info!("{}: {} channels generated", zone.name, channels.len() - before);
    }

    let zone_groups = aggregate(&channels, zones);
    report.channels = channels.len();

    ExportOutcome {
        channels,
        zones: zone_groups,
        report,
    }
}

/// Pick the backend named by the config and run the pipeline with it.
pub async fn export(config: &ExportConfig) -> Result<ExportOutcome> {
    let options = RunOptions {
        strict_radius: config.strict_radius,
    };

    let outcome = match config.backend_kind() {
        Ok(BackendKind::Json) => {
            let backend = JsonBackend::new(&config.query).context("Failed to set up JSON backend")?;
            run(&backend, &config.zones, options).await
        }
        Ok(BackendKind::Xml) => {
            let backend = XmlBackend::new(&config.query).context("Failed to set up XML backend")?;
            run(&backend, &config.zones, options).await
        }
        Err(name) => {
            tracing::warn!("Data source '{}' is not supported", name);
            run(&UnsupportedBackend::new(name), &config.zones, options).await
        }
    };

    Ok(outcome)
}

/// Write both tables into the configured output directory.
pub fn write_outputs(config: &ExportConfig, outcome: &ExportOutcome) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create {}", config.output_dir.display()))?;

    let channels_path = config.channels_path();
    let zones_path = config.zones_path();

    emitter::write_channels_file(&channels_path, outcome.channels.iter().map(|c| &c.channel))?;
    emitter::write_zones_file(&zones_path, &outcome.zones)?;

    Ok((channels_path, zones_path))
}

impl RunReport {
    pub fn log(&self) {
        let elapsed = Utc::now() - self.started_at;
        tracing::info!(
            "Export via {} finished in {} ms: {}/{} zones fetched, {} repeaters, {} channels",
            self.backend,
            elapsed.num_milliseconds(),
            self.zones_fetched,
            self.zones_total,
            self.repeaters_seen,
            self.channels
        );
        if self.repeaters_out_of_range > 0 {
            tracing::info!("{} repeaters dropped outside zone radius", self.repeaters_out_of_range);
        }
        if !self.failed_zones.is_empty() {
            tracing::warn!("Zones skipped: {}", self.failed_zones.join(", "));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    use crate::module::codeplug::{ChannelType, ModeTable};
    use crate::module::directory::{FieldValue, Repeater};

    /// Serves canned repeaters per zone; zones without an entry fail with HTTP 500.
    struct CannedBackend {
        data: HashMap<String, Vec<Repeater>>,
        modes: ModeTable,
    }

    #[async_trait]
    impl DirectoryBackend for CannedBackend {
        type Entry = Repeater;

        fn name(&self) -> &str {
            "canned"
        }

        async fn fetch(&self, zone: &ZoneConfig) -> Result<Vec<Repeater>, DirectoryError> {
            self.data.get(&zone.name).cloned().ok_or(DirectoryError::Fetch {
                status: 500,
                body: "Internal Server Error".into(),
            })
        }

        fn normalize(&self, entry: Repeater) -> Repeater {
            entry
        }

        fn modes(&self) -> &ModeTable {
            &self.modes
        }
    }

    fn zone(name: &str, latitude: f64, longitude: f64, max_distance: f64) -> ZoneConfig {
        ZoneConfig { name: name.into(), latitude, longitude, max_distance }
    }

    fn repeater(callsign: &str, modes: &[&str], lat: &str, lon: &str) -> Repeater {
        Repeater {
            callsign: callsign.into(),
            rx_frequency: FieldValue::Number("145.6875".into()),
            tx_frequency: FieldValue::Number("145.0875".into()),
            latitude: FieldValue::from_text(lat),
            longitude: FieldValue::from_text(lon),
            modes: modes.iter().map(|m| m.to_string()).collect(),
            rx_ctcss: None,
            tx_ctcss: None,
        }
    }

    fn backend(data: Vec<(&str, Vec<Repeater>)>) -> CannedBackend {
        CannedBackend {
            data: data.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
            modes: ModeTable::standard(),
        }
    }

    #[tokio::test]
    async fn test_numbering_spans_zones() {
        let backend = backend(vec![
            ("Krakow", vec![repeater("SR9KR", &["fm", "dmr"], "50.08", "19.90")]),
            ("Tarnow", vec![
                repeater("SR9TA", &["dmr"], "50.01", "20.98"),
                repeater("SR9TB", &["c4fm"], "50.02", "20.99"),
                repeater("SR9TC", &["fm"], "50.03", "21.00"),
            ]),
        ]);
        let zones = [zone("Krakow", 50.06, 19.94, 50.0), zone("Tarnow", 50.01, 20.98, 30.0)];

        let outcome = run(&backend, &zones, RunOptions::default()).await;

        let numbers: Vec<u32> = outcome.channels.iter().map(|c| c.channel.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        let names: Vec<&str> = outcome.channels.iter().map(|c| c.channel.name.as_str()).collect();
        assert_eq!(names, vec!["SR9KR-Digi", "SR9KR-FM", "SR9TA-Digi", "SR9TC-FM"]);

        assert_eq!(outcome.zones.len(), 4);
        assert_eq!(outcome.zones[2].name, "Tarnow-DIGI");
        assert_eq!(outcome.zones[2].channels, vec!["SR9TA-Digi"]);
        assert_eq!(outcome.report.repeaters_seen, 4);
        assert_eq!(outcome.report.zones_fetched, 2);
        assert_eq!(outcome.report.channels, 4);
    }

    #[tokio::test]
    async fn test_failed_zone_keeps_empty_pair() {
        let backend = backend(vec![("Tarnow", vec![repeater("SR9TA", &["dmr"], "50.01", "20.98")])]);
        let zones = [zone("Krakow", 50.06, 19.94, 50.0), zone("Tarnow", 50.01, 20.98, 30.0)];

        let outcome = run(&backend, &zones, RunOptions::default()).await;

        assert_eq!(outcome.report.failed_zones, vec!["Krakow"]);
        assert_eq!(outcome.channels.len(), 1);
        assert_eq!(outcome.channels[0].channel.number, 1);
        let zone_names: Vec<&str> = outcome.zones.iter().map(|z| z.name.as_str()).collect();
        assert_eq!(zone_names, vec!["Krakow-DIGI", "Krakow-FM", "Tarnow-DIGI", "Tarnow-FM"]);
        assert!(outcome.zones[0].channels.is_empty());
        assert!(outcome.zones[1].channels.is_empty());
    }

    #[tokio::test]
    async fn test_strict_radius() {
        let far_away = repeater("SP5W", &["fm"], "52.23", "21.01");
        let nearby = repeater("SR9KR", &["fm"], "50.08", "19.90");
        let unknown = repeater("SR9X", &["fm"], "", "");
        let zones = [zone("Krakow", 50.06, 19.94, 50.0)];

        let data = vec![("Krakow", vec![far_away, nearby, unknown])];
        let lenient = run(&backend(data.clone()), &zones, RunOptions::default()).await;
        assert_eq!(lenient.channels.len(), 3);

        let strict = run(&backend(data), &zones, RunOptions { strict_radius: true }).await;
        let names: Vec<&str> = strict.channels.iter().map(|c| c.channel.name.as_str()).collect();
        assert_eq!(names, vec!["SR9KR-FM", "SR9X-FM"]);
        assert_eq!(strict.channels[0].channel.number, 1);
        assert_eq!(strict.report.repeaters_out_of_range, 1);
    }

    #[tokio::test]
    async fn test_zone_order_follows_config() {
        let backend = backend(vec![
            ("B", vec![repeater("SR1B", &["dmr"], "", "")]),
            ("A", vec![repeater("SR1A", &["dmr"], "", "")]),
        ]);
        let zones = [zone("B", 0.0, 0.0, 1.0), zone("A", 0.0, 0.0, 1.0)];
        let outcome = run(&backend, &zones, RunOptions::default()).await;
        assert_eq!(outcome.zones[0].name, "B-DIGI");
        assert_eq!(outcome.zones[2].name, "A-DIGI");
        assert!(outcome.channels.iter().all(|c| c.channel.channel_type == ChannelType::Digital));
    }

    #[tokio::test]
    async fn test_unsupported_source_writes_empty_pairs() {
        let config = ExportConfig::from_toml(
            r#"
data_source = "csv"

[[zones]]
name = "Krakow"
latitude = 50.06
longitude = 19.94
max_distance = 50
"#,
        )
        .unwrap();

        let outcome = export(&config).await.unwrap();
        assert!(outcome.channels.is_empty());
        assert_eq!(outcome.zones.len(), 2);
        assert_eq!(outcome.report.failed_zones, vec!["Krakow"]);
        assert_eq!(outcome.report.backend, "csv");
    }

    #[test]
    fn test_skip_message_names_the_cause() {
        let parse = DirectoryError::parse_failure("JSON", "expected value", "<html>");
        assert_eq!(
            skip_message("Tarnow", &parse),
            "Skipping Tarnow: unable to parse the response as JSON: expected value"
        );

        let unsupported = DirectoryError::UnsupportedDataSource("csv".into());
        assert_eq!(skip_message("Krakow", &unsupported), "Skipping Krakow: unsupported data source 'csv'");

        let fetch = DirectoryError::Fetch { status: 500, body: String::new() };
        assert_eq!(skip_message("Gdansk", &fetch), "Skipping Gdansk: directory returned HTTP 500");
    }

    #[tokio::test]
    async fn test_write_outputs() {
        let dir = tempfile::TempDir::new().unwrap();
        let backend = backend(vec![("Krakow", vec![repeater("SR9KR", &["dmr"], "50.08", "19.90")])]);
        let zones = [zone("Krakow", 50.06, 19.94, 50.0)];
        let outcome = run(&backend, &zones, RunOptions::default()).await;

        let mut config = ExportConfig::from_toml("").unwrap();
        config.output_dir = dir.path().join("out");
        let (channels_path, zones_path) = write_outputs(&config, &outcome).unwrap();

        let channels = std::fs::read_to_string(channels_path).unwrap();
        assert_eq!(channels.lines().count(), 2);
        assert!(channels.contains("1;SR9KR-Digi;Digital;145,6875;145,0875;"));

        let zones = std::fs::read_to_string(zones_path).unwrap();
        assert!(zones.lines().nth(1).unwrap().starts_with("Krakow-DIGI;SR9KR-Digi;"));
    }
}
