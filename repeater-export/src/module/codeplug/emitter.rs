//! `;`-delimited channel and zone tables
//!
//! Column layout follows the import format of the radio-programming software.
//! Decimal values use `,` as the separator, everything else is written as is.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use csv::WriterBuilder;

use super::types::{Channel, ZONE_CAPACITY, Zone};
use crate::module::directory::FieldValue;

const DELIMITER: u8 = b';';

pub const CHANNEL_HEADER: [&str; 27] = [
    "Channel Number", "Channel Name", "Channel Type", "Rx Frequency", "Tx Frequency",
    "Bandwidth (kHz)", "Colour Code", "Timeslot", "Contact", "TG List", "DMR ID",
    "TS1_TA_Tx ID", "TS2_TA_Tx ID", "RX Tone", "TX Tone", "Squelch", "Power", "Rx Only",
    "Zone Skip", "All Skip", "TOT", "VOX", "No Beep", "No Eco", "APRS", "Latitude", "Longitude",
];

/// Render a value for the device locale: "145.6875" → "145,6875".
pub fn render_decimal(value: &FieldValue) -> String {
    match value {
        FieldValue::Missing => String::new(),
        FieldValue::Number(s) => s.replace('.', ","),
        FieldValue::Text(s) => s.clone(),
    }
}

fn channel_record(channel: &Channel) -> [String; 27] {
    let d = &channel.defaults;
    [
        channel.number.to_string(),
        channel.name.clone(),
        channel.channel_type.as_str().to_string(),
        render_decimal(&channel.rx_frequency),
        render_decimal(&channel.tx_frequency),
        channel.bandwidth.clone(),
        channel.colour_code.clone(),
        channel.timeslot.clone(),
        String::new(), // Contact
        String::new(), // TG List
        String::new(), // DMR ID
        String::new(), // TS1_TA_Tx ID
        String::new(), // TS2_TA_Tx ID
        channel.rx_tone.clone(),
        channel.tx_tone.clone(),
        String::new(), // Squelch
        d.power.to_string(),
        d.rx_only.to_string(),
        d.zone_skip.to_string(),
        d.all_skip.to_string(),
        d.tot.to_string(),
        d.vox.to_string(),
        d.no_beep.to_string(),
        d.no_eco.to_string(),
        d.aprs.to_string(),
        render_decimal(&channel.latitude),
        render_decimal(&channel.longitude),
    ]
}

pub fn write_channels<'a, W, I>(writer: W, channels: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Channel>,
{
    let mut wtr = WriterBuilder::new().delimiter(DELIMITER).from_writer(writer);
    wtr.write_record(CHANNEL_HEADER)?;
    for channel in channels {
        wtr.write_record(channel_record(channel))
            .with_context(|| format!("Failed to write channel {}", channel.number))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Zone rows are padded to the full header width.
pub fn write_zones<W: Write>(writer: W, zones: &[Zone]) -> Result<()> {
    let mut wtr = WriterBuilder::new().delimiter(DELIMITER).from_writer(writer);

    let mut header = Vec::with_capacity(ZONE_CAPACITY + 1);
    header.push("Zone Name".to_string());
    header.extend((1..=ZONE_CAPACITY).map(|i| format!("Channel{}", i)));
    wtr.write_record(&header)?;

    for zone in zones {
        let mut row = Vec::with_capacity(ZONE_CAPACITY + 1);
        row.push(zone.name.as_str());
        row.extend(zone.channels.iter().take(ZONE_CAPACITY).map(String::as_str));
        row.resize(ZONE_CAPACITY + 1, "");
        wtr.write_record(&row)
            .with_context(|| format!("Failed to write zone {}", zone.name))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_channels_file<'a, I>(path: &Path, channels: I) -> Result<()>
where
    I: IntoIterator<Item = &'a Channel>,
{
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_channels(file, channels)
}

pub fn write_zones_file(path: &Path, zones: &[Zone]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_zones(file, zones)
}
