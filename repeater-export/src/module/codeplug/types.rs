//! Channel and zone records written to the codeplug tables

use crate::module::directory::FieldValue;

/// Maximum number of channels a zone can hold on the device
pub const ZONE_CAPACITY: usize = 77;

/// Channel family. Also selects how a mode is turned into a channel.
///
/// Declaration order is emission order within one repeater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChannelType {
    Digital,
    Analogue,
}

impl ChannelType {
    pub const ALL: [ChannelType; 2] = [ChannelType::Digital, ChannelType::Analogue];

    /// Value of the "Channel Type" column
    pub fn as_str(self) -> &'static str {
        match self {
            ChannelType::Digital => "Digital",
            ChannelType::Analogue => "Analogue",
        }
    }

    /// Suffix appended to a channel name, e.g. "SR9KR-Digi"
    pub fn name_suffix(self) -> &'static str {
        match self {
            ChannelType::Digital => "Digi",
            ChannelType::Analogue => "FM",
        }
    }

    /// Suffix appended to a configured zone name, e.g. "Krakow-DIGI"
    pub fn zone_suffix(self) -> &'static str {
        match self {
            ChannelType::Digital => "DIGI",
            ChannelType::Analogue => "FM",
        }
    }
}

/// Per-channel device settings. Policy values, never read from the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceDefaults {
    pub power: &'static str,
    pub rx_only: &'static str,
    pub zone_skip: &'static str,
    pub all_skip: &'static str,
    pub tot: &'static str,
    pub vox: &'static str,
    pub no_beep: &'static str,
    pub no_eco: &'static str,
    pub aprs: &'static str,
}

impl Default for DeviceDefaults {
    fn default() -> Self {
        Self {
            power: "Master",
            rx_only: "No",
            zone_skip: "No",
            all_skip: "No",
            tot: "60",
            vox: "No",
            no_beep: "No",
            no_eco: "No",
            aprs: "No",
        }
    }
}

/// One row of the channel table
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    /// 1-based, unique across the run
    pub number: u32,
    pub name: String,
    pub channel_type: ChannelType,
    pub rx_frequency: FieldValue,
    pub tx_frequency: FieldValue,
    /// Analogue only, already in device notation ("12,5")
    pub bandwidth: String,
    /// Digital only
    pub colour_code: String,
    /// Digital only
    pub timeslot: String,
    /// Analogue only
    pub rx_tone: String,
    /// Analogue only
    pub tx_tone: String,
    pub latitude: FieldValue,
    pub longitude: FieldValue,
    pub defaults: DeviceDefaults,
}

/// A channel together with the configured zone it was fetched for.
#[derive(Debug, Clone, PartialEq)]
pub struct ZonedChannel {
    pub zone: String,
    pub channel: Channel,
}

/// One row of the zone table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    pub name: String,
    /// Channel names in generation order, at most [`ZONE_CAPACITY`]
    pub channels: Vec<String>,
}
