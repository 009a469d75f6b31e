//! Repeater → channel expansion
//!
//! Each mode a repeater advertises is looked up in a [`ModeTable`]; known
//! modes produce one channel each, unknown modes are skipped.

use std::collections::HashMap;

use super::types::{Channel, ChannelType, DeviceDefaults, ZonedChannel};
use crate::module::directory::Repeater;

const ANALOGUE_BANDWIDTH: &str = "12,5";
const DIGITAL_TIMESLOT: &str = "1";

/// Hands out channel numbers for one export run, starting at 1.
#[derive(Debug, Clone)]
pub struct ChannelCounter {
    next: u32,
}

impl Default for ChannelCounter {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl ChannelCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next number
    pub fn next_number(&mut self) -> u32 {
        let n = self.next;
        self.next += 1;
        n
    }

    /// How many numbers were handed out so far
    pub fn issued(&self) -> u32 {
        self.next - 1
    }
}

/// Mode identifier → channel family lookup.
///
/// Keys are matched exactly, as the directory spells them.
#[derive(Debug, Clone, Default)]
pub struct ModeTable {
    builders: HashMap<String, ChannelType>,
}

impl ModeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// `dmr` → Digital, `fm` → Analogue
    pub fn standard() -> Self {
        Self::new()
            .with("dmr", ChannelType::Digital)
            .with("fm", ChannelType::Analogue)
    }

    pub fn with(mut self, mode: &str, channel_type: ChannelType) -> Self {
        self.builders.insert(mode.to_string(), channel_type);
        self
    }

    pub fn lookup(&self, mode: &str) -> Option<ChannelType> {
        self.builders.get(mode).copied()
    }
}

impl ChannelType {
    /// Build the channel this family makes out of `repeater`.
    pub fn build(self, repeater: &Repeater, number: u32) -> Channel {
        let name = format!("{}-{}", repeater.callsign, self.name_suffix());
        let mut channel = Channel {
            number,
            name,
            channel_type: self,
            rx_frequency: repeater.rx_frequency.clone(),
            tx_frequency: repeater.tx_frequency.clone(),
            bandwidth: String::new(),
            colour_code: String::new(),
            timeslot: String::new(),
            rx_tone: String::new(),
            tx_tone: String::new(),
            latitude: repeater.latitude.clone(),
            longitude: repeater.longitude.clone(),
            defaults: DeviceDefaults::default(),
        };

        match self {
            ChannelType::Digital => {
                channel.colour_code = colour_code(&repeater.callsign);
                channel.timeslot = DIGITAL_TIMESLOT.to_string();
            }
            ChannelType::Analogue => {
                channel.bandwidth = ANALOGUE_BANDWIDTH.to_string();
                channel.rx_tone = repeater.rx_ctcss.clone().unwrap_or_default();
                channel.tx_tone = repeater.tx_ctcss.clone().unwrap_or_default();
            }
        }

        channel
    }
}

/// Third character of the callsign (the call area digit for most prefixes)
fn colour_code(callsign: &str) -> String {
    if callsign.chars().count() > 2 {
        callsign.chars().nth(2).map(String::from).unwrap_or_default()
    } else {
        String::new()
    }
}

/// Expand one repeater into its channels, numbering them from `counter`.
///
/// Digital channels come before analogue ones; within a family the source
/// mode order is kept.
pub fn expand(
    repeater: &Repeater,
    zone: &str,
    modes: &ModeTable,
    counter: &mut ChannelCounter,
) -> Vec<ZonedChannel> {
    let mut families: Vec<ChannelType> = repeater
        .modes
        .iter()
        .filter_map(|mode| match modes.lookup(mode) {
            Some(channel_type) => Some(channel_type),
            None => {
                tracing::trace!("{}: skipping unsupported mode '{}'", repeater.callsign, mode);
                None
            }
        })
        .collect();
    families.sort();

    families
        .into_iter()
        .map(|channel_type| ZonedChannel {
            zone: zone.to_string(),
            channel: channel_type.build(repeater, counter.next_number()),
        })
        .collect()
}
