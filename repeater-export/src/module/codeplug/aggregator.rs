use super::types::{ChannelType, ZONE_CAPACITY, Zone, ZonedChannel};
use crate::config::ZoneConfig;

/// Group channels into a `-DIGI` and an `-FM` zone per configured zone.
///
/// Zones follow configuration order and channels keep generation order.
/// Anything past [`ZONE_CAPACITY`] stays in the channel table only.
pub fn aggregate(channels: &[ZonedChannel], zones: &[ZoneConfig]) -> Vec<Zone> {
    let mut out = Vec::with_capacity(zones.len() * ChannelType::ALL.len());

    for zone in zones {
        for channel_type in ChannelType::ALL {
            let names: Vec<String> = channels
                .iter()
                .filter(|c| c.zone == zone.name && c.channel.channel_type == channel_type)
                .take(ZONE_CAPACITY)
                .map(|c| c.channel.name.clone())
                .collect();

            out.push(Zone {
                name: format!("{}-{}", zone.name, channel_type.zone_suffix()),
                channels: names,
            });
        }
    }

    out
}
