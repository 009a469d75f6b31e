//! Codeplug generation
//!
//! Turns normalized repeaters into numbered channels, groups them into
//! device zones and writes both tables.

pub mod types;
pub mod expander;
pub mod aggregator;
pub mod emitter;

pub use types::{Channel, ChannelType, DeviceDefaults, Zone, ZonedChannel, ZONE_CAPACITY};
pub use expander::{ChannelCounter, ModeTable, expand};
pub use aggregator::aggregate;
