//! Repeater directory access
//!
//! A [`DirectoryBackend`] fetches the raw entries of one zone and maps each
//! of them into a canonical [`Repeater`]. The pipeline only talks to the
//! trait, so JSON and XML sources are interchangeable.

pub mod error;
pub mod http;
pub mod json;
pub mod types;
pub mod unsupported;
pub mod xml;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use crate::config::ZoneConfig;
use crate::module::codeplug::ModeTable;

pub use error::DirectoryError;
pub use json::JsonBackend;
pub use types::{FieldValue, Repeater};
pub use unsupported::UnsupportedBackend;
pub use xml::XmlBackend;

/// Data source selected by the `data_source` config key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Json,
    Xml,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Json => "json",
            BackendKind::Xml => "xml",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(BackendKind::Json),
            "xml" => Ok(BackendKind::Xml),
            _ => Err(s.to_string()),
        }
    }
}

#[async_trait]
pub trait DirectoryBackend: Send + Sync {
    /// Backend-shaped entry, dropped once normalized
    type Entry: Send;

    fn name(&self) -> &str;

    /// One request for `zone`; no retry.
    async fn fetch(&self, zone: &ZoneConfig) -> Result<Vec<Self::Entry>, DirectoryError>;

    fn normalize(&self, entry: Self::Entry) -> Repeater;

    /// Modes this backend knows how to turn into channels
    fn modes(&self) -> &ModeTable;
}
