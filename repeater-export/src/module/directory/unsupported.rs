use std::convert::Infallible;

use async_trait::async_trait;

use super::error::DirectoryError;
use super::types::Repeater;
use super::DirectoryBackend;
use crate::config::ZoneConfig;
use crate::module::codeplug::ModeTable;

/// Stands in for a `data_source` value no backend implements.
///
/// Every fetch fails with [`DirectoryError::UnsupportedDataSource`], so the run
/// still completes and writes empty zone pairs.
pub struct UnsupportedBackend {
    data_source: String,
    modes: ModeTable,
}

impl UnsupportedBackend {
    pub fn new(data_source: impl Into<String>) -> Self {
        Self {
            data_source: data_source.into(),
            modes: ModeTable::new(),
        }
    }
}

#[async_trait]
impl DirectoryBackend for UnsupportedBackend {
    type Entry = Infallible;

    fn name(&self) -> &str {
        &self.data_source
    }

    async fn fetch(&self, _zone: &ZoneConfig) -> Result<Vec<Infallible>, DirectoryError> {
        Err(DirectoryError::UnsupportedDataSource(self.data_source.clone()))
    }

    fn normalize(&self, entry: Infallible) -> Repeater {
        match entry {}
    }

    fn modes(&self) -> &ModeTable {
        &self.modes
    }
}
