//! Construction settings for the evaluator and the transposition table.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::nnue::{Network, NetworkError};
use crate::tt::{TableConfig, TranspositionTable};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("table size must be 1..=30 bits, got {bits}")]
    TableBits { bits: u8 },
    #[error("no network path configured")]
    MissingNetwork,
    #[error(transparent)]
    Network(#[from] NetworkError),
}

/// Everything needed to build the evaluation and caching core.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoreConfig {
    pub table: TableConfig,
    /// Weight file read by `load_network`
    pub network_path: Option<PathBuf>,
}

impl CoreConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.table.validate()
    }

    pub fn build_table(&self) -> Result<TranspositionTable, ConfigError> {
        TranspositionTable::with_config(self.table)
    }

    /// Load the configured weight file, ready to share between evaluators.
    pub fn load_network(&self) -> Result<Arc<Network>, ConfigError> {
        let path = self.network_path.as_ref().ok_or(ConfigError::MissingNetwork)?;
        Ok(Arc::new(Network::load(path)?))
    }
}
