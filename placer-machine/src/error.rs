//! Machine error types

use placer_core::{HeadError, RegistryError};
use thiserror::Error;

/// Errors building a machine from its topology
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid machine configuration: {0}")]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("duplicate head id {0}")]
    DuplicateHead(String),
    #[error("duplicate axis id {0}")]
    DuplicateAxis(String),
    #[error("{device} refers to unknown axis {axis}")]
    UnknownAxis { device: String, axis: String },
    #[error("safe Z of {device} is outside the travel of axis {axis}")]
    SafeZOutOfRange { device: String, axis: String },
    #[error("length {0} mm is not representable in micrometers")]
    LengthOutOfRange(f64),
}

/// Errors of machine-wide operations
#[derive(Debug, Error)]
pub enum MachineError {
    #[error("head {head}: {source}")]
    Head {
        head: String,
        #[source]
        source: HeadError,
    },
    #[error("unknown head {0}")]
    UnknownHead(String),
    #[error("head {0} is not safe for lateral motion")]
    UnsafeLateralMove(String),
}

impl MachineError {
    /// The head error behind this failure, if any
    pub fn head_error(&self) -> Option<&HeadError> {
        match self {
            MachineError::Head { source, .. } => Some(source),
            _ => None,
        }
    }
}
