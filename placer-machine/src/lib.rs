//! Placer machine layer
//!
//! Builds the heads of a machine from a TOML topology, wiring simulated
//! drivers to shared carriages and Z axes, and runs machine-wide homing and
//! safe-Z retraction.

pub mod config;
pub mod error;
pub mod machine;

pub use config::{parse_config, MachineConfig};
pub use error::{ConfigError, MachineError};
pub use machine::{Machine, SimHead};
