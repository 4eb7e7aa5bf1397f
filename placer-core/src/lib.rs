//! Board-agnostic head coordination for the pick-and-place controller
//!
//! This crate contains the logic that ties the devices mounted on one head
//! together, independent of any particular driver:
//!
//! - Device capability traits (nozzle, actuator, camera)
//! - Device registry with identifier lookup
//! - Head coordinator for homing and safe-Z retraction
//! - Head safety state machine
//! - Coordinator configuration types

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// Must come first so the logging macros are visible to the other modules.
#[macro_use]
mod fmt;

pub mod config;
pub mod coordinator;
pub mod error;
pub mod registry;
pub mod state;
pub mod traits;
pub mod types;

#[cfg(test)]
mod testing;

pub use config::{DispatchPolicy, HeadConfig};
pub use coordinator::Head;
pub use error::{HeadError, MotionError, RegistryError};
pub use registry::DeviceRegistry;
pub use state::{HeadEvent, HeadOperation, HeadStatus, SafetyState};
pub use types::{identifier, DeviceKind, Identifier, Location, ZAxis};
