//! Head coordinator
//!
//! Runs head-level operations (home, safe Z) across every device mounted on
//! a head:
//!
//! - [`plan`] groups devices into lanes that may run concurrently
//! - [`head`] owns the devices, serializes operations and tracks safety state

pub mod head;
pub mod plan;

pub use head::Head;
pub use plan::{DeviceSet, DispatchPlan, Lane};
