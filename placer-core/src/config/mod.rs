//! Configuration types
//!
//! Board-agnostic coordinator settings. Topology (which devices exist) is
//! owned by the machine layer; only the behavior of a head lives here.

pub mod types;

pub use types::*;
