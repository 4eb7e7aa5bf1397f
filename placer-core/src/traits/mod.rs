//! Device capability traits
//!
//! These traits define the interface between the head coordinator and the
//! drivers of the devices mounted on the head.

pub mod device;

pub use device::{Actuator, Camera, HeadMountable, Homeable, Identifiable, Nozzle, SafeZRetractable};
