//! Simulated device drivers
//!
//! This crate provides implementations of the device traits defined in
//! placer-core, backed by simulated hardware:
//!
//! - Carriage (the X/Y gantry shared by everything on a head)
//! - Z axes with travel time, limits, halting and fault injection
//! - Nozzle, actuator and camera drivers mounted at an X/Y offset
//!
//! They stand in for real motion controller drivers on the host.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod actuator;
pub mod axis;
pub mod camera;
pub mod carriage;
pub mod mount;
pub mod nozzle;

pub use actuator::SimActuator;
pub use axis::{AxisConfig, SimAxis};
pub use camera::SimCamera;
pub use carriage::Carriage;
pub use mount::{Fault, Mount};
pub use nozzle::SimNozzle;
