//! Simulated actuator
//!
//! An actuator carries a binary output (valve, pin, feeder drive) on top of
//! its mount. Homing releases the output before moving.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use placer_core::traits::{
    Actuator, HeadMountable, Homeable, Identifiable, SafeZRetractable,
};
use placer_core::{Location, MotionError, ZAxis};

use crate::mount::Mount;

/// Actuator with a binary output
pub struct SimActuator {
    mount: Mount,
    on: BlockingMutex<CriticalSectionRawMutex, Cell<bool>>,
}

impl SimActuator {
    pub fn new(mount: Mount) -> Self {
        Self {
            mount,
            on: BlockingMutex::new(Cell::new(false)),
        }
    }

    pub fn mount(&self) -> &Mount {
        &self.mount
    }

    /// Switch the output
    pub fn actuate(&self, on: bool) {
        self.on.lock(|o| o.set(on));
    }

    pub fn is_actuated(&self) -> bool {
        self.on.lock(|o| o.get())
    }
}

impl Identifiable for SimActuator {
    fn id(&self) -> &str {
        self.mount.id()
    }
}

impl Homeable for SimActuator {
    async fn home(&self) -> Result<(), MotionError> {
        self.actuate(false);
        self.mount.home().await
    }

    fn home_location(&self) -> Option<Location> {
        Some(self.mount.home_location())
    }
}

impl SafeZRetractable for SimActuator {
    fn z_axis(&self) -> Option<&ZAxis> {
        self.mount.z_axis()
    }

    async fn retract_to_safe_z(&self) -> Result<(), MotionError> {
        self.mount.retract().await
    }

    fn retract_is_z_only(&self) -> bool {
        self.mount.retract_is_z_only()
    }

    async fn move_z(&self, z_um: i32) -> Result<(), MotionError> {
        self.mount.move_z(z_um).await
    }
}

impl HeadMountable for SimActuator {
    fn location(&self) -> Location {
        self.mount.location()
    }

    fn halt(&self) {
        self.mount.halt();
    }
}

impl Actuator for SimActuator {}
