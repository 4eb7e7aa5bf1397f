//! Simulated nozzle

use placer_core::traits::{HeadMountable, Homeable, Identifiable, Nozzle, SafeZRetractable};
use placer_core::{Location, MotionError, ZAxis};

use crate::mount::Mount;

/// Nozzle driven by its mount
pub struct SimNozzle {
    mount: Mount,
}

impl SimNozzle {
    pub fn new(mount: Mount) -> Self {
        Self { mount }
    }

    pub fn mount(&self) -> &Mount {
        &self.mount
    }
}

impl Identifiable for SimNozzle {
    fn id(&self) -> &str {
        self.mount.id()
    }
}

impl Homeable for SimNozzle {
    async fn home(&self) -> Result<(), MotionError> {
        self.mount.home().await
    }

    fn home_location(&self) -> Option<Location> {
        Some(self.mount.home_location())
    }
}

impl SafeZRetractable for SimNozzle {
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

impl HeadMountable for SimNozzle {
    fn location(&self) -> Location {
        self.mount.location()
    }

    fn halt(&self) {
        self.mount.halt();
    }
}

impl Nozzle for SimNozzle {}
