//! Simulated camera
//!
//! Cameras usually have no Z axis of their own; they report the fixed focal
//! height of their mount. Homing only confirms the carriage reference.

use placer_core::traits::{Camera, HeadMountable, Homeable, Identifiable, SafeZRetractable};
use placer_core::{Location, MotionError, ZAxis};

use crate::mount::Mount;

/// Head-mounted camera
pub struct SimCamera {
    mount: Mount,
}

impl SimCamera {
    pub fn new(mount: Mount) -> Self {
        Self { mount }
    }

    pub fn mount(&self) -> &Mount {
        &self.mount
    }
}

impl Identifiable for SimCamera {
    fn id(&self) -> &str {
        self.mount.id()
    }
}

impl Homeable for SimCamera {
    async fn home(&self) -> Result<(), MotionError> {
        self.mount.home().await
    }

    fn home_location(&self) -> Option<Location> {
        Some(self.mount.home_location())
    }
}

impl SafeZRetractable for SimCamera {
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

impl HeadMountable for SimCamera {
    fn location(&self) -> Location {
        self.mount.location()
    }

    fn halt(&self) {
        self.mount.halt();
    }
}

impl Camera for SimCamera {}
