//! Capability surface of head-mounted devices
//!
//! Nozzles, actuators and cameras all expose the same capabilities to the
//! head: an identifier, a home primitive and a safe-Z retract primitive.
//! Drivers implement the capability traits plus the marker trait for their
//! device type.

use crate::error::MotionError;
use crate::types::{Location, ZAxis};

/// Device with a stable identifier
pub trait Identifiable {
    /// Identifier, unique among devices of the same type on one head
    fn id(&self) -> &str;
}

/// Device that can move to a reference position
#[allow(async_fn_in_trait)]
pub trait Homeable {
    /// Move to the home position and establish the coordinate origin
    ///
    /// Resolves once the device is at home or the attempt has failed.
    async fn home(&self) -> Result<(), MotionError>;

    /// Location the device must report after a successful home
    ///
    /// `None` disables the post-home position check for this device.
    fn home_location(&self) -> Option<Location> {
        None
    }
}

/// Device that can be raised clear of the work surface
#[allow(async_fn_in_trait)]
pub trait SafeZRetractable {
    /// Vertical axis of the device, `None` if it has no Z motion
    fn z_axis(&self) -> Option<&ZAxis>;

    /// Move to the configured safe height
    async fn retract_to_safe_z(&self) -> Result<(), MotionError>;

    /// Whether [`retract_to_safe_z`](Self::retract_to_safe_z) only moves Z
    ///
    /// When this returns false the coordinator uses [`move_z`](Self::move_z)
    /// with the safe height instead.
    fn retract_is_z_only(&self) -> bool {
        true
    }

    /// Move only the vertical axis to an absolute height
    async fn move_z(&self, z_um: i32) -> Result<(), MotionError>;
}

/// Common surface of every device mounted on a head
pub trait HeadMountable: Identifiable + Homeable + SafeZRetractable {
    /// Current machine location
    fn location(&self) -> Location;

    /// Stop any motion in progress immediately
    ///
    /// Called on emergency stop. Must not block.
    fn halt(&self);
}

/// Pick-and-place end effector
pub trait Nozzle: HeadMountable {}

/// Auxiliary attachment (valve, pin, extra axis)
pub trait Actuator: HeadMountable {}

/// Vision sensor riding on the head
pub trait Camera: HeadMountable {}
