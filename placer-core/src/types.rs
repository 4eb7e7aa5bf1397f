//! Value types shared by the registry, the coordinator and device drivers

use core::fmt;

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Maximum identifier length in bytes
pub const MAX_ID_LEN: usize = 32;

/// Stable identifier of a head, device or axis
pub type Identifier = String<MAX_ID_LEN>;

/// Build an identifier, rejecting ids longer than [`MAX_ID_LEN`]
pub fn identifier(id: &str) -> Result<Identifier, RegistryError> {
    Identifier::try_from(id).map_err(|_| RegistryError::IdTooLong)
}

/// Build an identifier, truncating at a char boundary if `id` is too long
pub(crate) fn identifier_lossy(id: &str) -> Identifier {
    let mut out = Identifier::new();
    for ch in id.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

/// Kind of device mounted on a head
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DeviceKind {
    /// Pick-and-place end effector
    Nozzle,
    /// Auxiliary axis, valve, pin or similar attachment
    Actuator,
    /// Vision sensor riding on the head
    Camera,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeviceKind::Nozzle => "nozzle",
            DeviceKind::Actuator => "actuator",
            DeviceKind::Camera => "camera",
        })
    }
}

/// Machine coordinates of a device, in micrometers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Location {
    pub x_um: i32,
    pub y_um: i32,
    pub z_um: i32,
}

impl Location {
    /// Create a location from micrometer coordinates
    pub const fn new(x_um: i32, y_um: i32, z_um: i32) -> Self {
        Self { x_um, y_um, z_um }
    }

    /// Create a location from whole millimeters
    ///
    /// Coordinates beyond +/-2 147 483 mm saturate at the `i32` limits.
    pub const fn from_mm(x_mm: i32, y_mm: i32, z_mm: i32) -> Self {
        Self::new(
            x_mm.saturating_mul(1000),
            y_mm.saturating_mul(1000),
            z_mm.saturating_mul(1000),
        )
    }

    /// Same location with a different Z
    pub const fn with_z(self, z_um: i32) -> Self {
        Self { z_um, ..self }
    }

    /// Check whether both locations share X and Y
    pub fn same_xy(&self, other: &Location) -> bool {
        self.x_um == other.x_um && self.y_um == other.y_um
    }
}

/// Vertical axis a device rides on
///
/// Devices refer to a physical axis by identifier only. Two devices naming
/// the same axis are driven by the same motor and must never be commanded
/// at the same time.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ZAxis {
    /// Physical axis identifier
    pub axis: Identifier,
    /// Lowest Z at which lateral head motion is collision free
    pub safe_z_um: i32,
}

impl ZAxis {
    /// Describe a vertical axis
    pub fn new(axis: &str, safe_z_um: i32) -> Result<Self, RegistryError> {
        Ok(Self {
            axis: identifier(axis)?,
            safe_z_um,
        })
    }

    /// Check if `z_um` is at or above the safe height
    pub fn is_safe(&self, z_um: i32) -> bool {
        z_um >= self.safe_z_um
    }
}
