//! Head coordinator configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::state::HeadOperation;

/// How device commands of one head operation are issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DispatchPolicy {
    /// One device at a time in registry order (nozzles, actuators, cameras)
    #[default]
    Sequential,
    /// Devices on different axes concurrently; devices sharing an axis
    /// still run one after another
    Parallel,
}

/// Head coordinator configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HeadConfig {
    /// Dispatch policy for homing
    pub homing: DispatchPolicy,
    /// Dispatch policy for safe-Z retraction
    pub safe_z: DispatchPolicy,
    /// Check each device reports its home location after homing
    pub verify_home: bool,
}

impl Default for HeadConfig {
    fn default() -> Self {
        Self {
            homing: DispatchPolicy::Sequential,
            safe_z: DispatchPolicy::Parallel,
            verify_home: true,
        }
    }
}

impl HeadConfig {
    /// Everything sequential, e.g. for heads with unknown axis coupling
    pub const fn sequential() -> Self {
        Self {
            homing: DispatchPolicy::Sequential,
            safe_z: DispatchPolicy::Sequential,
            verify_home: true,
        }
    }

    /// Dispatch policy used for `operation`
    pub fn policy(&self, operation: HeadOperation) -> DispatchPolicy {
        match operation {
            HeadOperation::Home => self.homing,
            HeadOperation::MoveToSafeZ => self.safe_z,
        }
    }
}
