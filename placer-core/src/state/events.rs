//! Events that drive safety state transitions

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Head-level operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HeadOperation {
    /// Move every device to its home position
    Home,
    /// Raise every device to its safe height
    MoveToSafeZ,
}

impl fmt::Display for HeadOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HeadOperation::Home => "home",
            HeadOperation::MoveToSafeZ => "move to safe Z",
        })
    }
}

/// Events that can change the head safety state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeadEvent {
    /// Every device reached its home position
    HomeComplete,
    /// Every device with a Z axis is at or above safe Z
    SafeZComplete,
    /// A head operation failed on one of its devices
    OperationFailed(HeadOperation),
    /// A head operation was cancelled by an emergency stop
    Cancelled,
    /// Some device was commanded to move outside a head operation
    DeviceMotion,
}

impl HeadEvent {
    /// Event reported when `operation` succeeds
    pub fn completed(operation: HeadOperation) -> Self {
        match operation {
            HeadOperation::Home => HeadEvent::HomeComplete,
            HeadOperation::MoveToSafeZ => HeadEvent::SafeZComplete,
        }
    }

    /// Check if this event reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, HeadEvent::OperationFailed(_) | HeadEvent::Cancelled)
    }
}
