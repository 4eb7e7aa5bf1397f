//! Error types for device motion and head coordination

use thiserror::Error;

use crate::state::HeadOperation;
use crate::types::{identifier_lossy, DeviceKind, Identifier, MAX_ID_LEN};

/// Failure reported by a single device while homing or retracting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionError {
    /// Limit switch did not trigger within the homing window
    #[error("limit switch timeout")]
    LimitSwitchTimeout,
    /// Motor stall detected
    #[error("stall detected")]
    StallDetected,
    /// Move did not finish in time
    #[error("move timed out")]
    Timeout,
    /// Driver reported a hardware fault
    #[error("driver fault")]
    DriverFault,
    /// Target position outside the axis limits
    #[error("target outside axis limits")]
    OutOfBounds,
    /// Motion was stopped by a halt request
    #[error("motion halted")]
    Halted,
    /// Device does not report its home position after homing
    #[error("not at home position after homing")]
    NotAtHome,
    /// Device moved in X/Y during a Z-only move
    #[error("moved in X/Y during safe Z retraction")]
    LateralDrift,
    /// Device is still below its safe height after retraction
    #[error("below safe Z after retraction")]
    BelowSafeZ,
}

/// Failure of a head-level operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeadError {
    /// A device failed; the rest of the sequence was abandoned
    #[error("{operation} failed on {kind} {device}: {cause}")]
    Motion {
        device: Identifier,
        kind: DeviceKind,
        operation: HeadOperation,
        cause: MotionError,
    },
    /// Operation was cancelled by an emergency stop
    #[error("{operation} cancelled by emergency stop")]
    Cancelled { operation: HeadOperation },
}

impl HeadError {
    pub(crate) fn motion(
        device: &str,
        kind: DeviceKind,
        operation: HeadOperation,
        cause: MotionError,
    ) -> Self {
        HeadError::Motion {
            device: identifier_lossy(device),
            kind,
            operation,
            cause,
        }
    }

    /// Operation that failed
    pub fn operation(&self) -> HeadOperation {
        match self {
            HeadError::Motion { operation, .. } | HeadError::Cancelled { operation } => *operation,
        }
    }

    /// Identifier of the failing device, if a device failed
    pub fn device(&self) -> Option<&str> {
        match self {
            HeadError::Motion { device, .. } => Some(device.as_str()),
            HeadError::Cancelled { .. } => None,
        }
    }

    /// Underlying device failure, if any
    pub fn cause(&self) -> Option<MotionError> {
        match self {
            HeadError::Motion { cause, .. } => Some(*cause),
            HeadError::Cancelled { .. } => None,
        }
    }
}

/// Errors while assembling a device registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// Another device of the same kind already uses this id
    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: DeviceKind, id: Identifier },
    /// Collection for this kind is full
    #[error("too many {0}s on one head")]
    CapacityExceeded(DeviceKind),
    /// Identifier does not fit
    #[error("identifier longer than {} bytes", MAX_ID_LEN)]
    IdTooLong,
}
