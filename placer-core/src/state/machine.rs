//! Safety state definition
//!
//! Lateral head motion is only allowed once every device is known to be
//! at or above its safe height.

use core::fmt;

use super::events::{HeadEvent, HeadOperation};

/// Head safety states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SafetyState {
    /// Device positions are not trusted (initial and recovery state)
    #[default]
    Unknown,
    /// Every device is at its home position
    Homed,
    /// Every device is at or above safe Z; X/Y moves are collision free
    SafeForLateralMotion,
}

impl SafetyState {
    /// Check if the head may travel in X/Y
    pub fn lateral_motion_allowed(&self) -> bool {
        matches!(self, SafetyState::SafeForLateralMotion)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: HeadEvent) -> Self {
        use HeadEvent::*;
        use SafetyState::*;

        // Every event fully determines the next state; there is no
        // terminal state, a failed head is recovered by a retry.
        match event {
            HomeComplete => Homed,
            // Retraction does not depend on a prior home
            SafeZComplete => SafeForLateralMotion,
            OperationFailed(_) | Cancelled | DeviceMotion => Unknown,
        }
    }
}

impl fmt::Display for SafetyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SafetyState::Unknown => "unknown",
            SafetyState::Homed => "homed",
            SafetyState::SafeForLateralMotion => "safe for lateral motion",
        })
    }
}

/// Safety state plus the homed flag of a head
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HeadStatus {
    /// Whether lateral motion is currently safe
    pub safety: SafetyState,
    /// Whether the last home completed and has not been invalidated
    pub homed: bool,
}

impl HeadStatus {
    /// Initial status: unknown and unhomed
    pub const fn new() -> Self {
        Self {
            safety: SafetyState::Unknown,
            homed: false,
        }
    }

    /// Process an event and return the next status
    pub fn transition(self, event: HeadEvent) -> Self {
        let homed = match event {
            HeadEvent::HomeComplete => true,
            // Position references are lost once a home fails or motion is cut
            HeadEvent::OperationFailed(HeadOperation::Home) | HeadEvent::Cancelled => false,
            _ => self.homed,
        };

        Self {
            safety: self.safety.transition(event),
            homed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_unknown() {
        let status = HeadStatus::new();
        assert_eq!(status.safety, SafetyState::Unknown);
        assert!(!status.homed);
        assert_eq!(status, HeadStatus::default());
    }

    #[test]
    fn test_home_then_safe_z() {
        let homed = HeadStatus::new().transition(HeadEvent::HomeComplete);
        assert_eq!(homed.safety, SafetyState::Homed);
        assert!(homed.homed);
        assert!(!homed.safety.lateral_motion_allowed());

        let safe = homed.transition(HeadEvent::SafeZComplete);
        assert_eq!(safe.safety, SafetyState::SafeForLateralMotion);
        assert!(safe.homed);
        assert!(safe.safety.lateral_motion_allowed());
    }

    #[test]
    fn test_safe_z_without_home() {
        let safe = HeadStatus::new().transition(HeadEvent::SafeZComplete);
        assert_eq!(safe.safety, SafetyState::SafeForLateralMotion);
        assert!(!safe.homed);
    }

    #[test]
    fn test_failure_from_any_state() {
        let states = [
            SafetyState::Unknown,
            SafetyState::Homed,
            SafetyState::SafeForLateralMotion,
        ];
        let events = [
            HeadEvent::OperationFailed(HeadOperation::Home),
            HeadEvent::OperationFailed(HeadOperation::MoveToSafeZ),
            HeadEvent::Cancelled,
            HeadEvent::DeviceMotion,
        ];

        for state in states {
            for event in events {
                assert_eq!(state.transition(event), SafetyState::Unknown);
            }
        }
    }

    #[test]
    fn test_homed_flag_survives_failed_retract() {
        let status = HeadStatus::new()
            .transition(HeadEvent::HomeComplete)
            .transition(HeadEvent::OperationFailed(HeadOperation::MoveToSafeZ));
        assert_eq!(status.safety, SafetyState::Unknown);
        assert!(status.homed);
    }

    #[test]
    fn test_homed_flag_cleared() {
        let homed = HeadStatus::new().transition(HeadEvent::HomeComplete);

        let failed = homed.transition(HeadEvent::OperationFailed(HeadOperation::Home));
        assert!(!failed.homed);

        let cancelled = homed.transition(HeadEvent::Cancelled);
        assert!(!cancelled.homed);

        let moved = homed.transition(HeadEvent::DeviceMotion);
        assert_eq!(moved.safety, SafetyState::Unknown);
        assert!(moved.homed);
    }
}
