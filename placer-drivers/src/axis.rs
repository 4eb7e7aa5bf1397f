//! Simulated Z axis
//!
//! Moves take a configurable number of executor polls to complete so that
//! parallel dispatch and emergency stop can be observed. A halt aborts the
//! move in progress and leaves the axis where it was.

use core::cell::Cell;

use embassy_futures::yield_now;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use placer_core::{identifier, Identifier, MotionError, RegistryError};

/// Travel limits and timing of a simulated axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisConfig {
    /// Position reached by homing
    pub home_um: i32,
    /// Lowest reachable position
    pub min_um: i32,
    /// Highest reachable position
    pub max_um: i32,
    /// Executor polls a move takes before it lands
    pub travel_polls: u32,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            home_um: 0,
            min_um: -50_000,
            max_um: 0,
            travel_polls: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct AxisState {
    position_um: i32,
    homed: bool,
    halted: bool,
    moving: bool,
    moves: u32,
}

/// One physical Z axis, possibly shared by several devices
pub struct SimAxis {
    id: Identifier,
    config: AxisConfig,
    state: BlockingMutex<CriticalSectionRawMutex, Cell<AxisState>>,
}

impl SimAxis {
    /// Create an axis resting at its lowest position
    pub fn new(id: &str, config: AxisConfig) -> Result<Self, RegistryError> {
        Ok(Self {
            id: identifier(id)?,
            config,
            state: BlockingMutex::new(Cell::new(AxisState {
                position_um: config.min_um,
                ..AxisState::default()
            })),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn identifier(&self) -> &Identifier {
        &self.id
    }

    pub fn config(&self) -> &AxisConfig {
        &self.config
    }

    pub fn position_um(&self) -> i32 {
        self.state().position_um
    }

    pub fn is_homed(&self) -> bool {
        self.state().homed
    }

    pub fn is_moving(&self) -> bool {
        self.state().moving
    }

    /// Number of moves started, including homing
    pub fn moves(&self) -> u32 {
        self.state().moves
    }

    /// Jump to a position without travel, as a manual jog would
    pub fn set_position(&self, position_um: i32) {
        self.update(|s| s.position_um = position_um);
    }

    /// Travel to the home position
    pub async fn home(&self) -> Result<(), MotionError> {
        self.travel(self.config.home_um).await?;
        self.update(|s| s.homed = true);
        Ok(())
    }

    /// Travel to an absolute position within the axis limits
    pub async fn move_to(&self, target_um: i32) -> Result<(), MotionError> {
        if target_um < self.config.min_um || target_um > self.config.max_um {
            return Err(MotionError::OutOfBounds);
        }
        self.travel(target_um).await
    }

    /// Abort the move in progress
    ///
    /// The axis stops where it is, even if the moving future is dropped
    /// without being polled again.
    pub fn halt(&self) {
        self.update(|s| {
            if s.moving {
                s.halted = true;
                s.moving = false;
            }
        });
    }

    async fn travel(&self, target_um: i32) -> Result<(), MotionError> {
        self.update(|s| {
            s.halted = false;
            s.moving = true;
            s.moves += 1;
        });

        for _ in 0..self.config.travel_polls {
            yield_now().await;
            if self.state().halted {
                self.update(|s| {
                    s.halted = false;
                    s.moving = false;
                });
                return Err(MotionError::Halted);
            }
        }

        self.update(|s| {
            s.position_um = target_um;
            s.moving = false;
        });
        Ok(())
    }

    fn state(&self) -> AxisState {
        self.state.lock(|s| s.get())
    }

    fn update(&self, f: impl FnOnce(&mut AxisState)) {
        self.state.lock(|s| {
            let mut state = s.get();
            f(&mut state);
            s.set(state);
        });
    }
}
