//! Simulated X/Y carriage
//!
//! Every device on a head rides the same carriage, so they share one X/Y
//! position. Moves complete instantly; Z travel is simulated by the axes.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;

#[derive(Debug, Clone, Copy)]
struct CarriageState {
    x_um: i32,
    y_um: i32,
    homed: bool,
}

/// Shared X/Y gantry of one head
pub struct Carriage {
    home_x_um: i32,
    home_y_um: i32,
    state: BlockingMutex<CriticalSectionRawMutex, Cell<CarriageState>>,
}

impl Carriage {
    /// Create a carriage that homes to the given position
    ///
    /// Until homed, the carriage reports the origin.
    pub const fn new(home_x_um: i32, home_y_um: i32) -> Self {
        Self {
            home_x_um,
            home_y_um,
            state: BlockingMutex::new(Cell::new(CarriageState {
                x_um: 0,
                y_um: 0,
                homed: false,
            })),
        }
    }

    /// Current X/Y position in micrometers
    pub fn position(&self) -> (i32, i32) {
        let state = self.state.lock(|s| s.get());
        (state.x_um, state.y_um)
    }

    /// Position the carriage homes to
    pub fn home_position(&self) -> (i32, i32) {
        (self.home_x_um, self.home_y_um)
    }

    pub fn is_homed(&self) -> bool {
        self.state.lock(|s| s.get().homed)
    }

    /// Drive to the home switches
    pub fn home(&self) {
        self.state.lock(|s| {
            s.set(CarriageState {
                x_um: self.home_x_um,
                y_um: self.home_y_um,
                homed: true,
            })
        });
    }

    /// Move to an absolute X/Y position
    pub fn move_to(&self, x_um: i32, y_um: i32) {
        self.state.lock(|s| {
            let mut state = s.get();
            state.x_um = x_um;
            state.y_um = y_um;
            s.set(state);
        });
    }
}
