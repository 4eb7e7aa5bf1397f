//! Mounting of a simulated device on a head
//!
//! A [`Mount`] places a device on the carriage at a fixed X/Y offset and
//! optionally couples it to a Z axis. It carries the motion primitives the
//! nozzle, actuator and camera drivers delegate to.

use alloc::sync::Arc;
use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use placer_core::{identifier, Identifier, Location, MotionError, RegistryError, ZAxis};

use crate::axis::SimAxis;
use crate::carriage::Carriage;

/// Fault injected into the next matching command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// Fail the next home command
    Home(MotionError),
    /// Fail the next retract or Z move
    Retract(MotionError),
}

/// Device position on a head and the axis driving its Z
pub struct Mount {
    id: Identifier,
    carriage: Arc<Carriage>,
    offset_x_um: i32,
    offset_y_um: i32,
    z: Option<(Arc<SimAxis>, ZAxis)>,
    fixed_z_um: i32,
    z_only: bool,
    fault: BlockingMutex<CriticalSectionRawMutex, Cell<Option<Fault>>>,
    commands: BlockingMutex<CriticalSectionRawMutex, Cell<u32>>,
}

impl Mount {
    /// Mount a device at the carriage origin with no Z axis
    pub fn new(id: &str, carriage: Arc<Carriage>) -> Result<Self, RegistryError> {
        Ok(Self {
            id: identifier(id)?,
            carriage,
            offset_x_um: 0,
            offset_y_um: 0,
            z: None,
            fixed_z_um: 0,
            z_only: true,
            fault: BlockingMutex::new(Cell::new(None)),
            commands: BlockingMutex::new(Cell::new(0)),
        })
    }

    /// Offset of the device from the carriage reference point
    pub fn with_offset(mut self, x_um: i32, y_um: i32) -> Self {
        self.offset_x_um = x_um;
        self.offset_y_um = y_um;
        self
    }

    /// Couple the device to a Z axis with the given safe height
    pub fn with_z_axis(mut self, axis: Arc<SimAxis>, safe_z_um: i32) -> Self {
        let z_axis = ZAxis {
            axis: axis.identifier().clone(),
            safe_z_um,
        };
        self.z = Some((axis, z_axis));
        self
    }

    /// Height reported by a device without a Z axis
    pub fn with_fixed_z(mut self, z_um: i32) -> Self {
        self.fixed_z_um = z_um;
        self
    }

    /// Make the retract primitive park the carriage as well as raise Z
    pub fn with_combined_retract(mut self) -> Self {
        self.z_only = false;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn carriage(&self) -> &Arc<Carriage> {
        &self.carriage
    }

    pub fn axis(&self) -> Option<&Arc<SimAxis>> {
        self.z.as_ref().map(|(axis, _)| axis)
    }

    pub fn z_axis(&self) -> Option<&ZAxis> {
        self.z.as_ref().map(|(_, z_axis)| z_axis)
    }

    pub fn retract_is_z_only(&self) -> bool {
        self.z_only
    }

    /// Arm a one-shot fault for the next matching command
    pub fn inject_fault(&self, fault: Fault) {
        self.fault.lock(|f| f.set(Some(fault)));
    }

    /// Number of motion commands received
    pub fn commands(&self) -> u32 {
        self.commands.lock(|c| c.get())
    }

    /// Current location: carriage position plus offset, Z from the axis
    pub fn location(&self) -> Location {
        let (x_um, y_um) = self.carriage.position();
        let z_um = match &self.z {
            Some((axis, _)) => axis.position_um(),
            None => self.fixed_z_um,
        };
        Location::new(x_um + self.offset_x_um, y_um + self.offset_y_um, z_um)
    }

    /// Location after homing the carriage and the Z axis
    pub fn home_location(&self) -> Location {
        let (x_um, y_um) = self.carriage.home_position();
        let z_um = match &self.z {
            Some((axis, _)) => axis.config().home_um,
            None => self.fixed_z_um,
        };
        Location::new(x_um + self.offset_x_um, y_um + self.offset_y_um, z_um)
    }

    pub async fn home(&self) -> Result<(), MotionError> {
        self.count();
        if let Some(Fault::Home(err)) = self.take_fault(|f| matches!(f, Fault::Home(_))) {
            return Err(err);
        }

        self.carriage.home();
        if let Some((axis, _)) = &self.z {
            axis.home().await?;
        }
        Ok(())
    }

    /// Raise Z to the safe height, or keep it if already above
    pub async fn retract(&self) -> Result<(), MotionError> {
        self.count();
        self.check_retract_fault()?;

        let Some((axis, z_axis)) = &self.z else {
            return Ok(());
        };
        if !self.z_only {
            self.carriage.home();
        }
        let target = axis.position_um().max(z_axis.safe_z_um);
        axis.move_to(target).await
    }

    pub async fn move_z(&self, z_um: i32) -> Result<(), MotionError> {
        self.count();
        self.check_retract_fault()?;

        match &self.z {
            Some((axis, _)) => axis.move_to(z_um).await,
            None => Ok(()),
        }
    }

    pub fn halt(&self) {
        if let Some((axis, _)) = &self.z {
            axis.halt();
        }
    }

    fn check_retract_fault(&self) -> Result<(), MotionError> {
        match self.take_fault(|f| matches!(f, Fault::Retract(_))) {
            Some(Fault::Retract(err)) => Err(err),
            _ => Ok(()),
        }
    }

    fn take_fault(&self, matches: impl Fn(&Fault) -> bool) -> Option<Fault> {
        self.fault.lock(|f| match f.get() {
            Some(fault) if matches(&fault) => f.take(),
            _ => None,
        })
    }

    fn count(&self) {
        self.commands.lock(|c| c.set(c.get() + 1));
    }
}
