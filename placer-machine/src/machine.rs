//! Machine assembled from its topology
//!
//! Each head gets its own carriage. Z axes are machine-wide: devices naming
//! the same axis id drive the same [`SimAxis`].

use std::sync::Arc;

use embassy_futures::block_on;
use log::{debug, info, warn};
use placer_core::{DeviceRegistry, Head, HeadOperation};
use placer_drivers::{Carriage, Mount, SimActuator, SimAxis, SimCamera, SimNozzle};

use crate::config::{mm_to_um, parse_config, DeviceSection, HeadSection, MachineConfig};
use crate::error::{ConfigError, MachineError};

/// Head type built by the machine layer
pub type SimHead = Head<SimNozzle, SimActuator, SimCamera>;

/// A head and the carriage it rides on
struct Station {
    head: SimHead,
    carriage: Arc<Carriage>,
}

/// All heads and axes of one machine
pub struct Machine {
    axes: Vec<Arc<SimAxis>>,
    stations: Vec<Station>,
}

impl Machine {
    /// Parse a TOML topology and build the machine
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        Self::from_config(&parse_config(input)?)
    }

    pub fn from_config(config: &MachineConfig) -> Result<Self, ConfigError> {
        let mut axes: Vec<Arc<SimAxis>> = Vec::with_capacity(config.axes.len());
        for section in &config.axes {
            if axes.iter().any(|axis| axis.id() == section.id) {
                return Err(ConfigError::DuplicateAxis(section.id.clone()));
            }
            axes.push(Arc::new(SimAxis::new(&section.id, section.axis_config()?)?));
        }

        let mut stations: Vec<Station> = Vec::with_capacity(config.heads.len());
        for section in &config.heads {
            if stations.iter().any(|s| s.head.id() == section.id) {
                return Err(ConfigError::DuplicateHead(section.id.clone()));
            }
            stations.push(build_station(section, &axes)?);
        }

        info!("machine: {} heads, {} axes", stations.len(), axes.len());
        Ok(Self { axes, stations })
    }

    /// Heads in configuration order
    pub fn heads(&self) -> impl Iterator<Item = &SimHead> + '_ {
        self.stations.iter().map(|station| &station.head)
    }

    pub fn head_by_id(&self, id: &str) -> Option<&SimHead> {
        self.station(id).map(|station| &station.head)
    }

    pub fn axis_by_id(&self, id: &str) -> Option<&Arc<SimAxis>> {
        self.axes.iter().find(|axis| axis.id() == id)
    }

    /// Carriage of the head `head_id`
    pub fn carriage(&self, head_id: &str) -> Option<&Arc<Carriage>> {
        self.station(head_id).map(|station| &station.carriage)
    }

    /// Home every head in configuration order
    ///
    /// Stops at the first head that fails; later heads are not commanded.
    pub async fn home(&self) -> Result<(), MachineError> {
        self.run_all(HeadOperation::Home).await
    }

    /// Raise every device of every head to safe Z, head by head
    pub async fn move_to_safe_z(&self) -> Result<(), MachineError> {
        self.run_all(HeadOperation::MoveToSafeZ).await
    }

    pub fn home_blocking(&self) -> Result<(), MachineError> {
        block_on(self.home())
    }

    pub fn move_to_safe_z_blocking(&self) -> Result<(), MachineError> {
        block_on(self.move_to_safe_z())
    }

    /// Move a head's carriage to an absolute X/Y position
    ///
    /// Refused while the head is emergency stopped or not safe for lateral
    /// motion. The move itself
    /// counts as device motion, so the head has to be retracted again before
    /// the next one.
    pub fn move_head_xy(&self, head_id: &str, x_um: i32, y_um: i32) -> Result<(), MachineError> {
        let station = self
            .station(head_id)
            .ok_or_else(|| MachineError::UnknownHead(head_id.to_string()))?;

        if station.head.is_stopped() || !station.head.safety_state().lateral_motion_allowed() {
            warn!(
                "head {}: lateral move refused, safety {}",
                head_id,
                station.head.safety_state()
            );
            return Err(MachineError::UnsafeLateralMove(head_id.to_string()));
        }

        debug!("head {}: moving to ({}, {}) um", head_id, x_um, y_um);
        station.carriage.move_to(x_um, y_um);
        station.head.note_device_motion();
        Ok(())
    }

    /// Stop every head
    pub fn emergency_stop(&self) {
        warn!("machine: emergency stop");
        for station in &self.stations {
            station.head.emergency_stop();
        }
    }

    pub fn clear_emergency_stop(&self) {
        for station in &self.stations {
            station.head.clear_emergency_stop();
        }
    }

    fn station(&self, head_id: &str) -> Option<&Station> {
        self.stations.iter().find(|station| station.head.id() == head_id)
    }

    async fn run_all(&self, operation: HeadOperation) -> Result<(), MachineError> {
        info!("machine: {} on {} heads", operation, self.stations.len());
        for station in &self.stations {
            let head = &station.head;
            let result = match operation {
                HeadOperation::Home => head.home().await,
                HeadOperation::MoveToSafeZ => head.move_to_safe_z().await,
            };
            result.map_err(|source| MachineError::Head {
                head: head.id().to_string(),
                source,
            })?;
        }
        Ok(())
    }
}

fn build_station(section: &HeadSection, axes: &[Arc<SimAxis>]) -> Result<Station, ConfigError> {
    let carriage = Arc::new(Carriage::new(
        mm_to_um(section.home_x_mm)?,
        mm_to_um(section.home_y_mm)?,
    ));

    let mut devices = DeviceRegistry::new();
    for device in &section.nozzles {
        devices.add_nozzle(SimNozzle::new(build_mount(device, &carriage, axes)?))?;
    }
    for device in &section.actuators {
        devices.add_actuator(SimActuator::new(build_mount(device, &carriage, axes)?))?;
    }
    for device in &section.cameras {
        devices.add_camera(SimCamera::new(build_mount(device, &carriage, axes)?))?;
    }

    let head = Head::new(&section.id, devices, section.policy)?;
    debug!("head {}: {} devices", section.id, head.devices().len());
    Ok(Station { head, carriage })
}

fn build_mount(
    section: &DeviceSection,
    carriage: &Arc<Carriage>,
    axes: &[Arc<SimAxis>],
) -> Result<Mount, ConfigError> {
    let mut mount = Mount::new(&section.id, carriage.clone())?
        .with_offset(mm_to_um(section.offset_x_mm)?, mm_to_um(section.offset_y_mm)?)
        .with_fixed_z(mm_to_um(section.fixed_z_mm)?);

    if let Some(axis_id) = &section.z_axis {
        let axis = axes
            .iter()
            .find(|axis| axis.id() == axis_id)
            .ok_or_else(|| ConfigError::UnknownAxis {
                device: section.id.clone(),
                axis: axis_id.clone(),
            })?;

        let travel = axis.config();
        let safe_z_um = match section.safe_z_mm {
            Some(mm) => mm_to_um(mm)?,
            None => travel.max_um,
        };
        if safe_z_um < travel.min_um || safe_z_um > travel.max_um {
            return Err(ConfigError::SafeZOutOfRange {
                device: section.id.clone(),
                axis: axis_id.clone(),
            });
        }
        mount = mount.with_z_axis(axis.clone(), safe_z_um);
    }

    if !section.z_only_retract {
        mount = mount.with_combined_retract();
    }
    Ok(mount)
}
