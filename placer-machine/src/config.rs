//! Machine topology configuration
//!
//! The topology is a TOML document listing the Z axes of the machine and
//! the heads with their nozzles, actuators and cameras. Lengths are given
//! in millimeters and converted to micrometers when the machine is built.
//!
//! ```toml
//! [[axis]]
//! id = "Z1"
//! min_mm = -40.0
//!
//! [[head]]
//! id = "H1"
//!
//! [[head.nozzle]]
//! id = "N1"
//! z_axis = "Z1"
//! safe_z_mm = -5.0
//! ```

use placer_core::HeadConfig;
use placer_drivers::AxisConfig;
use serde::Deserialize;

use crate::error::ConfigError;

/// Complete machine topology
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MachineConfig {
    #[serde(default, rename = "axis")]
    pub axes: Vec<AxisSection>,
    #[serde(default, rename = "head")]
    pub heads: Vec<HeadSection>,
}

/// `[[axis]]` table: one physical Z axis
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxisSection {
    pub id: String,
    #[serde(default)]
    pub home_mm: f64,
    #[serde(default = "default_min_mm")]
    pub min_mm: f64,
    #[serde(default)]
    pub max_mm: f64,
    /// Simulated travel time in executor polls
    #[serde(default = "default_travel_polls")]
    pub travel_polls: u32,
}

/// `[[head]]` table
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeadSection {
    pub id: String,
    #[serde(default)]
    pub home_x_mm: f64,
    #[serde(default)]
    pub home_y_mm: f64,
    #[serde(default)]
    pub policy: HeadConfig,
    #[serde(default, rename = "nozzle")]
    pub nozzles: Vec<DeviceSection>,
    #[serde(default, rename = "actuator")]
    pub actuators: Vec<DeviceSection>,
    #[serde(default, rename = "camera")]
    pub cameras: Vec<DeviceSection>,
}

/// `[[head.nozzle]]`, `[[head.actuator]]` or `[[head.camera]]` table
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceSection {
    pub id: String,
    #[serde(default)]
    pub offset_x_mm: f64,
    #[serde(default)]
    pub offset_y_mm: f64,
    /// Identifier of the `[[axis]]` driving this device's Z
    pub z_axis: Option<String>,
    /// Safe height, defaults to the top of the axis travel
    pub safe_z_mm: Option<f64>,
    /// Height reported when the device has no Z axis
    #[serde(default)]
    pub fixed_z_mm: f64,
    /// Whether the device's retract moves only Z
    #[serde(default = "default_z_only_retract")]
    pub z_only_retract: bool,
}

fn default_min_mm() -> f64 {
    -50.0
}

fn default_travel_polls() -> u32 {
    1
}

fn default_z_only_retract() -> bool {
    true
}

/// Parse a machine topology from TOML
pub fn parse_config(input: &str) -> Result<MachineConfig, ConfigError> {
    Ok(toml::from_str(input)?)
}

/// Convert millimeters to whole micrometers
///
/// Rejects NaN, infinities and lengths that do not fit in an `i32` of
/// micrometers.
pub fn mm_to_um(mm: f64) -> Result<i32, ConfigError> {
    let um = (mm * 1000.0).round();
    if !um.is_finite() || um < f64::from(i32::MIN) || um > f64::from(i32::MAX) {
        return Err(ConfigError::LengthOutOfRange(mm));
    }
    Ok(um as i32)
}

impl AxisSection {
    pub fn axis_config(&self) -> Result<AxisConfig, ConfigError> {
        Ok(AxisConfig {
            home_um: mm_to_um(self.home_mm)?,
            min_um: mm_to_um(self.min_mm)?,
            max_um: mm_to_um(self.max_mm)?,
            travel_polls: self.travel_polls,
        })
    }
}
