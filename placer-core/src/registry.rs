//! Device registry
//!
//! Holds the nozzles, actuators and cameras mounted on one head, each in
//! configuration order. Membership is fixed once the registry is handed to
//! a [`Head`](crate::Head); lookups need no locking.

use heapless::Vec;

use crate::error::RegistryError;
use crate::traits::{Actuator, Camera, HeadMountable, Identifiable, Nozzle};
use crate::types::{identifier, DeviceKind, ZAxis};

/// Maximum nozzles per head
pub const MAX_NOZZLES: usize = 8;

/// Maximum actuators per head
pub const MAX_ACTUATORS: usize = 8;

/// Maximum cameras per head
pub const MAX_CAMERAS: usize = 4;

/// Maximum devices per head, all kinds together
pub const MAX_DEVICES: usize = MAX_NOZZLES + MAX_ACTUATORS + MAX_CAMERAS;

/// Position of a device within a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceSlot {
    pub kind: DeviceKind,
    pub index: u8,
}

impl DeviceSlot {
    pub const fn new(kind: DeviceKind, index: u8) -> Self {
        Self { kind, index }
    }

    /// Registry-wide index, unique across device kinds and below [`MAX_DEVICES`]
    pub fn ordinal(&self) -> usize {
        let base = match self.kind {
            DeviceKind::Nozzle => 0,
            DeviceKind::Actuator => MAX_NOZZLES,
            DeviceKind::Camera => MAX_NOZZLES + MAX_ACTUATORS,
        };
        base + self.index as usize
    }
}

/// Devices attached to one head
#[derive(Debug)]
pub struct DeviceRegistry<N, A, C> {
    nozzles: Vec<N, MAX_NOZZLES>,
    actuators: Vec<A, MAX_ACTUATORS>,
    cameras: Vec<C, MAX_CAMERAS>,
}

impl<N, A, C> Default for DeviceRegistry<N, A, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, A, C> DeviceRegistry<N, A, C> {
    /// Create an empty registry
    pub const fn new() -> Self {
        Self {
            nozzles: Vec::new(),
            actuators: Vec::new(),
            cameras: Vec::new(),
        }
    }

    /// Nozzles in registration order
    pub fn nozzles(&self) -> &[N] {
        &self.nozzles
    }

    /// Actuators in registration order
    pub fn actuators(&self) -> &[A] {
        &self.actuators
    }

    /// Cameras in registration order
    pub fn cameras(&self) -> &[C] {
        &self.cameras
    }

    /// Total number of devices
    pub fn len(&self) -> usize {
        self.nozzles.len() + self.actuators.len() + self.cameras.len()
    }

    /// Check if no device is attached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every device slot in command order: nozzles, then actuators, then cameras
    pub fn slots(&self) -> impl Iterator<Item = DeviceSlot> + '_ {
        let nozzles = (0..self.nozzles.len()).map(|i| DeviceSlot::new(DeviceKind::Nozzle, i as u8));
        let actuators =
            (0..self.actuators.len()).map(|i| DeviceSlot::new(DeviceKind::Actuator, i as u8));
        let cameras = (0..self.cameras.len()).map(|i| DeviceSlot::new(DeviceKind::Camera, i as u8));
        nozzles.chain(actuators).chain(cameras)
    }
}

impl<N: Nozzle, A: Actuator, C: Camera> DeviceRegistry<N, A, C> {
    /// Attach a nozzle
    pub fn add_nozzle(&mut self, nozzle: N) -> Result<(), RegistryError> {
        insert(&mut self.nozzles, nozzle, DeviceKind::Nozzle)
    }

    /// Attach an actuator
    pub fn add_actuator(&mut self, actuator: A) -> Result<(), RegistryError> {
        insert(&mut self.actuators, actuator, DeviceKind::Actuator)
    }

    /// Attach a camera
    pub fn add_camera(&mut self, camera: C) -> Result<(), RegistryError> {
        insert(&mut self.cameras, camera, DeviceKind::Camera)
    }

    /// Builder form of [`add_nozzle`](Self::add_nozzle)
    pub fn with_nozzle(mut self, nozzle: N) -> Result<Self, RegistryError> {
        self.add_nozzle(nozzle)?;
        Ok(self)
    }

    /// Builder form of [`add_actuator`](Self::add_actuator)
    pub fn with_actuator(mut self, actuator: A) -> Result<Self, RegistryError> {
        self.add_actuator(actuator)?;
        Ok(self)
    }

    /// Builder form of [`add_camera`](Self::add_camera)
    pub fn with_camera(mut self, camera: C) -> Result<Self, RegistryError> {
        self.add_camera(camera)?;
        Ok(self)
    }

    /// Nozzle with the given id
    pub fn nozzle_by_id(&self, id: &str) -> Option<&N> {
        find_by_id(&self.nozzles, id)
    }

    /// Actuator with the given id
    pub fn actuator_by_id(&self, id: &str) -> Option<&A> {
        find_by_id(&self.actuators, id)
    }

    /// Camera with the given id
    pub fn camera_by_id(&self, id: &str) -> Option<&C> {
        find_by_id(&self.cameras, id)
    }

    /// Identifier of the device in `slot`
    pub fn device_id(&self, slot: DeviceSlot) -> &str {
        let i = slot.index as usize;
        match slot.kind {
            DeviceKind::Nozzle => self.nozzles[i].id(),
            DeviceKind::Actuator => self.actuators[i].id(),
            DeviceKind::Camera => self.cameras[i].id(),
        }
    }

    /// Vertical axis of the device in `slot`
    pub fn z_axis(&self, slot: DeviceSlot) -> Option<&ZAxis> {
        let i = slot.index as usize;
        match slot.kind {
            DeviceKind::Nozzle => self.nozzles[i].z_axis(),
            DeviceKind::Actuator => self.actuators[i].z_axis(),
            DeviceKind::Camera => self.cameras[i].z_axis(),
        }
    }

    /// Stop the device in `slot`
    pub fn halt(&self, slot: DeviceSlot) {
        let i = slot.index as usize;
        match slot.kind {
            DeviceKind::Nozzle => self.nozzles[i].halt(),
            DeviceKind::Actuator => self.actuators[i].halt(),
            DeviceKind::Camera => self.cameras[i].halt(),
        }
    }
}

/// Find the device whose identifier equals `id`
///
/// Returns `None` for an empty collection or when no device matches.
pub fn find_by_id<'a, D: Identifiable>(devices: &'a [D], id: &str) -> Option<&'a D> {
    devices.iter().find(|device| device.id() == id)
}

fn insert<D: HeadMountable, const CAP: usize>(
    devices: &mut Vec<D, CAP>,
    device: D,
    kind: DeviceKind,
) -> Result<(), RegistryError> {
    let id = identifier(device.id())?;
    if find_by_id(devices, &id).is_some() {
        return Err(RegistryError::DuplicateId { kind, id });
    }
    devices
        .push(device)
        .map_err(|_| RegistryError::CapacityExceeded(kind))
}
