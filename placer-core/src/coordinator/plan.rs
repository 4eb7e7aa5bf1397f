//! Dispatch planning
//!
//! A plan splits the devices of one operation into lanes. Devices within a
//! lane are commanded one after another; lanes run concurrently. Devices
//! naming the same physical axis always share a lane.

use heapless::Vec;

use crate::registry::{DeviceSlot, MAX_DEVICES};

const _: () = assert!(MAX_DEVICES <= 32, "DeviceSet is a 32-bit mask");

/// Devices commanded strictly in order
pub type Lane = Vec<DeviceSlot, MAX_DEVICES>;

/// Set of devices, keyed by [`DeviceSlot::ordinal`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceSet(u32);

impl DeviceSet {
    pub const fn new() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, slot: DeviceSlot) {
        self.0 |= 1 << slot.ordinal();
    }

    pub fn contains(&self, slot: DeviceSlot) -> bool {
        self.0 & (1 << slot.ordinal()) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// Lanes of one head operation
#[derive(Debug, Clone, Default)]
pub struct DispatchPlan {
    lanes: Vec<Lane, MAX_DEVICES>,
}

impl DispatchPlan {
    /// Every device in a single lane, in the given order
    pub fn sequential(slots: impl IntoIterator<Item = DeviceSlot>) -> Self {
        let mut lane = Lane::new();
        for slot in slots {
            // Capacity matches the registry bound
            let _ = lane.push(slot);
        }

        let mut lanes = Vec::new();
        if !lane.is_empty() {
            let _ = lanes.push(lane);
        }
        Self { lanes }
    }

    /// One lane per physical axis
    ///
    /// Devices naming the same axis are queued on one lane in the given
    /// order. Devices without an axis get a lane of their own.
    pub fn by_axis<'a>(slots: impl IntoIterator<Item = (DeviceSlot, Option<&'a str>)>) -> Self {
        let mut lanes: Vec<Lane, MAX_DEVICES> = Vec::new();
        let mut keys: Vec<Option<&'a str>, MAX_DEVICES> = Vec::new();

        for (slot, axis) in slots {
            let shared = axis.and_then(|axis| keys.iter().position(|key| *key == Some(axis)));
            match shared {
                Some(lane) => {
                    let _ = lanes[lane].push(slot);
                }
                None => {
                    let mut lane = Lane::new();
                    let _ = lane.push(slot);
                    let _ = lanes.push(lane);
                    let _ = keys.push(axis);
                }
            }
        }

        Self { lanes }
    }

    /// Lanes in creation order
    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    /// Every slot of the plan, lane by lane
    pub fn slots(&self) -> impl Iterator<Item = DeviceSlot> + '_ {
        self.lanes.iter().flat_map(|lane| lane.iter().copied())
    }

    /// Number of devices in the plan
    pub fn device_count(&self) -> usize {
        self.lanes.iter().map(|lane| lane.len()).sum()
    }
}
