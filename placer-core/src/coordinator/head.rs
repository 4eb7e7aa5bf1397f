//! Head coordinator
//!
//! A [`Head`] owns the devices mounted on one carriage and runs the two
//! head-level operations across them:
//!
//! - `home()`: nozzles, then actuators, then cameras; fail-fast
//! - `move_to_safe_z()`: Z-only retraction of every device with a Z axis
//!
//! Only one operation runs at a time per head. Callers queue on the motion
//! token, so device commands from two operations never interleave.

use core::cell::{Cell, RefCell};
use core::sync::atomic::{AtomicBool, Ordering};

use embassy_futures::block_on;
use embassy_futures::join::join_array;
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;

use super::plan::{DeviceSet, DispatchPlan};
use crate::config::{DispatchPolicy, HeadConfig};
use crate::error::{HeadError, MotionError, RegistryError};
use crate::registry::{DeviceRegistry, DeviceSlot, MAX_DEVICES};
use crate::state::{HeadEvent, HeadOperation, HeadStatus, SafetyState};
use crate::traits::{Actuator, Camera, HeadMountable, Nozzle};
use crate::types::{identifier, DeviceKind, Identifier};

/// A movable group of nozzles, actuators and cameras
pub struct Head<N, A, C> {
    id: Identifier,
    config: HeadConfig,
    devices: DeviceRegistry<N, A, C>,
    /// Held for the whole of a head operation
    motion: Mutex<CriticalSectionRawMutex, ()>,
    status: BlockingMutex<CriticalSectionRawMutex, Cell<HeadStatus>>,
    /// Latched by an emergency stop until explicitly cleared
    stopped: AtomicBool,
    stop: Signal<CriticalSectionRawMutex, ()>,
}

/// Bookkeeping of one running operation
struct Progress {
    completed: Cell<DeviceSet>,
    failure: RefCell<Option<HeadError>>,
}

impl Progress {
    fn new() -> Self {
        Self {
            completed: Cell::new(DeviceSet::new()),
            failure: RefCell::new(None),
        }
    }

    fn aborted(&self) -> bool {
        self.failure.borrow().is_some()
    }

    fn complete(&self, slot: DeviceSlot) {
        let mut completed = self.completed.get();
        completed.insert(slot);
        self.completed.set(completed);
    }

    /// Keep the first failure only
    fn fail(&self, err: HeadError) {
        let mut failure = self.failure.borrow_mut();
        if failure.is_none() {
            *failure = Some(err);
        }
    }

    fn into_result(self) -> Result<(), HeadError> {
        match self.failure.into_inner() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl<N: Nozzle, A: Actuator, C: Camera> Head<N, A, C> {
    /// Create a head owning `devices`
    ///
    /// The head starts in [`SafetyState::Unknown`], unhomed.
    pub fn new(
        id: &str,
        devices: DeviceRegistry<N, A, C>,
        config: HeadConfig,
    ) -> Result<Self, RegistryError> {
        Ok(Self {
            id: identifier(id)?,
            config,
            devices,
            motion: Mutex::new(()),
            status: BlockingMutex::new(Cell::new(HeadStatus::new())),
            stopped: AtomicBool::new(false),
            stop: Signal::new(),
        })
    }

    /// Head identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &HeadConfig {
        &self.config
    }

    /// Every device attached to this head
    pub fn devices(&self) -> &DeviceRegistry<N, A, C> {
        &self.devices
    }

    pub fn nozzles(&self) -> &[N] {
        self.devices.nozzles()
    }

    pub fn actuators(&self) -> &[A] {
        self.devices.actuators()
    }

    pub fn cameras(&self) -> &[C] {
        self.devices.cameras()
    }

    pub fn nozzle_by_id(&self, id: &str) -> Option<&N> {
        self.devices.nozzle_by_id(id)
    }

    pub fn actuator_by_id(&self, id: &str) -> Option<&A> {
        self.devices.actuator_by_id(id)
    }

    pub fn camera_by_id(&self, id: &str) -> Option<&C> {
        self.devices.camera_by_id(id)
    }

    /// Current safety state and homed flag
    pub fn status(&self) -> HeadStatus {
        self.status.lock(|status| status.get())
    }

    pub fn safety_state(&self) -> SafetyState {
        self.status().safety
    }

    pub fn is_homed(&self) -> bool {
        self.status().homed
    }

    /// Check if a head operation currently holds the motion token
    pub fn is_busy(&self) -> bool {
        self.motion.try_lock().is_err()
    }

    /// Home every device
    ///
    /// Devices are homed nozzles first, then actuators, then cameras. The
    /// first failure aborts the sequence and leaves the head unhomed.
    pub async fn home(&self) -> Result<(), HeadError> {
        self.run(HeadOperation::Home).await
    }

    /// Raise every device with a Z axis to its safe height
    ///
    /// Does not require a prior home. No device moves in X/Y.
    pub async fn move_to_safe_z(&self) -> Result<(), HeadError> {
        self.run(HeadOperation::MoveToSafeZ).await
    }

    /// Blocking form of [`home`](Self::home)
    pub fn home_blocking(&self) -> Result<(), HeadError> {
        block_on(self.home())
    }

    /// Blocking form of [`move_to_safe_z`](Self::move_to_safe_z)
    pub fn move_to_safe_z_blocking(&self) -> Result<(), HeadError> {
        block_on(self.move_to_safe_z())
    }

    /// Cancel the running operation and refuse new ones
    ///
    /// Devices not yet done with the running operation are halted. Operations
    /// fail with [`HeadError::Cancelled`] until
    /// [`clear_emergency_stop`](Self::clear_emergency_stop) is called.
    pub fn emergency_stop(&self) {
        warn!("head {}: emergency stop", self.id.as_str());
        // Latched under the status lock so a finishing operation cannot
        // publish its completion after this point
        self.status.lock(|status| {
            self.stopped.store(true, Ordering::SeqCst);
            status.set(status.get().transition(HeadEvent::Cancelled));
        });
        self.stop.signal(());
    }

    /// Re-arm the head after an emergency stop
    pub fn clear_emergency_stop(&self) {
        info!("head {}: emergency stop cleared", self.id.as_str());
        self.stop.reset();
        self.stopped.store(false, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Record that a device was moved outside a head operation
    pub fn note_device_motion(&self) {
        let status = self.apply(HeadEvent::DeviceMotion);
        trace!("head {}: device motion, safety {}", self.id.as_str(), status.safety);
    }

    fn apply(&self, event: HeadEvent) -> HeadStatus {
        self.status.lock(|status| {
            let next = status.get().transition(event);
            status.set(next);
            next
        })
    }

    async fn run(&self, operation: HeadOperation) -> Result<(), HeadError> {
        let _token = self.motion.lock().await;

        let result = if self.is_stopped() {
            Err(HeadError::Cancelled { operation })
        } else {
            self.execute(operation).await
        };

        let (result, status) = self.status.lock(|status| {
            // A stop that raced the last device command still cancels
            let result = match result {
                Ok(()) if self.is_stopped() => Err(HeadError::Cancelled { operation }),
                other => other,
            };
            let event = match &result {
                Ok(()) => HeadEvent::completed(operation),
                Err(HeadError::Cancelled { .. }) => HeadEvent::Cancelled,
                Err(HeadError::Motion { .. }) => HeadEvent::OperationFailed(operation),
            };
            let next = status.get().transition(event);
            status.set(next);
            (result, next)
        });

        match &result {
            Ok(()) => info!(
                "head {}: {} complete, safety {}",
                self.id.as_str(),
                operation,
                status.safety
            ),
            Err(err) => error!("head {}: {}", self.id.as_str(), err),
        }
        result
    }

    async fn execute(&self, operation: HeadOperation) -> Result<(), HeadError> {
        let plan = self.plan(operation);
        info!(
            "head {}: {} started, {} devices in {} lanes",
            self.id.as_str(),
            operation,
            plan.device_count(),
            plan.lanes().len()
        );

        let progress = Progress::new();
        let outcome = select(self.dispatch(&plan, operation, &progress), self.stop.wait()).await;

        match outcome {
            Either::First(()) => progress.into_result(),
            Either::Second(()) => {
                let completed = progress.completed.get();
                for slot in plan.slots().filter(|slot| !completed.contains(*slot)) {
                    debug!("halting {} {}", slot.kind, self.devices.device_id(slot));
                    self.devices.halt(slot);
                }
                Err(HeadError::Cancelled { operation })
            }
        }
    }

    fn plan(&self, operation: HeadOperation) -> DispatchPlan {
        match self.config.policy(operation) {
            DispatchPolicy::Sequential => DispatchPlan::sequential(self.devices.slots()),
            DispatchPolicy::Parallel => DispatchPlan::by_axis(self.devices.slots().map(|slot| {
                let axis = self.devices.z_axis(slot).map(|axis| axis.axis.as_str());
                (slot, axis)
            })),
        }
    }

    /// Run every lane of `plan` to completion
    ///
    /// After the first failure no lane issues another device command;
    /// commands already in flight are allowed to finish.
    async fn dispatch(&self, plan: &DispatchPlan, operation: HeadOperation, progress: &Progress) {
        let lanes = plan.lanes();
        let runs: [_; MAX_DEVICES] = core::array::from_fn(|i| {
            let lane = lanes.get(i);
            async move {
                let Some(lane) = lane else {
                    return;
                };
                for &slot in lane.iter() {
                    if progress.aborted() {
                        break;
                    }
                    match self.command(slot, operation).await {
                        Ok(()) => progress.complete(slot),
                        Err(err) => progress.fail(err),
                    }
                }
            }
        });
        join_array(runs).await;
    }

    async fn command(&self, slot: DeviceSlot, operation: HeadOperation) -> Result<(), HeadError> {
        let i = slot.index as usize;
        match slot.kind {
            DeviceKind::Nozzle => self.drive(&self.devices.nozzles()[i], slot.kind, operation).await,
            DeviceKind::Actuator => {
                self.drive(&self.devices.actuators()[i], slot.kind, operation)
                    .await
            }
            DeviceKind::Camera => self.drive(&self.devices.cameras()[i], slot.kind, operation).await,
        }
    }

    async fn drive<D: HeadMountable>(
        &self,
        device: &D,
        kind: DeviceKind,
        operation: HeadOperation,
    ) -> Result<(), HeadError> {
        let outcome = match operation {
            HeadOperation::Home => self.home_device(device).await,
            HeadOperation::MoveToSafeZ => retract_device(device).await,
        };

        outcome.map_err(|cause| {
            error!(
                "head {}: {} of {} {} failed: {}",
                self.id.as_str(),
                operation,
                kind,
                device.id(),
                cause
            );
            HeadError::motion(device.id(), kind, operation, cause)
        })
    }

    async fn home_device<D: HeadMountable>(&self, device: &D) -> Result<(), MotionError> {
        debug!("homing {}", device.id());
        device.home().await?;

        if self.config.verify_home {
            if let Some(home) = device.home_location() {
                if device.location() != home {
                    return Err(MotionError::NotAtHome);
                }
            }
        }
        Ok(())
    }
}

/// Raise one device to safe Z and check nothing moved sideways
async fn retract_device<D: HeadMountable>(device: &D) -> Result<(), MotionError> {
    let Some(axis) = device.z_axis() else {
        trace!("{} has no Z axis", device.id());
        return Ok(());
    };

    let before = device.location();
    if device.retract_is_z_only() {
        debug!("retracting {} to safe Z", device.id());
        device.retract_to_safe_z().await?;
    } else if !axis.is_safe(before.z_um) {
        // The device's own retract may also travel in X/Y
        debug!("moving {} Z to {}", device.id(), axis.safe_z_um);
        device.move_z(axis.safe_z_um).await?;
    }

    let after = device.location();
    if !after.same_xy(&before) {
        return Err(MotionError::LateralDrift);
    }
    if !axis.is_safe(after.z_um) {
        return Err(MotionError::BelowSafeZ);
    }
    Ok(())
}
