//! Scripted devices for coordinator and registry tests

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use embassy_futures::yield_now;

use crate::error::MotionError;
use crate::traits::{
    Actuator, Camera, HeadMountable, Homeable, Identifiable, Nozzle, SafeZRetractable,
};
use crate::types::{Location, ZAxis};

/// Ordered log of device commands shared by all mocks of a test
#[derive(Default)]
pub struct Journal(Mutex<Vec<String>>);

impl Journal {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn record(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    /// Every entry, including completions
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Command entries only, without completions
    pub fn commands(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| !e.starts_with("done ") && !e.starts_with("fail "))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

/// Device with scripted behavior usable as nozzle, actuator or camera
pub struct MockDevice {
    id: String,
    journal: Arc<Journal>,
    location: Mutex<Location>,
    home: Location,
    z_axis: Option<ZAxis>,
    home_fault: Option<MotionError>,
    retract_fault: Option<MotionError>,
    z_only: bool,
    drift: bool,
    stuck: bool,
    polls: usize,
    gate: Option<Arc<AtomicBool>>,
    home_calls: AtomicUsize,
    retract_calls: AtomicUsize,
    move_z_calls: AtomicUsize,
    halted: AtomicBool,
}

impl MockDevice {
    pub fn new(id: &str, journal: &Arc<Journal>) -> Self {
        Self {
            id: id.to_string(),
            journal: journal.clone(),
            location: Mutex::new(Location::default()),
            home: Location::default(),
            z_axis: None,
            home_fault: None,
            retract_fault: None,
            z_only: true,
            drift: false,
            stuck: false,
            polls: 0,
            gate: None,
            home_calls: AtomicUsize::new(0),
            retract_calls: AtomicUsize::new(0),
            move_z_calls: AtomicUsize::new(0),
            halted: AtomicBool::new(false),
        }
    }

    pub fn with_axis(mut self, axis: &str, safe_z_um: i32) -> Self {
        self.z_axis = Some(ZAxis::new(axis, safe_z_um).unwrap());
        self
    }

    pub fn at(self, location: Location) -> Self {
        *self.location.lock().unwrap() = location;
        self
    }

    pub fn home_at(mut self, location: Location) -> Self {
        self.home = location;
        self
    }

    pub fn failing_home(mut self, fault: MotionError) -> Self {
        self.home_fault = Some(fault);
        self
    }

    pub fn failing_retract(mut self, fault: MotionError) -> Self {
        self.retract_fault = Some(fault);
        self
    }

    /// Retract primitive that also re-centers X/Y
    pub fn combined_retract(mut self) -> Self {
        self.z_only = false;
        self
    }

    /// Z-only retract that nevertheless nudges X
    pub fn drifting(mut self) -> Self {
        self.drift = true;
        self
    }

    /// Home reports success without moving
    pub fn stuck(mut self) -> Self {
        self.stuck = true;
        self
    }

    /// Every move takes `polls` executor polls
    pub fn slow(mut self, polls: usize) -> Self {
        self.polls = polls;
        self
    }

    /// Moves wait until `gate` is set
    pub fn gated(mut self, gate: &Arc<AtomicBool>) -> Self {
        self.gate = Some(gate.clone());
        self
    }

    pub fn home_calls(&self) -> usize {
        self.home_calls.load(Ordering::SeqCst)
    }

    pub fn retract_calls(&self) -> usize {
        self.retract_calls.load(Ordering::SeqCst)
    }

    pub fn move_z_calls(&self) -> usize {
        self.move_z_calls.load(Ordering::SeqCst)
    }

    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }

    async fn motion(&self) {
        for _ in 0..self.polls {
            yield_now().await;
        }
        if let Some(gate) = &self.gate {
            while !gate.load(Ordering::SeqCst) {
                yield_now().await;
            }
        }
    }

    fn finish(&self, fault: Option<MotionError>) -> Result<(), MotionError> {
        match fault {
            Some(fault) => {
                self.journal.record(format!("fail {}", self.id));
                Err(fault)
            }
            None => {
                self.journal.record(format!("done {}", self.id));
                Ok(())
            }
        }
    }
}

impl Identifiable for MockDevice {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Homeable for MockDevice {
    async fn home(&self) -> Result<(), MotionError> {
        self.journal.record(format!("home {}", self.id));
        self.home_calls.fetch_add(1, Ordering::SeqCst);
        self.motion().await;
        if self.home_fault.is_none() && !self.stuck {
            *self.location.lock().unwrap() = self.home;
        }
        self.finish(self.home_fault)
    }

    fn home_location(&self) -> Option<Location> {
        Some(self.home)
    }
}

impl SafeZRetractable for MockDevice {
    fn z_axis(&self) -> Option<&ZAxis> {
        self.z_axis.as_ref()
    }

    async fn retract_to_safe_z(&self) -> Result<(), MotionError> {
        self.journal.record(format!("retract {}", self.id));
        self.retract_calls.fetch_add(1, Ordering::SeqCst);
        self.motion().await;
        if self.retract_fault.is_none() {
            let safe_z = self.z_axis.as_ref().map_or(0, |axis| axis.safe_z_um);
            let mut location = self.location.lock().unwrap();
            if !self.z_only {
                location.x_um = self.home.x_um;
                location.y_um = self.home.y_um;
            }
            if self.drift {
                location.x_um += 1;
            }
            location.z_um = location.z_um.max(safe_z);
        }
        self.finish(self.retract_fault)
    }

    fn retract_is_z_only(&self) -> bool {
        self.z_only
    }

    async fn move_z(&self, z_um: i32) -> Result<(), MotionError> {
        self.journal.record(format!("move_z {}", self.id));
        self.move_z_calls.fetch_add(1, Ordering::SeqCst);
        self.motion().await;
        if self.retract_fault.is_none() {
            self.location.lock().unwrap().z_um = z_um;
        }
        self.finish(self.retract_fault)
    }
}

impl HeadMountable for MockDevice {
    fn location(&self) -> Location {
        *self.location.lock().unwrap()
    }

    fn halt(&self) {
        self.halted.store(true, Ordering::SeqCst);
        self.journal.record(format!("halt {}", self.id));
    }
}

impl Nozzle for MockDevice {}
impl Actuator for MockDevice {}
impl Camera for MockDevice {}
