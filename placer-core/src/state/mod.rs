//! Head safety state machine
//!
//! Tracks whether the head may move laterally. The state only changes in
//! response to explicit events from the coordinator or the machine layer.

pub mod events;
pub mod machine;

pub use events::{HeadEvent, HeadOperation};
pub use machine::{HeadStatus, SafetyState};
