//! Service layer for hoselock: scenario files, rig wiring, and replay.
//!
//! The core crates (`hl-input`, `hl-coupling`) are pure interaction logic
//! driven by a host. This crate provides a scripted host: scenarios are
//! YAML files describing part poses and a pointer timeline, a
//! [`CouplingRig`] wires sessions + state machine + collaborators, and the
//! replay service runs the fixed-rate tick loop and records a transcript
//! of every lifecycle event. Both the CLI and any future GUI share this
//! layer.

pub mod error;
pub mod providers;
pub mod replay;
pub mod rig;
pub mod scenario;

pub use error::{AppError, AppResult};
pub use providers::{ProximityPicker, StaticPoses};
pub use replay::{ReplayOptions, Transcript, TranscriptEntry, replay};
pub use rig::{CouplingRig, female_part, handle_part, male_part};
pub use scenario::{Scenario, load_scenario, validate_scenario};
