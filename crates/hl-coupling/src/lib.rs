//! Coupling lifecycle core for hoselock.
//!
//! This crate owns the one genuinely stateful piece of the trainer: the
//! coupling state machine that takes drag/rotation session events, decides
//! alignment, drives the pin/spring/valve linkage, and emits lifecycle
//! notifications for the presentation layer.
//!
//! # Architecture
//!
//! - Alignment evaluation and the mechanical linkage are pure functions.
//! - [`CouplingStateMachine`] holds the lifecycle state
//!   (Idle → Aligning → Connected → Locked and back) and never mutates
//!   session-owned state directly; it issues commands (enable/disable,
//!   set pose) to the sessions passed into each handler.
//! - Everything observable leaves as a tagged [`CouplingEvent`]; hosts
//!   implement [`PresentationSink`] to drive visuals/audio/UI fire-and-forget.

pub mod alignment;
pub mod error;
pub mod events;
pub mod linkage;
pub mod machine;

// Re-exports for public API
pub use alignment::{Alignment, AlignmentTolerance, evaluate_alignment};
pub use error::{CouplingError, CouplingResult};
pub use events::{CouplingEvent, PresentationSink, RecordingSink};
pub use linkage::{LinkagePose, MechanicalLinkage};
pub use machine::{CouplingConfig, CouplingState, CouplingStateMachine, PoseProvider};
