//! Pointer session primitives for the hoselock interaction core.
//!
//! This crate turns a raw pointer stream (rays + screen coordinates from the
//! host) into the two gesture sessions the coupling lifecycle is built on:
//!
//! - [`DragSession`] follows a pointer ray in a horizontal plane, clamps the
//!   displacement, and smooths part motion toward the target.
//! - [`RotationSession`] accumulates a single clamped rotation angle with a
//!   one-way fully-rotated latch.
//!
//! Sessions own their mutable state (part pose, angle) exclusively. They are
//! driven by explicit `start`/`update(dt)`/`end` calls within the host tick
//! and report what happened through typed event values; the orchestrating
//! state machine reacts to those events and issues commands back
//! (enable/disable, set pose). Ray picking is delegated to the external
//! [`PartPicker`] collaborator.

pub mod drag;
pub mod error;
pub mod picker;
pub mod pointer;
pub mod rotation;

// Re-exports for public API
pub use drag::{DragConfig, DragEvent, DragSession};
pub use error::{InputError, InputResult};
pub use picker::{PartPicker, StartOutcome};
pub use pointer::{PointerPhase, PointerSample};
pub use rotation::{RotationConfig, RotationEvent, RotationSession};
