//! Ray-pick collaborator trait.
//!
//! Spatial hit-testing lives in the host (physics engine, AR framework).
//! Sessions only need to know which part a pick ray landed on, so the
//! collaborator surface is a single method.

use hl_core::{PartId, Ray};

/// Spatial hit-test service provided by the host.
///
/// Implementations return the nearest part intersected by the ray, or
/// `None` when the ray misses everything relevant.
pub trait PartPicker {
    fn pick(&self, ray: &Ray) -> Option<PartId>;
}

/// Outcome of attempting to start a gesture session.
///
/// A miss is a diagnostic, never an error: the session simply stays
/// inactive and the next pointer sample gets another chance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    /// The ray hit the session's part; the gesture is now active.
    Started,
    /// The ray hit nothing relevant; session stays inactive.
    Missed,
    /// The session is not currently interactable.
    Disabled,
}

impl StartOutcome {
    pub fn started(self) -> bool {
        self == StartOutcome::Started
    }
}
