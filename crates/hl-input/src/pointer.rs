//! Pointer sample types delivered by the host input source.

use hl_core::{Ray, Real};

/// Phase of a pointer sample. One active pointer at a time is assumed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
    Began,
    Moved,
    Ended,
}

/// One pointer sample as delivered by the host per input poll.
///
/// The host camera unprojects the screen position into a pick ray; the raw
/// horizontal screen coordinate is kept alongside because handle rotation is
/// driven by screen-space deltas, not by the ray itself.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    pub phase: PointerPhase,
    pub ray: Ray,
    /// Horizontal screen coordinate (pixels or normalized units; only
    /// deltas are consumed, scaled by the rotation speed).
    pub screen_x: Real,
}

impl PointerSample {
    pub fn new(phase: PointerPhase, ray: Ray, screen_x: Real) -> Self {
        Self {
            phase,
            ray,
            screen_x,
        }
    }
}
