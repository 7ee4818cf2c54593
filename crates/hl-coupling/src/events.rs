//! Tagged lifecycle events and the presentation collaborator trait.

use serde::{Deserialize, Serialize};

use hl_core::Real;

use crate::linkage::LinkagePose;

/// Everything the coupling core reports to the outside world.
///
/// Discrete notifications, fire-and-forget: the core never waits on the
/// presentation layer. All payloads are plain scalars so events can be
/// recorded, replayed, and serialized into transcripts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CouplingEvent {
    /// Raw alignment readout for the current drag frame (distance/angle
    /// feedback for UI text, independent of edge detection).
    AlignmentSampled {
        aligned: bool,
        distance_m: Real,
        angle_deg: Real,
    },
    /// The aligned/not-aligned verdict changed since the previous frame.
    AlignedChanged {
        aligned: bool,
        distance_m: Real,
        angle_deg: Real,
    },
    /// Release happened while aligned; the halves mated and snapped.
    Connected,
    /// Release happened out of tolerance; the part was reset. A recovery
    /// path, not an error.
    ConnectFailed,
    /// Handle rotation progress in [0, 1].
    Progress { normalized: Real },
    /// The pin/spring/valve mechanism moved.
    LinkageMoved { pose: LinkagePose },
    /// The handle latch engaged; the coupling is complete.
    Locked,
    /// The handle returned to rest; the coupling released.
    Unlocked,
    /// Dragging of the female half was enabled/disabled.
    DragEnabled { enabled: bool },
    /// Handle rotation was enabled/disabled.
    RotationEnabled { enabled: bool },
}

/// Presentation collaborator: receives lifecycle notifications to drive
/// visuals, audio, and UI. Optional — a missing sink degrades to
/// logic-only operation.
pub trait PresentationSink {
    fn notify(&mut self, event: &CouplingEvent);
}

/// Convenience sink that records everything, for tests and transcripts.
#[derive(Default, Debug)]
pub struct RecordingSink {
    pub events: Vec<CouplingEvent>,
}

impl PresentationSink for RecordingSink {
    fn notify(&mut self, event: &CouplingEvent) {
        self.events.push(*event);
    }
}
