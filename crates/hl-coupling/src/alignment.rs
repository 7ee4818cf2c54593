//! Tolerance-based alignment evaluation between two connector poses.

use serde::{Deserialize, Serialize};

use hl_core::{Pose, Real, angle_between_deg};

use crate::error::{CouplingError, CouplingResult};

/// Position/orientation tolerances for a successful mate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlignmentTolerance {
    /// Maximum position error (meters), exclusive.
    pub position_m: Real,
    /// Maximum forward-axis angle error (degrees), exclusive.
    pub rotation_deg: Real,
}

impl AlignmentTolerance {
    /// Create an alignment tolerance.
    ///
    /// # Errors
    ///
    /// Returns an error if either tolerance is not positive.
    pub fn new(position_m: Real, rotation_deg: Real) -> CouplingResult<Self> {
        if position_m <= 0.0 {
            return Err(CouplingError::InvalidArg {
                what: "position tolerance must be positive",
            });
        }
        if rotation_deg <= 0.0 {
            return Err(CouplingError::InvalidArg {
                what: "rotation tolerance must be positive",
            });
        }
        Ok(Self {
            position_m,
            rotation_deg,
        })
    }
}

impl Default for AlignmentTolerance {
    fn default() -> Self {
        Self {
            position_m: 0.05,
            rotation_deg: 5.0,
        }
    }
}

/// Result of one alignment evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Alignment {
    pub aligned: bool,
    pub distance_m: Real,
    pub angle_deg: Real,
}

/// Evaluate geometric closeness of two reference poses.
///
/// Pure and deterministic; called every frame during an active drag.
/// Both errors are strict: a distance exactly at the tolerance is not
/// aligned. Symmetric in its arguments.
pub fn evaluate_alignment(a: &Pose, b: &Pose, tol: &AlignmentTolerance) -> Alignment {
    let distance_m = (a.position - b.position).norm();
    let angle_deg = angle_between_deg(a.forward(), b.forward());
    Alignment {
        aligned: distance_m < tol.position_m && angle_deg < tol.rotation_deg,
        distance_m,
        angle_deg,
    }
}
