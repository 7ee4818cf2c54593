//! 3D geometry primitives for the interaction core.
//!
//! Conventions (matching the training content this core drives):
//! - Y is up; drag gestures move parts in a horizontal (XZ) plane.
//! - A pose's forward direction is its orientation applied to +Z.
//! - Angles at API boundaries are degrees, distances are meters.

use nalgebra::{UnitQuaternion, Vector3};

use crate::error::{HlError, HlResult};
use crate::numeric::Real;

/// 3D vector alias used throughout the workspace.
pub type Vec3 = Vector3<Real>;

/// Unit quaternion alias used throughout the workspace.
pub type Quat = UnitQuaternion<Real>;

/// Direction threshold below which a ray is treated as parallel to a plane.
const PARALLEL_EPS: Real = 1e-9;

/// Position + orientation of a part. Read-only input to evaluation;
/// owned by the object it describes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Pose {
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Identity orientation at the origin.
    pub fn identity() -> Self {
        Self {
            position: Vec3::zeros(),
            orientation: Quat::identity(),
        }
    }

    /// Pose at `position` with identity orientation.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            orientation: Quat::identity(),
        }
    }

    /// Pose from a position and intrinsic roll/pitch/yaw in degrees.
    pub fn from_euler_deg(position: Vec3, roll: Real, pitch: Real, yaw: Real) -> Self {
        Self {
            position,
            orientation: Quat::from_euler_angles(
                roll.to_radians(),
                pitch.to_radians(),
                yaw.to_radians(),
            ),
        }
    }

    /// Forward direction: the pose orientation applied to +Z.
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::z()
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

/// A pick ray (origin + unit direction), typically unprojected from a
/// pointer position by the host camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray, normalizing the direction.
    ///
    /// # Errors
    ///
    /// Returns an error if the direction is (near) zero length.
    pub fn new(origin: Vec3, direction: Vec3) -> HlResult<Self> {
        let norm = direction.norm();
        if norm < PARALLEL_EPS {
            return Err(HlError::InvalidArg {
                what: "ray direction must be non-zero",
            });
        }
        Ok(Self {
            origin,
            direction: direction / norm,
        })
    }

    /// Point along the ray at parameter `t`.
    pub fn point_at(&self, t: Real) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Shortest distance from the ray (as a half-line) to a point.
    pub fn distance_to_point(&self, point: Vec3) -> Real {
        let to_point = point - self.origin;
        let t = to_point.dot(&self.direction).max(0.0);
        (to_point - self.direction * t).norm()
    }

    /// Intersect with the horizontal plane `y = plane_y`.
    ///
    /// Returns `None` when the ray is parallel to the plane or the
    /// intersection lies behind the origin.
    pub fn intersect_horizontal_plane(&self, plane_y: Real) -> Option<Vec3> {
        if self.direction.y.abs() < PARALLEL_EPS {
            return None;
        }
        let t = (plane_y - self.origin.y) / self.direction.y;
        if t < 0.0 {
            return None;
        }
        Some(self.point_at(t))
    }
}

/// Clamp `offset` to a sphere of `radius` around the origin, preserving
/// direction. Offsets already inside the sphere pass through unchanged.
pub fn clamp_to_radius(offset: Vec3, radius: Real) -> Vec3 {
    debug_assert!(radius >= 0.0);
    let norm = offset.norm();
    if norm > radius && norm > 0.0 {
        offset * (radius / norm)
    } else {
        offset
    }
}

/// Angle between two directions in degrees, in [0, 180].
///
/// Degenerate (near-zero) inputs yield 0 rather than NaN.
pub fn angle_between_deg(a: Vec3, b: Vec3) -> Real {
    let denom = a.norm() * b.norm();
    if denom < PARALLEL_EPS {
        return 0.0;
    }
    let cos = (a.dot(&b) / denom).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}
