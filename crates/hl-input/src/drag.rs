//! Drag session for the draggable (female) connector half.
//!
//! A drag is a single-shot gesture: the pointer ray must first pick the
//! part, then successive `update` calls pull the part toward the ray's
//! intersection with a horizontal plane fixed at the part's initial height.
//! The displacement from the gesture anchor is clamped to a sphere of
//! `max_displacement`, and motion toward the target is smoothed with a
//! frame-rate-independent exponential approach so the part never snaps.

use serde::{Deserialize, Serialize};
use tracing::debug;

use hl_core::{PartId, Pose, Ray, Real, Vec3, clamp_to_radius, lerp, smoothing_factor};

use crate::error::{InputError, InputResult};
use crate::picker::{PartPicker, StartOutcome};

/// Drag tuning parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DragConfig {
    /// Smoothing rate toward the drag target (1/second).
    pub speed: Real,
    /// Maximum displacement from the gesture anchor (meters).
    pub max_displacement: Real,
}

impl DragConfig {
    /// Create a drag configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `speed` or `max_displacement` are not positive.
    pub fn new(speed: Real, max_displacement: Real) -> InputResult<Self> {
        if speed <= 0.0 {
            return Err(InputError::InvalidArg {
                what: "drag speed must be positive",
            });
        }
        if max_displacement <= 0.0 {
            return Err(InputError::InvalidArg {
                what: "max_displacement must be positive",
            });
        }
        Ok(Self {
            speed,
            max_displacement,
        })
    }
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            speed: 10.0,
            max_displacement: 1.0,
        }
    }
}

/// Events reported by a drag session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragEvent {
    /// The part moved this tick; carries the updated position.
    Moved { position: Vec3 },
    /// The gesture ended. Fires exactly once per gesture, including
    /// tap-release with no movement and forced disable mid-drag.
    Released,
}

/// Pointer-follow session for a single draggable part.
///
/// Owns the part's pose exclusively. The coupling state machine reads the
/// pose and issues commands (`set_pose`, `set_enabled`); it never mutates
/// the pose directly.
#[derive(Clone, Debug)]
pub struct DragSession {
    config: DragConfig,
    part: PartId,
    initial_pose: Pose,
    pose: Pose,
    /// Height of the drag plane, fixed at the part's initial height.
    plane_y: Real,
    /// Gesture anchor, recorded when a drag starts.
    anchor: Vec3,
    enabled: bool,
    active: bool,
}

impl DragSession {
    pub fn new(part: PartId, initial_pose: Pose, config: DragConfig) -> Self {
        Self {
            config,
            part,
            initial_pose,
            pose: initial_pose,
            plane_y: initial_pose.position.y,
            anchor: initial_pose.position,
            enabled: false,
            active: false,
        }
    }

    pub fn part(&self) -> PartId {
        self.part
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn initial_pose(&self) -> Pose {
        self.initial_pose
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Command from the owning state machine: place the part (snap on
    /// connect, reset on failed release).
    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    /// Try to begin a drag gesture from a pointer-began sample.
    ///
    /// Picks via the host collaborator; only a hit on this session's part
    /// activates the gesture. A miss is a non-fatal diagnostic.
    pub fn start(&mut self, ray: &Ray, picker: &dyn PartPicker) -> StartOutcome {
        if !self.enabled {
            return StartOutcome::Disabled;
        }
        if self.active {
            // Duplicate Began without an Ended; treat as still dragging.
            return StartOutcome::Started;
        }
        match picker.pick(ray) {
            Some(part) if part == self.part => {
                self.active = true;
                self.anchor = self.pose.position;
                debug!(part = %self.part, "drag started");
                StartOutcome::Started
            }
            Some(other) => {
                debug!(hit = %other, "drag pick hit another part");
                StartOutcome::Missed
            }
            None => {
                debug!("drag pick missed everything");
                StartOutcome::Missed
            }
        }
    }

    /// Advance the drag toward the pointer ray for one tick.
    ///
    /// Returns `Moved` when the part position was updated; `None` when the
    /// session is inactive or the ray does not reach the drag plane.
    pub fn update(&mut self, ray: &Ray, dt: Real) -> Option<DragEvent> {
        if !self.active {
            return None;
        }
        let hit = ray.intersect_horizontal_plane(self.plane_y)?;

        // Constrain to the horizontal plane and clamp to the drag radius.
        let mut target = hit;
        target.y = self.plane_y;
        let offset = clamp_to_radius(target - self.anchor, self.config.max_displacement);
        let target = self.anchor + offset;

        let t = smoothing_factor(self.config.speed, dt);
        self.pose.position = Vec3::new(
            lerp(self.pose.position.x, target.x, t),
            lerp(self.pose.position.y, target.y, t),
            lerp(self.pose.position.z, target.z, t),
        );

        Some(DragEvent::Moved {
            position: self.pose.position,
        })
    }

    /// End the gesture. Returns `Released` exactly once per gesture.
    pub fn end(&mut self) -> Option<DragEvent> {
        if !self.active {
            return None;
        }
        self.active = false;
        debug!(part = %self.part, "drag ended");
        Some(DragEvent::Released)
    }

    /// Enable or disable dragging.
    ///
    /// Disabling mid-drag still runs the normal release lifecycle so the
    /// owning state machine never gets stuck waiting for a gesture end.
    pub fn set_enabled(&mut self, enabled: bool) -> Option<DragEvent> {
        let released = if !enabled { self.end() } else { None };
        self.enabled = enabled;
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hl_core::Id;

    struct HitSelf(PartId);
    impl PartPicker for HitSelf {
        fn pick(&self, _ray: &Ray) -> Option<PartId> {
            Some(self.0)
        }
    }

    struct MissAll;
    impl PartPicker for MissAll {
        fn pick(&self, _ray: &Ray) -> Option<PartId> {
            None
        }
    }

    fn down_ray_at(x: Real, z: Real) -> Ray {
        Ray::new(Vec3::new(x, 1.0, z), -Vec3::y()).unwrap()
    }

    fn session() -> DragSession {
        let part = Id::from_index(0);
        let mut s = DragSession::new(part, Pose::at(Vec3::zeros()), DragConfig::default());
        s.set_enabled(true);
        s
    }

    #[test]
    fn config_rejects_non_positive() {
        assert!(DragConfig::new(0.0, 1.0).is_err());
        assert!(DragConfig::new(10.0, -1.0).is_err());
        assert!(DragConfig::new(10.0, 1.0).is_ok());
    }

    #[test]
    fn start_requires_enabled_and_hit() {
        let part = Id::from_index(0);
        let mut s = DragSession::new(part, Pose::identity(), DragConfig::default());
        let ray = down_ray_at(0.0, 0.0);

        assert_eq!(s.start(&ray, &HitSelf(part)), StartOutcome::Disabled);

        s.set_enabled(true);
        assert_eq!(s.start(&ray, &MissAll), StartOutcome::Missed);
        assert!(!s.is_active());

        assert_eq!(s.start(&ray, &HitSelf(part)), StartOutcome::Started);
        assert!(s.is_active());
    }

    #[test]
    fn start_ignores_other_parts() {
        let mut s = session();
        let other = Id::from_index(7);
        let ray = down_ray_at(0.0, 0.0);
        assert_eq!(s.start(&ray, &HitSelf(other)), StartOutcome::Missed);
        assert!(!s.is_active());
    }

    #[test]
    fn update_moves_toward_target() {
        let mut s = session();
        let picker = HitSelf(s.part());
        s.start(&down_ray_at(0.0, 0.0), &picker);

        let event = s.update(&down_ray_at(0.2, 0.0), 0.016).unwrap();
        let DragEvent::Moved { position } = event else {
            panic!("expected Moved");
        };
        assert!(position.x > 0.0 && position.x < 0.2);
        assert_eq!(position.y, 0.0);
    }

    #[test]
    fn update_converges_and_clamps_to_max_displacement() {
        let mut s = session();
        let picker = HitSelf(s.part());
        s.start(&down_ray_at(0.0, 0.0), &picker);

        // Target far beyond the 1.0 m radius; drive to convergence.
        let far = down_ray_at(3.0, 4.0);
        for _ in 0..2000 {
            s.update(&far, 0.016);
        }
        let offset = s.pose().position;
        assert!((offset.norm() - 1.0).abs() < 1e-6);
        // Direction preserved: (3,0,4)/5
        assert!((offset.normalize() - Vec3::new(0.6, 0.0, 0.8)).norm() < 1e-6);
    }

    #[test]
    fn released_fires_exactly_once_even_without_update() {
        let mut s = session();
        let picker = HitSelf(s.part());
        s.start(&down_ray_at(0.0, 0.0), &picker);

        // Tap-release: no update in between.
        assert_eq!(s.end(), Some(DragEvent::Released));
        assert_eq!(s.end(), None);
    }

    #[test]
    fn disable_mid_drag_emits_release() {
        let mut s = session();
        let picker = HitSelf(s.part());
        s.start(&down_ray_at(0.0, 0.0), &picker);
        s.update(&down_ray_at(0.1, 0.0), 0.016);

        assert_eq!(s.set_enabled(false), Some(DragEvent::Released));
        assert!(!s.is_active());
        assert!(!s.is_enabled());
        // No further events once inert.
        assert_eq!(s.end(), None);
    }

    #[test]
    fn update_inactive_is_silent() {
        let mut s = session();
        assert_eq!(s.update(&down_ray_at(0.1, 0.0), 0.016), None);
    }

    #[test]
    fn ray_missing_drag_plane_moves_nothing() {
        let mut s = session();
        let picker = HitSelf(s.part());
        s.start(&down_ray_at(0.0, 0.0), &picker);

        // Parallel to the plane: no target, no event.
        let sideways = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::x()).unwrap();
        assert_eq!(s.update(&sideways, 0.016), None);
        assert_eq!(s.pose().position, Vec3::zeros());
    }
}
