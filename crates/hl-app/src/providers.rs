//! Scenario-backed implementations of the core collaborator traits.
//!
//! In an AR host these are the physics raycaster and the tracking system;
//! in scripted replay they are synthesized from scenario data.

use hl_core::{PartId, Pose, Ray, Real, Vec3};
use hl_coupling::PoseProvider;
use hl_input::PartPicker;

/// Pose provider over a fixed set of reference parts.
#[derive(Debug, Clone, Default)]
pub struct StaticPoses {
    parts: Vec<(PartId, Pose)>,
}

impl StaticPoses {
    pub fn new(parts: Vec<(PartId, Pose)>) -> Self {
        Self { parts }
    }

    pub fn insert(&mut self, part: PartId, pose: Pose) {
        if let Some(entry) = self.parts.iter_mut().find(|(p, _)| *p == part) {
            entry.1 = pose;
        } else {
            self.parts.push((part, pose));
        }
    }
}

impl PoseProvider for StaticPoses {
    fn pose(&self, part: PartId) -> Option<Pose> {
        self.parts.iter().find(|(p, _)| *p == part).map(|(_, pose)| *pose)
    }
}

/// Sphere-proximity picker: a ray hits the part whose center it passes
/// closest to, if within the pick radius. A stand-in for the host's
/// collider raycast, built fresh per pick from live part centers.
#[derive(Debug, Clone)]
pub struct ProximityPicker {
    parts: Vec<(PartId, Vec3)>,
    radius: Real,
}

impl ProximityPicker {
    pub fn new(parts: Vec<(PartId, Vec3)>, radius: Real) -> Self {
        Self { parts, radius }
    }
}

impl PartPicker for ProximityPicker {
    fn pick(&self, ray: &Ray) -> Option<PartId> {
        self.parts
            .iter()
            .map(|(part, center)| (*part, ray.distance_to_point(*center)))
            .filter(|(_, d)| *d <= self.radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(part, _)| part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hl_core::Id;

    #[test]
    fn static_poses_lookup_and_update() {
        let a = Id::from_index(0);
        let b = Id::from_index(1);
        let mut poses = StaticPoses::new(vec![(a, Pose::identity())]);
        assert!(poses.pose(a).is_some());
        assert!(poses.pose(b).is_none());

        poses.insert(a, Pose::at(Vec3::x()));
        assert_eq!(poses.pose(a).unwrap().position, Vec3::x());
    }

    #[test]
    fn picker_returns_nearest_within_radius() {
        let near = Id::from_index(0);
        let far = Id::from_index(1);
        let picker = ProximityPicker::new(
            vec![
                (near, Vec3::new(0.01, 0.0, 0.0)),
                (far, Vec3::new(0.05, 0.0, 0.0)),
            ],
            0.1,
        );
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), -Vec3::y()).unwrap();
        assert_eq!(picker.pick(&ray), Some(near));
    }

    #[test]
    fn picker_misses_outside_radius() {
        let part = Id::from_index(0);
        let picker = ProximityPicker::new(vec![(part, Vec3::new(5.0, 0.0, 0.0))], 0.1);
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), -Vec3::y()).unwrap();
        assert_eq!(picker.pick(&ray), None);
    }
}
