//! The coupling lifecycle state machine.
//!
//! Orchestrates the two-phase connect/lock sequence:
//!
//! ```text
//! Idle --drag moved--> Aligning --released aligned--> Connected
//!   ^                     |                               |
//!   |                released not aligned            latch fires
//!   |                     v                               v
//!   +----reset pose----- Idle        Locked --latch clears--+--> Idle
//! ```
//!
//! The machine consumes session events and issues commands back to the
//! sessions (enable/disable, set pose); it never mutates pose or angle
//! directly. Missing optional collaborators degrade to logic-only
//! operation with a warning, never an abort.

use tracing::{info, warn};

use hl_core::{PartId, Pose, Real};
use hl_input::{DragEvent, DragSession, RotationEvent, RotationSession};

use crate::alignment::{AlignmentTolerance, evaluate_alignment};
use crate::error::{CouplingError, CouplingResult};
use crate::events::CouplingEvent;
use crate::linkage::MechanicalLinkage;

/// Pose collaborator for static reference parts (male connector).
///
/// Read-only; resolved by the host every query so tracked/placed parts can
/// move between ticks.
pub trait PoseProvider {
    fn pose(&self, part: PartId) -> Option<Pose>;
}

/// Lifecycle state of one coupling assembly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CouplingState {
    /// Waiting for a drag; female half at (or heading back to) rest.
    Idle,
    /// A drag is in progress; alignment evaluated every frame.
    Aligning,
    /// Halves mated and snapped; handle armed.
    Connected,
    /// Handle fully rotated; coupling complete.
    Locked,
}

/// Numeric configuration of the state machine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CouplingConfig {
    pub tolerance: AlignmentTolerance,
    /// Fixed displacement applied along -forward when committing a
    /// connection, to avoid visible surface interpenetration (meters).
    pub edge_snap_offset_m: Real,
}

impl CouplingConfig {
    /// Create a coupling configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge-snap offset is negative.
    pub fn new(tolerance: AlignmentTolerance, edge_snap_offset_m: Real) -> CouplingResult<Self> {
        if edge_snap_offset_m < 0.0 {
            return Err(CouplingError::InvalidArg {
                what: "edge snap offset must be non-negative",
            });
        }
        Ok(Self {
            tolerance,
            edge_snap_offset_m,
        })
    }
}

impl Default for CouplingConfig {
    fn default() -> Self {
        Self {
            tolerance: AlignmentTolerance::default(),
            edge_snap_offset_m: 0.05,
        }
    }
}

/// Single source of truth for one coupling assembly's lifecycle.
#[derive(Debug)]
pub struct CouplingStateMachine {
    config: CouplingConfig,
    linkage: MechanicalLinkage,
    /// Reference part the female half aligns against.
    male_part: PartId,
    state: CouplingState,
    /// Verdict of the most recent alignment evaluation (edge detection).
    was_aligned: bool,
    /// A missing pose provider is warned about once, not per frame.
    warned_missing_pose: bool,
}

impl CouplingStateMachine {
    pub fn new(config: CouplingConfig, linkage: MechanicalLinkage, male_part: PartId) -> Self {
        Self {
            config,
            linkage,
            male_part,
            state: CouplingState::Idle,
            was_aligned: false,
            warned_missing_pose: false,
        }
    }

    pub fn state(&self) -> CouplingState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, CouplingState::Connected | CouplingState::Locked)
    }

    pub fn linkage(&self) -> &MechanicalLinkage {
        &self.linkage
    }

    /// Begin the interaction: enable dragging of the female half.
    pub fn begin(&mut self, drag: &mut DragSession) -> Vec<CouplingEvent> {
        drag.set_enabled(true);
        info!("coupling interaction started");
        vec![CouplingEvent::DragEnabled { enabled: true }]
    }

    /// React to a drag session event.
    pub fn on_drag_event(
        &mut self,
        event: DragEvent,
        drag: &mut DragSession,
        rotation: &mut RotationSession,
        poses: Option<&dyn PoseProvider>,
    ) -> Vec<CouplingEvent> {
        match event {
            DragEvent::Moved { .. } => self.on_drag_moved(drag, poses),
            DragEvent::Released => self.on_drag_released(drag, rotation, poses),
        }
    }

    /// React to a rotation session event.
    pub fn on_rotation_event(
        &mut self,
        event: RotationEvent,
        drag: &mut DragSession,
        rotation: &mut RotationSession,
    ) -> Vec<CouplingEvent> {
        match event {
            RotationEvent::Progress { normalized } => self.on_rotation_progress(normalized),
            RotationEvent::Locked => self.on_handle_locked(),
            RotationEvent::Unlocked => self.unlock(drag, rotation),
            // Gesture boundaries carry no lifecycle meaning here; the
            // latch state lives in the session.
            RotationEvent::Started | RotationEvent::Stopped => Vec::new(),
        }
    }

    fn on_drag_moved(
        &mut self,
        drag: &DragSession,
        poses: Option<&dyn PoseProvider>,
    ) -> Vec<CouplingEvent> {
        if self.is_connected() {
            return Vec::new();
        }
        self.state = CouplingState::Aligning;

        let Some(male) = self.male_pose(poses) else {
            // Degraded: no reference pose, alignment stays false.
            return Vec::new();
        };

        let result = evaluate_alignment(&drag.pose(), &male, &self.config.tolerance);
        let mut events = vec![CouplingEvent::AlignmentSampled {
            aligned: result.aligned,
            distance_m: result.distance_m,
            angle_deg: result.angle_deg,
        }];
        if result.aligned != self.was_aligned {
            events.push(CouplingEvent::AlignedChanged {
                aligned: result.aligned,
                distance_m: result.distance_m,
                angle_deg: result.angle_deg,
            });
        }
        self.was_aligned = result.aligned;
        events
    }

    fn on_drag_released(
        &mut self,
        drag: &mut DragSession,
        rotation: &mut RotationSession,
        poses: Option<&dyn PoseProvider>,
    ) -> Vec<CouplingEvent> {
        if self.is_connected() {
            return Vec::new();
        }

        if self.was_aligned {
            if let Some(male) = self.male_pose(poses) {
                return self.connect(&male, drag, rotation);
            }
            // Provider vanished between evaluation and release; fall
            // through to the reset path.
        }

        // Recovery path: put the part back exactly where it started.
        drag.set_pose(drag.initial_pose());
        self.state = CouplingState::Idle;
        self.was_aligned = false;
        info!("release out of tolerance, part reset");
        vec![CouplingEvent::ConnectFailed]
    }

    fn connect(
        &mut self,
        male: &Pose,
        drag: &mut DragSession,
        rotation: &mut RotationSession,
    ) -> Vec<CouplingEvent> {
        // Snap to the exact mating pose regardless of residual drag error:
        // male pose backed off along its forward axis by the edge offset.
        let snapped = Pose::new(
            male.position - male.forward() * self.config.edge_snap_offset_m,
            male.orientation,
        );
        drag.set_pose(snapped);
        drag.set_enabled(false);
        rotation.set_enabled(true);

        self.state = CouplingState::Connected;
        self.was_aligned = false;
        info!("halves connected, handle armed");

        vec![
            CouplingEvent::Connected,
            CouplingEvent::DragEnabled { enabled: false },
            CouplingEvent::RotationEnabled { enabled: true },
        ]
    }

    fn on_rotation_progress(&mut self, normalized: Real) -> Vec<CouplingEvent> {
        if !self.is_connected() {
            return Vec::new();
        }
        let pose = self.linkage.apply(normalized);
        vec![
            CouplingEvent::Progress { normalized },
            CouplingEvent::LinkageMoved { pose },
        ]
    }

    fn on_handle_locked(&mut self) -> Vec<CouplingEvent> {
        if self.state != CouplingState::Connected {
            return Vec::new();
        }
        self.state = CouplingState::Locked;
        info!("coupling locked");
        vec![CouplingEvent::Locked]
    }

    /// Unlock transition: reset the mechanism, re-enable dragging, return
    /// to Idle. Safe to invoke twice; the second call is a no-op.
    pub fn unlock(
        &mut self,
        drag: &mut DragSession,
        rotation: &mut RotationSession,
    ) -> Vec<CouplingEvent> {
        if self.state != CouplingState::Locked {
            return Vec::new();
        }

        rotation.set_enabled(false);
        drag.set_enabled(true);
        self.state = CouplingState::Idle;
        self.was_aligned = false;
        info!("coupling unlocked, dragging re-enabled");

        vec![
            CouplingEvent::Unlocked,
            CouplingEvent::LinkageMoved {
                pose: self.linkage.rest(),
            },
            CouplingEvent::DragEnabled { enabled: true },
            CouplingEvent::RotationEnabled { enabled: false },
        ]
    }

    fn male_pose(&mut self, poses: Option<&dyn PoseProvider>) -> Option<Pose> {
        let pose = poses.and_then(|p| p.pose(self.male_part));
        if pose.is_none() && !self.warned_missing_pose {
            warn!(part = %self.male_part, "no pose for reference part; alignment degraded");
            self.warned_missing_pose = true;
        }
        pose
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CouplingEvent as Ev;
    use hl_core::{Id, Ray, Vec3};
    use hl_input::{DragConfig, PartPicker, RotationConfig};

    const FEMALE: u32 = 0;
    const MALE: u32 = 1;
    const HANDLE: u32 = 2;

    struct FixedPoses {
        male: Pose,
    }
    impl PoseProvider for FixedPoses {
        fn pose(&self, part: PartId) -> Option<Pose> {
            (part == Id::from_index(MALE)).then_some(self.male)
        }
    }

    struct PickFemale;
    impl PartPicker for PickFemale {
        fn pick(&self, _ray: &Ray) -> Option<PartId> {
            Some(Id::from_index(FEMALE))
        }
    }

    fn rig() -> (
        CouplingStateMachine,
        DragSession,
        RotationSession,
        FixedPoses,
    ) {
        let machine = CouplingStateMachine::new(
            CouplingConfig::default(),
            MechanicalLinkage::default(),
            Id::from_index(MALE),
        );
        let drag = DragSession::new(
            Id::from_index(FEMALE),
            Pose::at(Vec3::new(-0.5, 0.0, 0.0)),
            DragConfig::default(),
        );
        let rotation = RotationSession::new(Id::from_index(HANDLE), RotationConfig::default());
        let poses = FixedPoses {
            male: Pose::at(Vec3::zeros()),
        };
        (machine, drag, rotation, poses)
    }

    fn down_ray_at(x: f64, z: f64) -> Ray {
        Ray::new(Vec3::new(x, 1.0, z), -Vec3::y()).unwrap()
    }

    /// Drive the drag session until it converges on the pointer target.
    fn drag_to(drag: &mut DragSession, x: f64, z: f64) -> DragEvent {
        let ray = down_ray_at(x, z);
        let mut last = None;
        for _ in 0..2000 {
            last = drag.update(&ray, 0.016);
        }
        last.expect("drag should move")
    }

    /// Drive a full aligned drag-and-release; returns all machine events.
    fn connect_rig(
        machine: &mut CouplingStateMachine,
        drag: &mut DragSession,
        rotation: &mut RotationSession,
        poses: &FixedPoses,
    ) -> Vec<Ev> {
        machine.begin(drag);
        drag.start(&down_ray_at(-0.5, 0.0), &PickFemale);
        let moved = drag_to(drag, 0.0, 0.0);
        let mut events = machine.on_drag_event(moved, drag, rotation, Some(poses));
        let released = drag.end().unwrap();
        events.extend(machine.on_drag_event(released, drag, rotation, Some(poses)));
        events
    }

    /// Drive the handle from rest to full lock; returns all machine events.
    fn lock_rig(
        machine: &mut CouplingStateMachine,
        drag: &mut DragSession,
        rotation: &mut RotationSession,
    ) -> Vec<Ev> {
        let picker = PickHandle;
        assert!(rotation.start(&down_ray_at(0.0, 0.0), 0.0, &picker).started());
        let mut events = Vec::new();
        let mut x = 0.0;
        for _ in 0..95 {
            x += 0.1;
            for ev in rotation.update(x, 0.1) {
                events.extend(machine.on_rotation_event(ev, drag, rotation));
            }
        }
        events
    }

    struct PickHandle;
    impl PartPicker for PickHandle {
        fn pick(&self, _ray: &Ray) -> Option<PartId> {
            Some(Id::from_index(HANDLE))
        }
    }

    #[test]
    fn moved_while_idle_enters_aligning_and_samples() {
        let (mut machine, mut drag, mut rotation, poses) = rig();
        machine.begin(&mut drag);
        drag.start(&down_ray_at(-0.5, 0.0), &PickFemale);

        let moved = drag.update(&down_ray_at(-0.4, 0.0), 0.016).unwrap();
        let events = machine.on_drag_event(moved, &mut drag, &mut rotation, Some(&poses));

        assert_eq!(machine.state(), CouplingState::Aligning);
        assert!(matches!(events[0], Ev::AlignmentSampled { .. }));
    }

    #[test]
    fn aligned_changed_fires_on_edges_only() {
        let (mut machine, mut drag, mut rotation, poses) = rig();
        machine.begin(&mut drag);
        drag.start(&down_ray_at(-0.5, 0.0), &PickFemale);

        // Far away: no edge (still not aligned).
        let moved = drag.update(&down_ray_at(-0.4, 0.0), 0.016).unwrap();
        let events = machine.on_drag_event(moved, &mut drag, &mut rotation, Some(&poses));
        assert!(!events.iter().any(|e| matches!(e, Ev::AlignedChanged { .. })));

        // Converge onto the male: exactly one aligned edge across the
        // whole approach.
        let ray = down_ray_at(0.0, 0.0);
        let mut edges = 0;
        for _ in 0..2000 {
            if let Some(moved) = drag.update(&ray, 0.016) {
                let events = machine.on_drag_event(moved, &mut drag, &mut rotation, Some(&poses));
                edges += events
                    .iter()
                    .filter(|e| matches!(e, Ev::AlignedChanged { aligned: true, .. }))
                    .count();
            }
        }
        assert_eq!(edges, 1);
    }

    #[test]
    fn aligned_release_connects_and_snaps_with_edge_offset() {
        let (mut machine, mut drag, mut rotation, poses) = rig();
        let events = connect_rig(&mut machine, &mut drag, &mut rotation, &poses);

        assert_eq!(machine.state(), CouplingState::Connected);
        assert!(events.contains(&Ev::Connected));
        assert!(events.contains(&Ev::DragEnabled { enabled: false }));
        assert!(events.contains(&Ev::RotationEnabled { enabled: true }));

        // Snapped to male position minus forward * 0.05; male forward is +Z.
        let expected = Vec3::new(0.0, 0.0, -0.05);
        assert!((drag.pose().position - expected).norm() < 1e-9);
        assert_eq!(drag.pose().orientation, poses.male.orientation);
        assert!(!drag.is_enabled());
        assert!(rotation.is_enabled());
    }

    #[test]
    fn non_aligned_release_resets_to_initial_pose() {
        let (mut machine, mut drag, mut rotation, poses) = rig();
        machine.begin(&mut drag);
        drag.start(&down_ray_at(-0.5, 0.0), &PickFemale);

        // Stop 0.1 m short of the male: outside the 0.05 m tolerance.
        let moved = drag_to(&mut drag, -0.1, 0.0);
        machine.on_drag_event(moved, &mut drag, &mut rotation, Some(&poses));
        let released = drag.end().unwrap();
        let events = machine.on_drag_event(released, &mut drag, &mut rotation, Some(&poses));

        assert_eq!(machine.state(), CouplingState::Idle);
        assert!(events.contains(&Ev::ConnectFailed));
        assert_eq!(drag.pose(), drag.initial_pose());
        assert!(drag.is_enabled());
        assert!(!rotation.is_enabled());
    }

    #[test]
    fn tap_release_without_movement_is_a_clean_reset() {
        let (mut machine, mut drag, mut rotation, poses) = rig();
        machine.begin(&mut drag);
        drag.start(&down_ray_at(-0.5, 0.0), &PickFemale);

        let released = drag.end().unwrap();
        let events = machine.on_drag_event(released, &mut drag, &mut rotation, Some(&poses));
        assert_eq!(machine.state(), CouplingState::Idle);
        assert!(events.contains(&Ev::ConnectFailed));
    }

    #[test]
    fn rotation_drives_linkage_and_locks_once() {
        let (mut machine, mut drag, mut rotation, poses) = rig();
        connect_rig(&mut machine, &mut drag, &mut rotation, &poses);

        let events = lock_rig(&mut machine, &mut drag, &mut rotation);

        assert_eq!(machine.state(), CouplingState::Locked);
        let locked = events.iter().filter(|e| matches!(e, Ev::Locked)).count();
        assert_eq!(locked, 1);
        assert_eq!(rotation.angle(), 90.0);

        // Last linkage pose is the full stroke.
        let last_linkage = events
            .iter()
            .rev()
            .find_map(|e| match e {
                Ev::LinkageMoved { pose } => Some(*pose),
                _ => None,
            })
            .unwrap();
        assert_eq!(last_linkage, machine.linkage().apply(1.0));
    }

    #[test]
    fn unwind_unlocks_and_reenables_drag() {
        let (mut machine, mut drag, mut rotation, poses) = rig();
        connect_rig(&mut machine, &mut drag, &mut rotation, &poses);
        lock_rig(&mut machine, &mut drag, &mut rotation);

        // Wind all the way back down.
        let mut events = Vec::new();
        let mut x = 9.5;
        for _ in 0..100 {
            x -= 0.1;
            for ev in rotation.update(x, 0.1) {
                events.extend(machine.on_rotation_event(ev, &mut drag, &mut rotation));
            }
        }

        assert_eq!(machine.state(), CouplingState::Idle);
        let unlocked = events.iter().filter(|e| matches!(e, Ev::Unlocked)).count();
        assert_eq!(unlocked, 1);
        assert!(events.contains(&Ev::LinkageMoved {
            pose: machine.linkage().rest()
        }));
        assert!(drag.is_enabled());
        assert!(!rotation.is_enabled());
    }

    #[test]
    fn unlock_is_idempotent() {
        let (mut machine, mut drag, mut rotation, poses) = rig();
        connect_rig(&mut machine, &mut drag, &mut rotation, &poses);
        lock_rig(&mut machine, &mut drag, &mut rotation);

        let first = machine.unlock(&mut drag, &mut rotation);
        assert!(first.contains(&Ev::Unlocked));
        let state_after = machine.state();
        let drag_enabled = drag.is_enabled();

        let second = machine.unlock(&mut drag, &mut rotation);
        assert!(second.is_empty());
        assert_eq!(machine.state(), state_after);
        assert_eq!(drag.is_enabled(), drag_enabled);
    }

    #[test]
    fn missing_pose_provider_degrades_silently() {
        let (mut machine, mut drag, mut rotation, _poses) = rig();
        machine.begin(&mut drag);
        drag.start(&down_ray_at(-0.5, 0.0), &PickFemale);

        let moved = drag_to(&mut drag, 0.0, 0.0);
        let events = machine.on_drag_event(moved, &mut drag, &mut rotation, None);
        assert!(events.is_empty());

        // Release with no provider: reset path, machine keeps operating.
        let released = drag.end().unwrap();
        let events = machine.on_drag_event(released, &mut drag, &mut rotation, None);
        assert!(events.contains(&Ev::ConnectFailed));
        assert_eq!(machine.state(), CouplingState::Idle);
    }
}
