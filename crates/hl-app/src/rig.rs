//! Assembly wiring: sessions + state machine + collaborators, driven by a
//! fixed-rate tick.

use hl_core::{PartId, Pose, Real};
use hl_coupling::{
    CouplingEvent, CouplingStateMachine, MechanicalLinkage, PresentationSink,
};
use hl_input::{
    DragConfig, DragSession, PointerPhase, PointerSample, RotationConfig, RotationSession,
};

use crate::error::AppResult;
use crate::providers::{ProximityPicker, StaticPoses};
use crate::scenario::Scenario;

/// Part id of the draggable female half.
pub fn female_part() -> PartId {
    PartId::from_index(0)
}

/// Part id of the fixed male half.
pub fn male_part() -> PartId {
    PartId::from_index(1)
}

/// Part id of the locking handle.
pub fn handle_part() -> PartId {
    PartId::from_index(2)
}

/// One coupling assembly wired together: the two sessions, the state
/// machine, and the scenario-backed collaborators.
///
/// `tick` runs the deterministic per-frame order: input → session update →
/// event dispatch → sink notification. The host (replay service, or a real
/// AR shell) calls it at a known cadence.
pub struct CouplingRig {
    drag: DragSession,
    rotation: RotationSession,
    machine: CouplingStateMachine,
    reference_poses: StaticPoses,
    pick_radius: Real,
    sink: Option<Box<dyn PresentationSink>>,
    time: Real,
}

impl CouplingRig {
    /// Build a rig from a scenario, re-validating all numeric tuning
    /// through the core constructors.
    pub fn from_scenario(scenario: &Scenario) -> AppResult<Self> {
        let cfg = &scenario.config;
        let drag_config = DragConfig::new(cfg.drag.speed, cfg.drag.max_displacement)?;
        let rotation_config = RotationConfig::new(
            cfg.rotation.speed,
            cfg.rotation.max_angle,
            cfg.rotation.lock_epsilon,
            cfg.rotation.unlock_epsilon,
        )?;
        let linkage = MechanicalLinkage::new(
            cfg.linkage.pin_max_travel_m,
            cfg.linkage.spring_max_scale,
            cfg.linkage.spring_min_scale,
            cfg.linkage.valve_push_m,
        )?;
        let coupling_config = cfg.coupling_config()?;

        let drag = DragSession::new(
            female_part(),
            scenario.parts.female.to_pose(),
            drag_config,
        );
        let rotation = RotationSession::new(handle_part(), rotation_config);
        let machine = CouplingStateMachine::new(coupling_config, linkage, male_part());
        let reference_poses = StaticPoses::new(vec![
            (male_part(), scenario.parts.male.to_pose()),
            (handle_part(), scenario.parts.handle.to_pose()),
        ]);

        Ok(Self {
            drag,
            rotation,
            machine,
            reference_poses,
            pick_radius: cfg.pick_radius_m,
            sink: None,
            time: 0.0,
        })
    }

    /// Attach a presentation sink. Absence is a valid configuration.
    pub fn with_sink(mut self, sink: Box<dyn PresentationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn state(&self) -> hl_coupling::CouplingState {
        self.machine.state()
    }

    pub fn drag(&self) -> &DragSession {
        &self.drag
    }

    pub fn rotation(&self) -> &RotationSession {
        &self.rotation
    }

    pub fn time(&self) -> Real {
        self.time
    }

    /// Begin the interaction (enables dragging), notifying the sink.
    pub fn start(&mut self) -> Vec<CouplingEvent> {
        let events = self.machine.begin(&mut self.drag);
        self.notify(&events);
        events
    }

    /// Advance one tick, feeding any pointer samples for this frame.
    ///
    /// Samples are processed in order; each Moved sample advances whichever
    /// session is active by this tick's `dt`.
    pub fn tick(&mut self, dt: Real, samples: &[PointerSample]) -> Vec<CouplingEvent> {
        let mut out = Vec::new();

        for sample in samples {
            match sample.phase {
                PointerPhase::Began => {
                    let picker = self.live_picker();
                    // Route by whichever session the ray actually lands
                    // on; the sessions reject picks of foreign parts.
                    if !self.drag.start(&sample.ray, &picker).started() {
                        self.rotation
                            .start(&sample.ray, sample.screen_x, &picker);
                    }
                }
                PointerPhase::Moved => {
                    if let Some(ev) = self.drag.update(&sample.ray, dt) {
                        out.extend(self.machine.on_drag_event(
                            ev,
                            &mut self.drag,
                            &mut self.rotation,
                            Some(&self.reference_poses),
                        ));
                    }
                    for ev in self.rotation.update(sample.screen_x, dt) {
                        out.extend(self.machine.on_rotation_event(
                            ev,
                            &mut self.drag,
                            &mut self.rotation,
                        ));
                    }
                }
                PointerPhase::Ended => {
                    if let Some(ev) = self.drag.end() {
                        out.extend(self.machine.on_drag_event(
                            ev,
                            &mut self.drag,
                            &mut self.rotation,
                            Some(&self.reference_poses),
                        ));
                    }
                    if let Some(ev) = self.rotation.end() {
                        out.extend(self.machine.on_rotation_event(
                            ev,
                            &mut self.drag,
                            &mut self.rotation,
                        ));
                    }
                }
            }
        }

        self.time += dt;
        self.notify(&out);
        out
    }

    /// Picker over live part centers (the female moves with its session).
    fn live_picker(&self) -> ProximityPicker {
        let mut parts = vec![(female_part(), self.drag.pose().position)];
        for id in [male_part(), handle_part()] {
            if let Some(pose) = hl_coupling::PoseProvider::pose(&self.reference_poses, id) {
                parts.push((id, pose.position));
            }
        }
        ProximityPicker::new(parts, self.pick_radius)
    }

    fn notify(&mut self, events: &[CouplingEvent]) {
        if let Some(sink) = self.sink.as_mut() {
            for event in events {
                sink.notify(event);
            }
        }
    }
}
