//! Scenario schema: scripted coupling exercises as YAML files.
//!
//! A scenario fixes the assembly's part poses, the interaction tuning, and
//! a pointer timeline (what the trainee's finger does, expressed as pick
//! rays and screen-x coordinates). Loading and validation are separate so
//! the CLI can lint files without running them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use hl_core::{Pose, Ray, Real, Vec3};
use hl_coupling::{AlignmentTolerance, CouplingConfig, MechanicalLinkage};
use hl_input::{DragConfig, PointerPhase, PointerSample, RotationConfig};

use crate::error::{AppError, AppResult};

/// Current scenario file version.
pub const SCENARIO_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub version: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parts: PartsDef,
    #[serde(default)]
    pub config: ConfigDef,
    #[serde(default)]
    pub timeline: Vec<TimelineSample>,
}

/// Initial placement of the three interactable parts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartsDef {
    pub female: PoseDef,
    pub male: PoseDef,
    pub handle: PoseDef,
}

/// Serializable pose: position plus intrinsic roll/pitch/yaw in degrees.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PoseDef {
    pub position: [Real; 3],
    #[serde(default)]
    pub euler_deg: [Real; 3],
}

impl PoseDef {
    pub fn to_pose(&self) -> Pose {
        let [x, y, z] = self.position;
        let [roll, pitch, yaw] = self.euler_deg;
        Pose::from_euler_deg(Vec3::new(x, y, z), roll, pitch, yaw)
    }
}

/// Interaction tuning; every field has the training asset's defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigDef {
    #[serde(default)]
    pub drag: DragConfig,
    #[serde(default)]
    pub rotation: RotationConfig,
    #[serde(default)]
    pub tolerance: AlignmentTolerance,
    #[serde(default = "default_edge_snap")]
    pub edge_snap_offset_m: Real,
    #[serde(default)]
    pub linkage: MechanicalLinkage,
    #[serde(default = "default_pick_radius")]
    pub pick_radius_m: Real,
}

fn default_edge_snap() -> Real {
    0.05
}

fn default_pick_radius() -> Real {
    0.1
}

impl Default for ConfigDef {
    fn default() -> Self {
        Self {
            drag: DragConfig::default(),
            rotation: RotationConfig::default(),
            tolerance: AlignmentTolerance::default(),
            edge_snap_offset_m: default_edge_snap(),
            linkage: MechanicalLinkage::default(),
            pick_radius_m: default_pick_radius(),
        }
    }
}

impl ConfigDef {
    pub fn coupling_config(&self) -> AppResult<CouplingConfig> {
        CouplingConfig::new(self.tolerance, self.edge_snap_offset_m).map_err(Into::into)
    }
}

/// One scripted pointer sample.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineSample {
    /// Scenario time in seconds.
    pub t: Real,
    pub phase: PhaseDef,
    pub ray: RayDef,
    /// Horizontal screen coordinate driving handle rotation.
    #[serde(default)]
    pub screen_x: Real,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PhaseDef {
    Began,
    Moved,
    Ended,
}

impl From<PhaseDef> for PointerPhase {
    fn from(phase: PhaseDef) -> Self {
        match phase {
            PhaseDef::Began => PointerPhase::Began,
            PhaseDef::Moved => PointerPhase::Moved,
            PhaseDef::Ended => PointerPhase::Ended,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RayDef {
    pub origin: [Real; 3],
    pub direction: [Real; 3],
}

impl TimelineSample {
    pub fn to_sample(&self) -> AppResult<PointerSample> {
        let [ox, oy, oz] = self.ray.origin;
        let [dx, dy, dz] = self.ray.direction;
        let ray = Ray::new(Vec3::new(ox, oy, oz), Vec3::new(dx, dy, dz))?;
        Ok(PointerSample::new(self.phase.into(), ray, self.screen_x))
    }
}

/// Load a scenario from a YAML file.
pub fn load_scenario(path: &Path) -> AppResult<Scenario> {
    let text = std::fs::read_to_string(path).map_err(|source| AppError::ScenarioFileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let scenario: Scenario = serde_yaml::from_str(&text)?;
    Ok(scenario)
}

/// Validate a scenario: version, finite poses, constructible configs, and
/// a monotonically non-decreasing timeline with well-formed rays.
pub fn validate_scenario(scenario: &Scenario) -> AppResult<()> {
    if scenario.version != SCENARIO_VERSION {
        return Err(AppError::Validation(format!(
            "unsupported scenario version {} (expected {})",
            scenario.version, SCENARIO_VERSION
        )));
    }
    if scenario.name.trim().is_empty() {
        return Err(AppError::Validation("scenario name is empty".into()));
    }

    for (label, pose) in [
        ("female", &scenario.parts.female),
        ("male", &scenario.parts.male),
        ("handle", &scenario.parts.handle),
    ] {
        let finite = pose.position.iter().chain(pose.euler_deg.iter());
        if finite.clone().any(|v| !v.is_finite()) {
            return Err(AppError::Validation(format!(
                "part '{label}' has a non-finite pose"
            )));
        }
    }

    let cfg = &scenario.config;
    DragConfig::new(cfg.drag.speed, cfg.drag.max_displacement)
        .map_err(|e| AppError::Validation(format!("drag config: {e}")))?;
    RotationConfig::new(
        cfg.rotation.speed,
        cfg.rotation.max_angle,
        cfg.rotation.lock_epsilon,
        cfg.rotation.unlock_epsilon,
    )
    .map_err(|e| AppError::Validation(format!("rotation config: {e}")))?;
    AlignmentTolerance::new(cfg.tolerance.position_m, cfg.tolerance.rotation_deg)
        .map_err(|e| AppError::Validation(format!("tolerance: {e}")))?;
    MechanicalLinkage::new(
        cfg.linkage.pin_max_travel_m,
        cfg.linkage.spring_max_scale,
        cfg.linkage.spring_min_scale,
        cfg.linkage.valve_push_m,
    )
    .map_err(|e| AppError::Validation(format!("linkage: {e}")))?;
    cfg.coupling_config()
        .map_err(|e| AppError::Validation(format!("coupling config: {e}")))?;
    if cfg.pick_radius_m <= 0.0 {
        return Err(AppError::Validation("pick radius must be positive".into()));
    }

    let mut last_t = 0.0;
    for (i, sample) in scenario.timeline.iter().enumerate() {
        if !sample.t.is_finite() || sample.t < 0.0 {
            return Err(AppError::Validation(format!(
                "timeline[{i}]: time must be finite and non-negative"
            )));
        }
        if sample.t < last_t {
            return Err(AppError::Validation(format!(
                "timeline[{i}]: times must be non-decreasing"
            )));
        }
        last_t = sample.t;
        sample
            .to_sample()
            .map_err(|e| AppError::Validation(format!("timeline[{i}]: {e}")))?;
    }

    Ok(())
}
