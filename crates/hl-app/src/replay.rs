//! Scripted playback: run a scenario's pointer timeline through a rig at a
//! fixed tick rate and record every lifecycle event.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use hl_core::Real;
use hl_coupling::CouplingEvent;
use hl_input::{PointerPhase, PointerSample};

use crate::error::{AppError, AppResult};
use crate::rig::CouplingRig;
use crate::scenario::{Scenario, validate_scenario};

/// Playback tuning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReplayOptions {
    /// Fixed tick length in seconds.
    pub dt: Real,
    /// Extra settling time after the last scripted sample, so smoothed
    /// motion in flight when the script ends still converges.
    pub settle_s: Real,
    /// Hard cap on tick count, guarding against degenerate timelines.
    pub max_ticks: usize,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            dt: 0.01,
            settle_s: 0.5,
            max_ticks: 1_000_000,
        }
    }
}

impl ReplayOptions {
    fn validate(&self) -> AppResult<()> {
        if !(self.dt > 0.0 && self.dt.is_finite()) {
            return Err(AppError::InvalidInput(format!(
                "replay dt must be positive and finite, got {}",
                self.dt
            )));
        }
        if !(self.settle_s >= 0.0 && self.settle_s.is_finite()) {
            return Err(AppError::InvalidInput(format!(
                "replay settle_s must be non-negative and finite, got {}",
                self.settle_s
            )));
        }
        Ok(())
    }
}

/// One recorded event with the tick time it fired at.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub t: Real,
    #[serde(flatten)]
    pub event: CouplingEvent,
}

/// Everything a replay produced, serializable for inspection or diffing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub scenario: String,
    pub started_at: String,
    pub dt: Real,
    pub final_state: String,
    pub entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn to_yaml(&self) -> AppResult<String> {
        serde_yaml::to_string(self).map_err(Into::into)
    }

    pub fn to_json(&self) -> AppResult<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }

    /// Count of entries matching a predicate (handy in assertions and
    /// summaries).
    pub fn count(&self, pred: impl Fn(&CouplingEvent) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.event)).count()
    }
}

/// Play a scenario to completion and return the transcript.
///
/// The timeline's samples are delivered on the first tick at or past their
/// scripted time. While a pointer is held (between `began` and `ended`) a
/// tick with no scripted sample repeats the last ray and screen position as
/// a synthetic `moved` sample, so smoothed drag motion converges without
/// the script spelling out every frame. A repeated sample has zero
/// horizontal delta and therefore never advances handle rotation; rotation
/// progress comes only from scripted samples.
pub fn replay(scenario: &Scenario, options: ReplayOptions) -> AppResult<Transcript> {
    validate_scenario(scenario)?;
    options.validate()?;

    let mut rig = CouplingRig::from_scenario(scenario)?;
    let mut entries = Vec::new();
    let started_at = chrono::Utc::now().to_rfc3339();

    for event in rig.start() {
        entries.push(TranscriptEntry { t: 0.0, event });
    }

    let end_time = scenario
        .timeline
        .last()
        .map_or(0.0, |s| s.t)
        + options.settle_s;

    let mut next = 0;
    let mut held: Option<PointerSample> = None;
    let mut ticks = 0usize;

    while rig.time() < end_time {
        if ticks >= options.max_ticks {
            return Err(AppError::InvalidInput(format!(
                "replay exceeded {} ticks before reaching t={end_time}",
                options.max_ticks
            )));
        }
        ticks += 1;

        let mut due: Vec<PointerSample> = Vec::new();
        while next < scenario.timeline.len() && scenario.timeline[next].t <= rig.time() {
            let sample = scenario.timeline[next].to_sample()?;
            match sample.phase {
                PointerPhase::Began | PointerPhase::Moved => {
                    held = Some(PointerSample::new(
                        PointerPhase::Moved,
                        sample.ray,
                        sample.screen_x,
                    ));
                }
                PointerPhase::Ended => held = None,
            }
            due.push(sample);
            next += 1;
        }
        if due.is_empty() {
            if let Some(repeat) = held {
                due.push(repeat);
            }
        }

        let t = rig.time();
        for event in rig.tick(options.dt, &due) {
            debug!(t, ?event, "replay event");
            entries.push(TranscriptEntry { t, event });
        }
    }

    let final_state = format!("{:?}", rig.state());
    info!(
        scenario = %scenario.name,
        ticks,
        events = entries.len(),
        %final_state,
        "replay finished"
    );

    Ok(Transcript {
        scenario: scenario.name.clone(),
        started_at,
        dt: options.dt,
        final_state,
        entries,
    })
}
