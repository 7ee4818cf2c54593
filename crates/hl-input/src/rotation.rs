//! Rotation session for the locking handle.
//!
//! The handle is a single continuous scalar: an angle accumulated from
//! horizontal pointer deltas, clamped to `[0, max_angle]`. A one-way latch
//! realizes the lock/unlock hysteresis: `Locked` fires once when the angle
//! reaches the top, and clears (firing `Unlocked` once) only when the angle
//! returns to (near) zero — jitter near either boundary cannot refire
//! events. The handle can only be pushed forward from rest, but once
//! engaged it can be wound back down freely.

use serde::{Deserialize, Serialize};
use tracing::debug;

use hl_core::{PartId, Ray, Real};

use crate::error::{InputError, InputResult};
use crate::picker::{PartPicker, StartOutcome};

/// Rotation tuning parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RotationConfig {
    /// Degrees per (screen-unit * second) of pointer motion.
    pub speed: Real,
    /// Full-lock angle (degrees).
    pub max_angle: Real,
    /// The latch sets once the angle is within this of `max_angle` (degrees).
    pub lock_epsilon: Real,
    /// The latch clears once the angle is within this of zero (degrees).
    pub unlock_epsilon: Real,
}

impl RotationConfig {
    /// Create a rotation configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `speed` or `max_angle` are not positive, if an
    /// epsilon is negative, or if `lock_epsilon` swallows the whole range.
    pub fn new(
        speed: Real,
        max_angle: Real,
        lock_epsilon: Real,
        unlock_epsilon: Real,
    ) -> InputResult<Self> {
        if speed <= 0.0 {
            return Err(InputError::InvalidArg {
                what: "rotation speed must be positive",
            });
        }
        if max_angle <= 0.0 {
            return Err(InputError::InvalidArg {
                what: "max_angle must be positive",
            });
        }
        if lock_epsilon < 0.0 || unlock_epsilon < 0.0 {
            return Err(InputError::InvalidArg {
                what: "epsilons must be non-negative",
            });
        }
        if lock_epsilon >= max_angle {
            return Err(InputError::InvalidArg {
                what: "lock_epsilon must be smaller than max_angle",
            });
        }
        Ok(Self {
            speed,
            max_angle,
            lock_epsilon,
            unlock_epsilon,
        })
    }
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            speed: 100.0,
            max_angle: 90.0,
            lock_epsilon: 1.0,
            unlock_epsilon: 0.01,
        }
    }
}

/// Events reported by a rotation session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RotationEvent {
    /// A rotation gesture began on the handle.
    Started,
    /// The angle changed; carries `angle / max_angle` in [0, 1].
    Progress { normalized: Real },
    /// The latch set: the handle reached full rotation. Fires once per
    /// latch cycle.
    Locked,
    /// The latch cleared: the handle returned to rest. Fires once per
    /// latch cycle.
    Unlocked,
    /// The rotation gesture ended.
    Stopped,
}

/// Angle-accumulating session for a single rotating part.
#[derive(Clone, Debug)]
pub struct RotationSession {
    config: RotationConfig,
    part: PartId,
    angle: Real,
    last_screen_x: Real,
    enabled: bool,
    active: bool,
    latched: bool,
}

impl RotationSession {
    pub fn new(part: PartId, config: RotationConfig) -> Self {
        Self {
            config,
            part,
            angle: 0.0,
            last_screen_x: 0.0,
            enabled: false,
            active: false,
            latched: false,
        }
    }

    pub fn part(&self) -> PartId {
        self.part
    }

    /// Current angle in degrees, always within `[0, max_angle]`.
    pub fn angle(&self) -> Real {
        self.angle
    }

    /// Current progress `angle / max_angle` in [0, 1].
    pub fn normalized(&self) -> Real {
        self.angle / self.config.max_angle
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the fully-rotated latch is currently set.
    pub fn is_latched(&self) -> bool {
        self.latched
    }

    /// While latched the handle stays interactable regardless of the
    /// enabled flag, so an unwind back to rest is always possible.
    fn interactable(&self) -> bool {
        self.enabled || self.latched
    }

    /// Try to begin a rotation gesture from a pointer-began sample.
    pub fn start(&mut self, ray: &Ray, screen_x: Real, picker: &dyn PartPicker) -> StartOutcome {
        if !self.interactable() {
            return StartOutcome::Disabled;
        }
        if self.active {
            return StartOutcome::Started;
        }
        match picker.pick(ray) {
            Some(part) if part == self.part => {
                self.active = true;
                self.last_screen_x = screen_x;
                debug!(part = %self.part, "rotation started");
                StartOutcome::Started
            }
            Some(other) => {
                debug!(hit = %other, "rotation pick hit another part");
                StartOutcome::Missed
            }
            None => {
                debug!("rotation pick missed everything");
                StartOutcome::Missed
            }
        }
    }

    /// Accumulate pointer motion into the angle for one tick.
    ///
    /// Emits `Progress` for every applied change, plus `Locked`/`Unlocked`
    /// on latch transitions. Returns an empty vec while inactive.
    pub fn update(&mut self, screen_x: Real, dt: Real) -> Vec<RotationEvent> {
        let mut events = Vec::new();
        if !self.active {
            return events;
        }

        let delta_deg = (screen_x - self.last_screen_x) * self.config.speed * dt;
        self.last_screen_x = screen_x;

        // Forward-only from rest: negative motion is ignored until the
        // handle is engaged, then it unwinds freely.
        if delta_deg > 0.0 || self.angle > 0.0 {
            self.angle = (self.angle + delta_deg).clamp(0.0, self.config.max_angle);
            events.push(RotationEvent::Progress {
                normalized: self.normalized(),
            });
        }

        if !self.latched && self.angle >= self.config.max_angle - self.config.lock_epsilon {
            self.latched = true;
            self.angle = self.config.max_angle;
            events.push(RotationEvent::Progress { normalized: 1.0 });
            events.push(RotationEvent::Locked);
            debug!(part = %self.part, "handle fully rotated");
        } else if self.latched && self.angle <= self.config.unlock_epsilon {
            self.latched = false;
            self.angle = 0.0;
            events.push(RotationEvent::Progress { normalized: 0.0 });
            events.push(RotationEvent::Unlocked);
            debug!(part = %self.part, "handle fully returned");
        }

        events
    }

    /// End the gesture. Latch state survives gesture boundaries.
    pub fn end(&mut self) -> Option<RotationEvent> {
        if !self.active {
            return None;
        }
        self.active = false;
        debug!(part = %self.part, "rotation stopped");
        Some(RotationEvent::Stopped)
    }

    /// Enable or disable rotation. Disabling mid-gesture still emits the
    /// normal `Stopped` lifecycle.
    pub fn set_enabled(&mut self, enabled: bool) -> Option<RotationEvent> {
        let stopped = if !enabled { self.end() } else { None };
        self.enabled = enabled;
        stopped
    }
}
