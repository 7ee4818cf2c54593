//! Secondary mechanical simulation: pin, spring, and valve driven by the
//! handle's normalized rotation.
//!
//! A pure deterministic map with no memory of its own; invoked once per
//! rotation progress event. Offsets and scales are local-space Z values the
//! presentation layer applies to the respective sub-parts.

use serde::{Deserialize, Serialize};

use hl_core::{Real, clamp01, lerp};

use crate::error::{CouplingError, CouplingResult};

/// Extents of the pin/spring/valve mechanism.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MechanicalLinkage {
    /// Full pin travel along -Z (meters).
    pub pin_max_travel_m: Real,
    /// Spring Z scale at rest (fully extended).
    pub spring_max_scale: Real,
    /// Spring Z scale at full compression.
    pub spring_min_scale: Real,
    /// Full valve push along -Z (meters).
    pub valve_push_m: Real,
}

impl MechanicalLinkage {
    /// Create a linkage from its extents.
    ///
    /// # Errors
    ///
    /// Returns an error if a travel is negative or the spring scales are
    /// not positive with `min < max`.
    pub fn new(
        pin_max_travel_m: Real,
        spring_max_scale: Real,
        spring_min_scale: Real,
        valve_push_m: Real,
    ) -> CouplingResult<Self> {
        if pin_max_travel_m < 0.0 {
            return Err(CouplingError::InvalidArg {
                what: "pin travel must be non-negative",
            });
        }
        if spring_min_scale <= 0.0 || spring_max_scale <= 0.0 {
            return Err(CouplingError::InvalidArg {
                what: "spring scales must be positive",
            });
        }
        if spring_min_scale >= spring_max_scale {
            return Err(CouplingError::InvalidArg {
                what: "spring min scale must be below max scale",
            });
        }
        if valve_push_m < 0.0 {
            return Err(CouplingError::InvalidArg {
                what: "valve push must be non-negative",
            });
        }
        Ok(Self {
            pin_max_travel_m,
            spring_max_scale,
            spring_min_scale,
            valve_push_m,
        })
    }

    /// Positions/scales of the mechanism at `normalized` rotation.
    ///
    /// Input is clamped to [0, 1]; every output is linear (and monotonic)
    /// in the input.
    pub fn apply(&self, normalized: Real) -> LinkagePose {
        let x = clamp01(normalized);
        LinkagePose {
            pin_offset_z: -self.pin_max_travel_m * x,
            pin_spin_deg: 360.0 * x,
            spring_scale_z: lerp(self.spring_max_scale, self.spring_min_scale, x),
            valve_offset_z: -self.valve_push_m * x,
        }
    }

    /// Rest values (handle at zero). Used when uncoupling.
    pub fn rest(&self) -> LinkagePose {
        self.apply(0.0)
    }
}

impl Default for MechanicalLinkage {
    fn default() -> Self {
        // Extents of the training asset's mechanism.
        Self {
            pin_max_travel_m: 0.05,
            spring_max_scale: 0.003948962,
            spring_min_scale: 0.001492708,
            valve_push_m: 0.02,
        }
    }
}

/// Local-space placement of the mechanism's moving parts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkagePose {
    /// Pin offset along local Z (meters, non-positive).
    pub pin_offset_z: Real,
    /// Pin spin about local Z (degrees, one full turn over the stroke).
    pub pin_spin_deg: Real,
    /// Spring local Z scale.
    pub spring_scale_z: Real,
    /// Valve offset along local Z (meters, non-positive).
    pub valve_offset_z: Real,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_rejects_bad_extents() {
        assert!(MechanicalLinkage::new(-0.01, 2.0, 1.0, 0.02).is_err());
        assert!(MechanicalLinkage::new(0.05, 1.0, 2.0, 0.02).is_err());
        assert!(MechanicalLinkage::new(0.05, 2.0, 0.0, 0.02).is_err());
        assert!(MechanicalLinkage::new(0.05, 2.0, 1.0, -0.1).is_err());
        assert!(MechanicalLinkage::new(0.05, 2.0, 1.0, 0.02).is_ok());
    }

    #[test]
    fn rest_and_full_stroke() {
        let linkage = MechanicalLinkage::default();

        let rest = linkage.apply(0.0);
        assert_eq!(rest.pin_offset_z, 0.0);
        assert_eq!(rest.pin_spin_deg, 0.0);
        assert_eq!(rest.spring_scale_z, linkage.spring_max_scale);
        assert_eq!(rest.valve_offset_z, 0.0);
        assert_eq!(rest, linkage.rest());

        let full = linkage.apply(1.0);
        assert_eq!(full.pin_offset_z, -linkage.pin_max_travel_m);
        assert_eq!(full.pin_spin_deg, 360.0);
        assert_eq!(full.spring_scale_z, linkage.spring_min_scale);
        assert_eq!(full.valve_offset_z, -linkage.valve_push_m);
    }

    #[test]
    fn input_is_clamped() {
        let linkage = MechanicalLinkage::default();
        assert_eq!(linkage.apply(-0.5), linkage.apply(0.0));
        assert_eq!(linkage.apply(1.5), linkage.apply(1.0));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn outputs_monotonic_in_input(a in 0.0_f64..1.0, b in 0.0_f64..1.0) {
            let linkage = MechanicalLinkage::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let at_lo = linkage.apply(lo);
            let at_hi = linkage.apply(hi);
            // Pin and valve move toward -Z, spring compresses, spin advances.
            prop_assert!(at_hi.pin_offset_z <= at_lo.pin_offset_z);
            prop_assert!(at_hi.pin_spin_deg >= at_lo.pin_spin_deg);
            prop_assert!(at_hi.spring_scale_z <= at_lo.spring_scale_z);
            prop_assert!(at_hi.valve_offset_z <= at_lo.valve_offset_z);
        }

        #[test]
        fn determinism(x in -1.0_f64..2.0) {
            let linkage = MechanicalLinkage::default();
            prop_assert_eq!(linkage.apply(x), linkage.apply(x));
        }
    }
}
