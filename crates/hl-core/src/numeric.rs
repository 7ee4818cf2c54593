use crate::HlError;

/// Floating point type used throughout the interaction core
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, HlError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(HlError::NonFinite { what, value: v })
    }
}

/// Linear interpolation, unclamped: `a + (b - a) * t`.
pub fn lerp(a: Real, b: Real, t: Real) -> Real {
    a + (b - a) * t
}

/// Clamp to the unit interval.
pub fn clamp01(v: Real) -> Real {
    v.clamp(0.0, 1.0)
}

/// Frame-rate-independent smoothing factor for an exponential approach
/// toward a target: `new = lerp(current, target, smoothing_factor(rate, dt))`.
///
/// Converges to the target as `rate * dt` grows; `rate <= 0` means no motion.
pub fn smoothing_factor(rate: Real, dt: Real) -> Real {
    if rate <= 0.0 || dt <= 0.0 {
        return 0.0;
    }
    1.0 - (-rate * dt).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn lerp_endpoints() {
        assert_eq!(lerp(2.0, 6.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 6.0, 1.0), 6.0);
        assert_eq!(lerp(2.0, 6.0, 0.5), 4.0);
    }

    #[test]
    fn smoothing_factor_bounds() {
        assert_eq!(smoothing_factor(0.0, 0.016), 0.0);
        assert_eq!(smoothing_factor(-1.0, 0.016), 0.0);
        let f = smoothing_factor(10.0, 0.016);
        assert!(f > 0.0 && f < 1.0);
        // Large rate*dt converges to 1
        assert!(smoothing_factor(1000.0, 1.0) > 0.999);
    }

    #[test]
    fn smoothing_factor_monotonic_in_dt() {
        let a = smoothing_factor(10.0, 0.01);
        let b = smoothing_factor(10.0, 0.02);
        assert!(b > a);
    }
}
