//! Easing and interpolation helpers
//!
//! Pure functions shared by every integrator in the simulation.

use rand::Rng;

use crate::consts::MAX_FRAME_DELTA;

/// Linear interpolation from `a` to `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Clamp `x` into `[lo, hi]` (NaN maps to `lo`)
#[inline]
pub fn clamp(x: f32, lo: f32, hi: f32) -> f32 {
    if x.is_nan() {
        return lo;
    }
    x.max(lo).min(hi)
}

/// Cubic ease-out: fast start, slow finish. Input is clamped to [0, 1].
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = clamp(t, 0.0, 1.0);
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}

/// Exponentially approach `target` at `rate` per second
#[inline]
pub fn damp(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    lerp(current, target, damp_factor(rate, dt))
}

/// Blend factor for an exponential approach over `dt`
#[inline]
pub fn damp_factor(rate: f32, dt: f32) -> f32 {
    1.0 - (-rate * dt).exp()
}

/// Make a host frame delta safe to integrate with.
///
/// Non-finite and negative deltas become zero; large steps from frame
/// hitches or tab backgrounding are capped at `max_delta`.
#[inline]
pub fn sanitize_delta(delta: f32, max_delta: f32) -> f32 {
    if !delta.is_finite() || delta <= 0.0 {
        return 0.0;
    }
    delta.min(max_delta)
}

/// `sanitize_delta` with the default cap
#[inline]
pub fn frame_delta(delta: f32) -> f32 {
    sanitize_delta(delta, MAX_FRAME_DELTA)
}

/// Uniform sample in `[lo, hi)`; tolerates `lo == hi`
#[inline]
pub fn random_between<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    lo + (hi - lo) * rng.random::<f32>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_out_cubic_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert_eq!(ease_out_cubic(-2.0), 0.0);
        assert_eq!(ease_out_cubic(3.0), 1.0);
        // Fast start: more than half the distance covered by the midpoint
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-6);
    }

    #[test]
    fn test_clamp_handles_nan() {
        assert_eq!(clamp(f32::NAN, 0.0, 1.0), 0.0);
        assert_eq!(clamp(2.0, 0.0, 1.0), 1.0);
        assert_eq!(clamp(-1.0, 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_sanitize_delta() {
        assert_eq!(sanitize_delta(f32::NAN, 0.05), 0.0);
        assert_eq!(sanitize_delta(f32::INFINITY, 0.05), 0.0);
        assert_eq!(sanitize_delta(-0.01, 0.05), 0.0);
        assert_eq!(sanitize_delta(0.5, 0.05), 0.05);
        assert_eq!(sanitize_delta(0.016, 0.05), 0.016);
    }

    #[test]
    fn test_damp_converges() {
        let mut v = 0.0;
        for _ in 0..600 {
            v = damp(v, 0.6, 2.0, 1.0 / 60.0);
        }
        assert!((v - 0.6).abs() < 1e-3);
        // Zero dt leaves the value untouched
        assert_eq!(damp(0.3, 1.0, 5.0, 0.0), 0.3);
    }

    #[test]
    fn test_random_between_degenerate_range() {
        use rand::SeedableRng;
        let mut rng = rand_pcg::Pcg32::seed_from_u64(7);
        assert_eq!(random_between(&mut rng, 2.0, 2.0), 2.0);
        for _ in 0..100 {
            let v = random_between(&mut rng, -1.0, 1.0);
            assert!((-1.0..1.0).contains(&v));
        }
    }
}
