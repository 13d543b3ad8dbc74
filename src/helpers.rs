//! Shared numeric helpers for generated readings.
//!
//! Generated values are published in two precisions:
//!
//! - `round_whole`: integer readings (temperatures, humidity, wind, pressure)
//! - `round_1dp`: rainfall amounts, one decimal place
//!
//! Both treat non-finite inputs as zero.

use rand::Rng;

/// Round to the nearest whole unit.
pub(crate) fn round_whole(v: f64) -> i32 {
    if !v.is_finite() {
        tracing::warn!("round_whole received non-finite value {}, defaulting to 0", v);
        return 0;
    }
    v.round() as i32
}

/// Round to one decimal place.
pub(crate) fn round_1dp(v: f64) -> f64 {
    if !v.is_finite() {
        tracing::warn!("round_1dp received non-finite value {}, defaulting to 0", v);
        return 0.0;
    }
    (v * 10.0).round() / 10.0
}

/// Clamp a percentage to [0, 100].
pub(crate) fn clamp_pct(v: f64) -> f64 {
    if !v.is_finite() {
        return 0.0;
    }
    v.clamp(0.0, 100.0)
}

/// Uniform draw from `[offset, offset + scale)`.
pub(crate) fn uniform<R: Rng + ?Sized>(rng: &mut R, offset: f64, scale: f64) -> f64 {
    offset + rng.random::<f64>() * scale
}

/// Symmetric jitter in `[-amplitude / 2, amplitude / 2)`.
pub(crate) fn jitter<R: Rng + ?Sized>(rng: &mut R, amplitude: f64) -> f64 {
    (rng.random::<f64>() - 0.5) * amplitude
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_round_whole() {
        assert_eq!(round_whole(27.4), 27);
        assert_eq!(round_whole(27.5), 28);
        assert_eq!(round_whole(-3.6), -4);
    }

    #[test]
    fn test_round_whole_non_finite() {
        assert_eq!(round_whole(f64::NAN), 0);
        assert_eq!(round_whole(f64::INFINITY), 0);
    }

    #[test]
    fn test_round_1dp() {
        assert!((round_1dp(3.14) - 3.1).abs() < 1e-10);
        assert!((round_1dp(3.16) - 3.2).abs() < 1e-10);
        assert_eq!(round_1dp(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_clamp_pct() {
        assert_eq!(clamp_pct(104.2), 100.0);
        assert_eq!(clamp_pct(-1.0), 0.0);
        assert_eq!(clamp_pct(55.5), 55.5);
        assert_eq!(clamp_pct(f64::NAN), 0.0);
    }

    #[test]
    fn test_uniform_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let v = uniform(&mut rng, 1000.0, 50.0);
            assert!((1000.0..1050.0).contains(&v), "out of range: {}", v);
        }
    }

    #[test]
    fn test_jitter_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1000 {
            let v = jitter(&mut rng, 8.0);
            assert!((-4.0..4.0).contains(&v), "out of range: {}", v);
        }
    }
}
