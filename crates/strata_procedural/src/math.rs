//! Interpolation helpers shared by the kernels.

/// Quintic fade curve `6t^5 - 15t^4 + 10t^3`.
#[inline]
#[must_use]
pub fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Linear interpolation from `a` (t = 0) to `b` (t = 1).
#[inline]
#[must_use]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

/// Clamps into `[0, 1]`.
#[inline]
#[must_use]
pub fn clamp01(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_endpoints() {
        assert_eq!(fade(0.0), 0.0);
        assert_eq!(fade(1.0), 1.0);
        assert!((fade(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_fade_is_monotonic() {
        let mut previous = fade(0.0);
        for i in 1..=100 {
            let current = fade(i as f32 / 100.0);
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(2.0, 4.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 4.0, 0.5), 3.0);
        assert_eq!(lerp(2.0, 4.0, 1.0), 4.0);
        assert_eq!(clamp01(-3.0), 0.0);
        assert_eq!(clamp01(1.5), 1.0);
    }
}
