// Per-frame smoothing shared by the dot field (size, pan/zoom) and the halftone (config).
// Visual: values glide toward their targets instead of snapping.

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// One exponential-smoothing step: move `current` a fraction `k` of the way to `target`.
#[inline]
pub fn approach(current: &mut f32, target: f32, k: f32) {
    *current += (target - *current) * k;
}

/// Frames needed for a fixed target to be reached within `tolerance` (relative to the
/// starting gap) when smoothing with factor `k` in (0, 1).
pub fn frames_to_settle(k: f32, tolerance: f32) -> u32 {
    debug_assert!(k > 0.0 && k < 1.0);
    (tolerance.ln() / (1.0 - k).ln()).ceil() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_endpoints() {
        assert_eq!(lerp(2.0, 6.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 6.0, 1.0), 6.0);
        assert_eq!(lerp(2.0, 6.0, 0.25), 3.0);
    }

    #[test]
    fn converges_within_predicted_frames() {
        for &k in &[0.05_f32, 0.15, 0.2, 0.3, 0.5, 0.9] {
            let (start, target) = (1.5_f32, 5.25_f32);
            let mut size = start;
            for _ in 0..frames_to_settle(k, 0.01) {
                approach(&mut size, target, k);
            }
            // 1% of the starting gap, plus a hair for f32 rounding
            let gap = (target - size).abs();
            assert!(gap <= 0.01 * (target - start).abs() + 1e-4, "k={k}: gap {gap}");
        }
    }

    #[test]
    fn never_overshoots() {
        let mut v = 0.0;
        for _ in 0..200 {
            approach(&mut v, 10.0, 0.3);
            assert!(v <= 10.0);
        }
    }
}
