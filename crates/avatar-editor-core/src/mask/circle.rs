//! Circular clip mask.
//!
//! The mask is defined in pixel coordinates of the buffer it is applied to.
//! Coverage is 1.0 inside the circle, 0.0 outside, with a linear ramp one
//! `edge_width` wide straddling the boundary so the clipped edge is
//! anti-aliased instead of stair-stepped.

/// Circle in pixel coordinates with an anti-aliased edge.
///
/// # Example
/// ```
/// use avatar_editor_core::mask::CircleMask;
///
/// let mask = CircleMask::inscribed(256);
/// assert_eq!(mask.coverage(128.0, 128.0), 1.0);
/// assert_eq!(mask.coverage(0.5, 0.5), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleMask {
    /// Center X in pixels
    pub center_x: f64,
    /// Center Y in pixels
    pub center_y: f64,
    /// Radius in pixels
    pub radius: f64,
    /// Width of the soft edge in pixels (0.0 = hard edge)
    pub edge_width: f64,
}

impl CircleMask {
    /// Create a circle mask. Negative radius or edge width are treated as zero.
    pub fn new(center_x: f64, center_y: f64, radius: f64, edge_width: f64) -> Self {
        Self {
            center_x,
            center_y,
            radius: radius.max(0.0),
            edge_width: edge_width.max(0.0),
        }
    }

    /// The largest circle that fits a `size` x `size` buffer, with a
    /// one-pixel anti-aliased edge.
    pub fn inscribed(size: u32) -> Self {
        let half = size as f64 / 2.0;
        Self::new(half, half, half, 1.0)
    }

    /// Fraction of the point `(x, y)` that lies inside the circle.
    pub fn coverage(&self, x: f64, y: f64) -> f64 {
        let dx = x - self.center_x;
        let dy = y - self.center_y;
        let dist = (dx * dx + dy * dy).sqrt();

        if self.edge_width <= 0.0 {
            return if dist <= self.radius { 1.0 } else { 0.0 };
        }

        ((self.radius - dist) / self.edge_width + 0.5).clamp(0.0, 1.0)
    }

    /// Multiply the alpha channel of an RGBA buffer by the mask coverage,
    /// sampled at each pixel center. Fully clipped pixels become
    /// transparent black.
    pub fn apply(&self, pixels: &mut [u8], width: u32, height: u32) {
        let channels = crate::decode::CHANNELS;
        debug_assert_eq!(pixels.len(), width as usize * height as usize * channels);

        for (i, px) in pixels.chunks_exact_mut(channels).enumerate() {
            let x = (i % width as usize) as f64 + 0.5;
            let y = (i / width as usize) as f64 + 0.5;
            let coverage = self.coverage(x, y);

            if coverage >= 1.0 {
                continue;
            }
            if coverage <= 0.0 {
                px.copy_from_slice(&[0, 0, 0, 0]);
                continue;
            }
            px[3] = (px[3] as f64 * coverage).round() as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inscribed_center_and_corners() {
        let mask = CircleMask::inscribed(256);

        assert_eq!(mask.coverage(128.0, 128.0), 1.0);
        assert_eq!(mask.coverage(0.5, 0.5), 0.0);
        assert_eq!(mask.coverage(255.5, 0.5), 0.0);
        assert_eq!(mask.coverage(0.5, 255.5), 0.0);
        assert_eq!(mask.coverage(255.5, 255.5), 0.0);
    }

    #[test]
    fn test_edge_is_half_covered() {
        let mask = CircleMask::new(0.0, 0.0, 10.0, 1.0);
        assert!((mask.coverage(10.0, 0.0) - 0.5).abs() < 1e-12);
        assert_eq!(mask.coverage(9.0, 0.0), 1.0);
        assert_eq!(mask.coverage(11.0, 0.0), 0.0);
    }

    #[test]
    fn test_hard_edge() {
        let mask = CircleMask::new(5.0, 5.0, 2.0, 0.0);
        assert_eq!(mask.coverage(7.0, 5.0), 1.0);
        assert_eq!(mask.coverage(7.01, 5.0), 0.0);
    }

    #[test]
    fn test_negative_inputs_clamped() {
        let mask = CircleMask::new(0.0, 0.0, -5.0, -1.0);
        assert_eq!(mask.radius, 0.0);
        assert_eq!(mask.edge_width, 0.0);
        assert_eq!(mask.coverage(1.0, 1.0), 0.0);
    }

    #[test]
    fn test_coverage_monotonic_along_radius() {
        let mask = CircleMask::inscribed(64);
        let mut prev = 1.0;
        for i in 0..=64 {
            let c = mask.coverage(32.0 + i as f64 * 0.5, 32.0);
            assert!(c <= prev, "coverage should not increase moving outward");
            prev = c;
        }
    }

    #[test]
    fn test_apply_clears_outside_and_keeps_inside() {
        let size = 16;
        let mut pixels = [200u8, 100, 50, 255].repeat((size * size) as usize);
        CircleMask::inscribed(size).apply(&mut pixels, size, size);

        let at = |x: u32, y: u32| {
            let i = ((y * size + x) * 4) as usize;
            [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
        };
        assert_eq!(at(0, 0), [0, 0, 0, 0]);
        assert_eq!(at(15, 15), [0, 0, 0, 0]);
        assert_eq!(at(8, 8), [200, 100, 50, 255]);

        // Edge pixel keeps its color with partial alpha
        let edge = at(0, 8);
        assert_eq!(&edge[..3], &[200, 100, 50]);
        assert!(edge[3] > 0 && edge[3] < 255, "edge alpha {}", edge[3]);
    }

    #[test]
    fn test_apply_is_idempotent_inside_and_outside() {
        let size = 32;
        let mut once = [10u8, 20, 30, 255].repeat((size * size) as usize);
        CircleMask::inscribed(size).apply(&mut once, size, size);

        let mut twice = once.clone();
        CircleMask::inscribed(size).apply(&mut twice, size, size);

        for (a, b) in once.chunks_exact(4).zip(twice.chunks_exact(4)) {
            if a[3] == 0 || a[3] == 255 {
                assert_eq!(a, b);
            }
        }
    }
}
