//! Inverse mapping from surface pixels back to source image pixels.
//!
//! Rendering walks the destination (surface) pixels and asks where each one
//! came from in the source. For a placement with center `C`, scale `s` and
//! clockwise rotation `θ`, a source offset `q` from the image center lands at
//! `C + R(θ)·(s·q)`. The inverse is:
//!
//! ```text
//! d     = p - C
//! q.x   = ( d.x * cos θ + d.y * sin θ) / s
//! q.y   = (-d.x * sin θ + d.y * cos θ) / s
//! src   = q + image_center
//! ```

use super::Placement;

/// Half-extents of the axis-aligned box around a rotated `width` x `height`
/// rectangle, in the same units as the inputs.
///
/// Used to bound the pixels the renderer has to visit.
pub fn rotated_extent(width: f64, height: f64, angle_degrees: f64) -> (f64, f64) {
    let angle_rad = angle_degrees.to_radians();
    let cos = angle_rad.cos().abs();
    let sin = angle_rad.sin().abs();

    // new_w = |w*cos| + |h*sin|, new_h = |w*sin| + |h*cos|
    (
        (width * cos + height * sin) / 2.0,
        (width * sin + height * cos) / 2.0,
    )
}

/// Precomputed inverse transform for one placement of one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InverseMap {
    center_x: f64,
    center_y: f64,
    cos: f64,
    sin: f64,
    /// Source pixels per surface unit, per axis.
    inv_kx: f64,
    inv_ky: f64,
    half_w: f64,
    half_h: f64,
}

impl InverseMap {
    /// Build the map for an image stored at `stored` size whose natural
    /// (pre-downscale) size is `natural`.
    ///
    /// Placement scale is relative to the natural size, so a source that was
    /// capped on load still appears at the size the user expects.
    pub fn new(placement: &Placement, natural: (u32, u32), stored: (u32, u32)) -> Self {
        let angle_rad = placement.rotation().to_radians();
        let scale = placement.scale();

        // Surface units per stored pixel
        let kx = scale * natural.0.max(1) as f64 / stored.0.max(1) as f64;
        let ky = scale * natural.1.max(1) as f64 / stored.1.max(1) as f64;

        Self {
            center_x: placement.center_x(),
            center_y: placement.center_y(),
            cos: angle_rad.cos(),
            sin: angle_rad.sin(),
            inv_kx: 1.0 / kx,
            inv_ky: 1.0 / ky,
            half_w: stored.0 as f64 / 2.0,
            half_h: stored.1 as f64 / 2.0,
        }
    }

    /// Map a surface point to continuous source coordinates.
    ///
    /// Source pixel `i` covers `[i, i + 1)`, so its center is at `i + 0.5`.
    #[inline]
    pub fn source_point(&self, x: f64, y: f64) -> (f64, f64) {
        let dx = x - self.center_x;
        let dy = y - self.center_y;

        let qx = (dx * self.cos + dy * self.sin) * self.inv_kx;
        let qy = (-dx * self.sin + dy * self.cos) * self.inv_ky;

        (qx + self.half_w, qy + self.half_h)
    }

    /// Surface-space bounding box `(x0, y0, x1, y1)` of the placed image,
    /// clipped to a `width` x `height` surface. Half-open on the max side.
    pub fn surface_bounds(&self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let (ex, ey) = rotated_extent(
            2.0 * self.half_w / self.inv_kx,
            2.0 * self.half_h / self.inv_ky,
            self.sin.atan2(self.cos).to_degrees(),
        );

        // One pixel of slack for interpolation at the edges
        let clip = |v: f64, max: u32| v.clamp(0.0, max as f64) as u32;
        (
            clip((self.center_x - ex).floor() - 1.0, width),
            clip((self.center_y - ey).floor() - 1.0, height),
            clip((self.center_x + ex).ceil() + 1.0, width),
            clip((self.center_y + ey).ceil() + 1.0, height),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::DEFAULT_SCALE;

    fn approx(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
    }

    #[test]
    fn test_rotated_extent_basics() {
        let (hx, hy) = rotated_extent(100.0, 50.0, 0.0);
        assert!(approx((hx, hy), (50.0, 25.0)));

        let (hx, hy) = rotated_extent(100.0, 50.0, 90.0);
        assert!(approx((hx, hy), (25.0, 50.0)));

        // Diagonal of a 100x100 square is ~141.4
        let (hx, hy) = rotated_extent(100.0, 100.0, 45.0);
        assert!((hx * 2.0 - 141.42).abs() < 0.01);
        assert!((hy * 2.0 - 141.42).abs() < 0.01);
    }

    #[test]
    fn test_rotated_extent_symmetry() {
        let a = rotated_extent(100.0, 80.0, 30.0);
        let b = rotated_extent(100.0, 80.0, -30.0);
        let c = rotated_extent(100.0, 80.0, 150.0);
        assert!(approx(a, b));
        assert!(approx(a, c));
    }

    #[test]
    fn test_center_maps_to_image_center() {
        let placement = Placement::centered_in(400, 400, DEFAULT_SCALE)
            .with_scale(2.0)
            .with_rotation(45.0);
        let map = InverseMap::new(&placement, (100, 60), (100, 60));
        assert!(approx(map.source_point(200.0, 200.0), (50.0, 30.0)));
    }

    #[test]
    fn test_scale_only() {
        let placement = Placement::centered_in(400, 400, 2.0);
        let map = InverseMap::new(&placement, (100, 100), (100, 100));

        // 20 surface units right of center = 10 source pixels at 2x
        assert!(approx(map.source_point(220.0, 200.0), (60.0, 50.0)));
    }

    #[test]
    fn test_clockwise_rotation() {
        let placement = Placement::centered_in(400, 400, 1.0).with_rotation(90.0);
        let map = InverseMap::new(&placement, (100, 100), (100, 100));

        // Rotating 90 degrees clockwise moves the source's right edge to the
        // bottom, so the point below center samples to the right of center.
        assert!(approx(map.source_point(200.0, 210.0), (60.0, 50.0)));
    }

    #[test]
    fn test_translation() {
        let placement = Placement::centered_in(400, 400, 1.0).translated(-50.0, 25.0);
        let map = InverseMap::new(&placement, (10, 10), (10, 10));
        assert!(approx(map.source_point(150.0, 225.0), (5.0, 5.0)));
    }

    #[test]
    fn test_downscaled_source_keeps_natural_size() {
        let placement = Placement::centered_in(400, 400, 1.0);
        // Natural 4000 wide, stored at 2000: one surface unit is half a stored pixel
        let map = InverseMap::new(&placement, (4000, 4000), (2000, 2000));
        assert!(approx(map.source_point(210.0, 200.0), (1005.0, 1000.0)));
    }

    #[test]
    fn test_surface_bounds_clip_to_surface() {
        let placement = Placement::centered_in(400, 400, 3.0);
        let map = InverseMap::new(&placement, (1000, 1000), (1000, 1000));
        assert_eq!(map.surface_bounds(400, 400), (0, 0, 400, 400));
    }

    #[test]
    fn test_surface_bounds_cover_small_image() {
        let placement = Placement::centered_in(400, 400, 1.0);
        let map = InverseMap::new(&placement, (20, 10), (20, 10));
        let (x0, y0, x1, y1) = map.surface_bounds(400, 400);

        assert!(x0 <= 190 && x1 >= 210);
        assert!(y0 <= 195 && y1 >= 205);
        assert!(x1 - x0 < 30);
    }

    #[test]
    fn test_surface_bounds_offscreen_image_is_empty() {
        let placement = Placement::centered_in(400, 400, 1.0).translated(1000.0, 0.0);
        let map = InverseMap::new(&placement, (20, 20), (20, 20));
        let (x0, _, x1, _) = map.surface_bounds(400, 400);
        assert_eq!(x0, x1);
    }
}
