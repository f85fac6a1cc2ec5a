//! The working surface and its stateless renderer.
//!
//! A [`WorkingSurface`] is a plain value: dimensions, a background fill and
//! at most one [`PlacedImage`]. Updates return new values; [`render`] turns
//! the current value into pixels without touching it.
//!
//! # Composition Order
//!
//! 1. Background fill
//! 2. Placed image (scaled, rotated, center-anchored), source-over
//!
//! The circular guide shown by the UI is never part of the raster; the
//! circle only appears at export time.

use std::sync::Arc;

use crate::config::Color;
use crate::decode::{DecodedImage, FilterType, CHANNELS};
use crate::transform::{sample, InverseMap, Placement, Premultiplied};

/// A decoded image together with where it sits on the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedImage {
    image: Arc<DecodedImage>,
    natural_width: u32,
    natural_height: u32,
    placement: Placement,
}

impl PlacedImage {
    /// Wrap an image whose stored size equals its natural size.
    pub fn new(image: DecodedImage, placement: Placement) -> Self {
        let (w, h) = (image.width, image.height);
        Self::with_natural_size(image, (w, h), placement)
    }

    /// Wrap an image that was downscaled on load; `natural` is the size
    /// before downscaling, which is what placement scale refers to.
    pub fn with_natural_size(
        image: DecodedImage,
        natural: (u32, u32),
        placement: Placement,
    ) -> Self {
        Self {
            image: Arc::new(image),
            natural_width: natural.0,
            natural_height: natural.1,
            placement,
        }
    }

    pub fn image(&self) -> &DecodedImage {
        &self.image
    }

    pub fn natural_size(&self) -> (u32, u32) {
        (self.natural_width, self.natural_height)
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Same image, new placement.
    pub fn with_placement(&self, placement: Placement) -> Self {
        Self {
            image: Arc::clone(&self.image),
            placement,
            ..*self
        }
    }
}

/// Fixed-size virtual canvas the avatar is composed on.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkingSurface {
    width: u32,
    height: u32,
    background: Color,
    image: Option<PlacedImage>,
}

impl WorkingSurface {
    /// Empty surface.
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        Self {
            width,
            height,
            background,
            image: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn image(&self) -> Option<&PlacedImage> {
        self.image.as_ref()
    }

    /// Surface holding `image`, replacing whatever was there.
    pub fn with_image(self, image: PlacedImage) -> Self {
        Self {
            image: Some(image),
            ..self
        }
    }

    /// Surface with no image.
    pub fn cleared(self) -> Self {
        Self { image: None, ..self }
    }

    /// Apply `f` to the placement of the current image, if any.
    pub fn map_placement(self, f: impl FnOnce(Placement) -> Placement) -> Self {
        let image = self
            .image
            .as_ref()
            .map(|placed| placed.with_placement(f(placed.placement)));
        Self { image, ..self }
    }
}

/// Render the surface to an RGBA buffer of `surface.width() x surface.height()`.
pub fn render(surface: &WorkingSurface, filter: FilterType) -> DecodedImage {
    let bg = surface.background.to_array();
    let mut output = DecodedImage::filled(surface.width, surface.height, bg);

    let Some(placed) = &surface.image else {
        return output;
    };
    if placed.image.is_empty() {
        return output;
    }

    let map = InverseMap::new(
        &placed.placement,
        placed.natural_size(),
        (placed.image.width, placed.image.height),
    );
    let (x0, y0, x1, y1) = map.surface_bounds(surface.width, surface.height);
    let bg_premultiplied = premultiply(bg);
    let stride = surface.width as usize;

    for y in y0..y1 {
        for x in x0..x1 {
            // Sample at the destination pixel center
            let (sx, sy) = map.source_point(x as f64 + 0.5, y as f64 + 0.5);
            let Some(src) = sample(&placed.image, sx, sy, filter) else {
                continue;
            };

            let idx = (y as usize * stride + x as usize) * CHANNELS;
            let out = unpremultiply(source_over(src, bg_premultiplied));
            output.pixels[idx..idx + CHANNELS].copy_from_slice(&out);
        }
    }

    output
}

fn premultiply(rgba: [u8; 4]) -> Premultiplied {
    let k = rgba[3] as f64 / 255.0;
    [
        rgba[0] as f64 * k,
        rgba[1] as f64 * k,
        rgba[2] as f64 * k,
        rgba[3] as f64,
    ]
}

#[inline]
fn source_over(src: Premultiplied, dst: Premultiplied) -> Premultiplied {
    let k = 1.0 - src[3] / 255.0;
    [
        src[0] + dst[0] * k,
        src[1] + dst[1] * k,
        src[2] + dst[2] * k,
        src[3] + dst[3] * k,
    ]
}

#[inline]
fn unpremultiply(px: Premultiplied) -> [u8; 4] {
    let a = px[3].clamp(0.0, 255.0);
    if a <= 0.0 {
        return [0, 0, 0, 0];
    }
    let k = 255.0 / a;
    [
        (px[0] * k).clamp(0.0, 255.0).round() as u8,
        (px[1] * k).clamp(0.0, 255.0).round() as u8,
        (px[2] * k).clamp(0.0, 255.0).round() as u8,
        a.round() as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::DEFAULT_SCALE;

    const BG: Color = Color::rgb(0xf8, 0xf9, 0xfa);

    /// 100x100 image: red 40x40 block in the middle, blue elsewhere.
    fn bullseye() -> DecodedImage {
        let mut pixels = Vec::with_capacity(100 * 100 * CHANNELS);
        for y in 0..100 {
            for x in 0..100 {
                if (30..70).contains(&x) && (30..70).contains(&y) {
                    pixels.extend_from_slice(&[255, 0, 0, 255]);
                } else {
                    pixels.extend_from_slice(&[0, 0, 255, 255]);
                }
            }
        }
        DecodedImage::new(100, 100, pixels)
    }

    fn surface_with(image: DecodedImage, placement: Placement) -> WorkingSurface {
        WorkingSurface::new(400, 400, BG).with_image(PlacedImage::new(image, placement))
    }

    #[test]
    fn test_empty_surface_is_background() {
        let out = render(&WorkingSurface::new(40, 30, BG), FilterType::Bilinear);
        assert_eq!((out.width, out.height), (40, 30));
        assert!(out.pixels.chunks_exact(4).all(|px| px == [0xf8, 0xf9, 0xfa, 255]));
    }

    #[test]
    fn test_default_placement_footprint() {
        // 100x100 at scale 0.5 covers 175..225 on both axes
        let surface = surface_with(bullseye(), Placement::centered_in(400, 400, DEFAULT_SCALE));
        let out = render(&surface, FilterType::Nearest);

        assert_eq!(out.pixel(200, 200), Some([255, 0, 0, 255]));
        assert_eq!(out.pixel(176, 176), Some([0, 0, 255, 255]));
        assert_eq!(out.pixel(174, 200), Some([0xf8, 0xf9, 0xfa, 255]));
        assert_eq!(out.pixel(225, 200), Some([0xf8, 0xf9, 0xfa, 255]));
    }

    #[test]
    fn test_scale_and_rotation_keep_center() {
        let placement = Placement::centered_in(400, 400, DEFAULT_SCALE)
            .with_scale(2.0)
            .with_rotation(45.0);
        let out = render(&surface_with(bullseye(), placement), FilterType::Bilinear);

        assert_eq!(out.pixel(200, 200), Some([255, 0, 0, 255]));
        // 200x200 square rotated 45 degrees reaches ~141 from center along the axes
        assert_eq!(out.pixel(200, 60), Some([0, 0, 255, 255]));
        // ...but not into the corners of the surface
        assert_eq!(out.pixel(5, 5), Some([0xf8, 0xf9, 0xfa, 255]));
    }

    #[test]
    fn test_rotation_is_clockwise() {
        // Left half red, right half green
        let mut pixels = Vec::new();
        for _y in 0..10 {
            for x in 0..10 {
                if x < 5 {
                    pixels.extend_from_slice(&[255, 0, 0, 255]);
                } else {
                    pixels.extend_from_slice(&[0, 255, 0, 255]);
                }
            }
        }
        let img = DecodedImage::new(10, 10, pixels);
        let placement = Placement::centered_in(400, 400, 3.0).with_rotation(90.0);
        let out = render(&surface_with(img, placement), FilterType::Nearest);

        // After a clockwise quarter turn the right (green) half points down
        assert_eq!(out.pixel(200, 210), Some([0, 255, 0, 255]));
        assert_eq!(out.pixel(200, 190), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_pan_moves_image() {
        let placement = Placement::centered_in(400, 400, DEFAULT_SCALE).translated(100.0, 0.0);
        let out = render(&surface_with(bullseye(), placement), FilterType::Nearest);

        assert_eq!(out.pixel(300, 200), Some([255, 0, 0, 255]));
        assert_eq!(out.pixel(200, 200), Some([0xf8, 0xf9, 0xfa, 255]));
    }

    #[test]
    fn test_translucent_image_composites_over_background() {
        let img = DecodedImage::filled(10, 10, [0, 0, 0, 128]);
        let surface = WorkingSurface::new(20, 20, Color::rgb(255, 255, 255))
            .with_image(PlacedImage::new(img, Placement::centered_in(20, 20, 1.0)));
        let out = render(&surface, FilterType::Nearest);

        let px = out.pixel(10, 10).unwrap();
        assert_eq!(px[3], 255);
        assert!((px[0] as i32 - 127).abs() <= 1, "got {px:?}");
    }

    #[test]
    fn test_transparent_background_stays_transparent_outside_image() {
        let img = DecodedImage::filled(4, 4, [10, 20, 30, 255]);
        let surface = WorkingSurface::new(20, 20, Color::TRANSPARENT)
            .with_image(PlacedImage::new(img, Placement::centered_in(20, 20, 1.0)));
        let out = render(&surface, FilterType::Nearest);

        assert_eq!(out.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(out.pixel(10, 10), Some([10, 20, 30, 255]));
    }

    #[test]
    fn test_natural_size_governs_footprint() {
        // Stored at 50x50 but naturally 100x100: same footprint as the full image
        let small = DecodedImage::filled(50, 50, [255, 0, 0, 255]);
        let placed = PlacedImage::with_natural_size(
            small,
            (100, 100),
            Placement::centered_in(400, 400, DEFAULT_SCALE),
        );
        let surface = WorkingSurface::new(400, 400, BG).with_image(placed);
        let out = render(&surface, FilterType::Nearest);

        assert_eq!(out.pixel(176, 176), Some([255, 0, 0, 255]));
        assert_eq!(out.pixel(174, 176), Some([0xf8, 0xf9, 0xfa, 255]));
    }

    #[test]
    fn test_render_is_deterministic() {
        let placement = Placement::centered_in(400, 400, DEFAULT_SCALE)
            .with_scale(1.3)
            .with_rotation(-33.0);
        let surface = surface_with(bullseye(), placement);
        assert_eq!(
            render(&surface, FilterType::Lanczos3),
            render(&surface, FilterType::Lanczos3)
        );
    }

    #[test]
    fn test_with_image_replaces() {
        let first = PlacedImage::new(
            DecodedImage::filled(2, 2, [1, 1, 1, 255]),
            Placement::centered_in(400, 400, 1.0),
        );
        let second = PlacedImage::new(
            DecodedImage::filled(3, 3, [2, 2, 2, 255]),
            Placement::centered_in(400, 400, 1.0),
        );
        let surface = WorkingSurface::new(400, 400, BG)
            .with_image(first)
            .with_image(second.clone());

        assert_eq!(surface.image(), Some(&second));
        assert!(surface.cleared().image().is_none());
    }

    #[test]
    fn test_map_placement_without_image_is_noop() {
        let surface = WorkingSurface::new(400, 400, BG);
        let mapped = surface.clone().map_placement(|p| p.with_scale(3.0));
        assert_eq!(mapped, surface);
    }

    #[test]
    fn test_map_placement_shares_pixels() {
        let surface = surface_with(bullseye(), Placement::centered_in(400, 400, DEFAULT_SCALE));
        let before = Arc::as_ptr(&surface.image().unwrap().image);
        let mapped = surface.map_placement(|p| p.with_rotation(10.0));
        let placed = mapped.image().unwrap();

        assert_eq!(Arc::as_ptr(&placed.image), before);
        assert_eq!(placed.placement().rotation(), 10.0);
    }
}
