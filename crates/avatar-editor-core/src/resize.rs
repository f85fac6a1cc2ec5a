//! Image resizing used for capping oversized sources and for scaling the
//! working surface down to the export resolution.
//!
//! Both paths go through the `image` crate's separable resampling filters.
//! Filtering runs on premultiplied `f32` pixels, so fully transparent
//! neighbors never bleed their (black) color into visible edges.
//! All functions return new `DecodedImage` instances without modifying the input.

use image::Rgba32FImage;
use thiserror::Error;

use crate::decode::{DecodedImage, FilterType, CHANNELS};

/// Errors that can occur while resizing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResizeError {
    /// Requested target has a zero edge.
    #[error("Invalid target dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// The source pixel buffer does not match its declared dimensions.
    #[error("Source buffer has {actual} bytes, expected {expected}")]
    BufferMismatch { expected: usize, actual: usize },
}

/// Resize an image to exact dimensions.
///
/// # Errors
///
/// Returns `ResizeError::InvalidDimensions` for a zero-sized target and
/// `ResizeError::BufferMismatch` if the source buffer is malformed.
pub fn resize(
    image: &DecodedImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<DecodedImage, ResizeError> {
    if width == 0 || height == 0 {
        return Err(ResizeError::InvalidDimensions { width, height });
    }

    // Fast path: if dimensions match, just clone
    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let premultiplied = to_premultiplied(image)?;
    let resized = image::imageops::resize(&premultiplied, width, height, filter.to_image_filter());

    Ok(from_premultiplied(&resized))
}

/// Resize an image to fit within a maximum edge length while preserving aspect ratio.
///
/// If the image already fits it is returned unchanged; images are never upscaled.
pub fn resize_to_fit(
    image: &DecodedImage,
    max_edge: u32,
    filter: FilterType,
) -> Result<DecodedImage, ResizeError> {
    if max_edge == 0 {
        return Err(ResizeError::InvalidDimensions {
            width: max_edge,
            height: max_edge,
        });
    }

    if image.width <= max_edge && image.height <= max_edge {
        return Ok(image.clone());
    }

    let (new_width, new_height) = calculate_fit_dimensions(image.width, image.height, max_edge);

    resize(image, new_width, new_height, filter)
}

fn to_premultiplied(image: &DecodedImage) -> Result<Rgba32FImage, ResizeError> {
    let mismatch = ResizeError::BufferMismatch {
        expected: image.width as usize * image.height as usize * CHANNELS,
        actual: image.pixels.len(),
    };
    if image.pixels.len() != image.width as usize * image.height as usize * CHANNELS {
        return Err(mismatch);
    }

    let mut data = Vec::with_capacity(image.pixels.len());
    for px in image.pixels.chunks_exact(CHANNELS) {
        let a = px[3] as f32 / 255.0;
        data.extend_from_slice(&[
            px[0] as f32 / 255.0 * a,
            px[1] as f32 / 255.0 * a,
            px[2] as f32 / 255.0 * a,
            a,
        ]);
    }

    Rgba32FImage::from_raw(image.width, image.height, data).ok_or(mismatch)
}

fn from_premultiplied(image: &Rgba32FImage) -> DecodedImage {
    let (width, height) = image.dimensions();
    let mut pixels = Vec::with_capacity(width as usize * height as usize * CHANNELS);

    for px in image.pixels() {
        let [r, g, b, a] = px.0;
        let alpha = (a.clamp(0.0, 1.0) * 255.0).round() as u8;
        if alpha == 0 {
            pixels.extend_from_slice(&[0, 0, 0, 0]);
            continue;
        }
        let a = a.clamp(0.0, 1.0);
        let channel = |c: f32| ((c / a).clamp(0.0, 1.0) * 255.0).round() as u8;
        pixels.extend_from_slice(&[channel(r), channel(g), channel(b), alpha]);
    }

    DecodedImage::new(width, height, pixels)
}

/// Calculate dimensions to fit within max_edge while preserving aspect ratio.
fn calculate_fit_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }

    let ratio = width as f64 / height as f64;

    if width >= height {
        let new_height = (max_edge as f64 / ratio).round() as u32;
        (max_edge, new_height.max(1))
    } else {
        let new_width = (max_edge as f64 * ratio).round() as u32;
        (new_width.max(1), max_edge)
    }
}
