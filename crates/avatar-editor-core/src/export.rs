//! Circular crop export.
//!
//! # Pipeline
//!
//! 1. Render the full working surface (background, then the placed image)
//! 2. Take the centered square of side `min(width, height)`; this is the
//!    whole surface when it is square
//! 3. Resample that square to `output_size` x `output_size`
//! 4. Clip to the circle inscribed in the output, anti-aliased at output
//!    resolution so the edge is never resampled a second time
//! 5. Encode as PNG
//!
//! Every step is deterministic, so exporting an unchanged surface twice
//! yields byte-identical PNGs.

use log::debug;
use thiserror::Error;

use crate::config::MAX_EDGE;
use crate::decode::{DecodedImage, FilterType, CHANNELS};
use crate::encode::{encode_png, to_data_uri, EncodeError, PNG_MIME};
use crate::mask::CircleMask;
use crate::resize::{resize, ResizeError};
use crate::surface::{render, WorkingSurface};

/// Errors that can occur while exporting a crop.
#[derive(Debug, Error)]
pub enum ExportError {
    /// There is no surface to draw from (session closed or never opened).
    #[error("No working surface is available to export from")]
    SurfaceUnavailable,

    /// Scaling the surface to the output size failed.
    #[error("Failed to resample surface: {0}")]
    Resample(#[from] ResizeError),

    /// Encoding the output failed.
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Settings for a single export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    /// Edge length of the square output.
    pub output_size: u32,
    /// Filter used for both the surface render and the resample.
    pub filter: FilterType,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_size: 256,
            filter: FilterType::Bilinear,
        }
    }
}

/// The encoded circular avatar handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropResult {
    width: u32,
    height: u32,
    png: Vec<u8>,
}

impl CropResult {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Encoded PNG bytes.
    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    pub fn into_png_bytes(self) -> Vec<u8> {
        self.png
    }

    /// `data:image/png;base64,...`
    pub fn data_uri(&self) -> String {
        to_data_uri(PNG_MIME, &self.png)
    }
}

/// Render, resample and clip the surface, returning raw RGBA pixels.
///
/// This is [`export_crop`] without the encoding step.
pub fn render_crop(
    surface: &WorkingSurface,
    options: &ExportOptions,
) -> Result<DecodedImage, ExportError> {
    let edge_ok = |edge: u32| (1..=MAX_EDGE).contains(&edge);
    if !edge_ok(surface.width()) || !edge_ok(surface.height()) {
        return Err(ExportError::SurfaceUnavailable);
    }
    let size = options.output_size;
    if size > MAX_EDGE {
        return Err(ResizeError::InvalidDimensions {
            width: size,
            height: size,
        }
        .into());
    }

    let composed = render(surface, options.filter);
    let square = if composed.width == composed.height {
        composed
    } else {
        center_square(&composed)
    };
    let mut output = resize(&square, size, size, options.filter)?;

    CircleMask::inscribed(size).apply(&mut output.pixels, size, size);
    Ok(output)
}

/// Cut the largest centered square out of `image`.
fn center_square(image: &DecodedImage) -> DecodedImage {
    let side = image.width.min(image.height);
    let left = ((image.width - side) / 2) as usize;
    let top = ((image.height - side) / 2) as usize;
    let (side, stride) = (side as usize, image.width as usize);

    let mut pixels = Vec::with_capacity(side * side * CHANNELS);
    for y in top..top + side {
        let start = (y * stride + left) * CHANNELS;
        pixels.extend_from_slice(&image.pixels[start..start + side * CHANNELS]);
    }

    DecodedImage::new(side as u32, side as u32, pixels)
}

/// Produce the circular PNG crop of the current surface.
pub fn export_crop(
    surface: &WorkingSurface,
    options: &ExportOptions,
) -> Result<CropResult, ExportError> {
    let cropped = render_crop(surface, options)?;
    let png = encode_png(&cropped.pixels, cropped.width, cropped.height)?;

    debug!(
        "exported {}x{} avatar crop ({} bytes, image placed: {})",
        cropped.width,
        cropped.height,
        png.len(),
        surface.image().is_some()
    );

    Ok(CropResult {
        width: cropped.width,
        height: cropped.height,
        png,
    })
}
