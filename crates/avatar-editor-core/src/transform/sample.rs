//! Pixel sampling with nearest, bilinear and Lanczos3 interpolation.
//!
//! Samples are taken in premultiplied alpha so transparent pixels around a
//! PNG avatar do not bleed their (meaningless) color into visible edges.
//!
//! Coordinates are continuous: pixel `i` covers `[i, i + 1)` and its center
//! sits at `i + 0.5`. Points outside the image return `None`, which gives
//! the placed image a hard edge against the background.

use crate::decode::{DecodedImage, FilterType, CHANNELS};

/// Premultiplied RGBA in the 0..=255 range.
pub type Premultiplied = [f64; 4];

/// Sample `image` at continuous coordinates `(x, y)`.
///
/// Returns `None` when the point lies outside the image.
pub fn sample(image: &DecodedImage, x: f64, y: f64, filter: FilterType) -> Option<Premultiplied> {
    if image.is_empty()
        || x < 0.0
        || y < 0.0
        || x >= image.width as f64
        || y >= image.height as f64
    {
        return None;
    }

    // Shift to index space where pixel centers are integral
    let (ix, iy) = (x - 0.5, y - 0.5);

    Some(match filter {
        FilterType::Nearest => get_premultiplied(image, x as i64, y as i64),
        FilterType::Bilinear => sample_bilinear(image, ix, iy),
        FilterType::Lanczos3 => sample_lanczos3(image, ix, iy),
    })
}

/// Get a pixel as premultiplied RGBA, clamping coordinates to the edge.
#[inline]
fn get_premultiplied(image: &DecodedImage, px: i64, py: i64) -> Premultiplied {
    let px = px.clamp(0, image.width as i64 - 1) as usize;
    let py = py.clamp(0, image.height as i64 - 1) as usize;
    let idx = (py * image.width as usize + px) * CHANNELS;

    let a = image.pixels[idx + 3] as f64;
    let k = a / 255.0;
    [
        image.pixels[idx] as f64 * k,
        image.pixels[idx + 1] as f64 * k,
        image.pixels[idx + 2] as f64 * k,
        a,
    ]
}

/// Bilinear interpolation over the 4 nearest pixels, weighted by distance.
fn sample_bilinear(image: &DecodedImage, x: f64, y: f64) -> Premultiplied {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let p00 = get_premultiplied(image, x0, y0);
    let p10 = get_premultiplied(image, x0 + 1, y0);
    let p01 = get_premultiplied(image, x0, y0 + 1);
    let p11 = get_premultiplied(image, x0 + 1, y0 + 1);

    let mut result = [0.0; 4];
    for i in 0..4 {
        result[i] = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
    }
    result
}

/// Lanczos3 interpolation over a 6x6 neighborhood.
///
/// The kernel has negative lobes, so the result is clamped back into a
/// valid premultiplied range (color never exceeds alpha).
fn sample_lanczos3(image: &DecodedImage, x: f64, y: f64) -> Premultiplied {
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;

    let mut sum = [0.0f64; 4];
    let mut weight_sum = 0.0;

    for ky in -2..=3 {
        for kx in -2..=3 {
            let px = x0 + kx;
            let py = y0 + ky;

            let weight = lanczos_weight(x - px as f64, 3.0) * lanczos_weight(y - py as f64, 3.0);
            let pixel = get_premultiplied(image, px, py);
            for i in 0..4 {
                sum[i] += pixel[i] * weight;
            }
            weight_sum += weight;
        }
    }

    if weight_sum.abs() < f64::EPSILON {
        return get_premultiplied(image, x.round() as i64, y.round() as i64);
    }

    let alpha = (sum[3] / weight_sum).clamp(0.0, 255.0);
    [
        (sum[0] / weight_sum).clamp(0.0, alpha),
        (sum[1] / weight_sum).clamp(0.0, alpha),
        (sum[2] / weight_sum).clamp(0.0, alpha),
        alpha,
    ]
}

/// Lanczos kernel weight function.
///
/// ```text
/// L(x) = sinc(x) * sinc(x/a)  for |x| < a
/// L(x) = 0                     for |x| >= a
/// ```
fn lanczos_weight(x: f64, a: f64) -> f64 {
    if x.abs() < f64::EPSILON {
        return 1.0;
    }
    if x.abs() >= a {
        return 0.0;
    }

    let pi_x = std::f64::consts::PI * x;
    let pi_x_a = pi_x / a;

    (a * pi_x.sin() * pi_x_a.sin()) / (pi_x * pi_x)
}
