//! The placement value record and its clamping rules.

use serde::Serialize;

/// Smallest scale the zoom slider allows.
pub const MIN_SCALE: f64 = 0.1;
/// Largest scale the zoom slider allows.
pub const MAX_SCALE: f64 = 3.0;
/// Scale applied when an image is first placed.
pub const DEFAULT_SCALE: f64 = 0.5;
/// Rotation slider lower bound, degrees.
pub const MIN_ROTATION: f64 = -180.0;
/// Rotation slider upper bound, degrees.
pub const MAX_ROTATION: f64 = 180.0;

/// Clamp a scale request into `[MIN_SCALE, MAX_SCALE]`.
///
/// Returns `None` for NaN or infinite input so callers keep the current value.
pub fn clamp_scale(scale: f64) -> Option<f64> {
    scale
        .is_finite()
        .then(|| scale.clamp(MIN_SCALE, MAX_SCALE))
}

/// Clamp a rotation request into `[MIN_ROTATION, MAX_ROTATION]` degrees.
///
/// Returns `None` for NaN or infinite input so callers keep the current value.
pub fn clamp_rotation(degrees: f64) -> Option<f64> {
    degrees
        .is_finite()
        .then(|| degrees.clamp(MIN_ROTATION, MAX_ROTATION))
}

/// Where and how the image sits on the working surface.
///
/// Immutable: every update returns a new record. The scale and rotation
/// invariants hold for every value a caller can obtain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    center_x: f64,
    center_y: f64,
    scale: f64,
    rotation: f64,
}

impl Placement {
    /// Image centered on a `width` x `height` surface, unrotated.
    ///
    /// `scale` is clamped like any other scale request; non-finite input
    /// falls back to [`DEFAULT_SCALE`].
    pub fn centered_in(width: u32, height: u32, scale: f64) -> Self {
        Self {
            center_x: width as f64 / 2.0,
            center_y: height as f64 / 2.0,
            scale: clamp_scale(scale).unwrap_or(DEFAULT_SCALE),
            rotation: 0.0,
        }
    }

    /// Center X in surface coordinates.
    pub fn center_x(&self) -> f64 {
        self.center_x
    }

    /// Center Y in surface coordinates.
    pub fn center_y(&self) -> f64 {
        self.center_y
    }

    /// Uniform scale factor.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Rotation in degrees.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn with_scale(self, scale: f64) -> Self {
        match clamp_scale(scale) {
            Some(scale) => Self { scale, ..self },
            None => self,
        }
    }

    pub fn with_rotation(self, degrees: f64) -> Self {
        match clamp_rotation(degrees) {
            Some(rotation) => Self { rotation, ..self },
            None => self,
        }
    }

    /// Move the image center by a surface-space offset (drag to pan).
    pub fn translated(self, dx: f64, dy: f64) -> Self {
        if !dx.is_finite() || !dy.is_finite() {
            return self;
        }
        Self {
            center_x: self.center_x + dx,
            center_y: self.center_y + dy,
            ..self
        }
    }
}
