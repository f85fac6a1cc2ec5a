//! Placement of the avatar image on the working surface.
//!
//! # Coordinate System
//!
//! - Surface coordinates are in surface pixels, origin at the top-left,
//!   y pointing down
//! - A placement anchors the image by its own center, not its top-left corner
//! - Rotation angles are in degrees, positive = clockwise on screen
//! - Scale is uniform and relative to the image's natural size
//!
//! Scale and rotation always act about the image center, so panning the
//! image never changes how zoom or rotation feel.

mod affine;
mod placement;
mod sample;

pub use affine::{rotated_extent, InverseMap};
pub use placement::{
    clamp_rotation, clamp_scale, Placement, DEFAULT_SCALE, MAX_ROTATION, MAX_SCALE, MIN_ROTATION,
    MIN_SCALE,
};
pub use sample::{sample, Premultiplied};
