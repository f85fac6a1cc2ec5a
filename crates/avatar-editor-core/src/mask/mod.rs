//! Clip masks applied at export time.
//!
//! Masks are evaluated per pixel and return a coverage value from 0.0
//! (clipped away) to 1.0 (kept). Applying a mask scales each pixel's alpha by
//! its coverage.

pub mod circle;

pub use circle::CircleMask;
