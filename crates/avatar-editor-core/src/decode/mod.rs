//! Image decoding for avatar sources.
//!
//! This module provides functionality for:
//! - Parsing base64 `data:` URIs produced by browser file pickers
//! - Decoding PNG and JPEG images (format sniffed from content)
//! - Applying JPEG EXIF orientation
//!
//! All decoded images are normalized to RGBA8 so transparency in PNG
//! avatars survives through to the circular export.

mod source;
mod types;

pub use source::{decode_image, parse_data_uri, ImageSource};
pub use types::{DecodeError, DecodedImage, FilterType, Orientation, CHANNELS};
