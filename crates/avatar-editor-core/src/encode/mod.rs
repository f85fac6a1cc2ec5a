//! Image encoding for the avatar export.
//!
//! This module provides functionality for:
//! - Encoding RGBA pixels to PNG (lossless, keeps transparency)
//! - Wrapping encoded bytes in a base64 `data:` URI for the host UI

mod png;

pub use png::{encode_png, to_data_uri, EncodeError, PNG_MIME};
