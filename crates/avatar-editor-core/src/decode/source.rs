//! Decoding of user-selected avatar sources.
//!
//! A source arrives either as raw encoded bytes or as a `data:` URI (what a
//! browser `FileReader.readAsDataURL` hands back). The container format is
//! sniffed from content, JPEG EXIF orientation is applied so phone photos
//! come out upright, and the result is normalized to RGBA8.

use std::io::Cursor;

use base64::{engine::general_purpose, Engine as _};
use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageError, ImageFormat, ImageReader};

use super::{DecodeError, DecodedImage, Orientation};

/// Reference to an image the user picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Encoded file bytes (PNG, JPEG).
    Bytes(Vec<u8>),
    /// A `data:<mime>;base64,<payload>` URI.
    DataUri(String),
}

impl ImageSource {
    /// Decode the referenced image into RGBA pixels.
    pub fn decode(&self) -> Result<DecodedImage, DecodeError> {
        match self {
            ImageSource::Bytes(bytes) => decode_image(bytes),
            ImageSource::DataUri(uri) => decode_image(&parse_data_uri(uri)?),
        }
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        ImageSource::Bytes(bytes)
    }
}

impl From<&str> for ImageSource {
    fn from(uri: &str) -> Self {
        ImageSource::DataUri(uri.to_string())
    }
}

impl From<String> for ImageSource {
    fn from(uri: String) -> Self {
        ImageSource::DataUri(uri)
    }
}

/// Decode encoded image bytes into RGBA pixels.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the container is not recognized or
/// its codec is not compiled in, `DecodeError::CorruptedFile` if decoding
/// fails part way, and `DecodeError::EmptyImage` for zero-sized images.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let format = reader.format().ok_or(DecodeError::InvalidFormat)?;

    let img = reader.decode().map_err(|e| match e {
        ImageError::Unsupported(_) => DecodeError::InvalidFormat,
        other => DecodeError::CorruptedFile(other.to_string()),
    })?;

    let img = if format == ImageFormat::Jpeg {
        apply_orientation(img, extract_orientation(bytes))
    } else {
        img
    };

    let rgba = img.into_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(DecodeError::EmptyImage);
    }
    Ok(DecodedImage::from_rgba_image(rgba))
}

/// Extract the payload of a base64 `data:` URI.
///
/// Only base64 payloads are accepted; image data URIs are never
/// percent-encoded in practice. ASCII whitespace inside the payload is ignored.
pub fn parse_data_uri(uri: &str) -> Result<Vec<u8>, DecodeError> {
    let rest = match uri.get(..5) {
        Some(scheme) if scheme.eq_ignore_ascii_case("data:") => &uri[5..],
        _ => return Err(DecodeError::InvalidDataUri("missing data: scheme".to_string())),
    };

    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| DecodeError::InvalidDataUri("missing ',' separator".to_string()))?;

    let is_base64 = meta
        .rsplit(';')
        .next()
        .is_some_and(|param| param.eq_ignore_ascii_case("base64"));
    if !is_base64 {
        return Err(DecodeError::InvalidDataUri(
            "only base64 payloads are supported".to_string(),
        ));
    }

    let compact: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| DecodeError::InvalidDataUri(e.to_string()))
}

/// Extract EXIF orientation from JPEG bytes.
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);

    Reader::new()
        .read_from_container(&mut cursor)
        .ok()
        .and_then(|exif| {
            exif.get_field(Tag::Orientation, In::PRIMARY)
                .and_then(|field| field.value.get_uint(0))
        })
        .map(Orientation::from)
        .unwrap_or_default()
}

/// Apply EXIF orientation transformation to an image.
fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}
