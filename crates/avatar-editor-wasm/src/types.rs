//! WASM-compatible wrapper types for image data.

use avatar_editor_core::decode::DecodedImage;
use wasm_bindgen::prelude::*;

/// A rendered RGBA image handed to JavaScript.
///
/// The pixel layout matches `ImageData` (4 bytes per pixel, straight alpha,
/// row-major), so `new ImageData(new Uint8ClampedArray(img.pixels()), img.width)`
/// paints it directly onto a canvas.
#[wasm_bindgen]
pub struct JsDecodedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsDecodedImage {
    /// Get the image width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the image height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of bytes in the pixel buffer (width * height * 4)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Returns RGBA pixel data as Uint8Array.
    ///
    /// This copies the buffer out of WASM memory.
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Explicitly free WASM memory.
    pub fn free(self) {}
}

impl JsDecodedImage {
    pub(crate) fn from_decoded(img: DecodedImage) -> Self {
        Self {
            width: img.width,
            height: img.height,
            pixels: img.pixels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_decoded() {
        let decoded = DecodedImage::filled(20, 10, [1, 2, 3, 4]);
        let js_img = JsDecodedImage::from_decoded(decoded);

        assert_eq!(js_img.width(), 20);
        assert_eq!(js_img.height(), 10);
        assert_eq!(js_img.byte_length(), 800);
        assert_eq!(&js_img.pixels()[..4], &[1, 2, 3, 4]);
    }
}
