//! Avatar Editor WASM - WebAssembly bindings for the avatar editor
//!
//! This crate exposes avatar-editor-core to JavaScript/TypeScript as a single
//! `AvatarEditor` class.
//!
//! # Module Structure
//!
//! - `editor` - The `AvatarEditor` class (load, zoom, rotate, pan, export, save)
//! - `types` - WASM-compatible wrapper types for image data
//!
//! # Usage
//!
//! ```typescript
//! import init, { AvatarEditor } from '@avatar-editor/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const editor = new AvatarEditor(undefined, onSave, onClose);
//! await editor.loadImage(new Uint8Array(await file.arrayBuffer()));
//! const dataUri = editor.exportCrop();
//! ```

use wasm_bindgen::prelude::*;

mod editor;
mod types;

pub use editor::AvatarEditor;
pub use types::JsDecodedImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    // Fails only if a logger is already installed
    let _ = console_log::init_with_level(log::Level::Debug);
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
