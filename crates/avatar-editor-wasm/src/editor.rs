//! The `AvatarEditor` class exposed to JavaScript.
//!
//! # Example
//!
//! ```typescript
//! import init, { AvatarEditor } from '@avatar-editor/wasm';
//!
//! await init();
//!
//! const editor = new AvatarEditor(
//!   { background: '#f8f9fa' },
//!   (dataUri) => setAvatar(dataUri),
//!   () => setOpen(false),
//! );
//!
//! if (await editor.loadImage(dataUriFromFileReader)) {
//!   editor.setScale(1.5);
//!   editor.setRotation(-30);
//!   const preview = editor.preview();
//!   ctx.putImageData(new ImageData(new Uint8ClampedArray(preview.pixels()), preview.width), 0, 0);
//! }
//!
//! editor.save(); // fires onSave, then onClose
//! ```
//!
//! # Callbacks
//!
//! `onSave` and `onClose` are queued while the session is being mutated and
//! dispatched once the session is no longer borrowed, so a callback may read
//! editor state (for example `isOpen` from `onClose`).

use std::cell::RefCell;
use std::rc::Rc;

use avatar_editor_core::config::EditorConfig;
use avatar_editor_core::decode::ImageSource;
use avatar_editor_core::session::{EditorSession, SessionHandler};
use avatar_editor_core::transform::Placement;
use js_sys::{Function, Promise, Uint8Array};
use log::warn;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, JsFuture};

use crate::types::JsDecodedImage;

/// A host notification waiting to be delivered.
#[derive(Debug, Clone, PartialEq)]
enum Event {
    Saved(String),
    Closed,
}

type EventQueue = Rc<RefCell<Vec<Event>>>;

/// Session handler that records events for later dispatch.
struct QueueHandler {
    events: EventQueue,
}

impl SessionHandler for QueueHandler {
    fn on_save(&mut self, data_uri: &str) {
        self.events
            .borrow_mut()
            .push(Event::Saved(data_uri.to_string()));
    }

    fn on_close(&mut self) {
        self.events.borrow_mut().push(Event::Closed);
    }
}

/// Snapshot of the editor for UI bindings (sliders, buttons).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EditorState {
    open: bool,
    has_image: bool,
    placement: Option<Placement>,
}

/// One open avatar editor dialog.
#[wasm_bindgen]
pub struct AvatarEditor {
    session: Rc<RefCell<EditorSession<QueueHandler>>>,
    events: EventQueue,
    on_save: Function,
    on_close: Function,
}

#[wasm_bindgen]
impl AvatarEditor {
    /// Open an editor.
    ///
    /// `config` may be `undefined` or a partial `EditorConfig` object;
    /// missing fields take their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(
        config: JsValue,
        on_save: Function,
        on_close: Function,
    ) -> Result<AvatarEditor, JsValue> {
        let config: EditorConfig = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid editor config: {e}")))?
        };

        let events = EventQueue::default();
        let handler = QueueHandler {
            events: Rc::clone(&events),
        };
        let session = EditorSession::open(config, handler)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(AvatarEditor {
            session: Rc::new(RefCell::new(session)),
            events,
            on_save,
            on_close,
        })
    }

    /// Decode and place an image.
    ///
    /// `source` is a base64 data URI string or a `Uint8Array` of file bytes.
    /// Resolves to `true` once the image is placed, `false` if decoding
    /// failed or a newer load (or `close()`) superseded this one.
    #[wasm_bindgen(js_name = loadImage)]
    pub fn load_image(&self, source: JsValue) -> Result<Promise, JsValue> {
        let source = image_source_from_js(&source)?;
        let ticket = self.session.borrow_mut().begin_load();
        let session = Rc::clone(&self.session);

        Ok(future_to_promise(async move {
            // Let the caller finish its current task before the decode blocks
            JsFuture::from(Promise::resolve(&JsValue::NULL)).await?;

            let result = source.decode();
            let outcome = session.borrow_mut().finish_load(ticket, result);
            Ok(JsValue::from_bool(outcome.is_placed()))
        }))
    }

    /// Decode and place an image synchronously.
    #[wasm_bindgen(js_name = loadImageBytes)]
    pub fn load_image_bytes(&self, bytes: &[u8]) -> bool {
        self.session
            .borrow_mut()
            .load_image(&ImageSource::Bytes(bytes.to_vec()))
            .is_placed()
    }

    /// Set the zoom factor (clamped to 0.1..=3.0).
    #[wasm_bindgen(js_name = setScale)]
    pub fn set_scale(&self, scale: f64) {
        self.session.borrow_mut().set_scale(scale);
    }

    /// Set the rotation in degrees (clamped to -180..=180).
    #[wasm_bindgen(js_name = setRotation)]
    pub fn set_rotation(&self, degrees: f64) {
        self.session.borrow_mut().set_rotation(degrees);
    }

    /// Pan the image by a surface-space offset.
    #[wasm_bindgen(js_name = moveBy)]
    pub fn move_by(&self, dx: f64, dy: f64) {
        self.session.borrow_mut().move_by(dx, dy);
    }

    pub fn reset(&self) {
        self.session.borrow_mut().reset();
    }

    /// Current zoom, `undefined` without an image.
    #[wasm_bindgen(getter)]
    pub fn scale(&self) -> Option<f64> {
        self.session.borrow().placement().map(|p| p.scale())
    }

    /// Current rotation in degrees, `undefined` without an image.
    #[wasm_bindgen(getter)]
    pub fn rotation(&self) -> Option<f64> {
        self.session.borrow().placement().map(|p| p.rotation())
    }

    #[wasm_bindgen(getter, js_name = hasImage)]
    pub fn has_image(&self) -> bool {
        self.session.borrow().has_image()
    }

    #[wasm_bindgen(getter, js_name = isOpen)]
    pub fn is_open(&self) -> bool {
        self.session.borrow().is_open()
    }

    /// `{ open, hasImage, placement: { centerX, centerY, scale, rotation } | null }`
    pub fn state(&self) -> Result<JsValue, JsValue> {
        let session = self.session.borrow();
        let state = EditorState {
            open: session.is_open(),
            has_image: session.has_image(),
            placement: session.placement(),
        };
        serde_wasm_bindgen::to_value(&state)
            .map_err(|e| JsValue::from_str(&format!("Failed to serialize state: {e}")))
    }

    /// Render the working surface, `undefined` once closed.
    pub fn preview(&self) -> Option<JsDecodedImage> {
        self.session
            .borrow()
            .preview()
            .map(JsDecodedImage::from_decoded)
    }

    /// Export the circular crop as a `data:image/png;base64,...` URI.
    #[wasm_bindgen(js_name = exportCrop)]
    pub fn export_crop(&self) -> Result<String, JsValue> {
        self.session
            .borrow()
            .export_crop()
            .map(|crop| crop.data_uri())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Export, call `onSave` with the data URI, then close.
    pub fn save(&self) -> Result<(), JsValue> {
        let result = self.session.borrow_mut().save();
        self.dispatch();
        result.map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Close without saving. Calls `onClose` the first time only.
    pub fn close(&self) {
        self.session.borrow_mut().close();
        self.dispatch();
    }
}

impl AvatarEditor {
    /// Deliver queued events to the JavaScript callbacks.
    fn dispatch(&self) {
        let events = std::mem::take(&mut *self.events.borrow_mut());
        for event in events {
            let result = match &event {
                Event::Saved(uri) => {
                    self.on_save.call1(&JsValue::NULL, &JsValue::from_str(uri))
                }
                Event::Closed => self.on_close.call0(&JsValue::NULL),
            };
            if let Err(err) = result {
                warn!("avatar editor callback for {event:?} threw: {err:?}");
            }
        }
    }
}

impl Drop for AvatarEditor {
    fn drop(&mut self) {
        // Pending loads hold their own handle on the session
        if let Ok(mut session) = self.session.try_borrow_mut() {
            session.close();
        }
        self.dispatch();
    }
}

fn image_source_from_js(source: &JsValue) -> Result<ImageSource, JsValue> {
    if let Some(uri) = source.as_string() {
        return Ok(ImageSource::DataUri(uri));
    }
    if let Some(bytes) = source.dyn_ref::<Uint8Array>() {
        return Ok(ImageSource::Bytes(bytes.to_vec()));
    }
    Err(JsValue::from_str(
        "Image source must be a data URI string or a Uint8Array",
    ))
}
