//! Avatar Editor Core - Avatar transform and export engine
//!
//! This crate holds the platform-independent half of the avatar editor: a
//! fixed-size working surface with one placed image, the zoom/rotate/pan
//! transforms applied to it, and the export of a circular PNG crop.
//!
//! # Modules
//!
//! - [`config`]: Editor settings and their validation
//! - [`decode`]: Image decoding from bytes or base64 data URIs
//! - [`transform`]: Placement state, clamping and inverse mapping
//! - [`surface`]: The working surface and its renderer
//! - [`mask`]: Anti-aliased circular clip
//! - [`resize`]: Source capping and output resampling
//! - [`encode`]: PNG encoding and data URI formatting
//! - [`export`]: The render, resample, clip and encode pipeline
//! - [`session`]: Lifecycle of one open editor, including async loads

pub mod config;
pub mod decode;
pub mod encode;
pub mod export;
pub mod mask;
pub mod resize;
pub mod session;
pub mod surface;
pub mod transform;

pub use config::{Color, ConfigError, EditorConfig};
pub use decode::{DecodeError, DecodedImage, FilterType, ImageSource};
pub use encode::EncodeError;
pub use export::{export_crop, CropResult, ExportError, ExportOptions};
pub use session::{EditorSession, LoadOutcome, LoadTicket, NoopHandler, SessionHandler};
pub use surface::{render, PlacedImage, WorkingSurface};
pub use transform::Placement;
