//! One open avatar editor, from dialog open to save or cancel.
//!
//! The session owns the only [`WorkingSurface`] for its lifetime and swaps
//! it for an updated value on every edit. Closing (explicitly, by saving, or
//! by dropping the session) releases the surface and fires `on_close` once.
//!
//! # Async loads
//!
//! Decoding may finish after the user has picked another file or closed the
//! dialog. Each load takes a [`LoadTicket`] from [`EditorSession::begin_load`];
//! [`EditorSession::finish_load`] only applies a result whose ticket is still
//! current, so late results never land on a newer image or a closed session.

use log::{debug, warn};

use crate::config::{ConfigError, EditorConfig};
use crate::decode::{DecodeError, DecodedImage, FilterType, ImageSource};
use crate::export::{export_crop, CropResult, ExportError, ExportOptions};
use crate::resize::resize_to_fit;
use crate::surface::{render, PlacedImage, WorkingSurface};
use crate::transform::Placement;

/// Callbacks into the host UI.
pub trait SessionHandler {
    /// A crop was saved. Called exactly once per successful [`EditorSession::save`].
    fn on_save(&mut self, data_uri: &str);

    /// The session ended. Called exactly once per session.
    fn on_close(&mut self);
}

/// Handler that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandler;

impl SessionHandler for NoopHandler {
    fn on_save(&mut self, _data_uri: &str) {}
    fn on_close(&mut self) {}
}

/// Identifies one in-flight image load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

/// What happened to a finished load.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The image was placed on the surface.
    Placed,
    /// Decoding failed; the surface is empty.
    Failed(DecodeError),
    /// The ticket was stale (newer load or closed session); nothing changed.
    Discarded,
}

impl LoadOutcome {
    pub fn is_placed(&self) -> bool {
        matches!(self, LoadOutcome::Placed)
    }
}

/// An open avatar editor.
pub struct EditorSession<H: SessionHandler> {
    config: EditorConfig,
    surface: Option<WorkingSurface>,
    generation: u64,
    handler: H,
}

impl<H: SessionHandler> EditorSession<H> {
    /// Open a session with an empty surface.
    pub fn open(config: EditorConfig, handler: H) -> Result<Self, ConfigError> {
        config.validate()?;

        let surface = WorkingSurface::new(
            config.surface_width,
            config.surface_height,
            config.background,
        );
        debug!(
            "opened avatar editor session ({}x{} surface, {}px output)",
            config.surface_width, config.surface_height, config.output_size
        );

        Ok(Self {
            config,
            surface: Some(surface),
            generation: 0,
            handler,
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn is_open(&self) -> bool {
        self.surface.is_some()
    }

    /// Current surface, `None` once closed.
    pub fn surface(&self) -> Option<&WorkingSurface> {
        self.surface.as_ref()
    }

    /// Placement of the current image, if one is placed.
    pub fn placement(&self) -> Option<Placement> {
        self.surface
            .as_ref()
            .and_then(|s| s.image())
            .map(|placed| placed.placement())
    }

    pub fn has_image(&self) -> bool {
        self.placement().is_some()
    }

    /// Start a load. Any earlier ticket becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Apply the result of the load identified by `ticket`.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<DecodedImage, DecodeError>,
    ) -> LoadOutcome {
        if ticket.generation != self.generation || self.surface.is_none() {
            warn!("discarding stale avatar load (ticket {})", ticket.generation);
            return LoadOutcome::Discarded;
        }

        let placed = result.and_then(|image| self.prepare(image));
        let Some(surface) = self.surface.take() else {
            return LoadOutcome::Discarded;
        };

        match placed {
            Ok(placed) => {
                debug!(
                    "placed {}x{} avatar source",
                    placed.natural_size().0,
                    placed.natural_size().1
                );
                self.surface = Some(surface.with_image(placed));
                LoadOutcome::Placed
            }
            Err(err) => {
                warn!("avatar source could not be decoded: {err}");
                self.surface = Some(surface.cleared());
                LoadOutcome::Failed(err)
            }
        }
    }

    /// Decode `source` and place it, replacing any current image.
    pub fn load_image(&mut self, source: &ImageSource) -> LoadOutcome {
        let ticket = self.begin_load();
        self.finish_load(ticket, source.decode())
    }

    /// Cap the source size and center it at the default scale.
    fn prepare(&self, image: DecodedImage) -> Result<PlacedImage, DecodeError> {
        let natural = (image.width, image.height);
        let placement = Placement::centered_in(
            self.config.surface_width,
            self.config.surface_height,
            self.config.default_scale,
        );

        let max_edge = self.config.max_source_edge;
        if max_edge == 0 || (image.width <= max_edge && image.height <= max_edge) {
            return Ok(PlacedImage::new(image, placement));
        }

        let capped = resize_to_fit(&image, max_edge, FilterType::Bilinear)
            .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;
        Ok(PlacedImage::with_natural_size(capped, natural, placement))
    }

    fn update(&mut self, f: impl FnOnce(Placement) -> Placement) {
        if let Some(surface) = self.surface.take() {
            self.surface = Some(surface.map_placement(f));
        }
    }

    /// Set the zoom, clamped to the slider range.
    pub fn set_scale(&mut self, scale: f64) {
        self.update(|p| p.with_scale(scale));
    }

    /// Set the rotation in degrees, clamped to the slider range.
    pub fn set_rotation(&mut self, degrees: f64) {
        self.update(|p| p.with_rotation(degrees));
    }

    /// Pan the image by a surface-space offset.
    pub fn move_by(&mut self, dx: f64, dy: f64) {
        self.update(|p| p.translated(dx, dy));
    }

    /// Back to the default scale, no rotation, centered. Keeps the image.
    pub fn reset(&mut self) {
        let (width, height, scale) = (
            self.config.surface_width,
            self.config.surface_height,
            self.config.default_scale,
        );
        self.update(|_| Placement::centered_in(width, height, scale));
    }

    /// Render the surface for on-screen display.
    pub fn preview(&self) -> Option<DecodedImage> {
        self.surface
            .as_ref()
            .map(|surface| render(surface, self.config.preview_filter))
    }

    /// Produce the circular crop of the current surface.
    ///
    /// # Errors
    ///
    /// `ExportError::SurfaceUnavailable` once the session is closed.
    pub fn export_crop(&self) -> Result<CropResult, ExportError> {
        let surface = self.surface.as_ref().ok_or(ExportError::SurfaceUnavailable)?;
        let options = ExportOptions {
            output_size: self.config.output_size,
            filter: self.config.export_filter,
        };
        export_crop(surface, &options)
    }

    /// Export, hand the data URI to `on_save`, then close.
    ///
    /// On error nothing is reported to the handler and the session stays
    /// open so the caller can retry or cancel.
    pub fn save(&mut self) -> Result<(), ExportError> {
        let crop = self.export_crop()?;
        self.handler.on_save(&crop.data_uri());
        self.close();
        Ok(())
    }

    /// End the session. Safe to call more than once.
    pub fn close(&mut self) {
        if self.surface.take().is_none() {
            return;
        }
        // Invalidate any load still in flight
        self.generation += 1;
        debug!("closed avatar editor session");
        self.handler.on_close();
    }
}

impl<H: SessionHandler> Drop for EditorSession<H> {
    fn drop(&mut self) {
        self.close();
    }
}
