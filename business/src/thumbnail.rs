//! Upload preview: decode a selected file in memory and draw it scaled onto a
//! fixed-size surface.
//!
//! Rendering is split in three steps so the decode can run off the controller:
//! 1. [`ThumbnailRenderer::begin`] clears the surface and issues a ticket
//! 2. [`ThumbnailRenderer::decode`] decodes the ticket's bytes on a blocking thread
//! 3. [`ThumbnailRenderer::finish`] draws the result if the ticket is still current
//!
//! A ticket goes stale as soon as another file is selected or the surface is
//! cleared, and a stale decode is dropped instead of drawn.

use image::imageops::FilterType;
use image::{DynamicImage, Rgba, RgbaImage};

use hannou_input::LocalFile;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThumbnailError {
    #[error("failed to decode {name}: {message}")]
    Decode { name: String, message: String },
    #[error("failed to encode preview: {0}")]
    Encode(String),
}

/// Fixed-size RGBA drawing surface.
#[derive(Debug, Clone)]
pub struct PreviewCanvas {
    image: RgbaImage,
}

impl PreviewCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width.max(1), height.max(1)),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Resets every pixel to transparent.
    pub fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }

    pub fn is_blank(&self) -> bool {
        self.image.pixels().all(|p| p.0[3] == 0)
    }

    /// Draws `source` stretched over the whole surface.
    pub fn draw_scaled(&mut self, source: &DynamicImage) {
        self.image = image::imageops::resize(
            &source.to_rgba8(),
            self.width(),
            self.height(),
            FilterType::Triangle,
        );
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.image
    }

    /// PNG snapshot of the surface.
    pub fn to_png(&self) -> Result<Vec<u8>, ThumbnailError> {
        let mut cursor = std::io::Cursor::new(Vec::new());
        self.image
            .write_to(&mut cursor, image::ImageFormat::Png)
            .map_err(|e| ThumbnailError::Encode(e.to_string()))?;
        Ok(cursor.into_inner())
    }
}

/// A pending render of one selected file.
#[derive(Debug, Clone)]
pub struct RenderTicket {
    generation: u64,
    file: LocalFile,
}

impl RenderTicket {
    pub fn file(&self) -> &LocalFile {
        &self.file
    }
}

/// Result of decoding a ticket, ready for [`ThumbnailRenderer::finish`].
#[derive(Debug)]
pub struct DecodedThumbnail {
    generation: u64,
    result: Result<DynamicImage, ThumbnailError>,
}

/// Owns the preview surface and tracks which selection it belongs to.
#[derive(Debug, Clone)]
pub struct ThumbnailRenderer {
    canvas: PreviewCanvas,
    generation: u64,
}

impl ThumbnailRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: PreviewCanvas::new(width, height),
            generation: 0,
        }
    }

    pub fn canvas(&self) -> &PreviewCanvas {
        &self.canvas
    }

    /// Starts rendering `file`: the previous frame is cleared right away and
    /// any decode still in flight becomes stale.
    pub fn begin(&mut self, file: &LocalFile) -> RenderTicket {
        self.generation += 1;
        self.canvas.clear();
        RenderTicket {
            generation: self.generation,
            file: file.clone(),
        }
    }

    /// Decodes the ticket's bytes without touching the renderer.
    pub async fn decode(ticket: RenderTicket) -> DecodedThumbnail {
        let RenderTicket { generation, file } = ticket;
        let name = file.name.clone();

        let result = tokio::task::spawn_blocking(move || {
            image::load_from_memory(&file.bytes).map_err(|e| ThumbnailError::Decode {
                name: file.name.clone(),
                message: e.to_string(),
            })
        })
        .await
        .unwrap_or_else(|e| {
            Err(ThumbnailError::Decode {
                name,
                message: e.to_string(),
            })
        });

        DecodedThumbnail { generation, result }
    }

    /// Draws a decoded image. Returns `true` if the surface changed.
    ///
    /// Stale results are dropped; decode failures leave the surface blank and
    /// are only logged.
    pub fn finish(&mut self, decoded: DecodedThumbnail) -> bool {
        if decoded.generation != self.generation {
            log::debug!(
                target: "hannou_business::thumbnail",
                "dropping stale thumbnail generation={} current={}",
                decoded.generation,
                self.generation
            );
            return false;
        }

        match decoded.result {
            Ok(image) => {
                self.canvas.draw_scaled(&image);
                true
            }
            Err(e) => {
                log::warn!(target: "hannou_business::thumbnail", "{e}");
                false
            }
        }
    }

    /// Begins, decodes and finishes in one go.
    pub async fn render(&mut self, file: &LocalFile) -> bool {
        let ticket = self.begin(file);
        let decoded = Self::decode(ticket).await;
        self.finish(decoded)
    }

    /// Blanks the surface and invalidates in-flight decodes.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.canvas.clear();
    }
}
