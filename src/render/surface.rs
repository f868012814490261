use std::path::Path;

use anyhow::Context;

use crate::foundation::core::Canvas;
use crate::foundation::error::{ShotreelError, ShotreelResult};
use crate::render::composite::{OPAQUE_BLACK, PremulRgba8, fill};

/// One rendered frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    pub fn black(canvas: Canvas) -> Self {
        let mut data = vec![0u8; canvas.pixel_len()];
        fill(&mut data, OPAQUE_BLACK);
        Self {
            width: canvas.width,
            height: canvas.height,
            data,
            premultiplied: true,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<PremulRgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn is_uniform(&self, px: PremulRgba8) -> bool {
        self.data.chunks_exact(4).all(|p| p == px)
    }

    pub fn is_black(&self) -> bool {
        self.is_uniform(OPAQUE_BLACK)
    }

    /// Straight-alpha copy for encoders and image files.
    pub fn to_straight_rgba(&self) -> Vec<u8> {
        if !self.premultiplied {
            return self.data.clone();
        }
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            let a = u32::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }

    pub fn save_png(&self, path: &Path) -> ShotreelResult<()> {
        let img = image::RgbaImage::from_raw(self.width, self.height, self.to_straight_rgba())
            .ok_or_else(|| ShotreelError::validation("frame buffer does not match its size"))?;
        img.save(path)
            .with_context(|| format!("write frame png '{}'", path.display()))?;
        Ok(())
    }
}

/// Drawing target shared by live preview and offscreen export.
pub trait DrawSurface {
    fn canvas(&self) -> Canvas;

    /// Whether the surface is attached to a live display.
    fn is_live(&self) -> bool;

    fn frame_mut(&mut self) -> &mut FrameRGBA;

    /// The last drawn frame.
    fn frame(&self) -> &FrameRGBA;

    /// Publish the frame drawn since the previous call.
    fn present(&mut self) -> ShotreelResult<()>;
}

/// Surface without a display, used for export and thumbnails.
#[derive(Clone, Debug)]
pub struct OffscreenCanvas {
    canvas: Canvas,
    frame: FrameRGBA,
}

impl OffscreenCanvas {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            frame: FrameRGBA::black(canvas),
        }
    }

    pub fn into_frame(self) -> FrameRGBA {
        self.frame
    }
}

impl DrawSurface for OffscreenCanvas {
    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn is_live(&self) -> bool {
        false
    }

    fn frame_mut(&mut self) -> &mut FrameRGBA {
        &mut self.frame
    }

    fn frame(&self) -> &FrameRGBA {
        &self.frame
    }

    fn present(&mut self) -> ShotreelResult<()> {
        Ok(())
    }
}

pub type Presenter = Box<dyn FnMut(&FrameRGBA) -> ShotreelResult<()> + Send>;

/// Surface backed by a display; every presented frame is handed to `presenter`.
pub struct LiveCanvas {
    canvas: Canvas,
    frame: FrameRGBA,
    presenter: Presenter,
    presented: u64,
}

impl std::fmt::Debug for LiveCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveCanvas")
            .field("canvas", &self.canvas)
            .field("presented", &self.presented)
            .finish()
    }
}

impl LiveCanvas {
    pub fn new(canvas: Canvas, presenter: Presenter) -> Self {
        Self {
            canvas,
            frame: FrameRGBA::black(canvas),
            presenter,
            presented: 0,
        }
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl DrawSurface for LiveCanvas {
    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn is_live(&self) -> bool {
        true
    }

    fn frame_mut(&mut self) -> &mut FrameRGBA {
        &mut self.frame
    }

    fn frame(&self) -> &FrameRGBA {
        &self.frame
    }

    fn present(&mut self) -> ShotreelResult<()> {
        (self.presenter)(&self.frame)?;
        self.presented += 1;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
