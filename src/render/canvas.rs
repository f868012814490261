use std::sync::Arc;

use crate::assets::fetched::{FetchedFile, PreparedImage};
use crate::foundation::core::{Affine, Canvas, Fps, Point};
use crate::foundation::error::{ShotreelError, ShotreelResult};
use crate::render::composite::{OPAQUE_BLACK, fill, over};
use crate::render::surface::{DrawSurface, FrameRGBA, OffscreenCanvas};
use crate::timeline::shot::FetchedShot;

/// Where a shot is within its own lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShotPhase {
    Entering,
    Steady,
    Exiting,
    Done,
}

/// State carried from one render call to the next.
#[derive(Clone, Debug)]
pub struct CanvasOptions {
    /// Animate zoom and transitions; when off, the poster frame is drawn.
    pub animate: bool,
    /// Image of the last settled shot and the scale it was last drawn at.
    pub old_image: Option<Arc<FetchedFile>>,
    pub old_scale: f64,
}

impl Default for CanvasOptions {
    fn default() -> Self {
        Self {
            animate: true,
            old_image: None,
            old_scale: 1.0,
        }
    }
}

impl CanvasOptions {
    pub fn poster() -> Self {
        Self {
            animate: false,
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Layer<'a> {
    image: &'a PreparedImage,
    scale: f64,
    opacity: f32,
}

/// What to draw for one frame, bottom to top over black.
#[derive(Debug)]
struct Plan<'a> {
    phase: ShotPhase,
    base: Option<Layer<'a>>,
    top: Option<Layer<'a>>,
    scale: f64,
}

/// Draws shots onto a 16:9 surface with Ken-Burns zoom and cross-fades.
///
/// A black cut holds pure black for one tick. The tick defaults to one frame interval, which is
/// what an export steps by; interactive playback sets it to its own tick with
/// [`CanvasRenderer::with_tick_ms`].
#[derive(Clone, Copy, Debug)]
pub struct CanvasRenderer {
    canvas: Canvas,
    fps: Fps,
    tick_ms: f64,
}

impl CanvasRenderer {
    pub fn new(canvas: Canvas, fps: Fps) -> Self {
        Self {
            canvas,
            fps,
            tick_ms: fps.frame_ms(),
        }
    }

    pub fn with_tick_ms(mut self, tick_ms: u64) -> Self {
        self.tick_ms = tick_ms as f64;
        self
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Draw `shot` at `elapsed_ms` into `surface` and present it.
    pub fn render(
        &self,
        shot: &FetchedShot,
        elapsed_ms: f64,
        opts: &mut CanvasOptions,
        surface: &mut dyn DrawSurface,
    ) -> ShotreelResult<ShotPhase> {
        if surface.canvas() != self.canvas {
            return Err(ShotreelError::validation(format!(
                "surface is {}x{}, renderer expects {}x{}",
                surface.canvas().width,
                surface.canvas().height,
                self.canvas.width,
                self.canvas.height
            )));
        }

        let plan = self.plan(shot, elapsed_ms.max(0.0), opts)?;
        let frame = surface.frame_mut();
        fill(&mut frame.data, OPAQUE_BLACK);
        for layer in [plan.base, plan.top].into_iter().flatten() {
            draw_cover(frame, layer.image, layer.scale, layer.opacity);
        }
        surface.present()?;

        if plan.phase != ShotPhase::Entering {
            opts.old_image = Some(shot.image.clone());
            opts.old_scale = plan.scale;
        }
        Ok(plan.phase)
    }

    /// Render one frame offscreen.
    pub fn render_frame(
        &self,
        shot: &FetchedShot,
        elapsed_ms: f64,
        opts: &mut CanvasOptions,
    ) -> ShotreelResult<FrameRGBA> {
        let mut surface = OffscreenCanvas::new(self.canvas);
        self.render(shot, elapsed_ms, opts, &mut surface)?;
        Ok(surface.into_frame())
    }

    fn plan<'a>(
        &self,
        shot: &'a FetchedShot,
        e: f64,
        opts: &CanvasOptions,
    ) -> ShotreelResult<Plan<'a>> {
        let current = current_source(shot, if opts.animate { e } else { 0.0 }, self.fps)?;

        if !opts.animate {
            return Ok(Plan {
                phase: ShotPhase::Steady,
                base: None,
                top: Some(Layer {
                    image: current,
                    scale: shot.zoom_start,
                    opacity: 1.0,
                }),
                scale: shot.zoom_start,
            });
        }

        let duration = shot.duration as f64;
        if e >= duration {
            let mut plan = self.animated(shot, current, duration, opts)?;
            plan.phase = ShotPhase::Done;
            return Ok(plan);
        }
        self.animated(shot, current, e, opts)
    }

    fn animated<'a>(
        &self,
        shot: &'a FetchedShot,
        current: &'a PreparedImage,
        e: f64,
        opts: &CanvasOptions,
    ) -> ShotreelResult<Plan<'a>> {
        let duration = shot.duration as f64;
        let scale = shot.zoom().scale_at(e, shot.duration);
        let full = |opacity: f32| Layer {
            image: current,
            scale,
            opacity,
        };

        if shot.has_black_fading && e < self.tick_ms {
            return Ok(Plan {
                phase: ShotPhase::Entering,
                base: None,
                top: None,
                scale,
            });
        }

        let fade_in = shot.fade_in as f64;
        if e < fade_in {
            let progress = e / fade_in;
            let previous = match &shot.previous_image {
                Some(prev) if !shot.has_black_fading => Some(prev),
                _ => None,
            };
            let plan = match previous {
                Some(prev) => {
                    let old_scale = match &opts.old_image {
                        Some(old) if Arc::ptr_eq(old, prev) && opts.old_scale > 0.0 => {
                            opts.old_scale
                        }
                        _ => shot.previous_zoom_end,
                    };
                    let image = match last_frame(shot.previous_video_frames.as_deref()) {
                        Some(frame) => frame,
                        None => image_of(prev)?,
                    };
                    Plan {
                        phase: ShotPhase::Entering,
                        base: Some(Layer {
                            image,
                            scale: old_scale,
                            opacity: 1.0,
                        }),
                        top: Some(full((0.5 + 0.5 * progress) as f32)),
                        scale,
                    }
                }
                None => Plan {
                    phase: ShotPhase::Entering,
                    base: None,
                    top: Some(full(progress as f32)),
                    scale,
                },
            };
            return Ok(plan);
        }

        let fade_out = shot.fade_out as f64;
        let exit_start = duration - fade_out;
        if fade_out > 0.0 && e >= exit_start {
            let progress = (e - exit_start) / fade_out;
            let plan = match &shot.next_image {
                Some(next) => Plan {
                    phase: ShotPhase::Exiting,
                    base: Some(Layer {
                        image: match first_frame(shot.next_video_frames.as_deref()) {
                            Some(frame) => frame,
                            None => image_of(next)?,
                        },
                        scale: shot.next_zoom_start,
                        opacity: 1.0,
                    }),
                    top: Some(full((1.0 - 0.5 * progress) as f32)),
                    scale,
                },
                None => Plan {
                    phase: ShotPhase::Exiting,
                    base: None,
                    top: Some(full((1.0 - progress) as f32)),
                    scale,
                },
            };
            return Ok(plan);
        }

        Ok(Plan {
            phase: ShotPhase::Steady,
            base: None,
            top: Some(full(1.0)),
            scale,
        })
    }
}

fn image_of(file: &FetchedFile) -> ShotreelResult<&PreparedImage> {
    file.as_image().ok_or_else(|| {
        ShotreelError::validation(format!("'{}' is not an image", file.filename))
    })
}

fn first_frame(video: Option<&FetchedFile>) -> Option<&PreparedImage> {
    video?.as_video_frames()?.first()
}

fn last_frame(video: Option<&FetchedFile>) -> Option<&PreparedImage> {
    video?.as_video_frames()?.last()
}

/// The shot's still image, or the video frame playing at `e`.
fn current_source(shot: &FetchedShot, e: f64, fps: Fps) -> ShotreelResult<&PreparedImage> {
    if let Some(frames) = shot.video_frames.as_ref().and_then(|v| v.as_video_frames())
        && let Some(last) = frames.len().checked_sub(1)
    {
        let idx = ((e * fps.as_f64() / 1000.0).floor().max(0.0) as usize).min(last);
        return Ok(&frames[idx]);
    }
    image_of(&shot.image)
}

/// Transform from image space to canvas space: centered, covering the canvas, then zoomed.
pub fn cover_transform(canvas: Canvas, image_w: u32, image_h: u32, zoom: f64) -> Affine {
    let cw = f64::from(canvas.width);
    let ch = f64::from(canvas.height);
    let iw = f64::from(image_w.max(1));
    let ih = f64::from(image_h.max(1));
    let cover = (cw / iw).max(ch / ih);
    Affine::translate((cw / 2.0, ch / 2.0))
        * Affine::scale(cover * zoom)
        * Affine::translate((-iw / 2.0, -ih / 2.0))
}

fn draw_cover(frame: &mut FrameRGBA, image: &PreparedImage, zoom: f64, opacity: f32) {
    if opacity <= 0.0 || image.width == 0 || image.height == 0 {
        return;
    }
    let canvas = Canvas {
        width: frame.width,
        height: frame.height,
    };
    let inv = cover_transform(canvas, image.width, image.height, zoom).inverse();
    let w = frame.width as usize;
    for (i, px) in frame.data.chunks_exact_mut(4).enumerate() {
        let x = (i % w) as f64 + 0.5;
        let y = (i / w) as f64 + 0.5;
        let src = sample_bilinear(image, inv * Point::new(x, y));
        let out = over([px[0], px[1], px[2], px[3]], src, opacity);
        px.copy_from_slice(&out);
    }
}

/// Bilinear sample at a continuous image-space position, clamped to the edges.
fn sample_bilinear(image: &PreparedImage, p: Point) -> [u8; 4] {
    let w = image.width as usize;
    let h = image.height as usize;
    let fx = (p.x - 0.5).clamp(0.0, (w - 1) as f64);
    let fy = (p.y - 0.5).clamp(0.0, (h - 1) as f64);
    let x0 = fx.floor() as usize;
    let y0 = fy.floor() as usize;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let tx = (fx - x0 as f64) as f32;
    let ty = (fy - y0 as f64) as f32;

    let px = |x: usize, y: usize| {
        let i = (y * w + x) * 4;
        &image.rgba8_premul[i..i + 4]
    };
    let (a, b, c, d) = (px(x0, y0), px(x1, y0), px(x0, y1), px(x1, y1));

    let mut out = [0u8; 4];
    for k in 0..4 {
        let top = f32::from(a[k]) + (f32::from(b[k]) - f32::from(a[k])) * tx;
        let bottom = f32::from(c[k]) + (f32::from(d[k]) - f32::from(c[k])) * tx;
        out[k] = (top + (bottom - top) * ty).round().clamp(0.0, 255.0) as u8;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/canvas.rs"]
mod tests;
