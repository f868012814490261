use crate::encode::sink::{AudioInputConfig, FrameSink, SinkConfig};
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{ShotreelError, ShotreelResult};
use crate::foundation::time::CancelToken;
use crate::render::canvas::{CanvasOptions, CanvasRenderer};
use crate::render::surface::{DrawSurface, FrameRGBA, OffscreenCanvas};
use crate::timeline::shot::Timeline;

/// Summary of a finished export.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportStats {
    pub frames: u64,
    pub duration_ms: u64,
}

/// Walks every frame of a timeline at a fixed rate, with no dependency on the wall clock.
#[derive(Debug)]
pub struct ExportDriver<'a> {
    timeline: &'a Timeline,
    renderer: CanvasRenderer,
    fps: Fps,
}

impl<'a> ExportDriver<'a> {
    pub fn new(timeline: &'a Timeline, canvas: Canvas, fps: Fps) -> Self {
        Self {
            timeline,
            renderer: CanvasRenderer::new(canvas, fps),
            fps,
        }
    }

    pub fn total_frames(&self) -> u64 {
        self.fps.frames_covering_ms(self.timeline.duration())
    }

    /// Render the frame shown at absolute time `t_ms`.
    pub fn frame_at_time(&self, t_ms: f64, opts: &mut CanvasOptions) -> ShotreelResult<FrameRGBA> {
        let (idx, elapsed) = self.timeline.shot_at(t_ms).ok_or_else(|| {
            ShotreelError::validation(format!(
                "time {t_ms} ms is outside the timeline (0..{} ms)",
                self.timeline.duration()
            ))
        })?;
        self.renderer
            .render_frame(&self.timeline.shots[idx], elapsed, opts)
    }

    pub fn frame_at(&self, frame: FrameIndex, opts: &mut CanvasOptions) -> ShotreelResult<FrameRGBA> {
        self.frame_at_time(self.fps.frame_to_ms(frame), opts)
    }

    /// Render every frame into `sink`.
    ///
    /// Any failure or cancellation aborts the sink, so no partial artifact is left behind.
    #[tracing::instrument(skip_all, fields(shots = self.timeline.len()))]
    pub fn run(
        &self,
        sink: &mut dyn FrameSink,
        audio: Option<AudioInputConfig>,
        cancel: &CancelToken,
    ) -> ShotreelResult<ExportStats> {
        if self.timeline.is_empty() {
            return Err(ShotreelError::EmptyTimeline);
        }
        let canvas = self.renderer.canvas();
        let total_frames = self.total_frames();
        sink.begin(SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps: self.fps,
            total_frames,
            audio,
        })?;

        if let Err(e) = self.push_all(sink, total_frames, cancel) {
            tracing::warn!(error = %e, "export failed, discarding output");
            sink.abort();
            return Err(e);
        }
        if let Err(e) = sink.end() {
            sink.abort();
            return Err(e);
        }

        let stats = ExportStats {
            frames: total_frames,
            duration_ms: self.timeline.duration(),
        };
        tracing::info!(frames = stats.frames, duration_ms = stats.duration_ms, "export finished");
        Ok(stats)
    }

    fn push_all(
        &self,
        sink: &mut dyn FrameSink,
        total_frames: u64,
        cancel: &CancelToken,
    ) -> ShotreelResult<()> {
        let mut opts = CanvasOptions::default();
        let mut surface = OffscreenCanvas::new(self.renderer.canvas());
        for f in 0..total_frames {
            if cancel.is_cancelled() {
                return Err(ShotreelError::Cancelled);
            }
            let t_ms = self.fps.frame_to_ms(FrameIndex(f));
            let Some((idx, elapsed)) = self.timeline.shot_at(t_ms) else {
                break;
            };
            self.renderer
                .render(&self.timeline.shots[idx], elapsed, &mut opts, &mut surface)?;
            sink.push_frame(FrameIndex(f), surface.frame())?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/export.rs"]
mod tests;
