use std::path::PathBuf;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ShotreelError, ShotreelResult};
use crate::render::surface::FrameRGBA;

/// Configuration provided to a [`FrameSink`] at the start of an export.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Number of frames that will be pushed.
    pub total_frames: u64,
    /// Optional external raw PCM audio file input.
    pub audio: Option<AudioInputConfig>,
}

/// Raw PCM audio input configuration for sinks that support audio encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioInputConfig {
    /// Path to interleaved `f32le` PCM data.
    pub path: PathBuf,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Sink contract for consuming rendered frames in timeline order.
///
/// `push_frame` is called in strictly increasing `FrameIndex` order. An export either ends with
/// `end`, after which the artifact is complete, or with `abort`, after which nothing it produced
/// may remain visible.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> ShotreelResult<()>;
    /// Push one frame in strictly increasing timeline order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ShotreelResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> ShotreelResult<()>;
    /// Discard everything pushed since `begin`.
    fn abort(&mut self);
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    pending: Vec<(FrameIndex, FrameRGBA)>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    finished: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Frames of the last completed export.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ShotreelResult<()> {
        self.cfg = Some(cfg);
        self.pending.clear();
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ShotreelResult<()> {
        if self.cfg.is_none() {
            return Err(ShotreelError::encode("in-memory sink not started"));
        }
        if let Some((last, _)) = self.pending.last()
            && idx.0 <= last.0
        {
            return Err(ShotreelError::encode("out-of-order frame index"));
        }
        self.pending.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> ShotreelResult<()> {
        if self.cfg.is_none() {
            return Err(ShotreelError::encode("in-memory sink not started"));
        }
        self.frames = std::mem::take(&mut self.pending);
        self.finished = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.pending.clear();
        self.frames.clear();
        self.finished = false;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
