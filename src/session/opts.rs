use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::assets::resolver::RetryPolicy;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ShotreelError, ShotreelResult};
use crate::session::access::Env;

/// Silence before the first and after the last line of a shot.
pub const SHOT_SPEECH_SILENCE_MS: u64 = 900;
/// Pause between consecutive dialog lines.
pub const SPEECH_SILENCE_SEPARATOR_MS: u64 = 200;
/// Interactive playback tick.
pub const INTERVAL_MS: u64 = 50;
/// Default export width; height follows the 16:9 ratio (288).
pub const DEFAULT_WIDTH: u32 = 512;

/// Per-bus gains applied by the mixer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    pub music: f32,
    pub sound: f32,
    pub voice: f32,
}

impl Default for Volume {
    fn default() -> Self {
        Self {
            music: 0.16,
            sound: 0.16,
            voice: 1.0,
        }
    }
}

/// Session configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatorOpts {
    pub env: Env,
    /// Render only this scene index.
    pub part: Option<usize>,
    /// Minimum shot length in milliseconds.
    pub shot_default_duration_ms: u64,
    pub fps: Fps,
    pub width: u32,
    pub volume: Volume,
    /// Cross-fade window in milliseconds (capped at half of each adjacent shot).
    pub fade_ms: u64,
    /// Ken-Burns zoom amount; a zoom-in shot goes from `1.0` to `1.0 + zoom_intensity`.
    pub zoom_intensity: f64,
    /// Fail on out-of-range envelopes instead of clamping them.
    pub strict_envelopes: bool,
    pub retry: RetryPolicy,
}

impl Default for CreatorOpts {
    fn default() -> Self {
        Self {
            env: Env::Export,
            part: None,
            shot_default_duration_ms: 3000,
            fps: Fps::default(),
            width: DEFAULT_WIDTH,
            volume: Volume::default(),
            fade_ms: 1000,
            zoom_intensity: 0.03,
            strict_envelopes: false,
            retry: RetryPolicy::default(),
        }
    }
}

impl CreatorOpts {
    pub fn from_json_str(s: &str) -> ShotreelResult<Self> {
        let opts: Self = serde_json::from_str(s).map_err(|e| ShotreelError::serde(e.to_string()))?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn from_path(path: &Path) -> ShotreelResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read options from '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> ShotreelResult<()> {
        Fps::new(self.fps.num, self.fps.den)?;
        Canvas::from_width(self.width)?;
        if !self.zoom_intensity.is_finite() {
            return Err(ShotreelError::validation("zoom_intensity must be finite"));
        }
        if self.retry.attempts == 0 {
            return Err(ShotreelError::validation("retry.attempts must be >= 1"));
        }
        Ok(())
    }

    pub fn canvas(&self) -> ShotreelResult<Canvas> {
        Canvas::from_width(self.width)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/opts.rs"]
mod tests;
