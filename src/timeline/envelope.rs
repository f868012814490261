use serde::{Deserialize, Serialize};

use crate::foundation::error::{ShotreelError, ShotreelResult};
use crate::foundation::math::lerp;
use crate::scene::model::ZoomDirection;

/// Non-fatal adjustment made while building a timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimelineWarning {
    /// A zoom factor was non-finite or non-positive and was replaced by 1.0.
    ZoomClamped {
        scene_idx: usize,
        shot_idx: usize,
        start: f64,
        end: f64,
    },
    /// Fade windows exceeded the shot duration and were shortened.
    FadesClamped {
        scene_idx: usize,
        shot_idx: usize,
        fade_in: u64,
        fade_out: u64,
        duration: u64,
    },
}

/// Linear scale envelope over a shot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoomEnvelope {
    pub start: f64,
    pub end: f64,
}

impl Default for ZoomEnvelope {
    fn default() -> Self {
        Self {
            start: 1.0,
            end: 1.0,
        }
    }
}

impl ZoomEnvelope {
    /// Scale at `elapsed_ms` into a shot of `duration_ms`.
    pub fn scale_at(self, elapsed_ms: f64, duration_ms: u64) -> f64 {
        if duration_ms == 0 {
            return self.end;
        }
        lerp(self.start, self.end, elapsed_ms / duration_ms as f64)
    }

    fn is_valid(self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.start > 0.0 && self.end > 0.0
    }
}

/// Envelope for an authored direction. `intensity` is the extra scale reached at the zoomed end.
pub fn zoom_envelope(direction: ZoomDirection, intensity: f64) -> ZoomEnvelope {
    let zoomed = 1.0 + intensity;
    match direction {
        ZoomDirection::In => ZoomEnvelope {
            start: 1.0,
            end: zoomed,
        },
        ZoomDirection::Out => ZoomEnvelope {
            start: zoomed,
            end: 1.0,
        },
        ZoomDirection::None => ZoomEnvelope::default(),
    }
}

/// Validate an envelope for one shot.
///
/// Invalid factors are replaced by 1.0 and reported, or rejected when `strict` is set.
pub fn check_zoom(
    env: ZoomEnvelope,
    scene_idx: usize,
    shot_idx: usize,
    strict: bool,
) -> ShotreelResult<(ZoomEnvelope, Option<TimelineWarning>)> {
    if env.is_valid() {
        return Ok((env, None));
    }
    if strict {
        return Err(ShotreelError::invalid_zoom_envelope(format!(
            "scene {scene_idx} shot {shot_idx}: zoom {} -> {} must be finite and positive",
            env.start, env.end
        )));
    }

    let fix = |v: f64| if v.is_finite() && v > 0.0 { v } else { 1.0 };
    let clamped = ZoomEnvelope {
        start: fix(env.start),
        end: fix(env.end),
    };
    tracing::warn!(
        scene_idx,
        shot_idx,
        start = env.start,
        end = env.end,
        "invalid zoom envelope, clamped to 1.0"
    );
    Ok((
        clamped,
        Some(TimelineWarning::ZoomClamped {
            scene_idx,
            shot_idx,
            start: env.start,
            end: env.end,
        }),
    ))
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fades {
    pub fade_in: u64,
    pub fade_out: u64,
}

/// Fade windows for consecutive shots.
///
/// `black_cut[i]` marks a hard cut into shot `i`. Every other boundary gets one symmetric window
/// `min(fade_ms, prev/2, next/2)`. The first shot fades in from black and the last fades out to
/// black over `min(fade_ms, duration/2)`.
pub fn assign_fades(durations: &[u64], black_cut: &[bool], fade_ms: u64) -> Vec<Fades> {
    let mut out = vec![Fades::default(); durations.len()];
    let (Some(&first), Some(&last)) = (durations.first(), durations.last()) else {
        return out;
    };

    out[0].fade_in = fade_ms.min(first / 2);
    let n = durations.len();
    out[n - 1].fade_out = fade_ms.min(last / 2);

    for i in 1..n {
        if black_cut.get(i).copied().unwrap_or(false) {
            out[i - 1].fade_out = 0;
            out[i].fade_in = 0;
            continue;
        }
        let w = fade_ms.min(durations[i - 1] / 2).min(durations[i] / 2);
        out[i - 1].fade_out = w;
        out[i].fade_in = w;
    }
    out
}

/// Shrink fades so `fade_in + fade_out <= duration`, keeping their ratio.
///
/// Returns the adjusted pair and whether anything changed.
pub fn clamp_fades(fade_in: u64, fade_out: u64, duration: u64) -> (Fades, bool) {
    let total = fade_in.saturating_add(fade_out);
    if total <= duration {
        return (Fades { fade_in, fade_out }, false);
    }
    let fade_in = ((u128::from(fade_in) * u128::from(duration)) / u128::from(total)) as u64;
    let fade_out = duration - fade_in;
    (Fades { fade_in, fade_out }, true)
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/envelope.rs"]
mod tests;
