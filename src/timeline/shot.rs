use std::sync::Arc;

use crate::assets::fetched::FetchedFile;
use crate::timeline::acoustic::AcousticEnv;
use crate::timeline::duration::{ShotDuration, VoiceSlot, voice_offsets};
use crate::timeline::envelope::{TimelineWarning, ZoomEnvelope, clamp_fades};

/// A resolved voice line.
#[derive(Clone, Debug)]
pub struct VoiceLine {
    pub file: Arc<FetchedFile>,
    pub offset_ms: Option<u64>,
    pub character_id: Option<String>,
    pub region: Option<Vec<f64>>,
}

impl VoiceLine {
    pub fn new(file: Arc<FetchedFile>) -> Self {
        Self {
            file,
            offset_ms: None,
            character_id: None,
            region: None,
        }
    }

    pub fn len_ms(&self) -> u64 {
        self.file.duration_ms().unwrap_or(0)
    }
}

/// The resolved, timed unit consumed by the renderer and the mixer.
#[derive(Clone, Debug)]
pub struct FetchedShot {
    pub scene_idx: usize,
    pub shot_idx: usize,
    pub music: Option<Arc<FetchedFile>>,
    pub sound: Option<Arc<FetchedFile>>,
    pub voice: Vec<VoiceLine>,
    pub acoustic_env: Option<AcousticEnv>,
    pub image: Arc<FetchedFile>,
    pub video_frames: Option<Arc<FetchedFile>>,
    pub duration: u64,
    pub starting_time: u64,
    pub fade_in: u64,
    pub fade_out: u64,
    pub zoom_start: f64,
    pub zoom_end: f64,
    /// Entered through a hard black cut instead of a cross-fade.
    pub has_black_fading: bool,
    pub previous_image: Option<Arc<FetchedFile>>,
    /// Frames of the previous shot when it is a video; the cross-fade enters over its last frame.
    pub previous_video_frames: Option<Arc<FetchedFile>>,
    /// Scale the previous shot ended at.
    pub previous_zoom_end: f64,
    /// Target of the outgoing cross-fade; linked by [`Timeline::from_shots`].
    pub next_image: Option<Arc<FetchedFile>>,
    pub next_video_frames: Option<Arc<FetchedFile>>,
    pub next_zoom_start: f64,
}

impl FetchedShot {
    /// A still shot with no audio, no fades and a flat zoom.
    pub fn still(scene_idx: usize, shot_idx: usize, image: Arc<FetchedFile>, duration: u64) -> Self {
        Self {
            scene_idx,
            shot_idx,
            music: None,
            sound: None,
            voice: Vec::new(),
            acoustic_env: None,
            image,
            video_frames: None,
            duration,
            starting_time: 0,
            fade_in: 0,
            fade_out: 0,
            zoom_start: 1.0,
            zoom_end: 1.0,
            has_black_fading: false,
            previous_image: None,
            previous_video_frames: None,
            previous_zoom_end: 1.0,
            next_image: None,
            next_video_frames: None,
            next_zoom_start: 1.0,
        }
    }

    pub fn zoom(&self) -> ZoomEnvelope {
        ZoomEnvelope {
            start: self.zoom_start,
            end: self.zoom_end,
        }
    }

    pub fn end_time(&self) -> u64 {
        self.starting_time + self.duration
    }

    pub fn voice_slots(&self) -> Vec<VoiceSlot> {
        self.voice
            .iter()
            .map(|v| VoiceSlot {
                len_ms: v.len_ms(),
                offset_ms: v.offset_ms,
            })
            .collect()
    }

    /// Start of each voice line relative to the shot start.
    pub fn voice_offsets(&self) -> Vec<u64> {
        voice_offsets(&self.voice_slots())
    }

    pub fn duration_summary(&self) -> ShotDuration {
        ShotDuration {
            scene_idx: self.scene_idx,
            shot_idx: self.shot_idx,
            starting_time: self.starting_time,
            duration: self.duration,
            dialogs: self.voice_offsets(),
        }
    }
}

/// Ordered shots on one absolute clock.
#[derive(Clone, Debug, Default)]
pub struct Timeline {
    pub shots: Vec<FetchedShot>,
    pub warnings: Vec<TimelineWarning>,
}

impl Timeline {
    /// Normalize hand-built or freshly resolved shots.
    ///
    /// Recomputes every `starting_time` as the running sum of durations and zeroes the fades on
    /// both sides of a black cut. Any other boundary gets one window shared by both shots, shrunk
    /// until it fits either of them. Each shot is then linked to what its neighbours draw.
    pub fn from_shots(mut shots: Vec<FetchedShot>) -> Self {
        let mut warnings = Vec::new();

        for i in 1..shots.len() {
            let w = if shots[i].has_black_fading {
                0
            } else {
                shots[i - 1].fade_out.max(shots[i].fade_in)
            };
            shots[i - 1].fade_out = w;
            shots[i].fade_in = w;
        }

        let mut t = 0u64;
        for shot in &mut shots {
            shot.starting_time = t;
            t += shot.duration;

            let (fades, clamped) = clamp_fades(shot.fade_in, shot.fade_out, shot.duration);
            if clamped {
                tracing::warn!(
                    scene_idx = shot.scene_idx,
                    shot_idx = shot.shot_idx,
                    fade_in = shot.fade_in,
                    fade_out = shot.fade_out,
                    duration = shot.duration,
                    "fades exceed shot duration, clamped"
                );
                warnings.push(TimelineWarning::FadesClamped {
                    scene_idx: shot.scene_idx,
                    shot_idx: shot.shot_idx,
                    fade_in: shot.fade_in,
                    fade_out: shot.fade_out,
                    duration: shot.duration,
                });
            }
            shot.fade_in = fades.fade_in;
            shot.fade_out = fades.fade_out;
        }

        // Clamping only shrinks, so taking the smaller side keeps every shot within its duration.
        for i in 1..shots.len() {
            let w = shots[i - 1].fade_out.min(shots[i].fade_in);
            shots[i - 1].fade_out = w;
            shots[i].fade_in = w;
        }

        for i in 0..shots.len() {
            let (next_image, next_video_frames, next_zoom_start) = match shots.get(i + 1) {
                Some(next) if !next.has_black_fading => (
                    Some(next.image.clone()),
                    next.video_frames.clone(),
                    next.zoom_start,
                ),
                _ => (None, None, 1.0),
            };
            shots[i].next_image = next_image;
            shots[i].next_video_frames = next_video_frames;
            shots[i].next_zoom_start = next_zoom_start;

            if i > 0 {
                shots[i].previous_zoom_end = shots[i - 1].zoom_end;
                if !shots[i].has_black_fading {
                    if shots[i].previous_image.is_none() {
                        shots[i].previous_image = Some(shots[i - 1].image.clone());
                    }
                    shots[i].previous_video_frames = shots[i - 1].video_frames.clone();
                }
            }
        }

        Self { shots, warnings }
    }

    pub fn is_empty(&self) -> bool {
        self.shots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.shots.len()
    }

    /// Sum of all shot durations.
    pub fn duration(&self) -> u64 {
        self.shots.last().map(FetchedShot::end_time).unwrap_or(0)
    }

    /// Shot playing at absolute time `t_ms` and the time elapsed within it.
    pub fn shot_at(&self, t_ms: f64) -> Option<(usize, f64)> {
        if t_ms.is_nan() || t_ms < 0.0 || t_ms >= self.duration() as f64 {
            return None;
        }
        let idx = self
            .shots
            .partition_point(|s| s.starting_time as f64 <= t_ms)
            .checked_sub(1)?;
        let shot = &self.shots[idx];
        Some((idx, t_ms - shot.starting_time as f64))
    }

    pub fn shot_durations(&self) -> Vec<ShotDuration> {
        self.shots.iter().map(FetchedShot::duration_summary).collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/shot.rs"]
mod tests;
