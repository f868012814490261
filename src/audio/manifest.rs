use std::sync::Arc;

use crate::assets::fetched::FetchedFile;
use crate::assets::media::MIX_SAMPLE_RATE;
use crate::session::opts::Volume;
use crate::timeline::shot::{FetchedShot, Timeline};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackKind {
    Music,
    Ambient,
    Voice,
    Echo,
}

#[derive(Clone, Debug)]
/// One scheduled audio contribution in timeline sample space.
pub struct AudioSegment {
    pub kind: TrackKind,
    pub timeline_start_sample: u64,
    pub timeline_end_sample: u64,
    pub source_start_sec: f64,
    /// Wrap around to the source start instead of stopping at its end.
    pub looped: bool,
    pub volume: f32,
    pub fade_in_sec: f64,
    pub fade_out_sec: f64,
    pub source_sample_rate: u32,
    pub source_channels: u16,
    pub source_interleaved_f32: Arc<Vec<f32>>,
}

#[derive(Clone, Debug)]
/// Audio rendering plan for a whole timeline.
pub struct AudioManifest {
    pub sample_rate: u32,
    pub channels: u16,
    pub total_samples: u64,
    pub segments: Vec<AudioSegment>,
}

pub fn ms_to_sample(ms: u64, sample_rate: u32) -> u64 {
    ((u128::from(ms) * u128::from(sample_rate) + 500) / 1000) as u64
}

/// Consecutive shots sharing one bed asset.
struct Run {
    file: Arc<FetchedFile>,
    start_ms: u64,
    end_ms: u64,
    fade_in_ms: u64,
    fade_out_ms: u64,
}

fn same_file(a: &FetchedFile, b: &FetchedFile) -> bool {
    std::ptr::eq(a, b) || a.key() == b.key()
}

/// Group shots into runs of the same bed asset (music or ambient sound).
///
/// Adjacent runs overlap by the boundary fade window, centered on the boundary, so the beds
/// cross-fade. The first run fades in and the last fades out over the edge shots' fades.
fn bed_runs(
    shots: &[FetchedShot],
    pick: impl Fn(&FetchedShot) -> Option<&Arc<FetchedFile>>,
) -> Vec<Run> {
    let mut runs: Vec<(Arc<FetchedFile>, usize, usize)> = Vec::new();
    let mut current: Option<(Arc<FetchedFile>, usize, usize)> = None;
    for (i, shot) in shots.iter().enumerate() {
        let file = pick(shot);
        if let (Some(file), Some((cur, _, last))) = (file, current.as_mut())
            && same_file(cur, file)
        {
            *last = i;
            continue;
        }
        runs.extend(current.take());
        current = file.map(|f| (f.clone(), i, i));
    }
    runs.extend(current);

    let total = shots.last().map(FetchedShot::end_time).unwrap_or(0);
    runs.into_iter()
        .map(|(file, first, last)| {
            let head = &shots[first];
            let tail = &shots[last];
            let (start_ms, fade_in_ms) = if first == 0 || head.has_black_fading {
                (head.starting_time, head.fade_in)
            } else {
                let w = head.fade_in;
                (head.starting_time.saturating_sub(w / 2), w)
            };
            let next_is_cut = shots.get(last + 1).is_none_or(|n| n.has_black_fading);
            let (end_ms, fade_out_ms) = if next_is_cut {
                (tail.end_time(), tail.fade_out)
            } else {
                let w = tail.fade_out;
                ((tail.end_time() + w / 2).min(total), w)
            };
            Run {
                file,
                start_ms,
                end_ms,
                fade_in_ms,
                fade_out_ms,
            }
        })
        .collect()
}

fn bed_segments(
    runs: Vec<Run>,
    kind: TrackKind,
    volume: f32,
    sample_rate: u32,
) -> Vec<AudioSegment> {
    runs.into_iter()
        .filter_map(|run| {
            let audio = run.file.as_audio()?;
            let len_ms = audio.duration_ms();
            if len_ms == 0 || run.end_ms <= run.start_ms {
                return None;
            }
            Some(AudioSegment {
                kind,
                timeline_start_sample: ms_to_sample(run.start_ms, sample_rate),
                timeline_end_sample: ms_to_sample(run.end_ms, sample_rate),
                source_start_sec: (run.start_ms % len_ms) as f64 / 1000.0,
                looped: true,
                volume,
                fade_in_sec: run.fade_in_ms as f64 / 1000.0,
                fade_out_sec: run.fade_out_ms as f64 / 1000.0,
                source_sample_rate: audio.sample_rate,
                source_channels: audio.channels,
                source_interleaved_f32: audio.interleaved_f32.clone(),
            })
        })
        .collect()
}

fn voice_segments(
    shot: &FetchedShot,
    volume: f32,
    sample_rate: u32,
    total_samples: u64,
) -> Vec<AudioSegment> {
    let mut out = Vec::new();
    for (line, offset) in shot.voice.iter().zip(shot.voice_offsets()) {
        let Some(audio) = line.file.as_audio() else {
            continue;
        };
        let start_ms = shot.starting_time + offset;
        let len_ms = audio.duration_ms();
        let seg = |kind, delay_ms: u64, gain: f32| AudioSegment {
            kind,
            timeline_start_sample: ms_to_sample(start_ms + delay_ms, sample_rate),
            timeline_end_sample: ms_to_sample(start_ms + delay_ms + len_ms, sample_rate)
                .min(total_samples),
            source_start_sec: 0.0,
            looped: false,
            volume: volume * gain,
            fade_in_sec: 0.0,
            fade_out_sec: 0.0,
            source_sample_rate: audio.sample_rate,
            source_channels: audio.channels,
            source_interleaved_f32: audio.interleaved_f32.clone(),
        };

        match shot.acoustic_env {
            Some(env) => {
                let tap = env.echo();
                out.push(seg(TrackKind::Voice, 0, env.dry_level()));
                out.push(seg(TrackKind::Echo, tap.delay_ms, tap.level));
            }
            None => out.push(seg(TrackKind::Voice, 0, 1.0)),
        }
    }
    out
}

/// Schedule music, ambient and voice contributions on the timeline clock.
pub fn build_audio_manifest(timeline: &Timeline, volume: &Volume) -> AudioManifest {
    let sample_rate = MIX_SAMPLE_RATE;
    let total_samples = ms_to_sample(timeline.duration(), sample_rate);

    let mut segments = Vec::new();
    segments.extend(bed_segments(
        bed_runs(&timeline.shots, |s| s.music.as_ref()),
        TrackKind::Music,
        volume.music,
        sample_rate,
    ));
    segments.extend(bed_segments(
        bed_runs(&timeline.shots, |s| s.sound.as_ref()),
        TrackKind::Ambient,
        volume.sound,
        sample_rate,
    ));
    for shot in &timeline.shots {
        segments.extend(voice_segments(shot, volume.voice, sample_rate, total_samples));
    }
    segments.retain(|s| s.timeline_end_sample > s.timeline_start_sample);

    tracing::debug!(
        segments = segments.len(),
        total_samples,
        "built audio manifest"
    );
    AudioManifest {
        sample_rate,
        channels: 2,
        total_samples,
        segments,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/manifest.rs"]
mod tests;
