use std::path::Path;

use anyhow::Context;

use crate::audio::manifest::{AudioManifest, AudioSegment, build_audio_manifest};
use crate::foundation::error::ShotreelResult;
use crate::session::opts::Volume;
use crate::timeline::shot::Timeline;

/// Mixed timeline audio, interleaved `f32`.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioTrack {
    pub sample_rate: u32,
    pub channels: u16,
    pub interleaved_f32: Vec<f32>,
}

impl AudioTrack {
    pub fn frames(&self) -> usize {
        self.interleaved_f32.len() / usize::from(self.channels.max(1))
    }

    pub fn duration_ms(&self) -> u64 {
        (self.frames() as u64 * 1000) / u64::from(self.sample_rate.max(1))
    }

    /// Peak absolute level in `[start_ms, end_ms)`, over all channels.
    pub fn peak_between(&self, start_ms: u64, end_ms: u64) -> f32 {
        let ch = usize::from(self.channels.max(1));
        let at = |ms: u64| {
            ((ms * u64::from(self.sample_rate) / 1000) as usize * ch).min(self.interleaved_f32.len())
        };
        self.interleaved_f32[at(start_ms)..at(end_ms).max(at(start_ms))]
            .iter()
            .fold(0.0f32, |m, s| m.max(s.abs()))
    }
}

/// Mix the whole timeline into one track as long as the timeline.
#[tracing::instrument(skip_all, fields(shots = timeline.len()))]
pub fn mix(timeline: &Timeline, volume: &Volume) -> AudioTrack {
    let manifest = build_audio_manifest(timeline, volume);
    AudioTrack {
        sample_rate: manifest.sample_rate,
        channels: manifest.channels,
        interleaved_f32: mix_manifest(&manifest),
    }
}

/// Mix all manifest segments into interleaved output PCM.
pub fn mix_manifest(manifest: &AudioManifest) -> Vec<f32> {
    let frames = manifest.total_samples as usize;
    let mut out = vec![0.0f32; frames * usize::from(manifest.channels)];

    for seg in &manifest.segments {
        mix_segment(&mut out, manifest, seg);
    }

    for s in &mut out {
        *s = s.clamp(-1.0, 1.0);
    }
    out
}

fn mix_segment(out: &mut [f32], manifest: &AudioManifest, seg: &AudioSegment) {
    let end = seg.timeline_end_sample.min(manifest.total_samples);
    let seg_len_samples = end.saturating_sub(seg.timeline_start_sample);
    if seg_len_samples == 0 || seg.source_channels == 0 {
        return;
    }

    let src = seg.source_interleaved_f32.as_ref();
    let src_frames = src.len() / usize::from(seg.source_channels);
    if src_frames == 0 {
        return;
    }

    for dst_sample in seg.timeline_start_sample..end {
        let rel_sample = dst_sample - seg.timeline_start_sample;
        let rel_sec = (rel_sample as f64) / f64::from(manifest.sample_rate);

        let mut src_pos = (seg.source_start_sec + rel_sec) * f64::from(seg.source_sample_rate);
        if !src_pos.is_finite() || src_pos < 0.0 {
            break;
        }
        if seg.looped {
            src_pos %= src_frames as f64;
        }
        let src_frame0 = src_pos.floor() as usize;
        if src_frame0 >= src_frames {
            break;
        }
        let src_frame1 = if seg.looped {
            (src_frame0 + 1) % src_frames
        } else {
            (src_frame0 + 1).min(src_frames - 1)
        };
        let frac = (src_pos - src_frame0 as f64) as f32;

        let gain = fade_gain(seg, rel_sec, seg_len_samples, manifest.sample_rate) * seg.volume;
        let dst_idx = dst_sample as usize * usize::from(manifest.channels);

        let (l, r) = if seg.source_channels == 1 {
            let v0 = src[src_frame0];
            let v1 = src[src_frame1];
            let v = v0 + ((v1 - v0) * frac);
            (v, v)
        } else {
            let i0 = src_frame0 * usize::from(seg.source_channels);
            let i1 = src_frame1 * usize::from(seg.source_channels);
            let l0 = src[i0];
            let l1 = src[i1];
            let r0 = src[i0 + 1];
            let r1 = src[i1 + 1];
            (l0 + ((l1 - l0) * frac), r0 + ((r1 - r0) * frac))
        };

        out[dst_idx] += l * gain;
        if manifest.channels > 1 {
            out[dst_idx + 1] += r * gain;
        }
    }
}

fn fade_gain(seg: &AudioSegment, rel_sec: f64, seg_len_samples: u64, sample_rate: u32) -> f32 {
    let mut gain = 1.0f32;
    if seg.fade_in_sec > 0.0 {
        let t = (rel_sec / seg.fade_in_sec).clamp(0.0, 1.0) as f32;
        gain *= t;
    }
    if seg.fade_out_sec > 0.0 {
        let seg_len_sec = (seg_len_samples as f64) / f64::from(sample_rate);
        let rem = (seg_len_sec - rel_sec).max(0.0);
        let t = (rem / seg.fade_out_sec).clamp(0.0, 1.0) as f32;
        gain *= t;
    }
    gain
}

/// Write interleaved `f32` PCM samples to raw little-endian `.f32le` file.
pub fn write_mix_to_f32le_file(samples_interleaved: &[f32], out_path: &Path) -> ShotreelResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!(
                "failed to create audio mix output directory '{}'",
                parent.display()
            )
        })?;
    }

    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes)
        .with_context(|| format!("failed to write mixed audio file '{}'", out_path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
