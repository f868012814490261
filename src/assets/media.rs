//! `ffmpeg`/`ffprobe` helpers for media the pure-Rust decoders cannot handle.
//!
//! Gated behind the `media-ffmpeg` feature; without it, non-WAV audio and video shots fail to
//! resolve with a descriptive error.

use crate::assets::fetched::{PreparedAudio, PreparedImage};
use crate::foundation::core::Fps;

/// Sample rate of the mixed output and of ffmpeg-decoded audio.
pub const MIX_SAMPLE_RATE: u32 = 48_000;

#[cfg(feature = "media-ffmpeg")]
mod imp {
    use std::{path::Path, process::Command, sync::Arc};

    use anyhow::Context;

    use super::*;

    /// Scratch file that is removed on drop.
    struct TempMedia(std::path::PathBuf);

    impl TempMedia {
        fn write(bytes: &[u8], hint: &str) -> anyhow::Result<Self> {
            let mut hasher = crate::foundation::math::Fnv1a64::new_default();
            hasher.write_bytes(hint.as_bytes());
            let path = std::env::temp_dir().join(format!(
                "shotreel_{}_{:016x}",
                std::process::id(),
                hasher.finish()
            ));
            std::fs::write(&path, bytes)
                .with_context(|| format!("write temp media '{}'", path.display()))?;
            Ok(Self(path))
        }
    }

    impl Drop for TempMedia {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    pub fn decode_audio(bytes: &[u8], hint: &str) -> anyhow::Result<PreparedAudio> {
        let tmp = TempMedia::write(bytes, hint)?;
        let out = Command::new("ffmpeg")
            .args(["-v", "error", "-i"])
            .arg(&tmp.0)
            .args([
                "-vn",
                "-f",
                "f32le",
                "-acodec",
                "pcm_f32le",
                "-ac",
                "2",
                "-ar",
                &MIX_SAMPLE_RATE.to_string(),
                "pipe:1",
            ])
            .output()
            .context("run ffmpeg for audio decode")?;
        anyhow::ensure!(
            out.status.success(),
            "ffmpeg audio decode failed: {}",
            String::from_utf8_lossy(&out.stderr).trim()
        );
        anyhow::ensure!(
            out.stdout.len().is_multiple_of(4),
            "decoded audio byte length is not aligned to f32 samples"
        );

        let pcm = out
            .stdout
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect::<Vec<_>>();
        Ok(PreparedAudio {
            sample_rate: MIX_SAMPLE_RATE,
            channels: 2,
            interleaved_f32: Arc::new(pcm),
        })
    }

    fn probe_dimensions(path: &Path) -> anyhow::Result<(u32, u32)> {
        #[derive(serde::Deserialize)]
        struct ProbeStream {
            codec_type: Option<String>,
            width: Option<u32>,
            height: Option<u32>,
        }
        #[derive(serde::Deserialize)]
        struct ProbeOut {
            streams: Vec<ProbeStream>,
        }

        let out = Command::new("ffprobe")
            .args(["-v", "error", "-print_format", "json", "-show_streams"])
            .arg(path)
            .output()
            .context("run ffprobe")?;
        anyhow::ensure!(
            out.status.success(),
            "ffprobe failed: {}",
            String::from_utf8_lossy(&out.stderr).trim()
        );
        let parsed: ProbeOut =
            serde_json::from_slice(&out.stdout).context("parse ffprobe json")?;
        let video = parsed
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .context("no video stream found")?;
        Ok((
            video.width.context("missing video width")?,
            video.height.context("missing video height")?,
        ))
    }

    pub fn decode_video_frames(
        bytes: &[u8],
        hint: &str,
        fps: Fps,
    ) -> anyhow::Result<Vec<PreparedImage>> {
        let tmp = TempMedia::write(bytes, hint)?;
        let (width, height) = probe_dimensions(&tmp.0)?;
        let out = Command::new("ffmpeg")
            .args(["-v", "error", "-i"])
            .arg(&tmp.0)
            .args([
                "-vf",
                &format!("fps={}/{}", fps.num, fps.den),
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "pipe:1",
            ])
            .output()
            .context("run ffmpeg for video decode")?;
        anyhow::ensure!(
            out.status.success(),
            "ffmpeg video decode failed: {}",
            String::from_utf8_lossy(&out.stderr).trim()
        );

        let frame_len = width as usize * height as usize * 4;
        anyhow::ensure!(frame_len > 0, "decoded video frame size is zero");
        anyhow::ensure!(
            out.stdout.len().is_multiple_of(frame_len),
            "decoded video has {} bytes, expected multiples of {frame_len}",
            out.stdout.len()
        );

        // ffmpeg emits opaque frames, so straight RGBA is already premultiplied.
        Ok(out
            .stdout
            .chunks_exact(frame_len)
            .map(|chunk| PreparedImage {
                width,
                height,
                rgba8_premul: Arc::new(chunk.to_vec()),
            })
            .collect())
    }
}

#[cfg(feature = "media-ffmpeg")]
pub use imp::{decode_audio, decode_video_frames};

#[cfg(not(feature = "media-ffmpeg"))]
pub fn decode_audio(_bytes: &[u8], hint: &str) -> anyhow::Result<PreparedAudio> {
    anyhow::bail!("'{hint}' is not WAV; other audio formats require the 'media-ffmpeg' feature")
}

#[cfg(not(feature = "media-ffmpeg"))]
pub fn decode_video_frames(
    _bytes: &[u8],
    hint: &str,
    _fps: Fps,
) -> anyhow::Result<Vec<PreparedImage>> {
    anyhow::bail!("video '{hint}' requires the 'media-ffmpeg' feature")
}
