use std::ffi::OsString;
use std::io::{Read, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use anyhow::Context;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ShotreelError, ShotreelResult};
use crate::render::surface::FrameRGBA;

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    pub out_path: PathBuf,
    /// Replace an existing file at `out_path`.
    pub overwrite: bool,
}

impl FfmpegSinkOpts {
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw frames to stdin.
///
/// Rendered frames are always opaque, so they are piped as-is. `ffmpeg` writes into a hidden
/// sibling of `out_path`; the file is renamed into place only when encoding succeeds, and
/// removed on abort or failure.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            cfg: None,
            last_idx: None,
        }
    }

    /// Where `ffmpeg` writes until the export completes.
    pub fn partial_path(&self) -> PathBuf {
        partial_path_for(&self.opts.out_path)
    }

    fn discard(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
        let _ = std::fs::remove_file(self.partial_path());
        self.cfg = None;
        self.last_idx = None;
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.child.is_some() {
            self.discard();
        }
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> ShotreelResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(ShotreelError::validation("video size must be non-zero"));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(ShotreelError::validation(format!(
                "video size {}x{} must be even for yuv420p output",
                cfg.width, cfg.height
            )));
        }
        if let Some(audio) = cfg.audio.as_ref()
            && (audio.sample_rate == 0 || audio.channels == 0)
        {
            return Err(ShotreelError::validation(
                "audio sample rate and channel count must be non-zero",
            ));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(ShotreelError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }
        if !is_ffmpeg_on_path() {
            return Err(ShotreelError::encode(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut child = Command::new("ffmpeg")
            .args(ffmpeg_args(&cfg, &self.partial_path()))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ShotreelError::encode(format!("failed to spawn ffmpeg: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ShotreelError::encode("ffmpeg stdin is not piped"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ShotreelError::encode("ffmpeg stderr is not piped"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        tracing::debug!(
            out = %self.opts.out_path.display(),
            frames = cfg.total_frames,
            audio = cfg.audio.is_some(),
            "ffmpeg started"
        );
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ShotreelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ShotreelError::encode("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(ShotreelError::encode(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(ShotreelError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ShotreelError::encode("ffmpeg sink is already finalized"));
        };
        stdin
            .write_all(&frame.data)
            .map_err(|e| ShotreelError::encode(format!("failed to write frame {}: {e}", idx.0)))?;
        Ok(())
    }

    fn end(&mut self) -> ShotreelResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| ShotreelError::encode("ffmpeg sink not started"))?;

        let status = child
            .wait()
            .map_err(|e| ShotreelError::encode(format!("failed to wait for ffmpeg to finish: {e}")))?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ShotreelError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| ShotreelError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        let partial = self.partial_path();
        if !status.success() {
            let _ = std::fs::remove_file(&partial);
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(ShotreelError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        std::fs::rename(&partial, &self.opts.out_path).with_context(|| {
            format!(
                "move finished video into place at '{}'",
                self.opts.out_path.display()
            )
        })?;
        tracing::info!(out = %self.opts.out_path.display(), "video written");
        self.cfg = None;
        Ok(())
    }

    fn abort(&mut self) {
        tracing::debug!(out = %self.opts.out_path.display(), "ffmpeg export aborted");
        self.discard();
    }
}

/// Command line for raw RGBA frames on stdin, plus the optional f32le soundtrack, into MP4.
fn ffmpeg_args(cfg: &SinkConfig, out: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-y", "-loglevel", "error", "-f", "rawvideo", "-pix_fmt", "rgba"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push("-s".into());
    args.push(format!("{}x{}", cfg.width, cfg.height).into());
    // Input rate must precede `-i` for rawvideo.
    args.push("-r".into());
    args.push(format!("{}/{}", cfg.fps.num, cfg.fps.den).into());
    args.push("-i".into());
    args.push("pipe:0".into());

    match cfg.audio.as_ref() {
        Some(audio) => {
            args.push("-f".into());
            args.push("f32le".into());
            args.push("-ar".into());
            args.push(audio.sample_rate.to_string().into());
            args.push("-ac".into());
            args.push(audio.channels.to_string().into());
            args.push("-i".into());
            args.push(audio.path.clone().into_os_string());
            args.extend(["-c:a", "aac", "-shortest"].map(OsString::from));
        }
        None => args.push("-an".into()),
    }
    args.extend(["-c:v", "libx264", "-pix_fmt", "yuv420p", "-movflags", "+faststart"].map(OsString::from));
    args.push(out.as_os_str().to_owned());
    args
}

/// Hidden sibling of `out`, keeping its extension so `ffmpeg` picks the same container.
pub fn partial_path_for(out: &Path) -> PathBuf {
    let name = out
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output.mp4".to_owned());
    out.with_file_name(format!(".partial-{name}"))
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ShotreelResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
