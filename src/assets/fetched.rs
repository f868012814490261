use std::sync::{Arc, OnceLock};

/// Raster image in premultiplied RGBA8 form.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedImage {
    pub width: u32,
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Uniform image, mostly for tests and placeholders.
    pub fn solid(width: u32, height: u32, premul: [u8; 4]) -> Self {
        let mut px = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..(width as usize * height as usize) {
            px.extend_from_slice(&premul);
        }
        Self {
            width,
            height,
            rgba8_premul: Arc::new(px),
        }
    }
}

/// Decoded audio stored as interleaved `f32` PCM.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedAudio {
    pub sample_rate: u32,
    pub channels: u16,
    pub interleaved_f32: Arc<Vec<f32>>,
}

impl PreparedAudio {
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.interleaved_f32.len() / usize::from(self.channels)
    }

    /// Natural playback length, rounded up to whole milliseconds.
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        (self.frames() as u64 * 1000).div_ceil(u64::from(self.sample_rate))
    }
}

/// Decoded payload of a [`FetchedFile`].
#[derive(Clone, Debug)]
pub enum MediaValue {
    Image(PreparedImage),
    Audio(PreparedAudio),
    /// Pre-rendered video decoded to frames at the session frame rate.
    VideoFrames(Arc<Vec<PreparedImage>>),
}

/// A resolved asset, shared by reference between the timeline, renderer and mixer.
#[derive(Debug)]
pub struct FetchedFile {
    pub filename: String,
    pub cache_key: Option<String>,
    pub value: MediaValue,
    duration_ms: OnceLock<u64>,
}

impl FetchedFile {
    pub fn new(filename: impl Into<String>, cache_key: Option<String>, value: MediaValue) -> Self {
        Self {
            filename: filename.into(),
            cache_key,
            value,
            duration_ms: OnceLock::new(),
        }
    }

    pub fn image(filename: impl Into<String>, image: PreparedImage) -> Arc<Self> {
        Arc::new(Self::new(filename, None, MediaValue::Image(image)))
    }

    pub fn audio(filename: impl Into<String>, audio: PreparedAudio) -> Arc<Self> {
        let duration = audio.duration_ms();
        let file = Self::new(filename, None, MediaValue::Audio(audio));
        file.attach_duration_ms(duration);
        Arc::new(file)
    }

    /// Canonical cache key: explicit key, else the filename.
    pub fn key(&self) -> &str {
        self.cache_key.as_deref().unwrap_or(&self.filename)
    }

    /// Playback length once known. The first attached value wins.
    pub fn duration_ms(&self) -> Option<u64> {
        self.duration_ms.get().copied()
    }

    pub fn attach_duration_ms(&self, ms: u64) {
        let _ = self.duration_ms.set(ms);
    }

    pub fn as_image(&self) -> Option<&PreparedImage> {
        match &self.value {
            MediaValue::Image(img) => Some(img),
            _ => None,
        }
    }

    pub fn as_audio(&self) -> Option<&PreparedAudio> {
        match &self.value {
            MediaValue::Audio(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_video_frames(&self) -> Option<&[PreparedImage]> {
        match &self.value {
            MediaValue::VideoFrames(frames) => Some(frames.as_slice()),
            _ => None,
        }
    }
}
