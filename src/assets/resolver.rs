use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::assets::decode;
use crate::assets::fetched::{FetchedFile, MediaValue};
use crate::assets::media;
use crate::assets::source::MediaSource;
use crate::foundation::core::Fps;
use crate::foundation::error::{ShotreelError, ShotreelResult};
use crate::foundation::math::Fnv1a64;
use crate::foundation::time::{CancelToken, wait};

/// Decoder selected for a reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Image,
    Audio,
    Video,
}

/// A reference to resolve: a source reference, or an inline value.
#[derive(Clone, Debug)]
pub struct MediaRequest {
    pub kind: AssetKind,
    pub filename: String,
    pub cache_key: Option<String>,
    pub inline: Option<Arc<Vec<u8>>>,
}

impl MediaRequest {
    pub fn new(kind: AssetKind, filename: impl Into<String>) -> Self {
        Self {
            kind,
            filename: filename.into(),
            cache_key: None,
            inline: None,
        }
    }

    pub fn image(filename: impl Into<String>) -> Self {
        Self::new(AssetKind::Image, filename)
    }

    pub fn audio(filename: impl Into<String>) -> Self {
        Self::new(AssetKind::Audio, filename)
    }

    pub fn video(filename: impl Into<String>) -> Self {
        Self::new(AssetKind::Video, filename)
    }

    /// Inline value; its cache key is derived from the content.
    pub fn inline(kind: AssetKind, bytes: Vec<u8>) -> Self {
        let mut hasher = Fnv1a64::new_default();
        hasher.write_bytes(&bytes);
        let key = format!("inline:{:016x}", hasher.finish());
        Self {
            kind,
            filename: key.clone(),
            cache_key: Some(key),
            inline: Some(Arc::new(bytes)),
        }
    }

    pub fn with_cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = Some(key.into());
        self
    }

    /// Canonical cache key: explicit key, else the filename.
    pub fn key(&self) -> &str {
        self.cache_key.as_deref().unwrap_or(&self.filename)
    }
}

/// Retry schedule for transient fetch failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub attempts: u32,
    /// Delay before the second attempt; doubles after each failure.
    pub initial_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            initial_backoff_ms: 50,
        }
    }
}

impl RetryPolicy {
    pub fn no_retry() -> Self {
        Self {
            attempts: 1,
            initial_backoff_ms: 0,
        }
    }
}

type Slot = Arc<Mutex<Option<Arc<FetchedFile>>>>;

/// Session-scoped resolver and cache.
///
/// Each cache key owns a slot whose lock is held for the whole load, so concurrent requests for
/// the same key wait for the first one instead of fetching again. Failed loads leave the slot
/// empty; a later request retries.
pub struct MediaResolver {
    source: Arc<dyn MediaSource>,
    fps: Fps,
    retry: RetryPolicy,
    slots: Mutex<HashMap<String, Slot>>,
    loads: Mutex<HashMap<String, u64>>,
}

impl std::fmt::Debug for MediaResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaResolver")
            .field("fps", &self.fps)
            .field("retry", &self.retry)
            .field("cached", &self.len())
            .finish()
    }
}

impl MediaResolver {
    pub fn new(source: Arc<dyn MediaSource>) -> Self {
        Self {
            source,
            fps: Fps::default(),
            retry: RetryPolicy::default(),
            slots: Mutex::new(HashMap::new()),
            loads: Mutex::new(HashMap::new()),
        }
    }

    /// Frame rate used when decoding video shots to frames.
    pub fn with_fps(mut self, fps: Fps) -> Self {
        self.fps = fps;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn resolve(&self, req: &MediaRequest) -> ShotreelResult<Arc<FetchedFile>> {
        let slot = {
            let mut slots = lock(&self.slots)?;
            slots.entry(req.key().to_owned()).or_default().clone()
        };

        let mut guard = lock(&slot)?;
        if let Some(file) = guard.as_ref() {
            return Ok(file.clone());
        }

        let file = Arc::new(
            self.load(req)
                .map_err(|e| ShotreelError::media_unavailable(req.filename.clone(), e))?,
        );
        *guard = Some(file.clone());
        Ok(file)
    }

    /// Resolve many references in parallel, one load per distinct key.
    ///
    /// Once `cancel` is set no new loads start; loads already running finish and stay cached, but
    /// the call reports [`ShotreelError::Cancelled`].
    pub fn resolve_all(
        &self,
        reqs: &[MediaRequest],
        cancel: &CancelToken,
    ) -> ShotreelResult<HashMap<String, Arc<FetchedFile>>> {
        let mut seen = HashSet::<&str>::new();
        let unique: Vec<&MediaRequest> = reqs.iter().filter(|r| seen.insert(r.key())).collect();

        let results: Vec<ShotreelResult<Arc<FetchedFile>>> = unique
            .par_iter()
            .map(|req| {
                if cancel.is_cancelled() {
                    return Err(ShotreelError::Cancelled);
                }
                self.resolve(req)
            })
            .collect();

        if cancel.is_cancelled() {
            return Err(ShotreelError::Cancelled);
        }

        let mut out = HashMap::with_capacity(unique.len());
        for (req, res) in unique.into_iter().zip(results) {
            out.insert(req.key().to_owned(), res?);
        }
        tracing::debug!(assets = out.len(), "resolved media batch");
        Ok(out)
    }

    /// Cached asset for `key`, if it has been resolved.
    pub fn cached(&self, key: &str) -> Option<Arc<FetchedFile>> {
        let slot = lock(&self.slots).ok()?.get(key).cloned()?;
        let guard = lock(&slot).ok()?;
        guard.clone()
    }

    /// Number of loads (fetch + decode) performed for `key`.
    pub fn load_count(&self, key: &str) -> u64 {
        lock(&self.loads)
            .map(|loads| loads.get(key).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Number of populated cache entries.
    pub fn len(&self) -> usize {
        let Ok(slots) = lock(&self.slots) else {
            return 0;
        };
        slots
            .values()
            .filter(|slot| lock(slot).map(|g| g.is_some()).unwrap_or(false))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn load(&self, req: &MediaRequest) -> anyhow::Result<FetchedFile> {
        if let Ok(mut loads) = lock(&self.loads) {
            *loads.entry(req.key().to_owned()).or_insert(0) += 1;
        }

        let bytes = match &req.inline {
            Some(bytes) => bytes.as_ref().clone(),
            None => self.fetch_with_retry(&req.filename)?,
        };

        let (value, duration_ms) = match req.kind {
            AssetKind::Image => (MediaValue::Image(decode::decode_image(&bytes)?), None),
            AssetKind::Audio => {
                let audio = if decode::is_wav(&bytes) {
                    decode::decode_wav(&bytes)?
                } else {
                    media::decode_audio(&bytes, &req.filename)?
                };
                let ms = audio.duration_ms();
                (MediaValue::Audio(audio), Some(ms))
            }
            AssetKind::Video => {
                let frames = media::decode_video_frames(&bytes, &req.filename, self.fps)?;
                anyhow::ensure!(!frames.is_empty(), "video decoded to zero frames");
                let ms = (frames.len() as f64 * self.fps.frame_ms()).ceil() as u64;
                (MediaValue::VideoFrames(Arc::new(frames)), Some(ms))
            }
        };

        let file = FetchedFile::new(req.filename.clone(), req.cache_key.clone(), value);
        if let Some(ms) = duration_ms {
            file.attach_duration_ms(ms);
        }
        tracing::debug!(key = req.key(), kind = ?req.kind, "loaded media");
        Ok(file)
    }

    fn fetch_with_retry(&self, reference: &str) -> anyhow::Result<Vec<u8>> {
        let attempts = self.retry.attempts.max(1);
        let mut backoff = self.retry.initial_backoff_ms;
        let mut attempt = 1;
        loop {
            match self.source.fetch(reference) {
                Ok(bytes) => return Ok(bytes),
                Err(e) if attempt < attempts => {
                    tracing::warn!(reference, attempt, error = %e, "fetch failed, retrying");
                    wait(backoff);
                    backoff = backoff.saturating_mul(2);
                    attempt += 1;
                }
                Err(e) => return Err(e.context(format!("fetch failed after {attempt} attempts"))),
            }
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> ShotreelResult<MutexGuard<'_, T>> {
    m.lock()
        .map_err(|_| ShotreelError::Other(anyhow::anyhow!("resolver cache lock poisoned")))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/resolver.rs"]
mod tests;
