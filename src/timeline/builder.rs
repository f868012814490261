use std::sync::Arc;

use crate::assets::fetched::FetchedFile;
use crate::assets::resolver::{MediaRequest, MediaResolver};
use crate::foundation::error::{ShotreelError, ShotreelResult};
use crate::foundation::time::CancelToken;
use crate::session::opts::CreatorOpts;
use crate::timeline::acoustic::AcousticEnv;
use crate::timeline::duration::shot_duration;
use crate::timeline::envelope::{TimelineWarning, assign_fades, check_zoom, zoom_envelope};
use crate::timeline::media_data::MediaData;
use crate::timeline::shot::{FetchedShot, Timeline, VoiceLine};

/// Every asset a timeline entry needs.
pub fn media_requests(md: &MediaData) -> Vec<MediaRequest> {
    let mut reqs = vec![MediaRequest::image(&md.image)];
    if let Some(prev) = &md.previous_image {
        reqs.push(MediaRequest::image(prev));
    }
    if let Some(video) = &md.video {
        reqs.push(MediaRequest::video(video));
    }
    reqs.extend(md.music.iter().map(|m| MediaRequest::audio(m)));
    reqs.extend(md.sound.iter().map(|s| MediaRequest::audio(s)));
    reqs.extend(md.voice.iter().map(|v| MediaRequest::audio(&v.url)));
    reqs
}

/// Resolves timeline entries one at a time so a preview can start before the rest arrive.
///
/// Shots are appended in order; [`TimelineBuilder::snapshot`] returns a playable timeline over
/// the shots resolved so far.
pub struct TimelineBuilder<'a> {
    resolver: &'a MediaResolver,
    opts: CreatorOpts,
    shots: Vec<FetchedShot>,
    warnings: Vec<TimelineWarning>,
}

impl<'a> TimelineBuilder<'a> {
    pub fn new(resolver: &'a MediaResolver, opts: CreatorOpts) -> Self {
        Self {
            resolver,
            opts,
            shots: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.shots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shots.is_empty()
    }

    /// Resolve one entry and append it.
    pub fn push(&mut self, md: &MediaData, cancel: &CancelToken) -> ShotreelResult<&FetchedShot> {
        let files = self.resolver.resolve_all(&media_requests(md), cancel)?;
        let get = |key: &str| -> ShotreelResult<Arc<FetchedFile>> {
            files
                .get(key)
                .cloned()
                .ok_or_else(|| ShotreelError::not_ready(format!("asset '{key}' was not resolved")))
        };

        let voice = md
            .voice
            .iter()
            .map(|cue| -> ShotreelResult<VoiceLine> {
                Ok(VoiceLine {
                    file: get(&cue.url)?,
                    offset_ms: cue.offset_ms,
                    character_id: cue.character_id.clone(),
                    region: cue.region.clone(),
                })
            })
            .collect::<ShotreelResult<Vec<_>>>()?;

        let (zoom, warning) = check_zoom(
            zoom_envelope(md.zoom, self.opts.zoom_intensity),
            md.scene_idx,
            md.shot_idx,
            self.opts.strict_envelopes,
        )?;
        self.warnings.extend(warning);

        let image = get(&md.image)?;
        let video_frames = md.video.as_deref().map(get).transpose()?;
        let authored = md
            .authored_duration
            .or_else(|| video_frames.as_ref().and_then(|v| v.duration_ms()));

        let mut shot = FetchedShot::still(md.scene_idx, md.shot_idx, image, 0);
        shot.music = md.music.as_deref().map(get).transpose()?;
        shot.sound = md.sound.as_deref().map(get).transpose()?;
        shot.acoustic_env = md.acoustic_env.as_deref().and_then(AcousticEnv::parse);
        shot.video_frames = video_frames;
        shot.voice = voice;
        shot.duration = shot_duration(
            authored,
            &shot.voice_slots(),
            self.opts.shot_default_duration_ms,
        );
        shot.zoom_start = zoom.start;
        shot.zoom_end = zoom.end;
        shot.has_black_fading = md.has_black_fading();
        shot.previous_image = md.previous_image.as_deref().map(get).transpose()?;

        tracing::debug!(
            scene_idx = md.scene_idx,
            shot_idx = md.shot_idx,
            duration = shot.duration,
            "resolved shot"
        );
        self.shots.push(shot);
        let idx = self.shots.len() - 1;
        Ok(&self.shots[idx])
    }

    /// Timeline over the shots resolved so far; the last one is treated as the final shot.
    pub fn snapshot(&self) -> Timeline {
        assemble(self.shots.clone(), self.warnings.clone(), self.opts.fade_ms)
    }

    pub fn finish(self) -> ShotreelResult<Timeline> {
        if self.shots.is_empty() {
            return Err(ShotreelError::EmptyTimeline);
        }
        Ok(assemble(self.shots, self.warnings, self.opts.fade_ms))
    }
}

fn assemble(mut shots: Vec<FetchedShot>, warnings: Vec<TimelineWarning>, fade_ms: u64) -> Timeline {
    let durations: Vec<u64> = shots.iter().map(|s| s.duration).collect();
    let black: Vec<bool> = shots.iter().map(|s| s.has_black_fading).collect();
    for (shot, fades) in shots.iter_mut().zip(assign_fades(&durations, &black, fade_ms)) {
        shot.fade_in = fades.fade_in;
        shot.fade_out = fades.fade_out;
    }
    let mut timeline = Timeline::from_shots(shots);
    let mut all = warnings;
    all.append(&mut timeline.warnings);
    timeline.warnings = all;
    timeline
}

/// Resolve every entry, prefetching distinct assets in parallel, and build the full timeline.
#[tracing::instrument(skip_all, fields(shots = media.len()))]
pub fn build_timeline(
    media: &[MediaData],
    resolver: &MediaResolver,
    opts: &CreatorOpts,
    cancel: &CancelToken,
) -> ShotreelResult<Timeline> {
    if media.is_empty() {
        return Err(ShotreelError::EmptyTimeline);
    }
    let all: Vec<MediaRequest> = media.iter().flat_map(media_requests).collect();
    resolver.resolve_all(&all, cancel)?;

    let mut builder = TimelineBuilder::new(resolver, opts.clone());
    for md in media {
        if cancel.is_cancelled() {
            return Err(ShotreelError::Cancelled);
        }
        builder.push(md, cancel)?;
    }
    let timeline = builder.finish()?;
    tracing::info!(
        shots = timeline.len(),
        duration_ms = timeline.duration(),
        warnings = timeline.warnings.len(),
        "timeline built"
    );
    Ok(timeline)
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/builder.rs"]
mod tests;
