use serde::{Deserialize, Serialize};

use crate::foundation::error::{ShotreelError, ShotreelResult};
use crate::scene::model::{Scene, ShotTransition, ZoomDirection};
use crate::session::opts::CreatorOpts;

/// A voice line reference with its placement metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VoiceCue {
    pub url: String,
    #[serde(default)]
    pub offset_ms: Option<u64>,
    #[serde(default)]
    pub character_id: Option<String>,
    /// Speaker's on-screen box, when the shot has one for this character.
    #[serde(default)]
    pub region: Option<Vec<f64>>,
}

/// URL-based description of one timeline entry, before any asset is fetched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MediaData {
    pub scene_idx: usize,
    pub shot_idx: usize,
    #[serde(default)]
    pub music: Option<String>,
    #[serde(default)]
    pub sound: Option<String>,
    #[serde(default)]
    pub voice: Vec<VoiceCue>,
    #[serde(default)]
    pub acoustic_env: Option<String>,
    pub image: String,
    #[serde(default)]
    pub video: Option<String>,
    /// Authored duration; the final one also depends on voice lengths.
    #[serde(default)]
    pub authored_duration: Option<u64>,
    #[serde(default)]
    pub zoom: ZoomDirection,
    #[serde(default)]
    pub transition: ShotTransition,
    #[serde(default)]
    pub previous_image: Option<String>,
}

impl MediaData {
    pub fn has_black_fading(&self) -> bool {
        self.transition == ShotTransition::BlackCut
    }
}

/// Flatten scenes into timeline entries.
///
/// With `opts.part` set only that scene is emitted, keeping its scene index, and its first shot
/// cross-fades from the last image of the scenes before it. Shots without an image reuse the
/// previous one; scenes without shots are skipped.
pub fn prepare_media_data(scenes: &[Scene], opts: &CreatorOpts) -> ShotreelResult<Vec<MediaData>> {
    let (first_idx, targeted): (usize, &[Scene]) = match opts.part {
        Some(part) => {
            let scene = scenes.get(part).ok_or_else(|| {
                ShotreelError::validation(format!(
                    "part {part} out of range for {} scenes",
                    scenes.len()
                ))
            })?;
            (part, std::slice::from_ref(scene))
        }
        None => (0, scenes),
    };

    let mut previous_image: Option<String> = scenes[..first_idx]
        .iter()
        .rev()
        .flat_map(|scene| scene.shots.iter().rev())
        .find_map(|shot| shot.image_reference().map(str::to_owned));

    let mut out = Vec::new();
    for (offset, scene) in targeted.iter().enumerate() {
        let scene_idx = first_idx + offset;
        scene.doc.validate()?;
        if scene.shots.is_empty() {
            tracing::debug!(scene_idx, "skipping scene without shots");
            continue;
        }
        let music = scene.doc.music_reference().map(str::to_owned);

        for (shot_idx, shot) in scene.shots.iter().enumerate() {
            let image = match shot.image_reference() {
                Some(url) => url.to_owned(),
                None => previous_image.clone().ok_or_else(|| {
                    ShotreelError::validation(format!(
                        "scene {scene_idx} shot {shot_idx} has no image and no earlier image to reuse"
                    ))
                })?,
            };

            let voice = shot
                .dialog
                .iter()
                .filter_map(|line| {
                    let url = line.line_url.as_deref().filter(|u| !u.is_empty())?;
                    let region = line
                        .character_id
                        .as_deref()
                        .and_then(|id| shot.bounding_box_for(id))
                        .map(|b| b.rect.clone());
                    Some(VoiceCue {
                        url: url.to_owned(),
                        offset_ms: line.offset_ms,
                        character_id: line.character_id.clone(),
                        region,
                    })
                })
                .collect();

            out.push(MediaData {
                scene_idx,
                shot_idx,
                music: music.clone(),
                sound: shot.sound_reference().map(str::to_owned),
                voice,
                acoustic_env: shot.acoustic_env.clone().filter(|s| !s.is_empty()),
                image: image.clone(),
                video: shot.video_reference().map(str::to_owned),
                authored_duration: shot.duration,
                zoom: shot.zoom.unwrap_or_default(),
                transition: shot.transition.unwrap_or_default(),
                previous_image: previous_image.replace(image),
            });
        }
    }

    if out.is_empty() {
        return Err(ShotreelError::EmptyTimeline);
    }
    tracing::debug!(shots = out.len(), "prepared media data");
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/media_data.rs"]
mod tests;
