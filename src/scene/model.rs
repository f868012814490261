use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{ShotreelError, ShotreelResult};

/// A background-music candidate attached to a scene.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Music {
    /// Storage reference of the music file.
    pub id: String,
    #[serde(default)]
    pub desc: Option<String>,
}

/// Authored, scene-level content.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDoc {
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub scene_title: Option<String>,
    #[serde(default)]
    pub music_desc: Option<String>,
    #[serde(default)]
    pub selected_music_index: Option<usize>,
    #[serde(default)]
    pub music_url: Option<String>,
    #[serde(default)]
    pub musics: Vec<Option<Music>>,
}

impl SceneDoc {
    /// `selected_music_index`, when set, must index into `musics`.
    pub fn validate(&self) -> ShotreelResult<()> {
        if let Some(idx) = self.selected_music_index
            && idx >= self.musics.len()
        {
            return Err(ShotreelError::validation(format!(
                "selected_music_index {idx} out of range for {} music candidates",
                self.musics.len()
            )));
        }
        Ok(())
    }

    /// The selected candidate's reference, falling back to the resolved `music_url`.
    pub fn music_reference(&self) -> Option<&str> {
        self.selected_music_index
            .and_then(|idx| self.musics.get(idx))
            .and_then(|m| m.as_ref())
            .map(|m| m.id.as_str())
            .or(self.music_url.as_deref())
            .filter(|s| !s.is_empty())
    }
}

/// One spoken line of a shot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogLine {
    pub line: String,
    /// Rendered speech audio; lines without audio are silent.
    #[serde(default)]
    pub line_url: Option<String>,
    #[serde(default)]
    pub character_id: Option<String>,
    #[serde(default)]
    pub emotion: Option<String>,
    /// Explicit start offset from the shot start. Absent means sequential placement.
    #[serde(default)]
    pub offset_ms: Option<u64>,
}

/// Screen region of a character, normalized `[x, y, w, h]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    #[serde(rename = "box")]
    pub rect: Vec<f64>,
    pub character_id: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomDirection {
    #[default]
    In,
    Out,
    None,
}

/// How a shot is entered from its predecessor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotTransition {
    #[default]
    Crossfade,
    BlackCut,
}

/// One visual beat inside a scene.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub shot_type: u32,
    #[serde(default)]
    pub location: u32,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub dialog: Vec<DialogLine>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub acoustic_env: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    /// Authored duration in milliseconds.
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub bounding_boxes: Vec<BoundingBox>,
    #[serde(default)]
    pub selected_sound_index: Option<usize>,
    #[serde(default)]
    pub sound_urls: Vec<String>,
    #[serde(default)]
    pub zoom: Option<ZoomDirection>,
    #[serde(default)]
    pub transition: Option<ShotTransition>,
}

impl Shot {
    pub fn image_reference(&self) -> Option<&str> {
        self.image_url.as_deref().filter(|s| !s.is_empty())
    }

    pub fn video_reference(&self) -> Option<&str> {
        self.video_url.as_deref().filter(|s| !s.is_empty())
    }

    /// Selected ambient sound, defaulting to the first candidate.
    pub fn sound_reference(&self) -> Option<&str> {
        self.sound_urls
            .get(self.selected_sound_index.unwrap_or(0))
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn bounding_box_for(&self, character_id: &str) -> Option<&BoundingBox> {
        self.bounding_boxes
            .iter()
            .find(|b| b.character_id == character_id)
    }
}

/// A scene: authored document, identifier and ordered shots.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(flatten)]
    pub doc: SceneDoc,
    #[serde(default)]
    pub shots: Vec<Shot>,
}

/// Parse an ordered scene list from JSON.
pub fn scenes_from_json_str(s: &str) -> ShotreelResult<Vec<Scene>> {
    serde_json::from_str(s).map_err(|e| ShotreelError::serde(e.to_string()))
}

/// Read and parse an ordered scene list from a JSON file.
pub fn scenes_from_path(path: &Path) -> ShotreelResult<Vec<Scene>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read scenes from '{}'", path.display()))?;
    scenes_from_json_str(&text)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
