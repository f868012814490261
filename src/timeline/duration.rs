use serde::{Deserialize, Serialize};

use crate::session::opts::{SHOT_SPEECH_SILENCE_MS, SPEECH_SILENCE_SEPARATOR_MS};

/// Length and optional fixed offset of one voice line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoiceSlot {
    pub len_ms: u64,
    pub offset_ms: Option<u64>,
}

/// Start offset of each line relative to the shot start.
///
/// Lines with an explicit offset start there. The rest play in order after the leading
/// silence, separated by a short pause.
pub fn voice_offsets(slots: &[VoiceSlot]) -> Vec<u64> {
    let mut cursor = SHOT_SPEECH_SILENCE_MS;
    slots
        .iter()
        .map(|slot| match slot.offset_ms {
            Some(offset) => offset,
            None => {
                let at = cursor;
                cursor += slot.len_ms + SPEECH_SILENCE_SEPARATOR_MS;
                at
            }
        })
        .collect()
}

/// Time a shot needs to play all of its lines, including the surrounding silence.
pub fn voice_span(slots: &[VoiceSlot]) -> u64 {
    let sequential: Vec<u64> = slots
        .iter()
        .filter(|s| s.offset_ms.is_none())
        .map(|s| s.len_ms)
        .collect();
    let sequential_span = if sequential.is_empty() {
        0
    } else {
        SHOT_SPEECH_SILENCE_MS * 2
            + sequential
                .iter()
                .map(|len| len + SPEECH_SILENCE_SEPARATOR_MS)
                .sum::<u64>()
    };

    let offset_span = slots
        .iter()
        .filter_map(|s| s.offset_ms.map(|o| o + s.len_ms + SHOT_SPEECH_SILENCE_MS))
        .max()
        .unwrap_or(0);

    sequential_span.max(offset_span)
}

/// The longer of the authored length, the voice span and the default.
pub fn shot_duration(authored_ms: Option<u64>, slots: &[VoiceSlot], default_ms: u64) -> u64 {
    authored_ms
        .unwrap_or(0)
        .max(voice_span(slots))
        .max(default_ms)
}

/// Per-shot timing summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotDuration {
    pub scene_idx: usize,
    pub shot_idx: usize,
    pub starting_time: u64,
    pub duration: u64,
    /// Start of each voice line, relative to the shot start.
    pub dialogs: Vec<u64>,
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/duration.rs"]
mod tests;
