use serde::{Deserialize, Serialize};

/// Ambient sound profile applied to a shot's voice lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcousticEnv {
    SmallRoom,
    LargeRoom,
    Hall,
    Outside,
    Stadium,
    Telephone,
}

/// A single delayed copy mixed on top of the dry signal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EchoTap {
    pub delay_ms: u64,
    pub level: f32,
}

impl AcousticEnv {
    pub const ALL: [AcousticEnv; 6] = [
        AcousticEnv::SmallRoom,
        AcousticEnv::LargeRoom,
        AcousticEnv::Hall,
        AcousticEnv::Outside,
        AcousticEnv::Stadium,
        AcousticEnv::Telephone,
    ];

    /// Parse an authored tag. Unknown or empty tags yield `None`.
    pub fn parse(tag: &str) -> Option<Self> {
        let tag = tag.trim().to_ascii_lowercase();
        let env = match tag.as_str() {
            "small_room" => Self::SmallRoom,
            "large_room" => Self::LargeRoom,
            "hall" => Self::Hall,
            "outside" => Self::Outside,
            "stadium" => Self::Stadium,
            "telephone" => Self::Telephone,
            "" => return None,
            other => {
                tracing::debug!(tag = other, "unknown acoustic environment, using dry voice");
                return None;
            }
        };
        Some(env)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SmallRoom => "small_room",
            Self::LargeRoom => "large_room",
            Self::Hall => "hall",
            Self::Outside => "outside",
            Self::Stadium => "stadium",
            Self::Telephone => "telephone",
        }
    }

    /// Gain of the unprocessed voice.
    pub fn dry_level(self) -> f32 {
        match self {
            Self::Hall => 0.84,
            Self::LargeRoom => 0.93,
            Self::SmallRoom => 0.95,
            Self::Outside => 0.97,
            Self::Stadium => 0.91,
            Self::Telephone => 0.7,
        }
    }

    /// Echo approximating the room response; it carries whatever the dry signal gives up.
    ///
    /// The telephone tap is very short, so it reads as a boxy line rather than a room.
    pub fn echo(self) -> EchoTap {
        let delay_ms = match self {
            Self::Telephone => 8,
            Self::SmallRoom => 25,
            Self::LargeRoom => 60,
            Self::Hall => 110,
            Self::Outside => 180,
            Self::Stadium => 240,
        };
        EchoTap {
            delay_ms,
            level: 1.0 - self.dry_level(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/acoustic.rs"]
mod tests;
