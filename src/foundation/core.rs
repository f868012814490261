use crate::foundation::error::{ShotreelError, ShotreelResult};

pub use kurbo::{Affine, Point};

/// Output aspect ratio numerator (width units).
pub const ASPECT_W: u32 = 16;
/// Output aspect ratio denominator (height units).
pub const ASPECT_H: u32 = 9;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 25, den: 1 }
    }
}

impl Fps {
    pub fn new(num: u32, den: u32) -> ShotreelResult<Self> {
        if den == 0 {
            return Err(ShotreelError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(ShotreelError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Length of one frame in milliseconds.
    pub fn frame_ms(self) -> f64 {
        1000.0 * f64::from(self.den) / f64::from(self.num)
    }

    /// Timeline position (ms) of the start of frame `frame`.
    pub fn frame_to_ms(self, frame: FrameIndex) -> f64 {
        (frame.0 as f64) * self.frame_ms()
    }

    /// Number of frames needed to cover `ms` milliseconds.
    pub fn frames_covering_ms(self, ms: u64) -> u64 {
        let num = u128::from(ms) * u128::from(self.num);
        let den = 1000u128 * u128::from(self.den);
        num.div_ceil(den) as u64
    }
}

/// Canvas height for a 16:9 frame of the given width.
pub fn canvas_height(width: f64) -> f64 {
    width * f64::from(ASPECT_H) / f64::from(ASPECT_W)
}

/// Pixel geometry of the drawing surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    /// 16:9 canvas derived from `width`; the fractional height is rounded to whole pixels.
    pub fn from_width(width: u32) -> ShotreelResult<Self> {
        if width == 0 {
            return Err(ShotreelError::validation("canvas width must be > 0"));
        }
        let height = canvas_height(f64::from(width)).round().max(1.0) as u32;
        Ok(Self { width, height })
    }

    pub fn pixel_len(self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
