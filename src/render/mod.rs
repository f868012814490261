pub mod canvas;
pub mod composite;
pub mod surface;

pub use canvas::{CanvasOptions, CanvasRenderer, ShotPhase};
pub use surface::{DrawSurface, FrameRGBA, LiveCanvas, OffscreenCanvas};
