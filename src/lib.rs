//! Shotreel turns authored scenes and shots into a timed movie.
//!
//! The pipeline runs strictly downward:
//!
//! - resolve and cache the referenced media ([`MediaResolver`])
//! - build a timed, faded, zoomed [`Timeline`]
//! - draw frames with the [`CanvasRenderer`] and mix the soundtrack ([`mix`])
//! - drive both interactively ([`Player`]) or exhaustively into a [`FrameSink`] ([`ExportDriver`])
//!
//! [`VideoCreator`] wraps the whole flow behind one session object.
#![forbid(unsafe_code)]

pub mod assets;
pub mod audio;
pub mod encode;
pub mod foundation;
pub mod playback;
pub mod render;
pub mod scene;
pub mod session;
pub mod timeline;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, canvas_height};
pub use crate::foundation::error::{ShotreelError, ShotreelResult};
pub use crate::foundation::time::{CancelToken, wait};

pub use crate::assets::resolver::{MediaRequest, MediaResolver, RetryPolicy};
pub use crate::assets::source::{FsSource, MediaSource, MemorySource};
pub use crate::audio::mix::{AudioTrack, mix};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::sink::{AudioInputConfig, FrameSink, InMemorySink, SinkConfig};
pub use crate::playback::{ExportDriver, ExportStats, Player, PlayerEvent, TimeProperties};
pub use crate::render::{
    CanvasOptions, CanvasRenderer, DrawSurface, FrameRGBA, LiveCanvas, OffscreenCanvas, ShotPhase,
};
pub use crate::scene::{Scene, SceneDoc, Shot, scenes_from_json_str, scenes_from_path};
pub use crate::session::{AccessPrivilege, CreatorOpts, Env, VideoCreator, Volume};
pub use crate::timeline::{
    FetchedShot, MediaData, ShotDuration, Timeline, TimelineWarning, build_timeline,
    prepare_media_data,
};
