pub mod acoustic;
pub mod builder;
pub mod duration;
pub mod envelope;
pub mod media_data;
pub mod shot;

pub use acoustic::AcousticEnv;
pub use builder::{TimelineBuilder, build_timeline};
pub use duration::ShotDuration;
pub use envelope::{TimelineWarning, ZoomEnvelope};
pub use media_data::{MediaData, VoiceCue, prepare_media_data};
pub use shot::{FetchedShot, Timeline, VoiceLine};
