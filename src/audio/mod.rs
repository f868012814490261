pub mod manifest;
pub mod mix;

pub use manifest::{AudioManifest, AudioSegment, TrackKind, build_audio_manifest};
pub use mix::{AudioTrack, mix, write_mix_to_f32le_file};
