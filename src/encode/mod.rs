pub mod ffmpeg;
pub mod sink;

pub use ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use sink::{AudioInputConfig, FrameSink, InMemorySink, SinkConfig};
