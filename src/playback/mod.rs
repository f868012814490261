pub mod export;
pub mod player;

pub use export::{ExportDriver, ExportStats};
pub use player::{Player, PlayerEvent, TimeProperties, run_realtime};
