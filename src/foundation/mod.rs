pub mod core;
pub mod error;
pub(crate) mod math;
pub mod time;
