pub mod access;
pub mod creator;
pub mod opts;

pub use access::{AccessPrivilege, Capabilities, Env, validate_access};
pub use creator::VideoCreator;
pub use opts::{CreatorOpts, Volume};
