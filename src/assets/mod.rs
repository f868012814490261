pub mod decode;
pub mod fetched;
pub mod media;
pub mod resolver;
pub mod source;
