pub mod model;

pub use model::{
    BoundingBox, DialogLine, Music, Scene, SceneDoc, Shot, ShotTransition, ZoomDirection,
    scenes_from_json_str, scenes_from_path,
};
