//! Software rasterizing viewer for triangle meshes: OBJ loading, model/world transforms,
//! camera projection, scanline triangle fill with a depth buffer and Phong lighting.

pub mod app;
pub mod error;
pub mod render;
pub mod scene;
pub mod util;
