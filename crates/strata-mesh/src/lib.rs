//! Geometry containers shared by the terrain generator and the renderer:
//! colors, triangles, meshes, and the model-loading seam.

pub mod color;
pub mod mesh;
pub mod model;

pub use color::{Color, height_ramp};
pub use mesh::{Mesh, Triangle};
pub use model::{ModelError, ModelLoader};
