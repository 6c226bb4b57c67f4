//! Software rendering pipeline and the background frame loop.
//!
//! The [`Renderer`] handle owns a named thread running a [`RenderLoop`]. Each
//! frame streams terrain chunks around the camera, applies queued
//! [`RenderEvent`]s, and rasterizes every visible mesh into a
//! [`FrameBuffer`] that is handed to a [`Presenter`].

mod cache;
mod camera;
mod error;
mod frame;
mod input;
mod raster;
mod render_loop;
mod renderer;
mod shader;
mod visibility;

pub use cache::ChunkCache;
pub use camera::{Camera, MAX_PITCH};
pub use error::RenderError;
pub use frame::FrameBuffer;
pub use input::{InputState, Key, RenderEvent};
pub use raster::{NEAR_PLANE, Projector, ScreenTriangle, clip_near, rasterize};
pub use render_loop::{FrameStats, NullPresenter, Presenter, RenderLoop};
pub use renderer::{Renderer, THREAD_NAME};
pub use shader::{HeightShader, Light, ShadeOptions, Shader};
pub use visibility::{DistanceCulling, VisibilityTest};
