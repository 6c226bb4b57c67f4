//! The frame loop run by the render thread.
//!
//! Every frame goes through up to four stages, in order:
//!
//! 1. **World update** (every `chunk_update` frames, or after a regenerate):
//!    evict chunks outside the render window, generate the missing ones in
//!    parallel, then insert them serially.
//! 2. **View update**: drain queued [`RenderEvent`]s and move the camera.
//! 3. **Render**: cull, shade, clip, project, and rasterize into the frame
//!    buffer, then hand it to the [`Presenter`].
//! 4. **Pacing**: sleep out the rest of `ms_per_frame`.
//!
//! The loop checks its running flag before every stage, so a stop request
//! lets the current stage finish and starts no new one.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use glam::Vec3;
use rayon::prelude::*;
use strata_config::{Config, RenderSettings};
use strata_mesh::{Color, Mesh};
use strata_terrain::Terraformer;
use tracing::{debug, info, trace, warn};

use crate::cache::ChunkCache;
use crate::camera::Camera;
use crate::error::RenderError;
use crate::frame::FrameBuffer;
use crate::input::{InputState, Key, RenderEvent};
use crate::raster::{Projector, ScreenTriangle, clip_near, rasterize};
use crate::shader::{HeightShader, Light, ShadeOptions, Shader};
use crate::visibility::{DistanceCulling, VisibilityTest};

/// Numbers describing one finished frame; what an overlay would draw.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStats {
    pub frame: u64,
    /// Time spent in the world, view, and render stages (pacing excluded).
    pub frame_time: Duration,
    pub chunks: usize,
    pub visible_meshes: usize,
    pub triangles: usize,
    pub pixels_written: usize,
}

impl FrameStats {
    pub fn fps(&self) -> f64 {
        let secs = self.frame_time.as_secs_f64();
        if secs > 0.0 { 1.0 / secs } else { f64::INFINITY }
    }
}

/// Receives every finished frame.
pub trait Presenter: Send {
    fn present(&mut self, frame: &FrameBuffer, stats: &FrameStats);
}

impl<F> Presenter for F
where
    F: FnMut(&FrameBuffer, &FrameStats) + Send,
{
    fn present(&mut self, frame: &FrameBuffer, stats: &FrameStats) {
        self(frame, stats)
    }
}

/// Discards frames.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn present(&mut self, _frame: &FrameBuffer, _stats: &FrameStats) {}
}

/// Everything the render thread owns.
pub struct RenderLoop {
    settings: RenderSettings,
    camera: Camera,
    cache: ChunkCache,
    frame: FrameBuffer,
    terrain: Terraformer,
    models: Vec<Mesh>,
    lights: Vec<Light>,
    shader: Box<dyn Shader>,
    visibility: Box<dyn VisibilityTest>,
    presenter: Box<dyn Presenter>,
    input: InputState,
    background: Color,
    cursor_locked: bool,
    world_dirty: bool,
    frame_index: u64,
    frame_limit: Option<u64>,
}

impl RenderLoop {
    /// Build a loop over the stock biomes, with the camera hovering above the
    /// terrain at the world origin.
    pub fn new(config: &Config) -> Result<Self, RenderError> {
        config.validate()?;
        let terrain = Terraformer::with_default_biomes(config.terrain.clone(), config.seed)?;
        let visibility = DistanceCulling::for_render_distance(
            config.render.render_distance,
            config.terrain.chunk_extent(),
        );

        let mut camera = Camera::new(Vec3::new(0.0, config.terrain.base + config.terrain.stretch * 5.0, 0.0));
        camera.rotate(0.0, -0.35);

        Ok(Self {
            settings: config.render.clone(),
            camera,
            cache: ChunkCache::new(),
            frame: FrameBuffer::new(config.window.width as usize, config.window.height as usize),
            terrain,
            models: Vec::new(),
            lights: vec![Light::default()],
            shader: Box::new(HeightShader),
            visibility: Box::new(visibility),
            presenter: Box::new(NullPresenter),
            input: InputState::new(),
            background: Color::SKY_BLUE,
            cursor_locked: false,
            world_dirty: true,
            frame_index: 0,
            frame_limit: None,
        })
    }

    /// Replace the terraformer, e.g. to use a custom biome list. The cache is
    /// cleared and refilled on the next frame.
    pub fn with_terraformer(mut self, terrain: Terraformer) -> Self {
        self.visibility = Box::new(DistanceCulling::for_render_distance(
            self.settings.render_distance,
            terrain.settings().chunk_extent(),
        ));
        self.terrain = terrain;
        self.cache.clear();
        self.world_dirty = true;
        self
    }

    pub fn with_presenter(mut self, presenter: impl Presenter + 'static) -> Self {
        self.presenter = Box::new(presenter);
        self
    }

    pub fn with_shader(mut self, shader: impl Shader + 'static) -> Self {
        self.shader = Box::new(shader);
        self
    }

    pub fn with_visibility(mut self, visibility: impl VisibilityTest + 'static) -> Self {
        self.visibility = Box::new(visibility);
        self
    }

    pub fn with_lights(mut self, lights: Vec<Light>) -> Self {
        self.lights = lights;
        self
    }

    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }

    /// Stop on its own after `frames` frames.
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn cache(&self) -> &ChunkCache {
        &self.cache
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn terrain(&self) -> &Terraformer {
        &self.terrain
    }

    pub fn models(&self) -> &[Mesh] {
        &self.models
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn cursor_locked(&self) -> bool {
        self.cursor_locked
    }

    /// Frames presented so far.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    fn limit_reached(&self) -> bool {
        self.frame_limit.is_some_and(|limit| self.frame_index >= limit)
    }

    fn world_due(&self) -> bool {
        self.world_dirty || self.frame_index % self.settings.chunk_update == 0
    }

    /// Run until `running` is cleared, a [`Key::Quit`] arrives, or the frame
    /// limit is hit. Returns the loop so its final state can be inspected.
    pub fn run(mut self, running: &AtomicBool, events: &Receiver<RenderEvent>) -> Self {
        info!(
            width = self.frame.width(),
            height = self.frame.height(),
            render_distance = self.settings.render_distance,
            seed = self.terrain.seed(),
            "render loop started"
        );
        let alive = || running.load(Ordering::Acquire);

        while alive() && !self.limit_reached() {
            let started = Instant::now();

            if self.world_due() {
                self.world_update();
                if !alive() {
                    break;
                }
            }

            if self.view_update(events.try_iter()).is_break() {
                running.store(false, Ordering::Release);
                break;
            }
            if !alive() {
                break;
            }

            let stats = self.render_frame(started);
            self.presenter.present(&self.frame, &stats);
            self.frame_index += 1;

            pace(started, self.settings.ms_per_frame);
        }

        info!(frames = self.frame_index, faults = self.terrain.faults(), "render loop stopped");
        self
    }

    /// Run one frame without pacing or a running flag. Returns `None` if the
    /// events contained [`Key::Quit`].
    pub fn step(&mut self, events: impl IntoIterator<Item = RenderEvent>) -> Option<FrameStats> {
        let started = Instant::now();
        if self.world_due() {
            self.world_update();
        }
        if self.view_update(events).is_break() {
            return None;
        }
        let stats = self.render_frame(started);
        self.presenter.present(&self.frame, &stats);
        self.frame_index += 1;
        Some(stats)
    }

    /// Stream chunks around the camera. Returns how many chunks were generated.
    ///
    /// Afterwards the cache holds at most `(2 * render_distance + 1)²` chunks,
    /// all within the Chebyshev window around the camera's chunk.
    pub fn world_update(&mut self) -> usize {
        self.world_dirty = false;
        let Some(center) = self.terrain.to_chunk(self.camera.position) else {
            warn!(position = ?self.camera.position, "camera outside addressable world; streaming skipped");
            return 0;
        };
        let radius = self.settings.render_distance;
        let evicted = self.cache.retain_within(center, radius);

        let terrain = &self.terrain;
        let missing = self.cache.missing(center, radius, |coord| terrain.in_bounds(coord));
        let generated: Vec<_> = missing
            .into_par_iter()
            .map(|coord| (coord, terrain.generate_chunk(coord)))
            .collect();

        let mut inserted = 0;
        for (coord, result) in generated {
            match result {
                Ok(mesh) => {
                    self.cache.insert(coord, mesh);
                    inserted += 1;
                }
                Err(error) => warn!(chunk = %coord, %error, "chunk skipped"),
            }
        }

        debug!(
            center = %center,
            inserted,
            evicted,
            cached = self.cache.len(),
            "world update"
        );
        inserted
    }

    /// Apply queued events, then move the camera along the held keys and
    /// advance external meshes by their velocity.
    pub fn view_update(&mut self, events: impl IntoIterator<Item = RenderEvent>) -> ControlFlow<()> {
        for event in events {
            match event {
                RenderEvent::Pointer { dx, dy } => {
                    if self.cursor_locked {
                        let s = self.settings.sensitivity;
                        self.camera.rotate(dx * s, -dy * s);
                    }
                }
                RenderEvent::Key { key, pressed } => self.input.process(key, pressed),
                RenderEvent::Resize { width, height } => {
                    if width > 0 && height > 0 {
                        self.frame.resize(width, height);
                        debug!(width, height, "frame buffer resized");
                    }
                }
                RenderEvent::AddModel(mesh) => {
                    debug!(triangles = mesh.triangle_count(), "model added");
                    self.models.push(mesh);
                }
            }
        }

        let pressed: Vec<Key> = self.input.pressed_keys().collect();
        self.input.clear_transients();
        for key in pressed {
            match key {
                Key::ToggleColorByHeight => self.settings.color_by_height ^= true,
                Key::ToggleShading => self.settings.shading ^= true,
                Key::ToggleLighting => self.settings.use_lighting ^= true,
                Key::ToggleCursorLock => self.cursor_locked ^= true,
                Key::Regenerate => self.regenerate(rand::random()),
                Key::Quit => return ControlFlow::Break(()),
                _ => {}
            }
        }

        let movement = self.input.movement();
        if movement != Vec3::ZERO {
            self.camera.translate(movement * self.settings.speed);
        }
        for model in &mut self.models {
            model.advance();
        }
        ControlFlow::Continue(())
    }

    /// Re-seed the terrain and drop every cached chunk; the next frame
    /// streams the new world in.
    pub fn regenerate(&mut self, seed: u64) {
        self.terrain.regenerate(seed);
        self.cache.clear();
        self.world_dirty = true;
        info!(seed, "world regenerated");
    }

    /// Clear, cull, shade, project, and rasterize every mesh.
    pub fn render_frame(&mut self, started: Instant) -> FrameStats {
        self.frame.clear(self.background);

        let camera = &self.camera;
        let visibility = &self.visibility;
        for mesh in self.cache.meshes_mut().chain(self.models.iter_mut()) {
            mesh.visible = visibility.is_visible(mesh, camera);
        }

        let meshes: Vec<&Mesh> = self
            .cache
            .meshes()
            .chain(self.models.iter())
            .filter(|mesh| mesh.visible)
            .collect();

        let projector = Projector::new(self.settings.field_of_view, self.frame.width(), self.frame.height());
        let options = ShadeOptions::new(&self.settings, self.terrain.settings());
        let shader = self.shader.as_ref();
        let lights = self.lights.as_slice();

        let triangles: Vec<ScreenTriangle> = meshes
            .par_iter()
            .flat_map_iter(|&mesh| {
                mesh.world_faces().flat_map(move |face| {
                    let color = shader.shade(&face, lights, &options);
                    clip_near(face.points.map(|p| camera.to_view(p)))
                        .map(move |view| projector.project_triangle(view, color))
                })
            })
            .collect();

        let pixels_written = rasterize(&mut self.frame, &triangles);

        let stats = FrameStats {
            frame: self.frame_index,
            frame_time: started.elapsed(),
            chunks: self.cache.len(),
            visible_meshes: meshes.len(),
            triangles: triangles.len(),
            pixels_written,
        };
        trace!(?stats, "frame rendered");
        stats
    }
}

/// Sleep out whatever is left of the frame budget.
fn pace(started: Instant, ms_per_frame: u64) {
    let budget = Duration::from_millis(ms_per_frame);
    if let Some(rest) = budget.checked_sub(started.elapsed()) {
        std::thread::sleep(rest);
    }
}
