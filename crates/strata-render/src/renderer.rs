//! Handle to the background render thread.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use crossbeam_channel::{Sender, unbounded};
use strata_mesh::{Color, ModelLoader};
use tracing::{info, warn};

use crate::error::RenderError;
use crate::input::RenderEvent;
use crate::render_loop::RenderLoop;

/// Name of the render thread, visible in logs and debuggers.
pub const THREAD_NAME: &str = "strata-render";

/// Owns the render thread. Dropping the handle stops the loop and joins it.
pub struct Renderer {
    running: Arc<AtomicBool>,
    events: Sender<RenderEvent>,
    handle: Option<JoinHandle<RenderLoop>>,
}

impl Renderer {
    /// Move `render_loop` onto a new thread and start it.
    pub fn spawn(render_loop: RenderLoop) -> Result<Self, RenderError> {
        let running = Arc::new(AtomicBool::new(true));
        let (events, receiver) = unbounded();

        let flag = Arc::clone(&running);
        let handle = std::thread::Builder::new()
            .name(THREAD_NAME.into())
            .spawn(move || render_loop.run(&flag, &receiver))
            .map_err(RenderError::Spawn)?;

        info!("renderer spawned");
        Ok(Self {
            running,
            events,
            handle: Some(handle),
        })
    }

    /// Whether the loop is still going.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
            && self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Queue an event for the next view update.
    pub fn send(&self, event: RenderEvent) -> Result<(), RenderError> {
        self.events.send(event).map_err(|_| RenderError::Disconnected)
    }

    /// Load a mesh with `loader` and queue it for the render set.
    pub fn load_model(
        &self,
        loader: &dyn ModelLoader,
        path: &Path,
        color: Color,
    ) -> Result<(), RenderError> {
        let mesh = loader.load(path, color)?;
        info!(path = %path.display(), triangles = mesh.triangle_count(), "model loaded");
        self.send(RenderEvent::AddModel(mesh))
    }

    /// Ask the loop to stop after its current stage and wait for it.
    ///
    /// Returns the loop's final state, or `None` if it was already collected.
    pub fn stop(&mut self) -> Result<Option<RenderLoop>, RenderError> {
        self.running.store(false, Ordering::Release);
        self.join()
    }

    /// Wait for the loop to end on its own (frame limit or quit key).
    pub fn wait(mut self) -> Result<RenderLoop, RenderError> {
        self.join()?.ok_or(RenderError::Disconnected)
    }

    fn join(&mut self) -> Result<Option<RenderLoop>, RenderError> {
        match self.handle.take() {
            Some(handle) => {
                let render_loop = handle.join().map_err(|_| RenderError::Panicked)?;
                info!("renderer joined");
                Ok(Some(render_loop))
            }
            None => Ok(None),
        }
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Err(error) = self.join() {
            warn!(%error, "render thread ended abnormally");
        }
    }
}
