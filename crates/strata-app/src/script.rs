//! Scripted fly-through that stands in for a user at the keyboard.

use strata_render::{Key, RenderEvent};

/// Pointer pixels of yaw applied every frame.
const TURN_PER_FRAME: f32 = 2.0;

/// Drives the camera forward with a slow weave for a fixed number of frames.
#[derive(Clone, Copy, Debug)]
pub struct FlyThrough {
    frames: u64,
}

fn tap(key: Key) -> [RenderEvent; 2] {
    [
        RenderEvent::Key { key, pressed: true },
        RenderEvent::Key { key, pressed: false },
    ]
}

impl FlyThrough {
    pub fn new(frames: u64) -> Self {
        Self { frames }
    }

    /// Events sent before the first frame: capture the pointer and start flying.
    pub fn opening(&self) -> Vec<RenderEvent> {
        let mut events = tap(Key::ToggleCursorLock).to_vec();
        events.push(RenderEvent::Key {
            key: Key::Forward,
            pressed: true,
        });
        events
    }

    /// Events to send once `frame` has been presented.
    pub fn after(&self, frame: u64) -> Vec<RenderEvent> {
        let weave = if (frame / 90) % 2 == 0 { 0.6 } else { -0.6 };
        let mut events = vec![RenderEvent::Pointer {
            dx: TURN_PER_FRAME,
            dy: weave,
        }];
        if frame + 1 == self.frames / 2 {
            events.extend(tap(Key::ToggleLighting));
        }
        if frame + 1 == self.frames * 3 / 4 {
            events.extend(tap(Key::ToggleColorByHeight));
        }
        events
    }
}
