//! Input events delivered to the render thread, and the held-key state they build.
//!
//! The embedding window maps its platform keys to [`Key`] actions and sends
//! [`RenderEvent`]s through [`Renderer::send`](crate::Renderer::send). Events
//! are queued and only applied in the view stage, between frames.

use glam::Vec3;
use hashbrown::HashSet;
use strata_mesh::Mesh;

/// Bindable actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Forward,
    Back,
    Left,
    Right,
    Up,
    Down,
    ToggleColorByHeight,
    ToggleShading,
    ToggleLighting,
    ToggleCursorLock,
    /// Re-roll the world seed and drop every cached chunk.
    Regenerate,
    Quit,
}

impl Key {
    /// Camera-local direction for a movement key (x right, y up, z forward).
    pub fn movement(self) -> Option<Vec3> {
        match self {
            Key::Forward => Some(Vec3::Z),
            Key::Back => Some(Vec3::NEG_Z),
            Key::Left => Some(Vec3::NEG_X),
            Key::Right => Some(Vec3::X),
            Key::Up => Some(Vec3::Y),
            Key::Down => Some(Vec3::NEG_Y),
            _ => None,
        }
    }

    /// Default key for each action, as a character: WASD, space/c, 1-4, r, escape.
    pub fn from_char(c: char) -> Option<Self> {
        Some(match c.to_ascii_lowercase() {
            'w' => Key::Forward,
            's' => Key::Back,
            'a' => Key::Left,
            'd' => Key::Right,
            ' ' => Key::Up,
            'c' => Key::Down,
            '1' => Key::ToggleColorByHeight,
            '2' => Key::ToggleShading,
            '3' => Key::ToggleLighting,
            '4' => Key::ToggleCursorLock,
            'r' => Key::Regenerate,
            '\u{1b}' => Key::Quit,
            _ => return None,
        })
    }
}

/// Something that happened in the window since the last view update.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderEvent {
    /// Pointer movement in pixels; `dy` grows downward.
    Pointer { dx: f32, dy: f32 },
    Key { key: Key, pressed: bool },
    Resize { width: usize, height: usize },
    /// Add an external mesh to the render set, outside the chunk cache.
    AddModel(Mesh),
}

/// Which keys are held, and which were pressed since the last frame.
#[derive(Clone, Debug, Default)]
pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key transition. Repeated presses of a held key are ignored.
    pub fn process(&mut self, key: Key, pressed: bool) {
        if pressed {
            if self.held.insert(key) {
                self.just_pressed.insert(key);
            }
        } else {
            self.held.remove(&key);
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    /// Keys pressed since the last [`clear_transients`](Self::clear_transients).
    pub fn pressed_keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.just_pressed.iter().copied()
    }

    /// Sum of the held movement directions, normalized; zero when nothing
    /// (or only opposing keys) is held.
    pub fn movement(&self) -> Vec3 {
        self.held
            .iter()
            .filter_map(|key| key.movement())
            .sum::<Vec3>()
            .normalize_or_zero()
    }

    pub fn clear_transients(&mut self) {
        self.just_pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_and_release() {
        let mut input = InputState::new();
        input.process(Key::Forward, true);
        assert!(input.is_held(Key::Forward));
        assert!(input.just_pressed(Key::Forward));
        input.clear_transients();
        assert!(!input.just_pressed(Key::Forward));
        input.process(Key::Forward, false);
        assert!(!input.is_held(Key::Forward));
    }

    #[test]
    fn test_repeat_press_not_just_pressed_again() {
        let mut input = InputState::new();
        input.process(Key::ToggleShading, true);
        input.clear_transients();
        input.process(Key::ToggleShading, true);
        assert!(!input.just_pressed(Key::ToggleShading));
    }

    #[test]
    fn test_movement_normalized() {
        let mut input = InputState::new();
        input.process(Key::Forward, true);
        input.process(Key::Right, true);
        let m = input.movement();
        assert!((m.length() - 1.0).abs() < 1e-6);
        assert!(m.x > 0.0 && m.z > 0.0);
    }

    #[test]
    fn test_opposing_keys_cancel() {
        let mut input = InputState::new();
        input.process(Key::Up, true);
        input.process(Key::Down, true);
        assert_eq!(input.movement(), Vec3::ZERO);
    }

    #[test]
    fn test_default_bindings() {
        assert_eq!(Key::from_char('W'), Some(Key::Forward));
        assert_eq!(Key::from_char('r'), Some(Key::Regenerate));
        assert_eq!(Key::from_char('x'), None);
        assert_eq!(Key::ToggleLighting.movement(), None);
    }
}
