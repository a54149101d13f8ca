//! Keyboard handling as a pure state transition.
//!
//! The platform layer translates window-system key events into [`Key`] and
//! [`KeyAction`]; [`Controls::handle_key`] turns them into a new `Controls`
//! value plus an optional one-shot [`Command`]. Held keys (object movement,
//! scaling) live in `Controls` and are applied per frame by the world.

/// Keys the demos react to. Everything else maps to `Other`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Tab,
    Digit(u8),
    W,
    A,
    S,
    D,
    Q,
    E,
    I,
    J,
    K,
    X,
    Y,
    Z,
    R,
    N,
    F,
    L,
    Left,
    Right,
    Up,
    Down,
    Minus,
    Equal,
    LeftBracket,
    RightBracket,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Press,
    Repeat,
    Release,
}

impl KeyAction {
    #[inline]
    fn is_down(self) -> bool {
        matches!(self, KeyAction::Press | KeyAction::Repeat)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Which key layout a demo uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Scheme {
    /// WASD/I/K move the selected object, X/Y/Z pick a rotation axis,
    /// +/- scale, digits select, arrows turn the camera.
    #[default]
    ObjectEditing,
    /// Same as `ObjectEditing` except digits toggle lights.
    Lighting,
    /// WASD/Q/E fly the camera, digits select a path, F/L save/load it.
    FlyCamera,
    /// Arrows orbit, W/S zoom, Q/E roll.
    Orbit,
}

/// One-shot effects a key press asks the demo to perform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    Quit,
    Select(usize),
    SelectNext,
    Spawn,
    ToggleLight(usize),
    SaveTrajectory,
    LoadTrajectory,
    /// Degrees.
    CameraRotate { yaw: f32, pitch: f32 },
    CameraMove { forward: f32, right: f32, up: f32 },
    CameraZoom(f32),
    /// Degrees.
    CameraRoll(f32),
}

/// Fixed per-press steps, matching the key-repeat feel of the course demos.
pub const CAMERA_MOVE_STEP: f32 = 0.1;
pub const CAMERA_ROTATE_STEP_DEG: f32 = 2.0;
pub const CAMERA_ZOOM_STEP: f32 = 0.2;
pub const CAMERA_ROLL_STEP_DEG: f32 = 2.0;

/// Keys currently held for continuous object motion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Held {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub scale_up: bool,
    pub scale_down: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub scheme: Scheme,
    pub held: Held,
    /// Axis the selected object spins around, if any.
    pub rotation_axis: Option<Axis>,
}

impl Controls {
    pub fn new(scheme: Scheme) -> Self {
        Self {
            scheme,
            ..Self::default()
        }
    }

    /// Apply one key event.
    pub fn handle_key(self, key: Key, action: KeyAction) -> (Self, Option<Command>) {
        if key == Key::Escape && action == KeyAction::Press {
            return (self, Some(Command::Quit));
        }
        match self.scheme {
            Scheme::ObjectEditing | Scheme::Lighting => self.object_editing(key, action),
            Scheme::FlyCamera => (self, fly_camera(key, action)),
            Scheme::Orbit => (self, orbit(key, action)),
        }
    }

    fn object_editing(mut self, key: Key, action: KeyAction) -> (Self, Option<Command>) {
        let down = action.is_down();
        let pressed = action == KeyAction::Press;
        let held = &mut self.held;

        let command = match key {
            Key::W => {
                held.forward = down;
                None
            }
            Key::S => {
                held.backward = down;
                None
            }
            Key::A => {
                held.left = down;
                None
            }
            Key::D => {
                held.right = down;
                None
            }
            Key::I => {
                held.up = down;
                None
            }
            Key::K | Key::J => {
                held.down = down;
                None
            }
            Key::Equal | Key::RightBracket => {
                held.scale_up = down;
                None
            }
            Key::Minus | Key::LeftBracket => {
                held.scale_down = down;
                None
            }
            Key::X if pressed => {
                self.rotation_axis = Some(Axis::X);
                None
            }
            Key::Y if pressed => {
                self.rotation_axis = Some(Axis::Y);
                None
            }
            Key::Z if pressed => {
                self.rotation_axis = Some(Axis::Z);
                None
            }
            Key::R if pressed => {
                self.rotation_axis = None;
                None
            }
            Key::Digit(n @ 1..=9) if pressed => Some(match self.scheme {
                Scheme::Lighting => Command::ToggleLight(usize::from(n - 1)),
                _ => Command::Select(usize::from(n - 1)),
            }),
            Key::Tab if pressed => Some(Command::SelectNext),
            Key::N if pressed => Some(Command::Spawn),
            Key::Q | Key::E if down => Some(Command::CameraMove {
                forward: 0.0,
                right: 0.0,
                up: if key == Key::Q {
                    CAMERA_MOVE_STEP
                } else {
                    -CAMERA_MOVE_STEP
                },
            }),
            _ if down => camera_rotation(key),
            _ => None,
        };
        (self, command)
    }
}

fn camera_rotation(key: Key) -> Option<Command> {
    let (yaw, pitch) = match key {
        Key::Left => (-CAMERA_ROTATE_STEP_DEG, 0.0),
        Key::Right => (CAMERA_ROTATE_STEP_DEG, 0.0),
        Key::Up => (0.0, CAMERA_ROTATE_STEP_DEG),
        Key::Down => (0.0, -CAMERA_ROTATE_STEP_DEG),
        _ => return None,
    };
    Some(Command::CameraRotate { yaw, pitch })
}

fn fly_camera(key: Key, action: KeyAction) -> Option<Command> {
    if action == KeyAction::Press {
        match key {
            Key::Digit(n @ 1..=9) => return Some(Command::Select(usize::from(n - 1))),
            Key::F => return Some(Command::SaveTrajectory),
            Key::L => return Some(Command::LoadTrajectory),
            _ => {}
        }
    }
    if !action.is_down() {
        return None;
    }
    let step = CAMERA_MOVE_STEP;
    let (forward, right, up) = match key {
        Key::W => (step, 0.0, 0.0),
        Key::S => (-step, 0.0, 0.0),
        Key::D => (0.0, step, 0.0),
        Key::A => (0.0, -step, 0.0),
        Key::Q => (0.0, 0.0, step),
        Key::E => (0.0, 0.0, -step),
        _ => return camera_rotation(key),
    };
    Some(Command::CameraMove { forward, right, up })
}

fn orbit(key: Key, action: KeyAction) -> Option<Command> {
    if !action.is_down() {
        return None;
    }
    match key {
        Key::W => Some(Command::CameraZoom(-CAMERA_ZOOM_STEP)),
        Key::S => Some(Command::CameraZoom(CAMERA_ZOOM_STEP)),
        Key::Q => Some(Command::CameraRoll(-CAMERA_ROLL_STEP_DEG)),
        Key::E => Some(Command::CameraRoll(CAMERA_ROLL_STEP_DEG)),
        _ => camera_rotation(key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_keys_follow_press_and_release() {
        let c = Controls::new(Scheme::ObjectEditing);
        let (c, cmd) = c.handle_key(Key::W, KeyAction::Press);
        assert!(cmd.is_none());
        assert!(c.held.forward);
        let (c, _) = c.handle_key(Key::W, KeyAction::Repeat);
        assert!(c.held.forward);
        let (c, _) = c.handle_key(Key::Equal, KeyAction::Press);
        assert!(c.held.scale_up);
        let (c, _) = c.handle_key(Key::W, KeyAction::Release);
        assert!(!c.held.forward);
        assert!(c.held.scale_up);
    }

    #[test]
    fn rotation_axis_is_exclusive() {
        let c = Controls::default();
        let (c, _) = c.handle_key(Key::X, KeyAction::Press);
        assert_eq!(c.rotation_axis, Some(Axis::X));
        let (c, _) = c.handle_key(Key::Z, KeyAction::Press);
        assert_eq!(c.rotation_axis, Some(Axis::Z));
        let (c, _) = c.handle_key(Key::R, KeyAction::Press);
        assert_eq!(c.rotation_axis, None);
    }

    #[test]
    fn digits_depend_on_scheme() {
        let (_, cmd) = Controls::new(Scheme::ObjectEditing).handle_key(Key::Digit(2), KeyAction::Press);
        assert_eq!(cmd, Some(Command::Select(1)));
        let (_, cmd) = Controls::new(Scheme::Lighting).handle_key(Key::Digit(3), KeyAction::Press);
        assert_eq!(cmd, Some(Command::ToggleLight(2)));
        // Repeats do not re-toggle.
        let (_, cmd) = Controls::new(Scheme::Lighting).handle_key(Key::Digit(3), KeyAction::Repeat);
        assert_eq!(cmd, None);
    }

    #[test]
    fn escape_quits_in_every_scheme() {
        for scheme in [
            Scheme::ObjectEditing,
            Scheme::Lighting,
            Scheme::FlyCamera,
            Scheme::Orbit,
        ] {
            let (_, cmd) = Controls::new(scheme).handle_key(Key::Escape, KeyAction::Press);
            assert_eq!(cmd, Some(Command::Quit));
        }
    }

    #[test]
    fn fly_camera_keys() {
        let c = Controls::new(Scheme::FlyCamera);
        let (c2, cmd) = c.handle_key(Key::W, KeyAction::Repeat);
        assert_eq!(c2, c);
        assert_eq!(
            cmd,
            Some(Command::CameraMove {
                forward: CAMERA_MOVE_STEP,
                right: 0.0,
                up: 0.0
            })
        );
        assert_eq!(c.handle_key(Key::F, KeyAction::Press).1, Some(Command::SaveTrajectory));
        assert_eq!(c.handle_key(Key::L, KeyAction::Repeat).1, None);
        assert_eq!(
            c.handle_key(Key::Left, KeyAction::Press).1,
            Some(Command::CameraRotate { yaw: -2.0, pitch: 0.0 })
        );
    }

    #[test]
    fn orbit_keys() {
        let c = Controls::new(Scheme::Orbit);
        assert_eq!(c.handle_key(Key::W, KeyAction::Press).1, Some(Command::CameraZoom(-0.2)));
        assert_eq!(c.handle_key(Key::E, KeyAction::Repeat).1, Some(Command::CameraRoll(2.0)));
        assert_eq!(c.handle_key(Key::E, KeyAction::Release).1, None);
    }

    #[test]
    fn camera_keys_in_object_editing() {
        let c = Controls::default();
        assert_eq!(
            c.handle_key(Key::Q, KeyAction::Press).1,
            Some(Command::CameraMove { forward: 0.0, right: 0.0, up: 0.1 })
        );
        assert_eq!(
            c.handle_key(Key::Up, KeyAction::Repeat).1,
            Some(Command::CameraRotate { yaw: 0.0, pitch: 2.0 })
        );
        assert_eq!(c.handle_key(Key::Up, KeyAction::Release).1, None);
    }
}
