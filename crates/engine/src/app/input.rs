use super::geometry::Vec2;

/// Level-triggered actions: the state reflects whether the key is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Quit,
}

const ACTION_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Quit => 4,
        }
    }
}

/// Edge-triggered presses: each is true for exactly one tick per key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PressedEdges {
    pub attack: bool,
    pub shoot: bool,
    pub restart: bool,
    pub toggle_music: bool,
    pub pointer: bool,
}

/// Everything a scene may read about input for one simulation tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    pressed: PressedEdges,
    cursor_position_px: Option<Vec2>,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        actions: ActionStates,
        pressed: PressedEdges,
        cursor_position_px: Option<Vec2>,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            quit_requested,
            actions,
            pressed,
            cursor_position_px,
            window_width,
            window_height,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn attack_pressed(&self) -> bool {
        self.pressed.attack
    }

    pub fn shoot_pressed(&self) -> bool {
        self.pressed.shoot
    }

    pub fn restart_pressed(&self) -> bool {
        self.pressed.restart
    }

    pub fn toggle_music_pressed(&self) -> bool {
        self.pressed.toggle_music
    }

    pub fn pointer_pressed(&self) -> bool {
        self.pressed.pointer
    }

    pub fn cursor_position_px(&self) -> Option<Vec2> {
        self.cursor_position_px
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_pressed(mut self, pressed: PressedEdges) -> Self {
        self.pressed = pressed;
        self
    }

    pub fn with_cursor_position_px(mut self, cursor_position_px: Option<Vec2>) -> Self {
        self.cursor_position_px = cursor_position_px;
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }
}

/// Tracks the held state of one key and latches a press edge on the
/// released-to-pressed transition.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct EdgeLatch {
    is_down: bool,
    pressed: bool,
}

impl EdgeLatch {
    pub(crate) fn set_down(&mut self, is_down: bool) {
        if is_down && !self.is_down {
            self.pressed = true;
        }
        self.is_down = is_down;
    }

    pub(crate) fn take(&mut self) -> bool {
        let pressed = self.pressed;
        self.pressed = false;
        pressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_latch_fires_once_per_press() {
        let mut latch = EdgeLatch::default();
        latch.set_down(true);
        assert!(latch.take());
        latch.set_down(true);
        assert!(!latch.take());
        latch.set_down(false);
        latch.set_down(true);
        assert!(latch.take());
    }

    #[test]
    fn snapshot_builders_set_level_and_edge_state() {
        let snapshot = InputSnapshot::empty()
            .with_action_down(InputAction::MoveLeft, true)
            .with_pressed(PressedEdges {
                attack: true,
                ..PressedEdges::default()
            });
        assert!(snapshot.is_down(InputAction::MoveLeft));
        assert!(!snapshot.is_down(InputAction::MoveRight));
        assert!(snapshot.attack_pressed());
        assert!(!snapshot.shoot_pressed());
    }
}
