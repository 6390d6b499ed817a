use engine::{InputAction, InputSnapshot, Vec2};

pub(crate) const TILE_SIZE: u32 = 16;
pub(crate) const MAP_WIDTH: u32 = 60;
pub(crate) const MAP_HEIGHT: u32 = 44;

/// Horizontal flips only follow facing once |facing.x| clears this.
pub(crate) const FLIP_DEADZONE: f32 = 0.1;

/// World position of the center of tile (x, y).
pub(crate) fn tile_center(tile_x: i32, tile_y: i32) -> Vec2 {
    let size = TILE_SIZE as f32;
    Vec2::new(
        tile_x as f32 * size + size * 0.5,
        tile_y as f32 * size + size * 0.5,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CardinalDir {
    Down,
    Left,
    Right,
    Up,
}

impl CardinalDir {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            CardinalDir::Down => "down",
            CardinalDir::Left => "left",
            CardinalDir::Right => "right",
            CardinalDir::Up => "up",
        }
    }

    /// Dominant axis of `delta`; ties go to the vertical axis.
    pub(crate) fn dominant(delta: Vec2) -> Self {
        if delta.x.abs() > delta.y.abs() {
            if delta.x < 0.0 {
                CardinalDir::Left
            } else {
                CardinalDir::Right
            }
        } else if delta.y < 0.0 {
            CardinalDir::Up
        } else {
            CardinalDir::Down
        }
    }
}

/// Player controls for one tick: held directions plus edge-triggered actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PlayerInput {
    pub(crate) left: bool,
    pub(crate) right: bool,
    pub(crate) up: bool,
    pub(crate) down: bool,
    pub(crate) attack: bool,
    pub(crate) shoot: bool,
}

impl PlayerInput {
    pub(crate) fn from_snapshot(input: &InputSnapshot) -> Self {
        Self {
            left: input.is_down(InputAction::MoveLeft),
            right: input.is_down(InputAction::MoveRight),
            up: input.is_down(InputAction::MoveUp),
            down: input.is_down(InputAction::MoveDown),
            attack: input.attack_pressed(),
            shoot: input.shoot_pressed(),
        }
    }

    /// Unnormalized movement axes, y-down.
    pub(crate) fn axis(&self) -> Vec2 {
        let x = f32::from(i8::from(self.right) - i8::from(self.left));
        let y = f32::from(i8::from(self.down) - i8::from(self.up));
        Vec2::new(x, y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum GameplayEvent {
    PlayerAttack { index: u8, direction: Vec2 },
    PlayerShoot { direction: Vec2 },
    PlayerDead,
}

/// Events raised by actor updates, drained by the scene in the same tick.
#[derive(Debug, Default)]
pub(crate) struct GameplayEventBus {
    events: Vec<GameplayEvent>,
}

impl GameplayEventBus {
    pub(crate) fn emit(&mut self, event: GameplayEvent) {
        self.events.push(event);
    }

    pub(crate) fn drain(&mut self) -> Vec<GameplayEvent> {
        std::mem::take(&mut self.events)
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
