use std::f32::consts::TAU;

use engine::{SceneWorld, Sprite, SpriteId, Stage, Vec2};
use rand::Rng;
use tracing::info;

use super::player::{humanoid_body, HUMANOID_SCALE};
use super::types::FLIP_DEADZONE;

pub(crate) const ORC_SPEED: f32 = 90.0;
pub(crate) const WANDER_SPEED_FACTOR: f32 = 0.6;
pub(crate) const IDLE_CHANCE: f32 = 0.25;
pub(crate) const WANDER_MIN_MS: u64 = 1200;
pub(crate) const WANDER_MAX_MS: u64 = 2400;

const IDLE: &str = "orc-idle";
const WALK: &str = "orc-walk";
const DEATH: &str = "orc-death";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OrcState {
    Wandering,
    Idle,
    Dead,
}

#[derive(Debug)]
pub(crate) struct Orc {
    sprite: SpriteId,
    state: OrcState,
    wander: Vec2,
    next_wander_time: u64,
    /// Death animation playing; wandering is suspended until it completes.
    dying: bool,
}

impl Orc {
    pub(crate) fn spawn(world: &mut SceneWorld, position: Vec2) -> Self {
        let sprite = world.spawn_sprite(
            Sprite::new(IDLE, position)
                .with_scale(HUMANOID_SCALE)
                .with_depth(position.y),
        );
        world.enable_body(sprite, humanoid_body(500.0, 200.0));
        world.set_interactive(sprite, true);
        world.play_animation(sprite, IDLE, true);
        Self {
            sprite,
            state: OrcState::Wandering,
            wander: Vec2::new(-1.0, 0.0),
            next_wander_time: 0,
            dying: false,
        }
    }

    pub(crate) fn sprite(&self) -> SpriteId {
        self.sprite
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn state(&self) -> OrcState {
        self.state
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn wander(&self) -> Vec2 {
        self.wander
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn next_wander_time(&self) -> u64 {
        self.next_wander_time
    }

    pub(crate) fn update(&mut self, stage: &mut dyn Stage, now: u64, rng: &mut impl Rng) {
        if let Some(position) = stage.sprite_position(self.sprite) {
            stage.set_depth(self.sprite, position.y);
        }
        if self.dying || self.state == OrcState::Dead {
            stage.set_velocity(self.sprite, Vec2::ZERO);
            return;
        }

        if now > self.next_wander_time {
            self.wander = if rng.gen::<f32>() < IDLE_CHANCE {
                Vec2::ZERO
            } else {
                let angle = rng.gen_range(0.0..TAU);
                Vec2::new(angle.cos(), angle.sin())
            };
            self.next_wander_time = now + rng.gen_range(WANDER_MIN_MS..=WANDER_MAX_MS);
        }

        stage.set_velocity(self.sprite, self.wander * (ORC_SPEED * WANDER_SPEED_FACTOR));
        // Facing follows the wander vector.
        if self.wander.x.abs() > FLIP_DEADZONE {
            stage.set_flip_x(self.sprite, self.wander.x < 0.0);
        }

        if self.wander.is_zero() {
            stage.play_animation(self.sprite, IDLE, true);
            self.state = OrcState::Idle;
        } else {
            stage.play_animation(self.sprite, WALK, true);
            self.state = OrcState::Wandering;
        }
    }

    /// Starts the death animation; the orc counts as dead once it finishes.
    /// Nothing deals damage to the orc yet.
    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn begin_death(&mut self, stage: &mut dyn Stage) -> bool {
        if self.state == OrcState::Dead {
            return false;
        }
        self.dying = stage.play_animation(self.sprite, DEATH, true);
        self.dying
    }

    pub(crate) fn on_animation_complete(&mut self, key: &str) {
        if key == DEATH && self.state != OrcState::Dead {
            self.dying = false;
            self.state = OrcState::Dead;
            info!("orc_died");
        }
    }
}
