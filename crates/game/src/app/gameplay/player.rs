use engine::{BodyDesc, SceneWorld, Sprite, SpriteId, Stage, Vec2};
use tracing::info;

use super::combat::SourcePose;
use super::types::{GameplayEvent, GameplayEventBus, PlayerInput, FLIP_DEADZONE};

pub(crate) const PLAYER_SPEED: f32 = 170.0;
pub(crate) const PLAYER_MAX_HEALTH: i32 = 3;
pub(crate) const ATTACK_COOLDOWN_MS: u64 = 450;
pub(crate) const SHOOT_COOLDOWN_MS: u64 = 650;
pub(crate) const INVULNERABLE_MS: u64 = 600;

const IDLE: &str = "soldier-idle";
const WALK: &str = "soldier-walk";
const HURT: &str = "soldier-hurt";
const DEATH: &str = "soldier-death";
const ATTACK_PREFIX: &str = "soldier-attack";

/// Shared soldier/orc body: 56x56 feet box on 100x100 frames at scale 1.1.
pub(crate) fn humanoid_body(drag: f32, max_velocity: f32) -> BodyDesc {
    BodyDesc {
        size: Vec2::new(56.0, 56.0),
        offset: Vec2::new(22.0, 44.0),
        drag,
        max_velocity: Some(max_velocity),
        collide_world_bounds: true,
        is_static: false,
    }
}

pub(crate) const HUMANOID_SCALE: f32 = 1.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlayerState {
    Idle,
    Walking,
    Attacking,
    Hurt,
    Dead,
}

#[derive(Debug)]
pub(crate) struct Player {
    sprite: SpriteId,
    state: PlayerState,
    health: i32,
    invulnerable_until: u64,
    dead: bool,
    facing: Vec2,
    /// Set while an attack or hurt animation owns the sprite.
    in_action: bool,
    attack_index: u8,
    next_attack_time: u64,
    next_shoot_time: u64,
}

impl Player {
    pub(crate) fn spawn(world: &mut SceneWorld, position: Vec2) -> Self {
        let sprite = world.spawn_sprite(
            Sprite::new(IDLE, position)
                .with_scale(HUMANOID_SCALE)
                .with_depth(position.y),
        );
        world.enable_body(sprite, humanoid_body(600.0, 220.0));
        world.play_animation(sprite, IDLE, true);
        Self {
            sprite,
            state: PlayerState::Idle,
            health: PLAYER_MAX_HEALTH,
            invulnerable_until: 0,
            dead: false,
            facing: Vec2::new(1.0, 0.0),
            in_action: false,
            attack_index: 0,
            next_attack_time: 0,
            next_shoot_time: 0,
        }
    }

    pub(crate) fn sprite(&self) -> SpriteId {
        self.sprite
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn state(&self) -> PlayerState {
        self.state
    }

    pub(crate) fn health(&self) -> i32 {
        self.health
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn is_dead(&self) -> bool {
        self.dead
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn facing(&self) -> Vec2 {
        self.facing
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn attack_index(&self) -> u8 {
        self.attack_index
    }

    pub(crate) fn pose(&self, stage: &dyn Stage) -> Option<SourcePose> {
        Some(SourcePose {
            position: stage.sprite_position(self.sprite)?,
            facing: self.facing,
            flip_x: stage.flip_x(self.sprite),
        })
    }

    pub(crate) fn update(
        &mut self,
        stage: &mut dyn Stage,
        input: PlayerInput,
        now: u64,
        events: &mut GameplayEventBus,
    ) {
        if let Some(position) = stage.sprite_position(self.sprite) {
            stage.set_depth(self.sprite, position.y);
        }
        if self.dead {
            stage.set_velocity(self.sprite, Vec2::ZERO);
            return;
        }

        let axis = input.axis();
        let moving = !axis.is_zero();
        if moving {
            let direction = axis.normalized();
            stage.set_velocity(self.sprite, direction * PLAYER_SPEED);
            self.facing = direction;
            if self.facing.x.abs() > FLIP_DEADZONE {
                stage.set_flip_x(self.sprite, self.facing.x < 0.0);
            }
        } else {
            stage.set_velocity(self.sprite, Vec2::ZERO);
        }

        if !self.in_action {
            let (key, state) = if moving {
                (WALK, PlayerState::Walking)
            } else {
                (IDLE, PlayerState::Idle)
            };
            stage.play_animation(self.sprite, key, true);
            self.state = state;
        }

        let swinging = self.state == PlayerState::Attacking;
        if input.attack && !swinging && now > self.next_attack_time {
            self.attack_index = self.attack_index % 3 + 1;
            let key = format!("{ATTACK_PREFIX}{}", self.attack_index);
            self.in_action = stage.play_animation(self.sprite, &key, true);
            if self.in_action {
                self.state = PlayerState::Attacking;
            }
            self.next_attack_time = now + ATTACK_COOLDOWN_MS;
            events.emit(GameplayEvent::PlayerAttack {
                index: self.attack_index,
                direction: self.facing,
            });
        }

        if input.shoot && now > self.next_shoot_time {
            self.next_shoot_time = now + SHOOT_COOLDOWN_MS;
            events.emit(GameplayEvent::PlayerShoot {
                direction: self.facing,
            });
        }
    }

    /// Applies one hit. Returns false while invulnerable or dead.
    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn hurt(
        &mut self,
        stage: &mut dyn Stage,
        now: u64,
        events: &mut GameplayEventBus,
    ) -> bool {
        if now < self.invulnerable_until || self.dead {
            return false;
        }
        self.invulnerable_until = now + INVULNERABLE_MS;
        self.health -= 1;
        self.in_action = stage.play_animation(self.sprite, HURT, true);
        if self.in_action {
            self.state = PlayerState::Hurt;
        }
        info!(health = self.health, "player_hurt");

        if self.health <= 0 {
            self.die(stage, events);
        }
        true
    }

    fn die(&mut self, stage: &mut dyn Stage, events: &mut GameplayEventBus) {
        if self.dead {
            return;
        }
        self.dead = true;
        self.state = PlayerState::Dead;
        stage.set_velocity(self.sprite, Vec2::ZERO);
        stage.set_body_enabled(self.sprite, false);
        stage.play_animation(self.sprite, DEATH, true);
        events.emit(GameplayEvent::PlayerDead);
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn respawn(&mut self, stage: &mut dyn Stage, position: Vec2) {
        self.dead = false;
        self.in_action = false;
        self.health = PLAYER_MAX_HEALTH;
        self.invulnerable_until = 0;
        self.state = PlayerState::Idle;
        stage.set_sprite_position(self.sprite, position);
        stage.set_body_enabled(self.sprite, true);
        stage.play_animation(self.sprite, IDLE, true);
    }

    pub(crate) fn on_animation_complete(&mut self, key: &str) {
        if key.starts_with(ATTACK_PREFIX) || key == HURT {
            self.in_action = false;
        }
        if key == DEATH {
            self.dead = true;
            self.state = PlayerState::Dead;
        }
    }
}
