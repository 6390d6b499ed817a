use engine::{SceneWorld, Sprite, SpriteId, Stage, Vec2};

use super::animations::npc_idle_key;
use super::types::CardinalDir;

pub(crate) const REACT_RADIUS: f32 = 120.0;

/// Villager that turns to face the player while they are close.
#[derive(Debug)]
pub(crate) struct Npc {
    sprite: SpriteId,
    key: &'static str,
    facing: CardinalDir,
}

impl Npc {
    pub(crate) fn spawn(world: &mut SceneWorld, key: &'static str, position: Vec2) -> Self {
        let sprite = world.spawn_sprite(
            Sprite::new(key, position)
                .with_origin(0.5, 0.85)
                .with_depth(position.y),
        );
        world.set_interactive(sprite, true);
        world.play_animation(sprite, &npc_idle_key(key, CardinalDir::Down), false);
        Self {
            sprite,
            key,
            facing: CardinalDir::Down,
        }
    }

    pub(crate) fn sprite(&self) -> SpriteId {
        self.sprite
    }

    /// Identity used for dialogue lookup, e.g. `npc-anna`.
    pub(crate) fn key(&self) -> &'static str {
        self.key
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn facing(&self) -> CardinalDir {
        self.facing
    }

    pub(crate) fn update(&mut self, stage: &mut dyn Stage, player: Option<Vec2>) {
        let Some(position) = stage.sprite_position(self.sprite) else {
            return;
        };
        stage.set_depth(self.sprite, position.y);
        let Some(player) = player else {
            return;
        };

        let delta = player - position;
        let dir = if delta.length() < REACT_RADIUS {
            CardinalDir::dominant(delta)
        } else {
            CardinalDir::Down
        };
        if dir != self.facing {
            self.facing = dir;
            let key = npc_idle_key(self.key, dir);
            if stage.has_animation(&key) {
                stage.play_animation(self.sprite, &key, false);
            }
        }
    }
}
