use engine::{SceneWorld, Sprite, SpriteId, Stage, Vec2};

use super::animations::{SLIME_IDLE, SLIME_TEXTURE};

const BOB_AMPLITUDE: f32 = 2.0;
const BOB_HALF_PERIOD_MS: f32 = 800.0;

#[derive(Debug)]
pub(crate) struct Slime {
    sprite: SpriteId,
}

impl Slime {
    pub(crate) fn spawn(world: &mut SceneWorld, position: Vec2) -> Self {
        let sprite = world.spawn_sprite(
            Sprite::new(SLIME_TEXTURE, position)
                .with_origin(0.5, 0.8)
                .with_depth(position.y),
        );
        world.play_animation(sprite, SLIME_IDLE, false);
        world.set_bob(sprite, BOB_AMPLITUDE, BOB_HALF_PERIOD_MS);
        Self { sprite }
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn sprite(&self) -> SpriteId {
        self.sprite
    }

    pub(crate) fn update(&self, stage: &mut dyn Stage) {
        if let Some(position) = stage.sprite_position(self.sprite) {
            stage.set_depth(self.sprite, position.y);
        }
    }
}
