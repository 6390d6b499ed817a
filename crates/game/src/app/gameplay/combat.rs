use engine::{AnimationEvent, BodyDesc, DelayedCalls, SceneWorld, Sprite, SpriteId, Stage, Vec2};
use tracing::debug;

pub(crate) const EFFECT_DEPTH: f32 = 900.0;
pub(crate) const EFFECT_OFFSET: f32 = 18.0;
pub(crate) const ARROW_TEXTURE: &str = "arrow-soldier-32";
pub(crate) const ARROW_SPEED: f32 = 320.0;
pub(crate) const ARROW_LIFETIME_MS: u64 = 2000;
const ARROW_SCALE: f32 = 0.7;

/// Where a spawn originates and which way its owner looks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SourcePose {
    pub(crate) position: Vec2,
    pub(crate) facing: Vec2,
    pub(crate) flip_x: bool,
}

/// Transient attack effects and arrows. Effects die with their animation;
/// arrows are removed a fixed time after launch.
#[derive(Debug, Default)]
pub(crate) struct Combat {
    effects: Vec<SpriteId>,
    arrows: Vec<SpriteId>,
    arrow_expiry: DelayedCalls<SpriteId>,
}

impl Combat {
    pub(crate) fn active_arrows(&self) -> &[SpriteId] {
        &self.arrows
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn active_effects(&self) -> &[SpriteId] {
        &self.effects
    }

    /// Spawns `{kind}-effect-attack{index}` in front of the source. Nothing
    /// is left behind when the effect sheet or its animation is missing.
    pub(crate) fn spawn_effect(
        &mut self,
        world: &mut SceneWorld,
        kind: &str,
        index: u8,
        source: SourcePose,
        direction: Vec2,
    ) -> Option<SpriteId> {
        let key = format!("{kind}-effect-attack{index}");
        if !world.has_texture(&key) {
            return None;
        }
        let dir = if direction.is_zero() {
            source.facing
        } else {
            direction
        };
        let offset = if dir.is_zero() {
            let x = if source.flip_x {
                -EFFECT_OFFSET
            } else {
                EFFECT_OFFSET
            };
            Vec2::new(x, 0.0)
        } else {
            dir * EFFECT_OFFSET
        };

        let mut sprite = Sprite::new(&key, source.position + offset).with_depth(EFFECT_DEPTH);
        sprite.flip_x = source.flip_x;
        let id = world.spawn_sprite(sprite);
        if !world.play_animation(id, &key, false) {
            world.despawn(id);
            return None;
        }
        self.effects.push(id);
        Some(id)
    }

    /// Launches an arrow along the first usable direction: the event's, then
    /// the source's facing, then its horizontal flip.
    pub(crate) fn spawn_arrow(
        &mut self,
        world: &mut SceneWorld,
        source: SourcePose,
        direction: Vec2,
        now: u64,
    ) -> Option<SpriteId> {
        if !world.has_texture(ARROW_TEXTURE) {
            return None;
        }
        let mut dir = if !direction.is_zero() {
            direction.normalized()
        } else if !source.facing.is_zero() {
            source.facing.normalized()
        } else if source.flip_x {
            Vec2::new(-1.0, 0.0)
        } else {
            Vec2::new(1.0, 0.0)
        };
        if dir.is_zero() {
            dir = Vec2::new(1.0, 0.0);
        }

        let position = Vec2::new(
            source.position.x + dir.x * EFFECT_OFFSET,
            source.position.y + dir.y * 10.0,
        );
        let mut sprite = Sprite::new(ARROW_TEXTURE, position)
            .with_depth(EFFECT_DEPTH)
            .with_scale(ARROW_SCALE);
        sprite.rotation = dir.angle();
        let id = world.spawn_sprite(sprite);
        world.enable_body(
            id,
            BodyDesc {
                size: Vec2::new(18.0, 8.0),
                offset: Vec2::new(7.0, 12.0),
                collide_world_bounds: true,
                ..BodyDesc::default()
            },
        );
        world.set_velocity(id, dir * ARROW_SPEED);
        self.arrows.push(id);
        self.arrow_expiry.schedule(now + ARROW_LIFETIME_MS, id);
        debug!(sprite = id.0, dir_x = dir.x, dir_y = dir.y, "arrow_spawned");
        Some(id)
    }

    /// Removes arrows whose lifetime ended at or before `now`.
    pub(crate) fn expire_arrows(&mut self, world: &mut SceneWorld, now: u64) {
        for (_, id) in self.arrow_expiry.drain_due(now) {
            if world.is_alive(id) {
                world.despawn(id);
            }
            self.arrows.retain(|arrow| *arrow != id);
        }
    }

    pub(crate) fn on_animation_complete(&mut self, world: &mut SceneWorld, event: &AnimationEvent) {
        let before = self.effects.len();
        self.effects.retain(|effect| *effect != event.sprite);
        if self.effects.len() != before {
            world.despawn(event.sprite);
        }
    }
}
