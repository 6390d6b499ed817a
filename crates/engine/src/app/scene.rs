use std::collections::BTreeMap;

use super::animation::AnimationLibrary;
use super::audio::SoundManager;
use super::camera::Camera2D;
use super::geometry::{Rect, Vec2};
use super::input::InputSnapshot;
use super::physics::{BodyDesc, ColliderTarget, PhysicsWorld};
use super::sprite::{BobTween, Sprite, SpriteId, PLACEHOLDER_SIZE_PX};
use super::texture::TextureStore;
use super::tilemap::Tilemap;
use super::ui::{UiElement, UiId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    /// Unload the scene, clear its world and load it again.
    HardReset,
}

/// A one-shot animation finished on `sprite` this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationEvent {
    pub sprite: SpriteId,
    pub key: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CameraFollow {
    target: SpriteId,
    lerp: f32,
}

/// Engine capabilities an actor uses to drive its own sprite and body.
pub trait Stage {
    fn now_ms(&self) -> u64;
    fn sprite_position(&self, id: SpriteId) -> Option<Vec2>;
    fn set_sprite_position(&mut self, id: SpriteId, position: Vec2);
    fn flip_x(&self, id: SpriteId) -> bool;
    fn set_flip_x(&mut self, id: SpriteId, flip_x: bool);
    fn set_depth(&mut self, id: SpriteId, depth: f32);
    /// Returns false when the animation key is not registered.
    fn play_animation(&mut self, id: SpriteId, key: &str, ignore_if_playing: bool) -> bool;
    fn has_animation(&self, key: &str) -> bool;
    fn has_texture(&self, key: &str) -> bool;
    fn set_velocity(&mut self, id: SpriteId, velocity: Vec2);
    fn set_body_enabled(&mut self, id: SpriteId, enabled: bool);
}

/// Everything a scene owns at runtime. Textures, animations and the sound
/// manager outlive [`SceneWorld::clear`]; everything else is reset.
#[derive(Debug, Default)]
pub struct SceneWorld {
    next_sprite_id: u64,
    sprites: BTreeMap<SpriteId, Sprite>,
    pending_despawns: Vec<SpriteId>,
    physics: PhysicsWorld,
    tilemap: Option<Tilemap>,
    textures: TextureStore,
    animations: AnimationLibrary,
    sounds: SoundManager,
    camera: Camera2D,
    camera_follow: Option<CameraFollow>,
    next_ui_id: u64,
    ui: BTreeMap<UiId, UiElement>,
    time_ms: f64,
}

impl SceneWorld {
    pub fn spawn_sprite(&mut self, sprite: Sprite) -> SpriteId {
        let id = SpriteId(self.next_sprite_id);
        self.next_sprite_id = self.next_sprite_id.saturating_add(1);
        self.sprites.insert(id, sprite);
        id
    }

    /// Queues `id` for removal at the end of the tick.
    pub fn despawn(&mut self, id: SpriteId) -> bool {
        if !self.sprites.contains_key(&id) || self.pending_despawns.contains(&id) {
            return false;
        }
        self.pending_despawns.push(id);
        true
    }

    pub fn is_alive(&self, id: SpriteId) -> bool {
        self.sprites.contains_key(&id) && !self.pending_despawns.contains(&id)
    }

    pub fn apply_pending(&mut self) {
        for id in self.pending_despawns.drain(..) {
            self.sprites.remove(&id);
            self.physics.remove_body(id);
            if self.camera_follow.is_some_and(|follow| follow.target == id) {
                self.camera_follow = None;
            }
        }
    }

    pub fn clear(&mut self) {
        self.sprites.clear();
        self.pending_despawns.clear();
        self.physics.clear();
        self.tilemap = None;
        let view = self.camera.view_size();
        self.camera = Camera2D::default();
        self.camera.set_view_size(view.x as u32, view.y as u32);
        self.camera_follow = None;
        self.ui.clear();
        self.time_ms = 0.0;
    }

    pub fn sprite(&self, id: SpriteId) -> Option<&Sprite> {
        self.sprites.get(&id)
    }

    pub fn sprite_mut(&mut self, id: SpriteId) -> Option<&mut Sprite> {
        self.sprites.get_mut(&id)
    }

    pub fn sprites(&self) -> impl Iterator<Item = (SpriteId, &Sprite)> {
        self.sprites.iter().map(|(id, sprite)| (*id, sprite))
    }

    pub fn sprite_count(&self) -> usize {
        self.sprites.len()
    }

    pub fn set_interactive(&mut self, id: SpriteId, interactive: bool) {
        if let Some(sprite) = self.sprites.get_mut(&id) {
            sprite.interactive = interactive;
        }
    }

    pub fn set_bob(&mut self, id: SpriteId, amplitude: f32, half_period_ms: f32) {
        if let Some(sprite) = self.sprites.get_mut(&id) {
            sprite.bob = Some(BobTween::new(sprite.position.y, amplitude, half_period_ms));
        }
    }

    /// Unscaled frame size of `texture_key`, or the placeholder size when the
    /// texture is not loaded.
    pub fn frame_size(&self, texture_key: &str) -> Vec2 {
        match self.textures.get(texture_key) {
            Some(texture) => Vec2::new(texture.frame_width as f32, texture.frame_height as f32),
            None => Vec2::new(PLACEHOLDER_SIZE_PX as f32, PLACEHOLDER_SIZE_PX as f32),
        }
    }

    /// World rectangle covered by the sprite's current frame.
    pub fn display_rect(&self, id: SpriteId) -> Option<Rect> {
        let sprite = self.sprites.get(&id)?;
        let (texture_key, _) = sprite.visual_frame();
        let size = self.frame_size(texture_key) * sprite.scale;
        Some(Rect::new(
            sprite.position.x - sprite.origin.x * size.x,
            sprite.position.y - sprite.origin.y * size.y,
            size.x,
            size.y,
        ))
    }

    /// Attaches a physics body. `desc.size` and `desc.offset` are given in
    /// unscaled frame pixels from the frame's top-left corner and follow the
    /// sprite's scale and origin.
    pub fn enable_body(&mut self, id: SpriteId, desc: BodyDesc) -> bool {
        let Some(sprite) = self.sprites.get(&id) else {
            return false;
        };
        let frame = self.frame_size(&sprite.texture_key);
        let scale = sprite.scale;
        let world_desc = BodyDesc {
            size: desc.size * scale,
            offset: Vec2::new(
                (desc.offset.x - sprite.origin.x * frame.x) * scale,
                (desc.offset.y - sprite.origin.y * frame.y) * scale,
            ),
            ..desc
        };
        self.physics.add_body(id, world_desc, sprite.position);
        true
    }

    pub fn add_collider(&mut self, body: SpriteId, target: ColliderTarget) {
        self.physics.add_collider(body, target);
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.physics
    }

    pub fn set_tilemap(&mut self, tilemap: Tilemap) {
        self.tilemap = Some(tilemap);
    }

    pub fn tilemap(&self) -> Option<&Tilemap> {
        self.tilemap.as_ref()
    }

    pub fn tilemap_mut(&mut self) -> Option<&mut Tilemap> {
        self.tilemap.as_mut()
    }

    pub fn textures(&self) -> &TextureStore {
        &self.textures
    }

    pub fn textures_mut(&mut self) -> &mut TextureStore {
        &mut self.textures
    }

    pub fn animations(&self) -> &AnimationLibrary {
        &self.animations
    }

    /// Texture store and animation library together, for registering
    /// animations over loaded sheets.
    pub fn animation_registry(&mut self) -> (&TextureStore, &mut AnimationLibrary) {
        (&self.textures, &mut self.animations)
    }

    /// Texture store and sound manager together, for asset loading.
    pub fn asset_stores_mut(&mut self) -> (&mut TextureStore, &mut SoundManager) {
        (&mut self.textures, &mut self.sounds)
    }

    pub fn sounds(&self) -> &SoundManager {
        &self.sounds
    }

    pub fn sounds_mut(&mut self) -> &mut SoundManager {
        &mut self.sounds
    }

    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera2D {
        &mut self.camera
    }

    /// Snaps the camera onto `target` and keeps easing towards it each tick.
    pub fn start_camera_follow(&mut self, target: SpriteId, lerp: f32) {
        if let Some(sprite) = self.sprites.get(&target) {
            self.camera.center_on(sprite.position);
        }
        self.camera_follow = Some(CameraFollow { target, lerp });
    }

    pub fn update_camera_follow(&mut self) {
        let Some(follow) = self.camera_follow else {
            return;
        };
        if let Some(sprite) = self.sprites.get(&follow.target) {
            self.camera.follow_towards(sprite.position, follow.lerp);
        }
    }

    pub fn add_ui(&mut self, element: UiElement) -> UiId {
        let id = UiId(self.next_ui_id);
        self.next_ui_id = self.next_ui_id.saturating_add(1);
        self.ui.insert(id, element);
        id
    }

    pub fn ui(&self, id: UiId) -> Option<&UiElement> {
        self.ui.get(&id)
    }

    pub fn ui_mut(&mut self, id: UiId) -> Option<&mut UiElement> {
        self.ui.get_mut(&id)
    }

    pub fn ui_elements(&self) -> impl Iterator<Item = &UiElement> {
        self.ui.values()
    }

    pub fn now_ms(&self) -> u64 {
        self.time_ms as u64
    }

    /// Advances scene time, animations, tweens and physics by one fixed step
    /// and reports the one-shot animations that completed.
    pub fn advance(&mut self, fixed_dt_seconds: f32) -> Vec<AnimationEvent> {
        let dt_ms = fixed_dt_seconds * 1000.0;
        self.time_ms += f64::from(dt_ms);

        let mut completed = Vec::new();
        for (id, sprite) in self.sprites.iter_mut() {
            if let Some(key) = sprite.animation.advance(dt_ms) {
                completed.push(AnimationEvent { sprite: *id, key });
            }
            if let Some(bob) = sprite.bob.as_mut() {
                sprite.position.y = bob.advance(dt_ms);
            }
        }

        for (id, sprite) in &self.sprites {
            self.physics.set_position(*id, sprite.position);
        }
        self.physics.step(fixed_dt_seconds, self.tilemap.as_ref());
        for (id, body) in self.physics.bodies() {
            if let Some(sprite) = self.sprites.get_mut(&id) {
                sprite.position = body.position();
            }
        }
        completed
    }

    /// Topmost visible interactive sprite under a point in logical screen
    /// pixels.
    pub fn pick_interactive_at(&self, screen_px: Vec2) -> Option<SpriteId> {
        let world = self.camera.screen_to_world(screen_px);
        let mut best: Option<(f32, SpriteId)> = None;
        for (id, sprite) in &self.sprites {
            if !sprite.interactive || !sprite.visible || !self.is_alive(*id) {
                continue;
            }
            let Some(rect) = self.display_rect(*id) else {
                continue;
            };
            if !rect.contains(world) {
                continue;
            }
            match best {
                Some((depth, _)) if depth > sprite.depth => {}
                _ => best = Some((sprite.depth, *id)),
            }
        }
        best.map(|(_, id)| id)
    }
}

impl Stage for SceneWorld {
    fn now_ms(&self) -> u64 {
        SceneWorld::now_ms(self)
    }

    fn sprite_position(&self, id: SpriteId) -> Option<Vec2> {
        self.sprites.get(&id).map(|sprite| sprite.position)
    }

    fn set_sprite_position(&mut self, id: SpriteId, position: Vec2) {
        if let Some(sprite) = self.sprites.get_mut(&id) {
            sprite.position = position;
            self.physics.set_position(id, position);
        }
    }

    fn flip_x(&self, id: SpriteId) -> bool {
        self.sprites.get(&id).is_some_and(|sprite| sprite.flip_x)
    }

    fn set_flip_x(&mut self, id: SpriteId, flip_x: bool) {
        if let Some(sprite) = self.sprites.get_mut(&id) {
            sprite.flip_x = flip_x;
        }
    }

    fn set_depth(&mut self, id: SpriteId, depth: f32) {
        if let Some(sprite) = self.sprites.get_mut(&id) {
            sprite.depth = depth;
        }
    }

    fn play_animation(&mut self, id: SpriteId, key: &str, ignore_if_playing: bool) -> bool {
        let Some(sprite) = self.sprites.get_mut(&id) else {
            return false;
        };
        sprite
            .animation
            .play(&self.animations, key, ignore_if_playing)
    }

    fn has_animation(&self, key: &str) -> bool {
        self.animations.exists(key)
    }

    fn has_texture(&self, key: &str) -> bool {
        self.textures.exists(key)
    }

    fn set_velocity(&mut self, id: SpriteId, velocity: Vec2) {
        self.physics.set_velocity(id, velocity);
    }

    fn set_body_enabled(&mut self, id: SpriteId, enabled: bool) {
        self.physics.set_enabled(id, enabled);
    }
}

pub trait Scene {
    fn load(&mut self, world: &mut SceneWorld);
    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand;
    fn render(&mut self, world: &SceneWorld);
    fn unload(&mut self, world: &mut SceneWorld);
    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        None
    }
}

struct SceneRuntime {
    scene: Box<dyn Scene>,
    world: SceneWorld,
    is_loaded: bool,
}

pub(crate) struct SceneMachine {
    runtime: SceneRuntime,
}

impl SceneMachine {
    pub(crate) fn new(scene: Box<dyn Scene>, world: SceneWorld) -> Self {
        Self {
            runtime: SceneRuntime {
                scene,
                world,
                is_loaded: false,
            },
        }
    }

    pub(crate) fn load(&mut self) {
        if self.runtime.is_loaded {
            return;
        }
        let runtime = &mut self.runtime;
        runtime.scene.load(&mut runtime.world);
        runtime.world.apply_pending();
        runtime.is_loaded = true;
    }

    pub(crate) fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        let runtime = &mut self.runtime;
        runtime.scene.update(fixed_dt_seconds, input, &mut runtime.world)
    }

    /// End-of-tick bookkeeping: camera follow, then deferred despawns.
    pub(crate) fn post_update(&mut self) {
        self.runtime.world.update_camera_follow();
        self.runtime.world.apply_pending();
    }

    pub(crate) fn render(&mut self) {
        let runtime = &mut self.runtime;
        runtime.scene.render(&runtime.world);
    }

    pub(crate) fn world(&self) -> &SceneWorld {
        &self.runtime.world
    }

    pub(crate) fn world_mut(&mut self) -> &mut SceneWorld {
        &mut self.runtime.world
    }

    pub(crate) fn debug_title(&self) -> Option<String> {
        self.runtime.scene.debug_title(&self.runtime.world)
    }

    pub(crate) fn hard_reset(&mut self) {
        let runtime = &mut self.runtime;
        if runtime.is_loaded {
            runtime.scene.unload(&mut runtime.world);
        }
        runtime.world.clear();
        runtime.scene.load(&mut runtime.world);
        runtime.world.apply_pending();
        runtime.is_loaded = true;
    }

    pub(crate) fn shutdown(&mut self) {
        let runtime = &mut self.runtime;
        if runtime.is_loaded {
            runtime.scene.unload(&mut runtime.world);
            runtime.world.clear();
            runtime.is_loaded = false;
        }
    }
}
