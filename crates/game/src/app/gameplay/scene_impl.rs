use engine::{
    rgb_hex, with_alpha, BodyDesc, ColliderTarget, DelayedCalls, InputSnapshot, Rect,
    Scene, SceneCommand, SceneWorld, Space, Sprite, SpriteId, Stage, UiElement, UiId, Vec2,
};
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use super::animations::{register_animations, NPC_KEYS};
use super::combat::Combat;
use super::dialogue::{dialogue_line, DialogueBubble};
use super::music::MusicController;
use super::npc::Npc;
use super::orc::Orc;
use super::player::Player;
use super::slime::Slime;
use super::tile_painter::{
    build_village_map, castle_placement, ensure_castle_texture, ensure_tileset,
    ensure_tree_texture, tree_positions, CASTLE_TEXTURE, TREE_TEXTURE,
};
use super::types::{tile_center, GameplayEvent, GameplayEventBus, PlayerInput};

const PLAYER_TILE: (i32, i32) = (10, 18);
const ORC_OFFSET: Vec2 = Vec2::new(160.0, 90.0);
const NPC_TILES: [(i32, i32); 6] = [(14, 18), (22, 18), (10, 26), (24, 30), (32, 20), (20, 34)];
const SLIME_TILES: [(i32, i32); 3] = [(16, 12), (26, 24), (36, 28)];

const CAMERA_ZOOM: f32 = 2.0;
const CAMERA_LERP: f32 = 0.08;
const SKY_COLOR: u32 = 0x9fd8ff;

const GAME_OVER_DELAY_MS: u64 = 400;
const GAME_OVER_TEXT: &str = "You fell!\nPress R to respawn";
const PANEL_SIZE: Vec2 = Vec2::new(520.0, 180.0);
const PANEL_DEPTH: f32 = 1200.0;
const TEXT_COLOR: u32 = 0xfef9d7;
const HUD_DEPTH: f32 = 1300.0;

/// Persists the player's music choice outside the scene.
pub(crate) type MusicSetter = Box<dyn FnMut(bool)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SceneTimer {
    RevealGameOver,
    HideDialogue,
}

/// Everything built by one load of the village.
#[derive(Debug)]
pub(crate) struct SceneState {
    pub(crate) player: Player,
    pub(crate) orc: Orc,
    pub(crate) npcs: Vec<Npc>,
    pub(crate) slimes: Vec<Slime>,
    pub(crate) combat: Combat,
    pub(crate) events: GameplayEventBus,
    pub(crate) game_over: bool,
    pub(crate) timers: DelayedCalls<SceneTimer>,
    pub(crate) dialogue: DialogueBubble,
    pub(crate) game_over_panel: UiId,
    pub(crate) game_over_text: UiId,
    pub(crate) hud: UiId,
    pub(crate) music: MusicController,
}

impl SceneState {
    fn dispatch_events(&mut self, world: &mut SceneWorld, now: u64) {
        for event in self.events.drain() {
            match event {
                GameplayEvent::PlayerAttack { index, direction } => {
                    if let Some(pose) = self.player.pose(&*world) {
                        self.combat
                            .spawn_effect(world, "soldier", index, pose, direction);
                    }
                }
                GameplayEvent::PlayerShoot { direction } => {
                    if let Some(pose) = self.player.pose(&*world) {
                        self.combat.spawn_arrow(world, pose, direction, now);
                    }
                }
                GameplayEvent::PlayerDead => self.enter_game_over(world, now),
            }
        }
    }

    fn enter_game_over(&mut self, world: &mut SceneWorld, now: u64) {
        if self.game_over {
            return;
        }
        self.game_over = true;
        world.physics_mut().pause();
        self.timers
            .schedule(now + GAME_OVER_DELAY_MS, SceneTimer::RevealGameOver);
        info!(now_ms = now, "player_died");
    }

    fn reveal_game_over(&self, world: &mut SceneWorld) {
        for id in [self.game_over_panel, self.game_over_text] {
            if let Some(element) = world.ui_mut(id) {
                element.visible = true;
            }
        }
    }

    fn run_timers(&mut self, world: &mut SceneWorld, now: u64) {
        for (timer, call) in self.timers.drain_due(now) {
            match call {
                SceneTimer::RevealGameOver => self.reveal_game_over(world),
                SceneTimer::HideDialogue => self.dialogue.on_hide_due(world, timer),
            }
        }
    }

    /// Identity used to pick a dialogue line for a clicked sprite.
    fn speaker(&self, sprite: SpriteId) -> Option<&'static str> {
        if sprite == self.orc.sprite() {
            return Some("orc");
        }
        self.npcs
            .iter()
            .find(|npc| npc.sprite() == sprite)
            .map(Npc::key)
    }

    fn talk_to(&mut self, world: &mut SceneWorld, sprite: SpriteId, now: u64) {
        let Some(identity) = self.speaker(sprite) else {
            return;
        };
        let Some(position) = world.sprite_position(sprite) else {
            return;
        };
        self.dialogue.show_above(
            world,
            &mut self.timers,
            SceneTimer::HideDialogue,
            position,
            dialogue_line(identity),
            now,
        );
        debug!(speaker = identity, "dialogue_shown");
    }

    fn refresh_hud(&self, world: &mut SceneWorld) {
        let text = hud_text(self.music.enabled());
        if let Some(element) = world.ui_mut(self.hud) {
            element.set_text(&text);
        }
    }
}

fn hud_text(music_enabled: bool) -> String {
    let music = if music_enabled { "on" } else { "off" };
    format!("WASD/Arrows move  J attack  K shoot  R restart  M music: {music}")
}

pub(crate) struct VillageScene {
    rng: StdRng,
    music_enabled: bool,
    music_setter: MusicSetter,
    state: Option<SceneState>,
}

impl VillageScene {
    pub(crate) fn new(rng: StdRng, music_enabled: bool, music_setter: MusicSetter) -> Self {
        Self {
            rng,
            music_enabled,
            music_setter,
            state: None,
        }
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn state(&self) -> Option<&SceneState> {
        self.state.as_ref()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn music_enabled(&self) -> bool {
        self.music_enabled
    }

    /// Applies one hit to the player outside the normal tick; the resulting
    /// events are dispatched on the next update.
    #[cfg(test)]
    pub(crate) fn hurt_player(&mut self, world: &mut SceneWorld) -> bool {
        let Some(state) = self.state.as_mut() else {
            return false;
        };
        let now = world.now_ms();
        state.player.hurt(world, now, &mut state.events)
    }

    fn spawn_castle(world: &mut SceneWorld) -> SpriteId {
        ensure_castle_texture(world.textures_mut());
        let placement = castle_placement();
        let castle = world.spawn_sprite(
            Sprite::new(CASTLE_TEXTURE, placement.position)
                .with_origin(0.5, 0.0)
                .with_depth(placement.depth),
        );
        world.enable_body(
            castle,
            BodyDesc {
                size: Vec2::new(placement.footprint.width, placement.footprint.height),
                offset: Vec2::new(placement.footprint.x, placement.footprint.y),
                is_static: true,
                ..BodyDesc::default()
            },
        );
        castle
    }

    fn spawn_game_over_ui(world: &mut SceneWorld) -> (UiId, UiId) {
        let center = world.camera().view_size() * 0.5;
        let panel = world.add_ui(
            UiElement::panel(
                PANEL_SIZE,
                with_alpha(rgb_hex(0x0b1324), 217),
                Space::Screen,
            )
            .at(center)
            .with_depth(PANEL_DEPTH)
            .hidden(),
        );
        let text = world.add_ui(
            UiElement::text(GAME_OVER_TEXT, rgb_hex(TEXT_COLOR), 4, Space::Screen)
                .at(center)
                .with_depth(PANEL_DEPTH + 1.0)
                .hidden(),
        );
        (panel, text)
    }
}

impl Scene for VillageScene {
    fn load(&mut self, world: &mut SceneWorld) {
        register_animations(world);

        ensure_tileset(world.textures_mut(), &mut self.rng);
        let map = match build_village_map(&mut self.rng) {
            Ok(map) => map,
            Err(error) => {
                warn!(error = %error, "village_map_failed");
                return;
            }
        };
        ensure_tree_texture(world.textures_mut());
        for position in tree_positions(&map) {
            world.spawn_sprite(Sprite::new(TREE_TEXTURE, position).with_depth(position.y));
        }
        let ground = map.ground;
        let world_size = map.tilemap.world_size();
        world.set_tilemap(map.tilemap);

        let castle = Self::spawn_castle(world);

        let bounds = Rect::new(0.0, 0.0, world_size.x, world_size.y);
        world.physics_mut().set_bounds(bounds);

        let spawn = tile_center(PLAYER_TILE.0, PLAYER_TILE.1);
        let player = Player::spawn(world, spawn);
        let orc = Orc::spawn(world, spawn + ORC_OFFSET);
        let npcs = NPC_KEYS
            .into_iter()
            .zip(NPC_TILES)
            .map(|(key, (x, y))| Npc::spawn(world, key, tile_center(x, y)))
            .collect::<Vec<_>>();
        let slimes = SLIME_TILES
            .iter()
            .map(|(x, y)| Slime::spawn(world, tile_center(*x, *y)))
            .collect::<Vec<_>>();

        for body in [player.sprite(), orc.sprite()] {
            world.add_collider(body, ColliderTarget::TileLayer(ground));
            world.add_collider(body, ColliderTarget::Body(castle));
        }

        let camera = world.camera_mut();
        camera.set_bounds(bounds);
        camera.set_background(rgb_hex(SKY_COLOR));
        camera.set_zoom(CAMERA_ZOOM);
        world.start_camera_follow(player.sprite(), CAMERA_LERP);

        let (game_over_panel, game_over_text) = Self::spawn_game_over_ui(world);
        let dialogue = DialogueBubble::create(world);
        let hud_position = Vec2::new(world.camera().view_size().x * 0.5, 12.0);
        let hud = world.add_ui(
            UiElement::text(
                &hud_text(self.music_enabled),
                rgb_hex(TEXT_COLOR),
                2,
                Space::Screen,
            )
            .at(hud_position)
            .with_depth(HUD_DEPTH),
        );
        let music = MusicController::setup(world.sounds_mut(), self.music_enabled);

        info!(
            sprite_count = world.sprite_count(),
            npc_count = npcs.len(),
            music_enabled = self.music_enabled,
            "scene_loaded"
        );
        self.state = Some(SceneState {
            player,
            orc,
            npcs,
            slimes,
            combat: Combat::default(),
            events: GameplayEventBus::default(),
            game_over: false,
            timers: DelayedCalls::default(),
            dialogue,
            game_over_panel,
            game_over_text,
            hud,
            music,
        });
    }

    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        if input.restart_pressed() {
            info!("scene_restart_requested");
            return SceneCommand::HardReset;
        }
        let Some(state) = self.state.as_mut() else {
            return SceneCommand::None;
        };

        let completed = world.advance(fixed_dt_seconds);
        let now = world.now_ms();
        state.run_timers(world, now);
        state.combat.expire_arrows(world, now);
        for event in &completed {
            state.combat.on_animation_complete(world, event);
            if event.sprite == state.player.sprite() {
                state.player.on_animation_complete(&event.key);
            } else if event.sprite == state.orc.sprite() {
                state.orc.on_animation_complete(&event.key);
            }
        }

        if world.sounds_mut().take_unlocked() {
            state.music.on_unlock(world.sounds_mut());
        }
        if input.toggle_music_pressed() {
            self.music_enabled = !self.music_enabled;
            (self.music_setter)(self.music_enabled);
            state.music.set_enabled(world.sounds_mut(), self.music_enabled);
            state.refresh_hud(world);
        }

        if input.pointer_pressed() {
            let picked = input
                .cursor_position_px()
                .and_then(|cursor| world.pick_interactive_at(cursor));
            if let Some(sprite) = picked {
                state.talk_to(world, sprite, now);
            }
        }

        // Pending events from out-of-tick hits land before the game-over gate.
        state.dispatch_events(world, now);
        if state.game_over {
            return SceneCommand::None;
        }

        state
            .player
            .update(world, PlayerInput::from_snapshot(input), now, &mut state.events);
        state.dispatch_events(world, now);

        state.orc.update(world, now, &mut self.rng);
        let player_position = world.sprite_position(state.player.sprite());
        for npc in &mut state.npcs {
            npc.update(world, player_position);
        }
        for slime in &state.slimes {
            slime.update(world);
        }
        SceneCommand::None
    }

    fn render(&mut self, _world: &SceneWorld) {}

    fn unload(&mut self, world: &mut SceneWorld) {
        if let Some(mut state) = self.state.take() {
            state.music.shutdown(world.sounds_mut());
            state.timers.clear();
        }
        info!("scene_unloaded");
    }

    fn debug_title(&self, world: &SceneWorld) -> Option<String> {
        let state = self.state.as_ref()?;
        Some(format!(
            "Pixel Village | hp {} | arrows {} | t {:.1}s{}",
            state.player.health(),
            state.combat.active_arrows().len(),
            world.now_ms() as f64 / 1000.0,
            if state.game_over { " | game over" } else { "" }
        ))
    }
}
