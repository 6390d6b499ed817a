use std::cell::RefCell;
use std::rc::Rc;

use engine::{
    Canvas, InputAction, InputSnapshot, PressedEdges, Scene, SceneCommand, SceneWorld, Stage,
    Vec2,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::animations::{register_animations, NPC_KEYS, SLIME_TEXTURE};
use super::combat::{Combat, SourcePose, ARROW_SPEED, ARROW_TEXTURE};
use super::dialogue::dialogue_line;
use super::music::MUSIC_KEY;
use super::npc::Npc;
use super::orc::{Orc, OrcState, ORC_SPEED, WANDER_SPEED_FACTOR};
use super::player::{Player, PlayerState, PLAYER_MAX_HEALTH, PLAYER_SPEED};
use super::scene_impl::VillageScene;
use super::slime::Slime;
use super::tile_painter::{blocks_decor, build_village_map, CASTLE_TEXTURE};
use super::types::{CardinalDir, GameplayEvent, GameplayEventBus, PlayerInput};

const DT: f32 = 1.0 / 60.0;

fn sheet(world: &mut SceneWorld, key: &str, frames: u32, frame_px: u32) {
    world.textures_mut().insert(
        key,
        Canvas::new(frames * frame_px, frame_px).into_texture(frame_px, frame_px),
    );
}

/// World with every sheet the village uses and the music key registered.
fn village_world() -> SceneWorld {
    let mut world = SceneWorld::default();
    let humanoid = [
        ("soldier-idle", 6),
        ("soldier-walk", 8),
        ("soldier-attack1", 6),
        ("soldier-attack2", 6),
        ("soldier-attack3", 6),
        ("soldier-hurt", 4),
        ("soldier-death", 4),
        ("orc-idle", 6),
        ("orc-walk", 8),
        ("orc-death", 4),
    ];
    for (key, frames) in humanoid {
        sheet(&mut world, key, frames, 100);
    }
    for index in 1..=3 {
        sheet(&mut world, &format!("soldier-effect-attack{index}"), 4, 48);
    }
    for key in NPC_KEYS {
        sheet(&mut world, key, 16, 32);
    }
    sheet(&mut world, SLIME_TEXTURE, 2, 16);
    sheet(&mut world, ARROW_TEXTURE, 1, 32);
    world.sounds_mut().register_key(MUSIC_KEY);
    world
}

fn actor_world() -> SceneWorld {
    let mut world = village_world();
    register_animations(&mut world);
    world
}

fn current_animation(world: &SceneWorld, id: engine::SpriteId) -> Option<String> {
    world
        .sprite(id)
        .and_then(|sprite| sprite.animation().current_key().map(str::to_string))
}

fn velocity(world: &SceneWorld, id: engine::SpriteId) -> Vec2 {
    world.physics().body(id).expect("body").velocity()
}

fn assert_vec2_close(actual: Vec2, expected: Vec2) {
    assert!(
        (actual.x - expected.x).abs() < 0.01 && (actual.y - expected.y).abs() < 0.01,
        "actual={actual:?} expected={expected:?}"
    );
}

struct Fixture {
    scene: VillageScene,
    world: SceneWorld,
    saved_music: Rc<RefCell<Vec<bool>>>,
}

impl Fixture {
    fn loaded(music_enabled: bool) -> Self {
        let saved_music = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&saved_music);
        let mut scene = VillageScene::new(
            StdRng::seed_from_u64(42),
            music_enabled,
            Box::new(move |enabled| sink.borrow_mut().push(enabled)),
        );
        let mut world = village_world();
        scene.load(&mut world);
        world.apply_pending();
        Self {
            scene,
            world,
            saved_music,
        }
    }

    fn tick(&mut self, input: &InputSnapshot) -> SceneCommand {
        let command = self.scene.update(DT, input, &mut self.world);
        self.world.update_camera_follow();
        self.world.apply_pending();
        command
    }

    fn idle(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.tick(&InputSnapshot::empty());
        }
    }

    fn hard_reset(&mut self) {
        self.scene.unload(&mut self.world);
        self.world.clear();
        self.scene.load(&mut self.world);
        self.world.apply_pending();
    }

    fn state(&self) -> &super::scene_impl::SceneState {
        self.scene.state().expect("scene loaded")
    }

    fn click_sprite(&mut self, id: engine::SpriteId) {
        let position = self.world.sprite_position(id).expect("sprite");
        let cursor = self.world.camera().world_to_screen(position);
        let input = pressed(PressedEdges {
            pointer: true,
            ..PressedEdges::default()
        })
        .with_cursor_position_px(Some(cursor));
        self.tick(&input);
    }

    fn ui_visible(&self, id: engine::UiId) -> bool {
        self.world.ui(id).expect("ui element").visible
    }

    fn ui_text(&self, id: engine::UiId) -> String {
        self.world
            .ui(id)
            .and_then(|element| element.text_content())
            .expect("text element")
            .to_string()
    }
}

fn pressed(edges: PressedEdges) -> InputSnapshot {
    InputSnapshot::empty().with_pressed(edges)
}

fn toggle_music() -> InputSnapshot {
    pressed(PressedEdges {
        toggle_music: true,
        ..PressedEdges::default()
    })
}

#[test]
fn each_hit_costs_one_health_and_grants_invulnerability() {
    let mut world = actor_world();
    let mut player = Player::spawn(&mut world, Vec2::new(200.0, 200.0));
    let mut events = GameplayEventBus::default();

    assert_eq!(player.health(), PLAYER_MAX_HEALTH);
    assert!(player.hurt(&mut world, 0, &mut events));
    assert_eq!(player.health(), 2);
    assert_eq!(player.state(), PlayerState::Hurt);

    assert!(!player.hurt(&mut world, 599, &mut events));
    assert_eq!(player.health(), 2);

    assert!(player.hurt(&mut world, 600, &mut events));
    assert_eq!(player.health(), 1);
    assert!(events.is_empty());
}

#[test]
fn final_hit_kills_exactly_once() {
    let mut world = actor_world();
    let mut player = Player::spawn(&mut world, Vec2::new(200.0, 200.0));
    let mut events = GameplayEventBus::default();

    for now in [0, 600, 1200] {
        assert!(player.hurt(&mut world, now, &mut events));
    }
    assert!(player.is_dead());
    assert_eq!(player.state(), PlayerState::Dead);
    assert_eq!(events.drain(), vec![GameplayEvent::PlayerDead]);
    assert!(!world.physics().body(player.sprite()).expect("body").enabled());

    assert!(!player.hurt(&mut world, 5000, &mut events));
    assert!(events.is_empty());

    player.update(
        &mut world,
        PlayerInput {
            right: true,
            attack: true,
            ..PlayerInput::default()
        },
        6000,
        &mut events,
    );
    assert!(events.is_empty());
    assert_eq!(velocity(&world, player.sprite()), Vec2::ZERO);
}

#[test]
fn respawn_restores_a_living_player() {
    let mut world = actor_world();
    let mut player = Player::spawn(&mut world, Vec2::new(200.0, 200.0));
    let mut events = GameplayEventBus::default();
    for now in [0, 600, 1200] {
        player.hurt(&mut world, now, &mut events);
    }

    player.respawn(&mut world, Vec2::new(64.0, 64.0));
    assert!(!player.is_dead());
    assert_eq!(player.health(), PLAYER_MAX_HEALTH);
    assert_eq!(world.sprite_position(player.sprite()), Some(Vec2::new(64.0, 64.0)));
    assert!(world.physics().body(player.sprite()).expect("body").enabled());
}

#[test]
fn attack_index_cycles_and_ignores_cooldown_presses() {
    let mut world = actor_world();
    let mut player = Player::spawn(&mut world, Vec2::new(200.0, 200.0));
    let mut events = GameplayEventBus::default();
    let attack = PlayerInput {
        attack: true,
        ..PlayerInput::default()
    };

    for now in [1, 100, 452, 500, 903, 1354, 1805] {
        player.update(&mut world, attack, now, &mut events);
        let swing = format!("soldier-attack{}", player.attack_index());
        player.on_animation_complete(&swing);
    }
    let indices = events
        .drain()
        .into_iter()
        .filter_map(|event| match event {
            GameplayEvent::PlayerAttack { index, .. } => Some(index),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(indices, vec![1, 2, 3, 1, 2]);
    assert_eq!(player.attack_index(), 2);
    assert_eq!(
        current_animation(&world, player.sprite()).as_deref(),
        Some("soldier-attack2")
    );
}

#[test]
fn attack_press_mid_swing_is_ignored_after_the_cooldown() {
    let mut world = actor_world();
    let mut player = Player::spawn(&mut world, Vec2::new(200.0, 200.0));
    let mut events = GameplayEventBus::default();
    let attack = PlayerInput {
        attack: true,
        ..PlayerInput::default()
    };
    let count_attacks = |events: &mut GameplayEventBus| {
        events
            .drain()
            .into_iter()
            .filter(|event| matches!(event, GameplayEvent::PlayerAttack { .. }))
            .count()
    };

    player.update(&mut world, attack, 1, &mut events);
    assert!(world.advance(0.451).is_empty());
    assert_eq!(player.state(), PlayerState::Attacking);

    player.update(&mut world, attack, 452, &mut events);
    assert_eq!(count_attacks(&mut events), 1);
    assert_eq!(player.attack_index(), 1);

    let mut finished = false;
    for _ in 0..30 {
        for event in world.advance(DT) {
            if event.sprite == player.sprite() {
                player.on_animation_complete(&event.key);
                finished = true;
            }
        }
    }
    assert!(finished);
    player.update(&mut world, attack, 1000, &mut events);
    assert_eq!(count_attacks(&mut events), 1);
    assert_eq!(player.attack_index(), 2);
}

#[test]
fn attack_animation_owns_the_sprite_until_it_completes() {
    let mut world = actor_world();
    let mut player = Player::spawn(&mut world, Vec2::new(200.0, 200.0));
    let mut events = GameplayEventBus::default();
    player.update(
        &mut world,
        PlayerInput {
            attack: true,
            ..PlayerInput::default()
        },
        1,
        &mut events,
    );
    player.update(&mut world, PlayerInput::default(), 2, &mut events);
    assert_eq!(player.state(), PlayerState::Attacking);

    player.on_animation_complete("soldier-attack1");
    player.update(&mut world, PlayerInput::default(), 3, &mut events);
    assert_eq!(player.state(), PlayerState::Idle);
}

#[test]
fn moving_left_faces_left_and_walks() {
    let mut world = actor_world();
    let mut player = Player::spawn(&mut world, Vec2::new(200.0, 200.0));
    let mut events = GameplayEventBus::default();
    player.update(
        &mut world,
        PlayerInput {
            left: true,
            ..PlayerInput::default()
        },
        1,
        &mut events,
    );

    assert!(player.facing().x < 0.0);
    assert!(world.flip_x(player.sprite()));
    assert_eq!(player.state(), PlayerState::Walking);
    assert_eq!(
        current_animation(&world, player.sprite()).as_deref(),
        Some("soldier-walk")
    );
    assert_vec2_close(
        velocity(&world, player.sprite()),
        Vec2::new(-PLAYER_SPEED, 0.0),
    );
}

#[test]
fn diagonal_movement_is_normalized() {
    let mut world = actor_world();
    let mut player = Player::spawn(&mut world, Vec2::new(200.0, 200.0));
    let mut events = GameplayEventBus::default();
    player.update(
        &mut world,
        PlayerInput {
            right: true,
            down: true,
            ..PlayerInput::default()
        },
        1,
        &mut events,
    );
    let speed = velocity(&world, player.sprite()).length();
    assert!((speed - PLAYER_SPEED).abs() < 0.01, "speed={speed}");
}

#[test]
fn no_input_selects_idle() {
    let mut world = actor_world();
    let mut player = Player::spawn(&mut world, Vec2::new(200.0, 200.0));
    let mut events = GameplayEventBus::default();
    player.update(
        &mut world,
        PlayerInput {
            up: true,
            ..PlayerInput::default()
        },
        1,
        &mut events,
    );
    player.update(&mut world, PlayerInput::default(), 2, &mut events);

    assert_eq!(player.state(), PlayerState::Idle);
    assert_eq!(
        current_animation(&world, player.sprite()).as_deref(),
        Some("soldier-idle")
    );
    assert_eq!(velocity(&world, player.sprite()), Vec2::ZERO);
    assert!(events.is_empty());
}

#[test]
fn decor_never_lands_on_water_or_path() {
    for seed in 0..24 {
        let map = build_village_map(&mut StdRng::seed_from_u64(seed)).expect("map");
        let decor = map.tilemap.layer(map.decor).expect("decor layer");
        let mut placed = 0;
        for (x, y, _) in decor.iter_tiles() {
            let ground = map.ground_tile(x as i32, y as i32).expect("ground tile");
            assert!(!blocks_decor(ground), "seed {seed}: decor at ({x},{y})");
            placed += 1;
        }
        assert!(placed > 0, "seed {seed} placed nothing");
    }
}

#[test]
fn unaimed_arrow_flies_right_and_expires_at_its_deadline() {
    let mut world = actor_world();
    let mut combat = Combat::default();
    let source = SourcePose {
        position: Vec2::new(100.0, 100.0),
        facing: Vec2::ZERO,
        flip_x: false,
    };

    let arrow = combat
        .spawn_arrow(&mut world, source, Vec2::ZERO, 0)
        .expect("arrow spawned");
    assert_eq!(world.sprite_position(arrow), Some(Vec2::new(118.0, 100.0)));
    assert_vec2_close(velocity(&world, arrow), Vec2::new(ARROW_SPEED, 0.0));
    let sprite = world.sprite(arrow).expect("arrow sprite");
    assert_eq!(sprite.rotation, 0.0);
    assert!((sprite.scale - 0.7).abs() < f32::EPSILON);

    world.advance(0.25);
    let x = world.sprite_position(arrow).expect("arrow").x;
    assert!((x - 198.0).abs() < 0.01, "x={x}");

    combat.expire_arrows(&mut world, 1999);
    assert!(world.is_alive(arrow));
    combat.expire_arrows(&mut world, 2000);
    assert!(!world.is_alive(arrow));
    assert!(combat.active_arrows().is_empty());
}

#[test]
fn arrow_follows_flip_when_facing_is_zero() {
    let mut world = actor_world();
    let mut combat = Combat::default();
    let source = SourcePose {
        position: Vec2::new(100.0, 100.0),
        facing: Vec2::ZERO,
        flip_x: true,
    };
    let arrow = combat
        .spawn_arrow(&mut world, source, Vec2::ZERO, 0)
        .expect("arrow spawned");
    assert_vec2_close(velocity(&world, arrow), Vec2::new(-ARROW_SPEED, 0.0));

    let aimed = combat
        .spawn_arrow(&mut world, source, Vec2::new(0.0, -3.0), 0)
        .expect("aimed arrow");
    assert_vec2_close(velocity(&world, aimed), Vec2::new(0.0, -ARROW_SPEED));
    assert_eq!(world.sprite_position(aimed), Some(Vec2::new(100.0, 90.0)));
}

#[test]
fn missing_arrow_texture_spawns_nothing() {
    let mut world = SceneWorld::default();
    let mut combat = Combat::default();
    let source = SourcePose {
        position: Vec2::ZERO,
        facing: Vec2::new(1.0, 0.0),
        flip_x: false,
    };
    assert!(combat.spawn_arrow(&mut world, source, Vec2::ZERO, 0).is_none());
    assert!(combat
        .spawn_effect(&mut world, "soldier", 1, source, Vec2::ZERO)
        .is_none());
    assert_eq!(world.sprite_count(), 0);
}

#[test]
fn effect_without_its_animation_is_not_handed_out() {
    let mut world = village_world();
    let mut combat = Combat::default();
    let source = SourcePose {
        position: Vec2::new(100.0, 100.0),
        facing: Vec2::new(1.0, 0.0),
        flip_x: false,
    };
    assert!(combat
        .spawn_effect(&mut world, "soldier", 1, source, Vec2::ZERO)
        .is_none());
    assert!(combat.active_effects().is_empty());
    assert_eq!(world.sprite_count(), 0);
}

#[test]
fn effect_is_removed_when_its_animation_finishes() {
    let mut world = actor_world();
    let mut combat = Combat::default();
    let source = SourcePose {
        position: Vec2::new(100.0, 100.0),
        facing: Vec2::ZERO,
        flip_x: true,
    };
    let effect = combat
        .spawn_effect(&mut world, "soldier", 2, source, Vec2::ZERO)
        .expect("effect spawned");
    assert_eq!(world.sprite_position(effect), Some(Vec2::new(82.0, 100.0)));
    assert!(world.flip_x(effect));
    assert_eq!(combat.active_effects(), &[effect]);

    let mut finished = false;
    for _ in 0..60 {
        for event in world.advance(DT) {
            combat.on_animation_complete(&mut world, &event);
            finished |= event.sprite == effect;
        }
    }
    assert!(finished);
    assert!(!world.is_alive(effect));
    assert!(combat.active_effects().is_empty());
}

#[test]
fn orc_rerolls_its_wander_on_schedule() {
    let mut world = actor_world();
    let mut orc = Orc::spawn(&mut world, Vec2::new(300.0, 300.0));
    let mut rng = StdRng::seed_from_u64(3);

    orc.update(&mut world, 1, &mut rng);
    let first = orc.wander();
    let deadline = orc.next_wander_time();
    assert!((1201..=2401).contains(&deadline), "deadline={deadline}");
    assert_vec2_close(
        velocity(&world, orc.sprite()),
        first * (ORC_SPEED * WANDER_SPEED_FACTOR),
    );

    orc.update(&mut world, deadline, &mut rng);
    assert_eq!(orc.wander(), first);
    assert_eq!(orc.next_wander_time(), deadline);

    orc.update(&mut world, deadline + 1, &mut rng);
    assert!(orc.next_wander_time() > deadline);
}

#[test]
fn orc_sometimes_idles_and_sometimes_walks() {
    let mut world = actor_world();
    let mut orc = Orc::spawn(&mut world, Vec2::new(300.0, 300.0));
    let mut rng = StdRng::seed_from_u64(11);
    let (mut idle, mut walking) = (0, 0);
    let mut now = 1;
    for _ in 0..64 {
        orc.update(&mut world, now, &mut rng);
        match orc.state() {
            OrcState::Idle => {
                idle += 1;
                assert!(orc.wander().is_zero());
            }
            OrcState::Wandering => {
                walking += 1;
                assert!((orc.wander().length() - 1.0).abs() < 0.001);
            }
            OrcState::Dead => unreachable!("orc never dies here"),
        }
        now = orc.next_wander_time() + 1;
    }
    assert!(idle > 0 && walking > 0, "idle={idle} walking={walking}");
}

#[test]
fn orc_death_animation_stops_the_orc() {
    let mut world = actor_world();
    let mut orc = Orc::spawn(&mut world, Vec2::new(300.0, 300.0));
    let mut rng = StdRng::seed_from_u64(5);
    assert!(orc.begin_death(&mut world));

    for _ in 0..60 {
        for event in world.advance(DT) {
            if event.sprite == orc.sprite() {
                orc.on_animation_complete(&event.key);
            }
        }
    }
    assert_eq!(orc.state(), OrcState::Dead);
    orc.update(&mut world, 10_000, &mut rng);
    assert_eq!(orc.state(), OrcState::Dead);
    assert_eq!(velocity(&world, orc.sprite()), Vec2::ZERO);
}

#[test]
fn orc_keeps_dying_while_updated_every_tick() {
    let mut world = actor_world();
    let mut orc = Orc::spawn(&mut world, Vec2::new(300.0, 300.0));
    let mut rng = StdRng::seed_from_u64(5);
    orc.update(&mut world, 1, &mut rng);
    assert!(orc.begin_death(&mut world));

    let mut now = 1;
    for _ in 0..60 {
        now += 16;
        orc.update(&mut world, now, &mut rng);
        assert_eq!(velocity(&world, orc.sprite()), Vec2::ZERO);
        for event in world.advance(DT) {
            if event.sprite == orc.sprite() {
                orc.on_animation_complete(&event.key);
            }
        }
    }
    assert_eq!(orc.state(), OrcState::Dead);
    assert_eq!(
        current_animation(&world, orc.sprite()).as_deref(),
        Some("orc-death")
    );
    assert!(!orc.begin_death(&mut world));
}

#[test]
fn npc_turns_towards_a_nearby_player() {
    let mut world = actor_world();
    let mut npc = Npc::spawn(&mut world, "npc-anna", Vec2::new(300.0, 300.0));
    assert_eq!(npc.facing(), CardinalDir::Down);

    npc.update(&mut world, Some(Vec2::new(250.0, 310.0)));
    assert_eq!(npc.facing(), CardinalDir::Left);
    assert_eq!(
        current_animation(&world, npc.sprite()).as_deref(),
        Some("npc-anna-idle-left")
    );

    npc.update(&mut world, Some(Vec2::new(300.0, 200.0)));
    assert_eq!(npc.facing(), CardinalDir::Up);

    npc.update(&mut world, None);
    assert_eq!(npc.facing(), CardinalDir::Up);

    // Exactly at the radius counts as out of range.
    npc.update(&mut world, Some(Vec2::new(420.0, 300.0)));
    assert_eq!(npc.facing(), CardinalDir::Down);
    assert_eq!(
        current_animation(&world, npc.sprite()).as_deref(),
        Some("npc-anna-idle-down")
    );
}

#[test]
fn slime_bobs_and_sorts_by_its_current_height() {
    let mut world = actor_world();
    let slime = Slime::spawn(&mut world, Vec2::new(80.0, 120.0));
    assert_eq!(
        current_animation(&world, slime.sprite()).as_deref(),
        Some("slime-idle")
    );
    for _ in 0..24 {
        world.advance(DT);
    }
    slime.update(&mut world);
    let sprite = world.sprite(slime.sprite()).expect("slime");
    assert!(sprite.position.y < 120.0);
    assert_eq!(sprite.depth, sprite.position.y);
}

#[test]
fn load_builds_the_whole_village() {
    let fixture = Fixture::loaded(true);
    let state = fixture.state();
    let world = &fixture.world;

    assert_eq!(state.npcs.len(), NPC_KEYS.len());
    assert_eq!(state.slimes.len(), 3);
    assert!(world.tilemap().is_some());
    assert!((world.camera().zoom() - 2.0).abs() < f32::EPSILON);
    let bounds = world.physics().bounds().expect("world bounds");
    assert_eq!((bounds.width, bounds.height), (960.0, 704.0));
    assert!(world
        .sprites()
        .any(|(_, sprite)| sprite.texture_key == CASTLE_TEXTURE));

    let player = world.sprite_position(state.player.sprite()).expect("player");
    assert_eq!(player, Vec2::new(168.0, 296.0));
    let orc = world.sprite_position(state.orc.sprite()).expect("orc");
    assert_eq!(orc, Vec2::new(328.0, 386.0));
    assert!(fixture.ui_text(state.hud).contains("music: on"));
    assert!(!fixture.ui_visible(state.game_over_panel));
}

#[test]
fn scene_attack_and_shoot_spawn_transients() {
    let mut fixture = Fixture::loaded(true);
    fixture.tick(&pressed(PressedEdges {
        attack: true,
        shoot: true,
        ..PressedEdges::default()
    }));
    assert_eq!(fixture.state().combat.active_effects().len(), 1);
    assert_eq!(fixture.state().combat.active_arrows().len(), 1);

    // Held movement without a fresh press fires nothing new.
    let held = InputSnapshot::empty().with_action_down(InputAction::MoveRight, true);
    fixture.tick(&held);
    assert_eq!(fixture.state().combat.active_arrows().len(), 1);
}

#[test]
fn fatal_damage_pauses_physics_and_reveals_game_over_later() {
    let mut fixture = Fixture::loaded(true);
    for _ in 0..3 {
        assert!(fixture.scene.hurt_player(&mut fixture.world));
        fixture.idle(40);
    }

    let state = fixture.state();
    assert!(state.game_over);
    assert!(state.player.is_dead());
    assert!(fixture.world.physics().is_paused());
    assert!(fixture.ui_visible(state.game_over_panel));
    assert!(fixture.ui_visible(state.game_over_text));
    assert!(fixture
        .ui_text(state.game_over_text)
        .starts_with("You fell!"));

    let before = fixture
        .world
        .sprite_position(fixture.state().player.sprite())
        .expect("player");
    fixture.tick(&InputSnapshot::empty().with_action_down(InputAction::MoveLeft, true));
    let after = fixture
        .world
        .sprite_position(fixture.state().player.sprite())
        .expect("player");
    assert_eq!(before, after);
}

#[test]
fn game_over_panel_waits_before_showing() {
    let mut fixture = Fixture::loaded(true);
    for _ in 0..2 {
        fixture.scene.hurt_player(&mut fixture.world);
        fixture.idle(40);
    }
    fixture.scene.hurt_player(&mut fixture.world);
    fixture.idle(1);
    assert!(fixture.state().game_over);
    assert!(!fixture.ui_visible(fixture.state().game_over_panel));

    fixture.idle(20);
    assert!(!fixture.ui_visible(fixture.state().game_over_panel));
    fixture.idle(10);
    assert!(fixture.ui_visible(fixture.state().game_over_panel));
}

#[test]
fn restart_resets_the_village() {
    let mut fixture = Fixture::loaded(true);
    for _ in 0..3 {
        fixture.scene.hurt_player(&mut fixture.world);
        fixture.idle(40);
    }
    assert!(fixture.state().game_over);

    let restart = pressed(PressedEdges {
        restart: true,
        ..PressedEdges::default()
    });
    assert_eq!(fixture.tick(&restart), SceneCommand::HardReset);
    fixture.hard_reset();

    let state = fixture.state();
    assert!(!state.game_over);
    assert_eq!(state.player.health(), PLAYER_MAX_HEALTH);
    assert!(!fixture.world.physics().is_paused());
    assert!(!fixture.ui_visible(state.game_over_panel));
    assert_eq!(fixture.world.now_ms(), 0);
    assert_eq!(fixture.world.sounds().active_count(), 1);
}

#[test]
fn clicking_a_villager_shows_their_line_then_hides_it() {
    let mut fixture = Fixture::loaded(true);
    let npc = fixture.state().npcs[0].sprite();
    let npc_position = fixture.world.sprite_position(npc).expect("npc");
    fixture.click_sprite(npc);

    let bubble = fixture.state().dialogue.ui();
    assert!(fixture.ui_visible(bubble));
    assert_eq!(fixture.ui_text(bubble), dialogue_line(NPC_KEYS[0]));
    let position = fixture.world.ui(bubble).expect("bubble").position;
    assert_eq!(position, Vec2::new(npc_position.x, npc_position.y - 46.0));

    fixture.idle(100);
    assert!(fixture.ui_visible(bubble));
    fixture.idle(10);
    assert!(!fixture.ui_visible(bubble));
}

#[test]
fn a_new_line_cancels_the_pending_hide() {
    let mut fixture = Fixture::loaded(true);
    let npc = fixture.state().npcs[0].sprite();
    fixture.click_sprite(npc);
    fixture.idle(60);
    fixture.click_sprite(npc);
    let bubble = fixture.state().dialogue.ui();

    fixture.idle(60);
    assert!(fixture.ui_visible(bubble));
    fixture.idle(60);
    assert!(!fixture.ui_visible(bubble));
}

#[test]
fn clicking_the_orc_uses_the_orc_line() {
    let mut fixture = Fixture::loaded(true);
    let orc = fixture.state().orc.sprite();
    fixture.click_sprite(orc);
    let bubble = fixture.state().dialogue.ui();
    assert_eq!(fixture.ui_text(bubble), dialogue_line("orc"));
    assert_eq!(
        dialogue_line("orc"),
        "Rawr! Even I approve of Patrick's coding skills!"
    );
    assert_eq!(dialogue_line("someone-else"), "Hello there");
}

#[test]
fn music_toggle_persists_and_waits_for_unlock() {
    let mut fixture = Fixture::loaded(true);
    let track_playing = |fixture: &Fixture| fixture.state().music.is_playing(fixture.world.sounds());
    assert!(!track_playing(&fixture));

    fixture.tick(&toggle_music());
    assert!(!fixture.scene.music_enabled());
    assert!(fixture.ui_text(fixture.state().hud).contains("music: off"));
    fixture.tick(&toggle_music());
    assert_eq!(*fixture.saved_music.borrow(), vec![false, true]);
    assert!(!track_playing(&fixture));

    fixture.world.sounds_mut().unlock();
    fixture.idle(1);
    assert!(track_playing(&fixture));
}

#[test]
fn disabled_music_stays_silent_after_unlock() {
    let mut fixture = Fixture::loaded(false);
    fixture.world.sounds_mut().unlock();
    fixture.idle(2);
    assert!(!fixture.state().music.is_playing(fixture.world.sounds()));

    fixture.tick(&toggle_music());
    assert!(fixture.state().music.is_playing(fixture.world.sounds()));
    assert_eq!(*fixture.saved_music.borrow(), vec![true]);
}

#[test]
fn unload_stops_and_destroys_the_track() {
    let mut fixture = Fixture::loaded(true);
    fixture.world.sounds_mut().unlock();
    fixture.idle(1);
    assert_eq!(fixture.world.sounds().active_count(), 1);

    fixture.scene.unload(&mut fixture.world);
    assert_eq!(fixture.world.sounds().active_count(), 0);
    assert!(fixture.scene.state().is_none());
    assert_eq!(
        fixture.scene.update(DT, &InputSnapshot::empty(), &mut fixture.world),
        SceneCommand::None
    );
}
