use engine::{Repeat, SceneWorld};
use tracing::debug;

use super::types::CardinalDir;

struct SheetAnimation {
    key: &'static str,
    sheet: &'static str,
    frame_rate: f32,
    repeat: Repeat,
}

const fn looped(key: &'static str, frame_rate: f32) -> SheetAnimation {
    SheetAnimation {
        key,
        sheet: key,
        frame_rate,
        repeat: Repeat::Loop,
    }
}

const fn once(key: &'static str, frame_rate: f32) -> SheetAnimation {
    SheetAnimation {
        key,
        sheet: key,
        frame_rate,
        repeat: Repeat::Once,
    }
}

/// Whole-sheet animations; each plays every frame of the sheet named after it.
const SHEET_ANIMATIONS: &[SheetAnimation] = &[
    looped("soldier-idle", 6.0),
    looped("soldier-walk", 10.0),
    once("soldier-attack1", 12.0),
    once("soldier-attack2", 12.0),
    once("soldier-attack3", 12.0),
    once("soldier-hurt", 10.0),
    once("soldier-death", 8.0),
    looped("orc-idle", 6.0),
    looped("orc-walk", 9.0),
    once("orc-attack1", 11.0),
    once("orc-attack2", 11.0),
    once("orc-hurt", 10.0),
    once("orc-death", 8.0),
    once("soldier-effect-attack1", 14.0),
    once("soldier-effect-attack2", 14.0),
    once("soldier-effect-attack3", 14.0),
    once("orc-effect-attack1", 14.0),
    once("orc-effect-attack2", 14.0),
];

pub(crate) const NPC_KEYS: [&str; 6] = [
    "npc-alex",
    "npc-anna",
    "npc-ardley",
    "npc-colt",
    "npc-ester",
    "npc-tom",
];

/// First frame of each facing on the 4x4 NPC sheets.
const NPC_DIRECTION_STARTS: [(CardinalDir, u32); 4] = [
    (CardinalDir::Down, 0),
    (CardinalDir::Left, 4),
    (CardinalDir::Right, 8),
    (CardinalDir::Up, 12),
];

pub(crate) const SLIME_TEXTURE: &str = "slime";
pub(crate) const SLIME_IDLE: &str = "slime-idle";

pub(crate) fn npc_idle_key(npc_key: &str, dir: CardinalDir) -> String {
    format!("{npc_key}-idle-{}", dir.as_str())
}

fn npc_walk_key(npc_key: &str, dir: CardinalDir) -> String {
    format!("{npc_key}-walk-{}", dir.as_str())
}

/// Registers every animation whose sheet is loaded. Already registered keys
/// and missing sheets are skipped, so calling this again is harmless.
pub(crate) fn register_animations(world: &mut SceneWorld) {
    let (textures, animations) = world.animation_registry();
    let before = animations.len();

    for def in SHEET_ANIMATIONS {
        if animations.exists(def.key) {
            continue;
        }
        animations.create_from_sheet(textures, def.key, def.sheet, def.frame_rate, def.repeat);
    }

    if textures.exists(NPC_KEYS[0]) {
        for npc_key in NPC_KEYS {
            for (dir, start) in NPC_DIRECTION_STARTS {
                animations.create_frame_range(
                    textures,
                    &npc_walk_key(npc_key, dir),
                    npc_key,
                    start,
                    start + 3,
                    8.0,
                    Repeat::Loop,
                );
                animations.create_frame_range(
                    textures,
                    &npc_idle_key(npc_key, dir),
                    npc_key,
                    start,
                    start,
                    1.0,
                    Repeat::Loop,
                );
            }
        }
    }

    if textures.exists(SLIME_TEXTURE) {
        animations.create_frame_range(textures, SLIME_IDLE, SLIME_TEXTURE, 0, 1, 6.0, Repeat::Loop);
    }

    debug!(
        registered = animations.len() - before,
        total = animations.len(),
        "animations_registered"
    );
}
