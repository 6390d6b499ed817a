mod animations;
mod combat;
mod dialogue;
mod music;
mod npc;
mod orc;
mod player;
mod scene_impl;
mod slime;
mod tile_painter;
mod types;

use engine::Scene;
use rand::rngs::StdRng;

pub(crate) use scene_impl::MusicSetter;
use scene_impl::VillageScene;

/// Builds the village scene with its world-generation rng and the music
/// preference it starts from.
pub(crate) fn build_scene(rng: StdRng, music_enabled: bool, music_setter: MusicSetter) -> Box<dyn Scene> {
    Box::new(VillageScene::new(rng, music_enabled, music_setter))
}

#[cfg(test)]
mod tests;
