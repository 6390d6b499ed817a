use std::collections::HashMap;

use super::texture::TextureStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    Loop,
    Once,
}

/// Sprite-sheet animation: a frame sequence from one texture at a fixed rate.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationDef {
    pub key: String,
    pub texture_key: String,
    pub frames: Vec<u32>,
    pub frame_rate: f32,
    pub repeat: Repeat,
}

impl AnimationDef {
    fn frame_duration_ms(&self) -> f32 {
        if self.frame_rate > 0.0 {
            1000.0 / self.frame_rate
        } else {
            1000.0
        }
    }
}

#[derive(Debug, Default)]
pub struct AnimationLibrary {
    defs: HashMap<String, AnimationDef>,
}

impl AnimationLibrary {
    pub fn exists(&self, key: &str) -> bool {
        self.defs.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&AnimationDef> {
        self.defs.get(key)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Registers `def` unless the key is taken or it has no frames.
    pub fn insert(&mut self, def: AnimationDef) -> bool {
        if def.frames.is_empty() || self.defs.contains_key(&def.key) {
            return false;
        }
        self.defs.insert(def.key.clone(), def);
        true
    }

    /// Registers an animation over every frame of `sheet`. Skipped when the
    /// sheet texture is not loaded.
    pub fn create_from_sheet(
        &mut self,
        textures: &TextureStore,
        key: &str,
        sheet: &str,
        frame_rate: f32,
        repeat: Repeat,
    ) -> bool {
        let Some(texture) = textures.get(sheet) else {
            return false;
        };
        let end = texture.frame_count() - 1;
        self.create_frame_range(textures, key, sheet, 0, end, frame_rate, repeat)
    }

    /// Registers an animation over frames `start..=end` of `sheet`.
    #[allow(clippy::too_many_arguments)]
    pub fn create_frame_range(
        &mut self,
        textures: &TextureStore,
        key: &str,
        sheet: &str,
        start: u32,
        end: u32,
        frame_rate: f32,
        repeat: Repeat,
    ) -> bool {
        if !textures.exists(sheet) || end < start {
            return false;
        }
        self.insert(AnimationDef {
            key: key.to_string(),
            texture_key: sheet.to_string(),
            frames: (start..=end).collect(),
            frame_rate,
            repeat,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ActiveAnimation {
    def: AnimationDef,
    elapsed_ms: f32,
    finished: bool,
}

/// Per-sprite playback state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationPlayer {
    active: Option<ActiveAnimation>,
}

impl AnimationPlayer {
    /// Starts `key`. With `ignore_if_playing`, a running animation with the
    /// same key keeps its progress. Returns false when the key is unknown.
    pub fn play(&mut self, library: &AnimationLibrary, key: &str, ignore_if_playing: bool) -> bool {
        let Some(def) = library.get(key) else {
            return false;
        };
        if ignore_if_playing && self.is_playing_key(key) {
            return true;
        }
        self.active = Some(ActiveAnimation {
            def: def.clone(),
            elapsed_ms: 0.0,
            finished: false,
        });
        true
    }

    pub fn current_key(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.def.key.as_str())
    }

    pub fn is_playing(&self) -> bool {
        self.active.as_ref().is_some_and(|active| !active.finished)
    }

    pub fn is_playing_key(&self, key: &str) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| !active.finished && active.def.key == key)
    }

    /// Texture and frame to draw, if an animation has ever been started.
    pub fn current_frame(&self) -> Option<(&str, u32)> {
        let active = self.active.as_ref()?;
        let frame_count = active.def.frames.len();
        let step = (active.elapsed_ms / active.def.frame_duration_ms()).floor() as usize;
        let index = match active.def.repeat {
            Repeat::Loop => step % frame_count,
            Repeat::Once => step.min(frame_count - 1),
        };
        Some((active.def.texture_key.as_str(), active.def.frames[index]))
    }

    /// Advances playback; returns the key of a one-shot animation on the
    /// tick it completes. Looping animations never complete.
    pub fn advance(&mut self, dt_ms: f32) -> Option<String> {
        let active = self.active.as_mut()?;
        if active.finished {
            return None;
        }
        active.elapsed_ms += dt_ms;
        if active.def.repeat == Repeat::Loop {
            let cycle_ms = active.def.frame_duration_ms() * active.def.frames.len() as f32;
            if cycle_ms > 0.0 {
                active.elapsed_ms %= cycle_ms;
            }
            return None;
        }
        let total_ms = active.def.frame_duration_ms() * active.def.frames.len() as f32;
        if active.elapsed_ms >= total_ms {
            active.finished = true;
            active.elapsed_ms = total_ms;
            return Some(active.def.key.clone());
        }
        None
    }
}
