use std::collections::{BTreeMap, HashSet};
use std::fmt;

use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SoundId(u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundConfig {
    pub looped: bool,
    pub volume: f32,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            looped: false,
            volume: 1.0,
        }
    }
}

/// Output device for started and stopped sounds.
pub trait AudioSink {
    fn start(&mut self, id: SoundId, key: &str, config: SoundConfig);
    fn stop(&mut self, id: SoundId);
}

/// Sink that produces no sound; playback transitions are only logged.
#[derive(Debug, Default)]
pub struct SilentSink;

impl AudioSink for SilentSink {
    fn start(&mut self, id: SoundId, key: &str, config: SoundConfig) {
        debug!(
            sound_id = id.0,
            sound_key = key,
            looped = config.looped,
            volume = config.volume,
            "sound_started"
        );
    }

    fn stop(&mut self, id: SoundId) {
        debug!(sound_id = id.0, "sound_stopped");
    }
}

#[derive(Debug, Clone)]
struct SoundSlot {
    key: String,
    config: SoundConfig,
    playing: bool,
}

/// Keyed sound instances behind an autoplay lock. Playback is refused until
/// the first user gesture unlocks the manager; the unlock is reported once
/// through [`SoundManager::take_unlocked`].
pub struct SoundManager {
    locked: bool,
    unlock_pending: bool,
    registered_keys: HashSet<String>,
    sounds: BTreeMap<SoundId, SoundSlot>,
    next_id: u64,
    sink: Box<dyn AudioSink>,
}

impl fmt::Debug for SoundManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoundManager")
            .field("locked", &self.locked)
            .field("registered_keys", &self.registered_keys)
            .field("sounds", &self.sounds)
            .finish()
    }
}

impl Default for SoundManager {
    fn default() -> Self {
        Self::new(Box::new(SilentSink))
    }
}

impl SoundManager {
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        Self {
            locked: true,
            unlock_pending: false,
            registered_keys: HashSet::new(),
            sounds: BTreeMap::new(),
            next_id: 0,
            sink,
        }
    }

    pub fn register_key(&mut self, key: impl Into<String>) {
        self.registered_keys.insert(key.into());
    }

    pub fn exists(&self, key: &str) -> bool {
        self.registered_keys.contains(key)
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Unlocks on the first call; later calls are no-ops.
    pub fn unlock(&mut self) {
        if !self.locked {
            return;
        }
        self.locked = false;
        self.unlock_pending = true;
        info!("audio_unlocked");
    }

    /// True exactly once after the manager unlocks.
    pub fn take_unlocked(&mut self) -> bool {
        std::mem::take(&mut self.unlock_pending)
    }

    /// Creates a stopped sound for a registered key.
    pub fn add(&mut self, key: &str, config: SoundConfig) -> Option<SoundId> {
        if !self.exists(key) {
            warn!(sound_key = key, "sound_missing");
            return None;
        }
        let id = SoundId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.sounds.insert(
            id,
            SoundSlot {
                key: key.to_string(),
                config,
                playing: false,
            },
        );
        Some(id)
    }

    /// Starts `id`. Returns false while locked or for unknown sounds.
    pub fn play(&mut self, id: SoundId) -> bool {
        if self.locked {
            return false;
        }
        let Some(slot) = self.sounds.get_mut(&id) else {
            return false;
        };
        slot.playing = true;
        self.sink.start(id, &slot.key, slot.config);
        true
    }

    pub fn stop(&mut self, id: SoundId) {
        if let Some(slot) = self.sounds.get_mut(&id) {
            if slot.playing {
                slot.playing = false;
                self.sink.stop(id);
            }
        }
    }

    pub fn is_playing(&self, id: SoundId) -> bool {
        self.sounds.get(&id).is_some_and(|slot| slot.playing)
    }

    pub fn destroy(&mut self, id: SoundId) {
        self.stop(id);
        self.sounds.remove(&id);
    }

    pub fn active_count(&self) -> usize {
        self.sounds.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default, Clone)]
    struct RecordingSink {
        events: Rc<RefCell<Vec<String>>>,
    }

    impl AudioSink for RecordingSink {
        fn start(&mut self, _id: SoundId, key: &str, _config: SoundConfig) {
            self.events.borrow_mut().push(format!("start:{key}"));
        }

        fn stop(&mut self, _id: SoundId) {
            self.events.borrow_mut().push("stop".to_string());
        }
    }

    fn manager_with_bgm() -> (SoundManager, Rc<RefCell<Vec<String>>>) {
        let sink = RecordingSink::default();
        let events = Rc::clone(&sink.events);
        let mut manager = SoundManager::new(Box::new(sink));
        manager.register_key("bgm");
        (manager, events)
    }

    #[test]
    fn play_is_refused_while_locked() {
        let (mut manager, events) = manager_with_bgm();
        let bgm = manager.add("bgm", SoundConfig::default()).expect("bgm");
        assert!(!manager.play(bgm));
        assert!(!manager.is_playing(bgm));
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn unlock_is_reported_once() {
        let (mut manager, _) = manager_with_bgm();
        assert!(!manager.take_unlocked());
        manager.unlock();
        manager.unlock();
        assert!(manager.take_unlocked());
        assert!(!manager.take_unlocked());
        assert!(!manager.is_locked());
    }

    #[test]
    fn stop_and_destroy_reach_the_sink() {
        let (mut manager, events) = manager_with_bgm();
        manager.unlock();
        let bgm = manager.add("bgm", SoundConfig::default()).expect("bgm");
        assert!(manager.play(bgm));
        manager.stop(bgm);
        manager.stop(bgm);
        manager.destroy(bgm);
        assert_eq!(*events.borrow(), vec!["start:bgm".to_string(), "stop".to_string()]);
        assert_eq!(manager.active_count(), 0);
    }

    #[test]
    fn unregistered_keys_cannot_be_added() {
        let (mut manager, _) = manager_with_bgm();
        assert_eq!(manager.add("missing", SoundConfig::default()), None);
    }
}
