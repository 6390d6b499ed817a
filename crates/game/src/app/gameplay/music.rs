use engine::{SoundConfig, SoundId, SoundManager};
use tracing::{debug, info};

pub(crate) const MUSIC_KEY: &str = "bgm";
const MUSIC_VOLUME: f32 = 0.35;

/// Background track driven by the player's music preference. Playback that
/// is refused while audio is locked is retried when the unlock arrives.
#[derive(Debug)]
pub(crate) struct MusicController {
    enabled: bool,
    track: Option<SoundId>,
}

impl MusicController {
    pub(crate) fn setup(sounds: &mut SoundManager, enabled: bool) -> Self {
        let track = sounds.add(
            MUSIC_KEY,
            SoundConfig {
                looped: true,
                volume: MUSIC_VOLUME,
            },
        );
        let mut music = Self { enabled, track };
        music.try_play(sounds);
        music
    }

    pub(crate) fn enabled(&self) -> bool {
        self.enabled
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn is_playing(&self, sounds: &SoundManager) -> bool {
        self.track.is_some_and(|track| sounds.is_playing(track))
    }

    fn try_play(&mut self, sounds: &mut SoundManager) {
        let Some(track) = self.track else {
            return;
        };
        if !self.enabled || sounds.is_playing(track) {
            return;
        }
        if sounds.play(track) {
            debug!("music_started");
        }
    }

    /// Called once when the sound manager reports its unlock.
    pub(crate) fn on_unlock(&mut self, sounds: &mut SoundManager) {
        self.try_play(sounds);
    }

    pub(crate) fn set_enabled(&mut self, sounds: &mut SoundManager, enabled: bool) {
        self.enabled = enabled;
        info!(enabled, "music_toggled");
        if enabled {
            self.try_play(sounds);
        } else if let Some(track) = self.track {
            sounds.stop(track);
        }
    }

    pub(crate) fn shutdown(&mut self, sounds: &mut SoundManager) {
        if let Some(track) = self.track.take() {
            sounds.destroy(track);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> SoundManager {
        let mut sounds = SoundManager::default();
        sounds.register_key(MUSIC_KEY);
        sounds
    }

    #[test]
    fn locked_setup_waits_for_unlock() {
        let mut sounds = manager();
        let mut music = MusicController::setup(&mut sounds, true);
        assert!(!music.is_playing(&sounds));

        sounds.unlock();
        assert!(sounds.take_unlocked());
        music.on_unlock(&mut sounds);
        assert!(music.is_playing(&sounds));

        music.on_unlock(&mut sounds);
        assert!(music.is_playing(&sounds));
    }

    #[test]
    fn disable_then_enable_without_gesture_plays_once_unlocked() {
        let mut sounds = manager();
        let mut music = MusicController::setup(&mut sounds, true);
        music.set_enabled(&mut sounds, false);
        music.set_enabled(&mut sounds, true);
        assert!(!music.is_playing(&sounds));

        sounds.unlock();
        music.on_unlock(&mut sounds);
        assert!(music.is_playing(&sounds));
    }

    #[test]
    fn unlock_while_disabled_stays_silent() {
        let mut sounds = manager();
        let mut music = MusicController::setup(&mut sounds, false);
        sounds.unlock();
        music.on_unlock(&mut sounds);
        assert!(!music.is_playing(&sounds));

        music.set_enabled(&mut sounds, true);
        assert!(music.is_playing(&sounds));
        music.set_enabled(&mut sounds, false);
        assert!(!music.is_playing(&sounds));
    }

    #[test]
    fn missing_track_is_a_no_op() {
        let mut sounds = SoundManager::default();
        let mut music = MusicController::setup(&mut sounds, true);
        sounds.unlock();
        music.on_unlock(&mut sounds);
        assert!(!music.is_playing(&sounds));
        music.shutdown(&mut sounds);
    }

    #[test]
    fn shutdown_destroys_the_track() {
        let mut sounds = manager();
        sounds.unlock();
        let mut music = MusicController::setup(&mut sounds, true);
        assert!(music.is_playing(&sounds));
        music.shutdown(&mut sounds);
        assert_eq!(sounds.active_count(), 0);
    }
}
