use engine::{rgb_hex, DelayedCalls, SceneWorld, Space, TimerId, UiElement, UiId, Vec2};

pub(crate) const DEFAULT_LINE: &str = "Hello there";
pub(crate) const DIALOGUE_HIDE_MS: u64 = 1800;
const BUBBLE_RISE: f32 = 46.0;
const BUBBLE_DEPTH: f32 = 1201.0;

/// Line spoken by a clickable identity; unknown identities get a greeting.
pub(crate) fn dialogue_line(identity: &str) -> &'static str {
    match identity {
        "npc-alex" => "Hey, looking for Patrick? His GitHub is where the magic happens!",
        "npc-anna" => "The code behind this world? Yep, Patrick crafted it all himself!",
        "npc-ardley" => "Need a quest? Start with Patrick's projects - he's got plenty!",
        "npc-colt" => "Check out Patrick's repo! Even we NPCs are impressed!",
        "npc-ester" => "The terrain's custom CSS, but Patrick made every pixel count!",
        "npc-tom" => "Want more adventures? Patrick's portfolio is full of them!",
        "orc" => "Rawr! Even I approve of Patrick's coding skills!",
        _ => DEFAULT_LINE,
    }
}

/// Single world-space speech line shared by every speaker.
#[derive(Debug)]
pub(crate) struct DialogueBubble {
    text: UiId,
    hide_timer: Option<TimerId>,
}

impl DialogueBubble {
    pub(crate) fn create(world: &mut SceneWorld) -> Self {
        let text = world.add_ui(
            UiElement::text("", rgb_hex(0xfef9d7), 1, Space::World)
                .with_depth(BUBBLE_DEPTH)
                .hidden(),
        );
        Self {
            text,
            hide_timer: None,
        }
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn ui(&self) -> UiId {
        self.text
    }

    /// Shows `line` above `target` and restarts the hide countdown.
    pub(crate) fn show_above<T>(
        &mut self,
        world: &mut SceneWorld,
        timers: &mut DelayedCalls<T>,
        hide: T,
        target: Vec2,
        line: &str,
        now: u64,
    ) {
        if let Some(element) = world.ui_mut(self.text) {
            element.set_text(line);
            element.position = Vec2::new(target.x, target.y - BUBBLE_RISE);
            element.visible = true;
        }
        if let Some(previous) = self.hide_timer.take() {
            timers.cancel(previous);
        }
        self.hide_timer = Some(timers.schedule(now + DIALOGUE_HIDE_MS, hide));
    }

    /// Hides the bubble when `timer` is the pending hide; stale ids are ignored.
    pub(crate) fn on_hide_due(&mut self, world: &mut SceneWorld, timer: TimerId) {
        if self.hide_timer != Some(timer) {
            return;
        }
        self.hide_timer = None;
        if let Some(element) = world.ui_mut(self.text) {
            element.visible = false;
        }
    }
}
