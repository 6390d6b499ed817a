use std::f32::consts::PI;

use super::animation::AnimationPlayer;
use super::geometry::Vec2;
use super::texture::{rgb_hex, Rgba};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpriteId(pub u64);

pub const PLACEHOLDER_COLOR: Rgba = rgb_hex(0xff00ff);
pub const PLACEHOLDER_SIZE_PX: u32 = 32;

/// A positioned, depth-sorted image. `position` is the world point that
/// `origin` (normalized within the frame) is pinned to.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub texture_key: String,
    pub frame: u32,
    pub position: Vec2,
    pub origin: Vec2,
    pub scale: f32,
    pub rotation: f32,
    pub flip_x: bool,
    pub depth: f32,
    pub visible: bool,
    pub interactive: bool,
    pub(crate) animation: AnimationPlayer,
    pub(crate) bob: Option<BobTween>,
}

impl Sprite {
    pub fn new(texture_key: &str, position: Vec2) -> Self {
        Self {
            texture_key: texture_key.to_string(),
            frame: 0,
            position,
            origin: Vec2::new(0.5, 0.5),
            scale: 1.0,
            rotation: 0.0,
            flip_x: false,
            depth: 0.0,
            visible: true,
            interactive: false,
            animation: AnimationPlayer::default(),
            bob: None,
        }
    }

    pub fn with_origin(mut self, x: f32, y: f32) -> Self {
        self.origin = Vec2::new(x, y);
        self
    }

    pub fn with_depth(mut self, depth: f32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn animation(&self) -> &AnimationPlayer {
        &self.animation
    }

    /// Texture key and frame to draw this tick.
    pub fn visual_frame(&self) -> (&str, u32) {
        self.animation
            .current_frame()
            .unwrap_or((self.texture_key.as_str(), self.frame))
    }
}

/// Yoyo vertical offset with sine in-out easing that repeats forever.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BobTween {
    base_y: f32,
    amplitude: f32,
    half_period_ms: f32,
    elapsed_ms: f32,
}

impl BobTween {
    /// Moves from `base_y` to `base_y - amplitude` over `half_period_ms` and back.
    pub fn new(base_y: f32, amplitude: f32, half_period_ms: f32) -> Self {
        Self {
            base_y,
            amplitude,
            half_period_ms: half_period_ms.max(1.0),
            elapsed_ms: 0.0,
        }
    }

    pub fn advance(&mut self, dt_ms: f32) -> f32 {
        self.elapsed_ms = (self.elapsed_ms + dt_ms) % (self.half_period_ms * 2.0);
        self.value()
    }

    pub fn value(&self) -> f32 {
        let phase = self.elapsed_ms / self.half_period_ms;
        let t = if phase <= 1.0 { phase } else { 2.0 - phase };
        let eased = -((PI * t).cos() - 1.0) * 0.5;
        self.base_y - self.amplitude * eased
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bob_reaches_peak_at_half_period_and_returns() {
        let mut bob = BobTween::new(100.0, 2.0, 800.0);
        assert_eq!(bob.value(), 100.0);
        let peak = bob.advance(800.0);
        assert!((peak - 98.0).abs() < 0.0001, "peak={peak}");
        let back = bob.advance(800.0);
        assert!((back - 100.0).abs() < 0.0001, "back={back}");
    }

    #[test]
    fn bob_eases_slowly_near_the_ends() {
        let mut bob = BobTween::new(0.0, 2.0, 800.0);
        let early = bob.advance(80.0).abs();
        let mut mid = BobTween::new(0.0, 2.0, 800.0);
        let before = mid.advance(360.0);
        let mid_step = (mid.advance(80.0) - before).abs();
        assert!(early < 0.1, "early={early}");
        assert!(mid_step > early, "mid_step={mid_step} early={early}");
    }

    #[test]
    fn visual_frame_falls_back_to_static_frame() {
        let mut sprite = Sprite::new("tree-3x", Vec2::ZERO);
        sprite.frame = 3;
        assert_eq!(sprite.visual_frame(), ("tree-3x", 3));
    }
}
