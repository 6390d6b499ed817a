use crate::app::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Integer upscale factor used to present a logical frame in a window, at
/// least 1.
pub fn present_scale(logical: Viewport, window: Viewport) -> u32 {
    if logical.width == 0 || logical.height == 0 {
        return 1;
    }
    (window.width / logical.width)
        .min(window.height / logical.height)
        .max(1)
}

/// Maps a window pixel to a logical frame pixel. The logical frame is scaled
/// by [`present_scale`] and centered; points in the letterbox map to `None`.
pub fn window_to_logical(position: Vec2, logical: Viewport, window: Viewport) -> Option<Vec2> {
    let scale = present_scale(logical, window) as f32;
    let offset_x = (window.width as f32 - logical.width as f32 * scale) * 0.5;
    let offset_y = (window.height as f32 - logical.height as f32 * scale) * 0.5;
    let x = (position.x - offset_x) / scale;
    let y = (position.y - offset_y) / scale;
    if x < 0.0 || y < 0.0 || x >= logical.width as f32 || y >= logical.height as f32 {
        return None;
    }
    Some(Vec2 { x, y })
}
