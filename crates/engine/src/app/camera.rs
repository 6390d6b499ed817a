use super::geometry::{Rect, Vec2};
use super::texture::Rgba;

pub const CAMERA_ZOOM_DEFAULT: f32 = 1.0;
pub const CAMERA_ZOOM_MIN: f32 = 0.25;
pub const CAMERA_ZOOM_MAX: f32 = 8.0;

/// World camera. `center` is the world point shown at the middle of the
/// view; `view_size` is the logical screen size in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera2D {
    center: Vec2,
    zoom: f32,
    bounds: Option<Rect>,
    background: Rgba,
    view_size: Vec2,
}

impl Default for Camera2D {
    fn default() -> Self {
        Self {
            center: Vec2::ZERO,
            zoom: CAMERA_ZOOM_DEFAULT,
            bounds: None,
            background: [0, 0, 0, 255],
            view_size: Vec2::new(960.0, 540.0),
        }
    }
}

impl Camera2D {
    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = clamp_camera_zoom(zoom);
        self.clamp_to_bounds();
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = Some(bounds);
        self.clamp_to_bounds();
    }

    pub fn background(&self) -> Rgba {
        self.background
    }

    pub fn set_background(&mut self, color: Rgba) {
        self.background = color;
    }

    pub fn view_size(&self) -> Vec2 {
        self.view_size
    }

    pub fn set_view_size(&mut self, width: u32, height: u32) {
        self.view_size = Vec2::new(width.max(1) as f32, height.max(1) as f32);
        self.clamp_to_bounds();
    }

    pub fn center_on(&mut self, target: Vec2) {
        self.center = target;
        self.clamp_to_bounds();
    }

    /// Moves a `lerp` fraction of the way towards `target`, then clamps.
    pub fn follow_towards(&mut self, target: Vec2, lerp: f32) {
        let lerp = lerp.clamp(0.0, 1.0);
        self.center += (target - self.center) * lerp;
        self.clamp_to_bounds();
    }

    /// World rectangle currently covered by the view.
    pub fn visible_world_rect(&self) -> Rect {
        let half = self.view_size * (0.5 / self.zoom);
        Rect::new(
            self.center.x - half.x,
            self.center.y - half.y,
            half.x * 2.0,
            half.y * 2.0,
        )
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.center) * self.zoom + self.view_size * 0.5
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.view_size * 0.5) * (1.0 / self.zoom) + self.center
    }

    fn clamp_to_bounds(&mut self) {
        let Some(bounds) = self.bounds else {
            return;
        };
        let half = self.view_size * (0.5 / self.zoom);
        self.center.x = clamp_axis(self.center.x, bounds.x, bounds.right(), half.x);
        self.center.y = clamp_axis(self.center.y, bounds.y, bounds.bottom(), half.y);
    }
}

fn clamp_axis(value: f32, min: f32, max: f32, half_extent: f32) -> f32 {
    if max - min <= half_extent * 2.0 {
        return (min + max) * 0.5;
    }
    value.clamp(min + half_extent, max - half_extent)
}

fn clamp_camera_zoom(zoom: f32) -> f32 {
    if !zoom.is_finite() {
        return CAMERA_ZOOM_DEFAULT;
    }
    zoom.clamp(CAMERA_ZOOM_MIN, CAMERA_ZOOM_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn village_camera() -> Camera2D {
        let mut camera = Camera2D::default();
        camera.set_zoom(2.0);
        camera.set_bounds(Rect::new(0.0, 0.0, 960.0, 704.0));
        camera
    }

    #[test]
    fn center_maps_to_view_middle() {
        let mut camera = village_camera();
        camera.center_on(Vec2::new(400.0, 300.0));
        assert_eq!(camera.world_to_screen(Vec2::new(400.0, 300.0)), Vec2::new(480.0, 270.0));
        assert_eq!(camera.world_to_screen(Vec2::new(410.0, 290.0)), Vec2::new(500.0, 250.0));
    }

    #[test]
    fn screen_to_world_inverts_world_to_screen() {
        let mut camera = village_camera();
        camera.center_on(Vec2::new(400.0, 300.0));
        let world = camera.screen_to_world(Vec2::new(100.0, 50.0));
        let back = camera.world_to_screen(world);
        assert!((back.x - 100.0).abs() < 0.001 && (back.y - 50.0).abs() < 0.001);
    }

    #[test]
    fn bounds_keep_view_inside_world() {
        let mut camera = village_camera();
        camera.center_on(Vec2::new(0.0, 0.0));
        let visible = camera.visible_world_rect();
        assert_eq!(visible.x, 0.0);
        assert_eq!(visible.y, 0.0);

        camera.center_on(Vec2::new(5000.0, 5000.0));
        let visible = camera.visible_world_rect();
        assert_eq!(visible.right(), 960.0);
        assert_eq!(visible.bottom(), 704.0);
    }

    #[test]
    fn follow_moves_a_fraction_of_the_gap() {
        let mut camera = Camera2D::default();
        camera.center_on(Vec2::new(0.0, 0.0));
        camera.follow_towards(Vec2::new(100.0, 0.0), 0.08);
        assert!((camera.center().x - 8.0).abs() < 0.0001);
    }

    #[test]
    fn invalid_zoom_falls_back_to_default() {
        let mut camera = Camera2D::default();
        camera.set_zoom(f32::NAN);
        assert_eq!(camera.zoom(), CAMERA_ZOOM_DEFAULT);
    }
}
