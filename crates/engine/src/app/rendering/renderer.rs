use std::cmp::Ordering;
use std::sync::Arc;

use pixels::{Pixels, SurfaceTexture};
use thiserror::Error;
use winit::window::Window;

use crate::app::camera::Camera2D;
use crate::app::sprite::{Sprite, PLACEHOLDER_COLOR, PLACEHOLDER_SIZE_PX};
use crate::app::texture::{blend_over, with_alpha, Rgba, Texture};
use crate::app::tilemap::{TileLayer, Tilemap};
use crate::app::ui::{Space, UiElement, UiKind};
use crate::app::{SceneWorld, Vec2};

use super::font::draw_text_centered;
use super::transform::{window_to_logical, Viewport};

const PLACEHOLDER_ALPHA: u8 = 160;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("pixel surface error: {0}")]
    Pixels(#[from] pixels::Error),
    #[error("failed to resize pixel surface: {0}")]
    Resize(#[from] pixels::TextureError),
}

/// Software renderer presenting a fixed logical frame through `pixels`.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    logical: Viewport,
    window_size: Viewport,
}

impl Renderer {
    pub fn new(window: Arc<Window>, logical: Viewport) -> Result<Self, RenderError> {
        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width.max(1), size.height.max(1), Arc::clone(&window));
        let pixels = Pixels::new(logical.width, logical.height, surface)?;
        Ok(Self {
            window,
            pixels,
            logical,
            window_size: Viewport {
                width: size.width,
                height: size.height,
            },
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels.resize_surface(width, height)?;
        self.window_size = Viewport { width, height };
        Ok(())
    }

    pub fn logical_size(&self) -> Viewport {
        self.logical
    }

    pub fn window_to_logical(&self, position: Vec2) -> Option<Vec2> {
        window_to_logical(position, self.logical, self.window_size)
    }

    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }

    pub fn render_world(&mut self, world: &SceneWorld) -> Result<(), RenderError> {
        let (width, height) = (self.logical.width, self.logical.height);
        compose_frame(self.pixels.frame_mut(), width, height, world);
        self.pixels.render()?;
        Ok(())
    }
}

enum DrawItem<'a> {
    Layer(&'a TileLayer),
    Sprite(&'a Sprite),
    Ui(&'a UiElement),
}

impl DrawItem<'_> {
    fn depth(&self) -> f32 {
        match self {
            DrawItem::Layer(layer) => layer.depth(),
            DrawItem::Sprite(sprite) => sprite.depth,
            DrawItem::Ui(element) => element.depth,
        }
    }
}

/// Draws `world` into an RGBA frame of `width` x `height` logical pixels.
/// Tile layers, sprites and UI share one depth order; equal depths keep
/// layer, sprite, UI insertion order.
pub fn compose_frame(frame: &mut [u8], width: u32, height: u32, world: &SceneWorld) {
    if width == 0 || height == 0 {
        return;
    }
    let camera = world.camera();
    let background = camera.background();
    for chunk in frame.chunks_exact_mut(4) {
        chunk.copy_from_slice(&background);
    }

    let mut items: Vec<DrawItem<'_>> = Vec::new();
    if let Some(tilemap) = world.tilemap() {
        items.extend(tilemap.layers().iter().map(DrawItem::Layer));
    }
    items.extend(
        world
            .sprites()
            .map(|(_, sprite)| sprite)
            .filter(|sprite| sprite.visible)
            .map(DrawItem::Sprite),
    );
    items.extend(
        world
            .ui_elements()
            .filter(|element| element.visible)
            .map(DrawItem::Ui),
    );
    items.sort_by(|a, b| a.depth().partial_cmp(&b.depth()).unwrap_or(Ordering::Equal));

    let mut target = FrameTarget {
        frame,
        width,
        height,
    };
    for item in items {
        match item {
            DrawItem::Layer(layer) => {
                if let Some(tilemap) = world.tilemap() {
                    draw_tile_layer(&mut target, camera, tilemap, layer, world);
                }
            }
            DrawItem::Sprite(sprite) => draw_sprite(&mut target, camera, sprite, world),
            DrawItem::Ui(element) => draw_ui(&mut target, camera, element),
        }
    }
}

struct FrameTarget<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl FrameTarget<'_> {
    fn blend(&mut self, x: i32, y: i32, color: Rgba) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height || color[3] == 0 {
            return;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let mut dst = [0u8; 4];
        dst.copy_from_slice(&self.frame[offset..offset + 4]);
        self.frame[offset..offset + 4].copy_from_slice(&blend_over(dst, color));
    }

    fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba) {
        let x0 = x0.max(0);
        let y0 = y0.max(0);
        let x1 = x1.min(self.width as i32);
        let y1 = y1.min(self.height as i32);
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend(x, y, color);
            }
        }
    }
}

/// Source region of a texture drawn with a pivot, scale, rotation and flip.
struct Blit<'a> {
    texture: &'a Texture,
    src_x: u32,
    src_y: u32,
    src_w: u32,
    src_h: u32,
    /// Screen position of the pivot.
    pivot: Vec2,
    /// Pivot inside the source region, in source pixels.
    pivot_src: Vec2,
    scale: f32,
    rotation: f32,
    flip_x: bool,
}

fn blit(target: &mut FrameTarget<'_>, blit: &Blit<'_>) {
    if blit.scale <= 0.0 || blit.src_w == 0 || blit.src_h == 0 {
        return;
    }
    let (sin, cos) = blit.rotation.sin_cos();
    let corners = [
        Vec2::new(0.0, 0.0),
        Vec2::new(blit.src_w as f32, 0.0),
        Vec2::new(0.0, blit.src_h as f32),
        Vec2::new(blit.src_w as f32, blit.src_h as f32),
    ];
    let mut min = Vec2::new(f32::INFINITY, f32::INFINITY);
    let mut max = Vec2::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
    for corner in corners {
        let local = (corner - blit.pivot_src) * blit.scale;
        let screen = Vec2::new(
            local.x * cos - local.y * sin + blit.pivot.x,
            local.x * sin + local.y * cos + blit.pivot.y,
        );
        min = Vec2::new(min.x.min(screen.x), min.y.min(screen.y));
        max = Vec2::new(max.x.max(screen.x), max.y.max(screen.y));
    }

    let x0 = (min.x.floor() as i32).max(0);
    let y0 = (min.y.floor() as i32).max(0);
    let x1 = (max.x.ceil() as i32).min(target.width as i32);
    let y1 = (max.y.ceil() as i32).min(target.height as i32);
    let inv_scale = blit.scale.recip();
    for py in y0..y1 {
        for px in x0..x1 {
            let d = Vec2::new(px as f32 + 0.5 - blit.pivot.x, py as f32 + 0.5 - blit.pivot.y);
            let unrotated = Vec2::new(d.x * cos + d.y * sin, -d.x * sin + d.y * cos);
            let mut local = unrotated * inv_scale + blit.pivot_src;
            if blit.flip_x {
                // Mirror within the frame so the display rect is unchanged.
                local.x = blit.src_w as f32 - local.x;
            }
            if local.x < 0.0
                || local.y < 0.0
                || local.x >= blit.src_w as f32
                || local.y >= blit.src_h as f32
            {
                continue;
            }
            let color = blit.texture.pixel(
                blit.src_x + local.x as u32,
                blit.src_y + local.y as u32,
            );
            target.blend(px, py, color);
        }
    }
}

fn draw_tile_layer(
    target: &mut FrameTarget<'_>,
    camera: &Camera2D,
    tilemap: &Tilemap,
    layer: &TileLayer,
    world: &SceneWorld,
) {
    let Some(tileset) = world.textures().get(tilemap.tileset_key()) else {
        return;
    };
    let tile_size = tilemap.tile_size();
    let size = tile_size as f32;
    let visible = camera.visible_world_rect();
    let min_x = ((visible.x / size).floor() as i32).max(0);
    let min_y = ((visible.y / size).floor() as i32).max(0);
    let max_x = ((visible.right() / size).ceil() as i32).min(layer.width() as i32);
    let max_y = ((visible.bottom() / size).ceil() as i32).min(layer.height() as i32);

    for ty in min_y..max_y {
        for tx in min_x..max_x {
            let Some(tile) = layer.tile_at(tx, ty) else {
                continue;
            };
            let (src_x, src_y) = tileset.frame_origin(u32::from(tile));
            let pivot = camera.world_to_screen(Vec2::new(tx as f32 * size, ty as f32 * size));
            blit(
                target,
                &Blit {
                    texture: tileset,
                    src_x,
                    src_y,
                    src_w: tile_size.min(tileset.frame_width),
                    src_h: tile_size.min(tileset.frame_height),
                    pivot,
                    pivot_src: Vec2::ZERO,
                    scale: camera.zoom(),
                    rotation: 0.0,
                    flip_x: false,
                },
            );
        }
    }
}

fn draw_sprite(target: &mut FrameTarget<'_>, camera: &Camera2D, sprite: &Sprite, world: &SceneWorld) {
    let (texture_key, frame) = sprite.visual_frame();
    let pivot = camera.world_to_screen(sprite.position);
    let scale = sprite.scale * camera.zoom();

    let Some(texture) = world.textures().get(texture_key) else {
        let size = PLACEHOLDER_SIZE_PX as f32 * scale;
        let x0 = pivot.x - sprite.origin.x * size;
        let y0 = pivot.y - sprite.origin.y * size;
        target.fill_rect(
            x0.round() as i32,
            y0.round() as i32,
            (x0 + size).round() as i32,
            (y0 + size).round() as i32,
            with_alpha(PLACEHOLDER_COLOR, PLACEHOLDER_ALPHA),
        );
        return;
    };

    let (src_x, src_y) = texture.frame_origin(frame);
    let frame_w = texture.frame_width as f32;
    let frame_h = texture.frame_height as f32;
    blit(
        target,
        &Blit {
            texture,
            src_x,
            src_y,
            src_w: texture.frame_width,
            src_h: texture.frame_height,
            pivot,
            pivot_src: Vec2::new(frame_w * sprite.origin.x, frame_h * sprite.origin.y),
            scale,
            rotation: sprite.rotation,
            flip_x: sprite.flip_x,
        },
    );
}

fn draw_ui(target: &mut FrameTarget<'_>, camera: &Camera2D, element: &UiElement) {
    let (center, zoom) = match element.space {
        Space::Screen => (element.position, 1.0),
        Space::World => (camera.world_to_screen(element.position), camera.zoom()),
    };
    match &element.kind {
        UiKind::Panel { size, color } => {
            let half = *size * (0.5 * zoom);
            target.fill_rect(
                (center.x - half.x).round() as i32,
                (center.y - half.y).round() as i32,
                (center.x + half.x).round() as i32,
                (center.y + half.y).round() as i32,
                *color,
            );
        }
        UiKind::Text {
            text,
            color,
            pixel_scale,
        } => {
            let scale = ((*pixel_scale as f32) * zoom).round().max(1.0) as i32;
            draw_text_centered(
                target.frame,
                target.width,
                target.height,
                center.x.round() as i32,
                center.y.round() as i32,
                text,
                *color,
                scale,
            );
        }
    }
}
