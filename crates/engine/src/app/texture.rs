use std::collections::HashMap;

pub type Rgba = [u8; 4];

/// Opaque color from a `0xRRGGBB` literal.
pub const fn rgb_hex(value: u32) -> Rgba {
    [
        ((value >> 16) & 0xff) as u8,
        ((value >> 8) & 0xff) as u8,
        (value & 0xff) as u8,
        255,
    ]
}

pub const fn with_alpha(color: Rgba, alpha: u8) -> Rgba {
    [color[0], color[1], color[2], alpha]
}

/// Source-over blend of `src` onto `dst`.
pub fn blend_over(dst: Rgba, src: Rgba) -> Rgba {
    match src[3] {
        0 => dst,
        255 => src,
        alpha => {
            let a = alpha as u32;
            let inv = 255 - a;
            let mix = |s: u8, d: u8| ((s as u32 * a + d as u32 * inv + 127) / 255) as u8;
            let out_alpha = (a + dst[3] as u32 * inv / 255).min(255) as u8;
            [
                mix(src[0], dst[0]),
                mix(src[1], dst[1]),
                mix(src[2], dst[2]),
                out_alpha,
            ]
        }
    }
}

/// CPU-side RGBA drawing surface used to build procedural textures.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rgba: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        let offset = self.offset(x as i32, y as i32)?;
        let mut color = [0u8; 4];
        color.copy_from_slice(&self.rgba[offset..offset + 4]);
        Some(color)
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Rgba) {
        self.for_each_clipped(x, y, width, height, |pixel| {
            let mut dst = [0u8; 4];
            dst.copy_from_slice(pixel);
            pixel.copy_from_slice(&blend_over(dst, color));
        });
    }

    pub fn clear_rect(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.for_each_clipped(x, y, width, height, |pixel| pixel.fill(0));
    }

    /// One-pixel horizontal stroke from `x0` (inclusive) to `x1` (exclusive).
    pub fn stroke_horizontal(&mut self, x0: i32, x1: i32, y: i32, color: Rgba) {
        self.fill_rect(x0, y, x1 - x0, 1, color);
    }

    pub fn into_texture(self, frame_width: u32, frame_height: u32) -> Texture {
        Texture {
            width: self.width,
            height: self.height,
            frame_width: frame_width.max(1),
            frame_height: frame_height.max(1),
            rgba: self.rgba,
        }
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 4)
    }

    fn for_each_clipped(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        mut apply: impl FnMut(&mut [u8]),
    ) {
        let start_x = x.max(0);
        let start_y = y.max(0);
        let end_x = (x + width).min(self.width as i32);
        let end_y = (y + height).min(self.height as i32);
        if end_x <= start_x || end_y <= start_y {
            return;
        }
        let stride = self.width as usize * 4;
        for py in start_y..end_y {
            let row = py as usize * stride;
            for px in start_x..end_x {
                let offset = row + px as usize * 4;
                apply(&mut self.rgba[offset..offset + 4]);
            }
        }
    }
}

/// Decoded image or canvas, optionally sliced into equally sized frames.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub frame_width: u32,
    pub frame_height: u32,
    pub rgba: Vec<u8>,
}

impl Texture {
    pub fn frame_count(&self) -> u32 {
        let columns = self.width / self.frame_width;
        let rows = self.height / self.frame_height;
        (columns * rows).max(1)
    }

    /// Top-left pixel of `frame` inside the sheet, row-major.
    pub fn frame_origin(&self, frame: u32) -> (u32, u32) {
        let columns = (self.width / self.frame_width).max(1);
        let frame = frame.min(self.frame_count() - 1);
        (
            (frame % columns) * self.frame_width,
            (frame / columns) * self.frame_height,
        )
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        if x >= self.width || y >= self.height {
            return [0, 0, 0, 0];
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let mut color = [0u8; 4];
        color.copy_from_slice(&self.rgba[offset..offset + 4]);
        color
    }
}

#[derive(Debug, Default)]
pub struct TextureStore {
    textures: HashMap<String, Texture>,
}

impl TextureStore {
    pub fn exists(&self, key: &str) -> bool {
        self.textures.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Texture> {
        self.textures.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, texture: Texture) {
        self.textures.insert(key.into(), texture);
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_hex_unpacks_channels() {
        assert_eq!(rgb_hex(0x6fbe5f), [0x6f, 0xbe, 0x5f, 255]);
    }

    #[test]
    fn fill_rect_clips_to_canvas_bounds() {
        let mut canvas = Canvas::new(4, 4);
        canvas.fill_rect(-2, 2, 10, 10, rgb_hex(0xff0000));
        assert_eq!(canvas.pixel(0, 2), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(3, 3), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(0, 1), Some([0, 0, 0, 0]));
        assert_eq!(canvas.pixel(4, 0), None);
    }

    #[test]
    fn translucent_fill_blends_over_existing_pixels() {
        let mut canvas = Canvas::new(1, 1);
        canvas.fill_rect(0, 0, 1, 1, rgb_hex(0xffffff));
        canvas.fill_rect(0, 0, 1, 1, with_alpha(rgb_hex(0x000000), 128));
        let pixel = canvas.pixel(0, 0).expect("pixel");
        assert!(pixel[0] > 120 && pixel[0] < 135, "pixel={pixel:?}");
        assert_eq!(pixel[3], 255);
    }

    #[test]
    fn clear_rect_resets_to_transparent() {
        let mut canvas = Canvas::new(2, 2);
        canvas.fill_rect(0, 0, 2, 2, rgb_hex(0x123456));
        canvas.clear_rect(1, 1, 1, 1);
        assert_eq!(canvas.pixel(1, 1), Some([0, 0, 0, 0]));
        assert_eq!(canvas.pixel(0, 0), Some(rgb_hex(0x123456)));
    }

    #[test]
    fn frames_are_sliced_row_major() {
        let texture = Canvas::new(64, 32).into_texture(16, 16);
        assert_eq!(texture.frame_count(), 8);
        assert_eq!(texture.frame_origin(0), (0, 0));
        assert_eq!(texture.frame_origin(5), (16, 16));
        assert_eq!(texture.frame_origin(99), (48, 16));
    }
}
