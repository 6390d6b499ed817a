use crate::app::texture::{blend_over, Rgba};

pub const GLYPH_WIDTH: i32 = 3;
pub const GLYPH_HEIGHT: i32 = 5;
pub const GLYPH_ADVANCE: i32 = 4;
pub const LINE_ADVANCE: i32 = 7;

/// 3x5 glyphs for ' '..='~', five 3-bit rows packed top row first.
const ASCII_GLYPHS: [u16; 95] = [
    0x0000, 0x2482, 0x5a00, 0x5f7d, 0x7ddf, 0x52a5, 0x2aab, 0x2400,
    0x1491, 0x4494, 0x0aa8, 0x05d0, 0x0014, 0x01c0, 0x0002, 0x12a4,
    0x7b6f, 0x2c97, 0x73e7, 0x73cf, 0x5bc9, 0x79cf, 0x79ef, 0x7292,
    0x7bef, 0x7bcf, 0x0410, 0x0414, 0x1511, 0x0e38, 0x4454, 0x72c2,
    0x7be7, 0x2bed, 0x6bae, 0x7927, 0x6b6e, 0x79a7, 0x79a4, 0x796f,
    0x5bed, 0x7497, 0x726f, 0x5bad, 0x4927, 0x5fed, 0x5ffd, 0x7b6f,
    0x6ba4, 0x7b79, 0x6bad, 0x79cf, 0x7492, 0x5b6f, 0x5b6a, 0x5bfd,
    0x5aad, 0x5a92, 0x72a7, 0x6926, 0x4889, 0x324b, 0x2a00, 0x0007,
    0x4400, 0x0e7f, 0x49ae, 0x0f27, 0x13ef, 0x0fa7, 0x39a4, 0x0f79,
    0x49ad, 0x2092, 0x106a, 0x4bad, 0x4927, 0x0ded, 0x0d6d, 0x0f6f,
    0x0d74, 0x0f79, 0x0d64, 0x0f8f, 0x2e93, 0x0b6f, 0x0b6a, 0x0b7a,
    0x0a95, 0x0b79, 0x0e57, 0x3593, 0x2492, 0x64d6, 0x0780,
];

const FALLBACK_GLYPH: u16 = 0x72c2;

fn glyph_bits(ch: char) -> u16 {
    match ch {
        ' '..='~' => ASCII_GLYPHS[ch as usize - ' ' as usize],
        _ => FALLBACK_GLYPH,
    }
}

fn glyph_pixel(bits: u16, col: i32, row: i32) -> bool {
    let shift = (GLYPH_HEIGHT - 1 - row) * GLYPH_WIDTH + (GLYPH_WIDTH - 1 - col);
    bits & (1 << shift) != 0
}

/// Width and height in pixels of `text` drawn at `scale`.
pub fn text_size(text: &str, scale: i32) -> (i32, i32) {
    let mut width = 0;
    let mut lines = 0;
    for line in text.split('\n') {
        lines += 1;
        width = width.max(line_width(line, scale));
    }
    let height = if lines == 0 {
        0
    } else {
        (lines - 1) * LINE_ADVANCE * scale + GLYPH_HEIGHT * scale
    };
    (width, height)
}

fn line_width(line: &str, scale: i32) -> i32 {
    let count = line.chars().count() as i32;
    if count == 0 {
        return 0;
    }
    ((count - 1) * GLYPH_ADVANCE + GLYPH_WIDTH) * scale
}

/// Draws `text` centered on (`center_x`, `center_y`), each line centered
/// on its own.
#[allow(clippy::too_many_arguments)]
pub fn draw_text_centered(
    frame: &mut [u8],
    width: u32,
    height: u32,
    center_x: i32,
    center_y: i32,
    text: &str,
    color: Rgba,
    scale: i32,
) {
    let scale = scale.max(1);
    let (_, total_height) = text_size(text, scale);
    let mut y = center_y - total_height / 2;
    for line in text.split('\n') {
        let x = center_x - line_width(line, scale) / 2;
        draw_line(frame, width, height, x, y, line, color, scale);
        y += LINE_ADVANCE * scale;
    }
}

#[allow(clippy::too_many_arguments)]
pub fn draw_line(
    frame: &mut [u8],
    width: u32,
    height: u32,
    mut x: i32,
    y: i32,
    line: &str,
    color: Rgba,
    scale: i32,
) {
    for ch in line.chars() {
        draw_glyph(frame, width, height, x, y, glyph_bits(ch), color, scale);
        x += GLYPH_ADVANCE * scale;
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_glyph(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    bits: u16,
    color: Rgba,
    scale: i32,
) {
    if bits == 0 {
        return;
    }
    let (width_i32, height_i32) = (width as i32, height as i32);
    for row in 0..GLYPH_HEIGHT {
        for col in 0..GLYPH_WIDTH {
            if !glyph_pixel(bits, col, row) {
                continue;
            }
            for sy in 0..scale {
                let py = y + row * scale + sy;
                if py < 0 || py >= height_i32 {
                    continue;
                }
                for sx in 0..scale {
                    let px = x + col * scale + sx;
                    if px < 0 || px >= width_i32 {
                        continue;
                    }
                    let offset = (py as usize * width as usize + px as usize) * 4;
                    let mut dst = [0u8; 4];
                    dst.copy_from_slice(&frame[offset..offset + 4]);
                    frame[offset..offset + 4].copy_from_slice(&blend_over(dst, color));
                }
            }
        }
    }
}
