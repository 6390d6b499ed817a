use engine::{rgb_hex, with_alpha, Canvas, LayerId, Rect, Rgba, TextureStore, Tilemap, TilemapError, Vec2};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use super::types::{tile_center, MAP_HEIGHT, MAP_WIDTH, TILE_SIZE};

pub(crate) const TILESET_KEY: &str = "cozy-tiles";
pub(crate) const TREE_TEXTURE: &str = "tree-3x";
pub(crate) const CASTLE_TEXTURE: &str = "castle-big";

pub(crate) const GRASS: &[u16] = &[0, 1, 2];
pub(crate) const PATH: &[u16] = &[3, 4];
pub(crate) const WATER: &[u16] = &[5, 6];
pub(crate) const BUSH: &[u16] = &[9];
pub(crate) const FLOWER: &[u16] = &[10, 11];
pub(crate) const ROCK: &[u16] = &[12];

const ATLAS_COLUMNS: u32 = 4;
const ATLAS_ROWS: u32 = 4;

/// Tree anchors in tile coordinates.
const TREE_TILES: [(i32, i32); 21] = [
    (18, 8),
    (8, 12),
    (12, 13),
    (16, 12),
    (20, 10),
    (28, 8),
    (32, 10),
    (36, 8),
    (40, 10),
    (30, 16),
    (34, 18),
    (38, 16),
    (42, 18),
    (8, 26),
    (12, 28),
    (16, 26),
    (20, 28),
    (26, 30),
    (30, 32),
    (34, 30),
    (38, 32),
];

const CASTLE_TILE: (i32, i32) = (10, -2);
const CASTLE_SIZE: (u32, u32) = (TILE_SIZE * 12, TILE_SIZE * 10);
const CASTLE_FOOTPRINT: Vec2 = Vec2::new(192.0, 128.0);
const CASTLE_FOOTPRINT_OFFSET: Vec2 = Vec2::new(-16.0, 30.0);

pub(crate) fn is_water(tile: u16) -> bool {
    WATER.contains(&tile)
}

/// Ground tiles that decor may not cover.
pub(crate) fn blocks_decor(tile: u16) -> bool {
    is_water(tile) || PATH.contains(&tile)
}

fn pick(indices: &[u16], rng: &mut impl Rng) -> u16 {
    indices.choose(rng).copied().unwrap_or(0)
}

/// Paints the 4x4 village atlas into the texture store unless a tileset
/// with that key is already present.
pub(crate) fn ensure_tileset(textures: &mut TextureStore, rng: &mut impl Rng) {
    if textures.exists(TILESET_KEY) {
        return;
    }
    let tile = TILE_SIZE as i32;
    let mut canvas = Canvas::new(ATLAS_COLUMNS * TILE_SIZE, ATLAS_ROWS * TILE_SIZE);

    let grounds: [(u16, u32, Option<(i32, i32, u32)>, [u32; 2], u32); 7] = [
        (0, 0x6fbe5f, None, [0x5aa650, 0x7ad66a], 18),
        (1, 0x66b355, None, [0x4f9446, 0x82d873], 22),
        (2, 0x74c765, None, [0x5fb255, 0x8edc7a], 14),
        (3, 0xb58a57, None, [0xa37446, 0xcaa074], 20),
        (4, 0xa97b4f, None, [0x915f3a, 0xc89a6b], 18),
        (5, 0x6bbbe8, Some((4, 3, 0x5aa9db)), [0x8ad5ff, 0x4d99cc], 10),
        (6, 0x62b0de, Some((6, 2, 0x4f9acc)), [0x84d0ff, 0x559fcd], 10),
    ];
    for (index, base, band, speckles, count) in grounds {
        let (x, y) = atlas_origin(index);
        canvas.clear_rect(x, y, tile, tile);
        canvas.fill_rect(x, y, tile, tile, rgb_hex(base));
        if let Some((band_y, band_height, band_color)) = band {
            canvas.fill_rect(x, y + band_y, tile, band_height, rgb_hex(band_color));
        }
        for _ in 0..count {
            let px = x + rng.gen_range(0..tile);
            let py = y + rng.gen_range(0..tile);
            let color = speckles.choose(rng).copied().unwrap_or(base);
            canvas.fill_rect(px, py, 1, 1, rgb_hex(color));
        }
    }

    // (atlas index, [(x, y, w, h, color)]) rectangle stacks for decor icons.
    let icons: [(u16, &[(i32, i32, i32, i32, u32)]); 5] = [
        (
            8,
            &[
                (3, 2, 10, 10, 0x2f7d32),
                (4, 3, 8, 8, 0x3b9b3c),
                (2, 6, 12, 6, 0x265b2a),
                (7, 10, 2, 4, 0x6b4b2a),
            ],
        ),
        (
            9,
            &[
                (3, 6, 10, 6, 0x3f8f3f),
                (4, 5, 8, 6, 0x4faa4d),
                (2, 8, 12, 4, 0x2f6f35),
            ],
        ),
        (10, &[(6, 6, 4, 4, 0x4faa4d), (7, 7, 2, 2, 0xffdc6b)]),
        (11, &[(5, 6, 6, 4, 0x4faa4d), (7, 7, 2, 2, 0xf08bb4)]),
        (
            12,
            &[
                (4, 6, 8, 6, 0x8b8f94),
                (5, 7, 6, 4, 0x6f7278),
                (6, 5, 4, 2, 0xa0a4aa),
            ],
        ),
    ];
    for (index, rects) in icons {
        let (x, y) = atlas_origin(index);
        canvas.clear_rect(x, y, tile, tile);
        for &(rx, ry, rw, rh, color) in rects {
            canvas.fill_rect(x + rx, y + ry, rw, rh, rgb_hex(color));
        }
    }

    textures.insert(TILESET_KEY, canvas.into_texture(TILE_SIZE, TILE_SIZE));
    debug!(key = TILESET_KEY, "tileset_generated");
}

fn atlas_origin(index: u16) -> (i32, i32) {
    let index = u32::from(index);
    (
        ((index % ATLAS_COLUMNS) * TILE_SIZE) as i32,
        ((index / ATLAS_COLUMNS) * TILE_SIZE) as i32,
    )
}

/// The painted village grid and the ids of its two layers.
#[derive(Debug)]
pub(crate) struct VillageMap {
    pub(crate) tilemap: Tilemap,
    pub(crate) ground: LayerId,
    pub(crate) decor: LayerId,
}

impl VillageMap {
    pub(crate) fn ground_tile(&self, x: i32, y: i32) -> Option<u16> {
        self.tilemap.layer(self.ground)?.tile_at(x, y)
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn decor_tile(&self, x: i32, y: i32) -> Option<u16> {
        self.tilemap.layer(self.decor)?.tile_at(x, y)
    }

    /// Fills `width` x `height` cells from (`start_x`, `start_y`) on `layer`
    /// with random picks from `indices`.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn paint_rect(
        &mut self,
        layer: LayerId,
        start_x: i32,
        start_y: i32,
        width: i32,
        height: i32,
        indices: &[u16],
        rng: &mut impl Rng,
    ) {
        let Some(target) = self.tilemap.layer_mut(layer) else {
            return;
        };
        for y in start_y..start_y + height {
            for x in start_x..start_x + width {
                target.put_tile_at(pick(indices, rng), x, y);
            }
        }
    }

    /// Drops `count` decor tiles at random cells in the inclusive range
    /// `[start, start + extent]` on both axes. Cells over water or path are
    /// skipped, so fewer tiles may land than requested. Returns how many did.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn scatter_decor(
        &mut self,
        indices: &[u16],
        count: u32,
        start_x: i32,
        start_y: i32,
        width: i32,
        height: i32,
        rng: &mut impl Rng,
    ) -> u32 {
        let mut placed = 0;
        for _ in 0..count {
            let x = rng.gen_range(start_x..=start_x + width);
            let y = rng.gen_range(start_y..=start_y + height);
            if self.ground_tile(x, y).is_some_and(blocks_decor) {
                continue;
            }
            let tile = pick(indices, rng);
            if let Some(decor) = self.tilemap.layer_mut(self.decor) {
                if decor.put_tile_at(tile, x, y) {
                    placed += 1;
                }
            }
        }
        placed
    }
}

/// Builds the 60x44 village: random grass, the cozy paths and ponds, then
/// scattered decor. Water on the ground layer is solid.
pub(crate) fn build_village_map(rng: &mut impl Rng) -> Result<VillageMap, TilemapError> {
    let mut tilemap = Tilemap::new(MAP_WIDTH, MAP_HEIGHT, TILE_SIZE, TILESET_KEY)?;
    let ground = tilemap.create_blank_layer("ground", 0.0)?;
    let decor = tilemap.create_blank_layer("decor", 1.0)?;
    let mut map = VillageMap {
        tilemap,
        ground,
        decor,
    };

    map.paint_rect(ground, 0, 0, MAP_WIDTH as i32, MAP_HEIGHT as i32, GRASS, rng);

    for (x, y, w, h) in [(6, 18, 20, 2), (14, 10, 2, 10), (8, 8, 8, 6)] {
        map.paint_rect(ground, x, y, w, h, PATH, rng);
    }
    for (x, y, w, h) in [(26, 10, 8, 5), (6, 28, 10, 5), (36, 18, 8, 6)] {
        map.paint_rect(ground, x, y, w, h, WATER, rng);
    }

    let scatters: [(&[u16], u32, i32, i32, i32, i32); 4] = [
        (BUSH, 80, 4, 6, 28, 20),
        (FLOWER, 120, 4, 8, 28, 20),
        (ROCK, 30, 4, 8, 28, 20),
        (BUSH, 70, 32, 8, 20, 20),
    ];
    let mut placed = 0;
    for (indices, count, x, y, w, h) in scatters {
        placed += map.scatter_decor(indices, count, x, y, w, h, rng);
    }

    if let Some(layer) = map.tilemap.layer_mut(ground) {
        layer.set_collision(WATER);
    }
    debug!(decor_placed = placed, "village_map_painted");
    Ok(map)
}

/// 48x48 tree drawn once into the texture store.
pub(crate) fn ensure_tree_texture(textures: &mut TextureStore) {
    if textures.exists(TREE_TEXTURE) {
        return;
    }
    let size = TILE_SIZE * 3;
    let mut canvas = Canvas::new(size, size);
    let layers: [(i32, i32, i32, i32, Rgba); 5] = [
        (10, 6, 28, 26, rgb_hex(0x2f7d32)),
        (14, 10, 20, 18, rgb_hex(0x3b9b3c)),
        (8, 20, 32, 16, rgb_hex(0x265b2a)),
        (22, 30, 4, 12, rgb_hex(0x6b4b2a)),
        (12, 34, 24, 4, with_alpha(rgb_hex(0x000000), 26)),
    ];
    for (x, y, w, h, color) in layers {
        canvas.fill_rect(x, y, w, h, color);
    }
    textures.insert(TREE_TEXTURE, canvas.into_texture(size, size));
}

/// Image positions of the trees that do not stand in water.
pub(crate) fn tree_positions(map: &VillageMap) -> Vec<Vec2> {
    TREE_TILES
        .iter()
        .filter(|(x, y)| !map.ground_tile(*x, *y).is_some_and(is_water))
        .map(|(x, y)| {
            let center = tile_center(*x, *y);
            Vec2::new(center.x, center.y + 6.0)
        })
        .collect()
}

pub(crate) fn ensure_castle_texture(textures: &mut TextureStore) {
    if textures.exists(CASTLE_TEXTURE) {
        return;
    }
    let (width, height) = CASTLE_SIZE;
    let (w, h) = (width as i32, height as i32);
    let mut canvas = Canvas::new(width, height);

    canvas.fill_rect(0, 24, w, h - 24, rgb_hex(0xd2d6dd));
    canvas.fill_rect(8, 32, w - 16, h - 32, rgb_hex(0xb9bdc4));
    for x in (0..w).step_by(12) {
        canvas.fill_rect(x, 18, 8, 10, rgb_hex(0x9aa0aa));
    }

    canvas.fill_rect(w / 2 - 18, h - 40, 36, 40, rgb_hex(0xc6cbd3));
    canvas.fill_rect(w / 2 - 10, h - 26, 20, 26, rgb_hex(0x8e6a4c));
    canvas.fill_rect(w / 2 - 6, h - 22, 12, 22, rgb_hex(0x6f4d35));

    let window = rgb_hex(0x7d8591);
    for x in [14, w - 24, w / 2 - 5] {
        canvas.fill_rect(x, 44, 10, 10, window);
    }

    for y in (32..h - 8).step_by(10) {
        canvas.stroke_horizontal(8, w - 8, y, rgb_hex(0xa2a7b0));
    }

    textures.insert(CASTLE_TEXTURE, canvas.into_texture(width, height));
}

/// Castle image anchor (top-center of the image) and its solid footprint in
/// frame pixels from the image's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CastlePlacement {
    pub(crate) position: Vec2,
    pub(crate) depth: f32,
    pub(crate) footprint: Rect,
}

pub(crate) fn castle_placement() -> CastlePlacement {
    let anchor = tile_center(CASTLE_TILE.0, CASTLE_TILE.1);
    CastlePlacement {
        position: Vec2::new(anchor.x, anchor.y + 24.0),
        depth: anchor.y + 30.0,
        footprint: Rect::new(
            CASTLE_FOOTPRINT_OFFSET.x,
            CASTLE_FOOTPRINT_OFFSET.y,
            CASTLE_FOOTPRINT.x,
            CASTLE_FOOTPRINT.y,
        ),
    }
}
