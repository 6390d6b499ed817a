use std::collections::HashSet;

use thiserror::Error;

use super::geometry::{Rect, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TilemapError {
    #[error("tilemap dimensions must be non-zero: {width}x{height} tiles of {tile_size}px")]
    ZeroSize {
        width: u32,
        height: u32,
        tile_size: u32,
    },
    #[error("tile layer '{name}' already exists")]
    DuplicateLayer { name: String },
}

/// One grid of tile indices. Cells may be empty.
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    name: String,
    width: u32,
    height: u32,
    depth: f32,
    tiles: Vec<Option<u16>>,
    colliding: HashSet<u16>,
}

impl TileLayer {
    fn blank(name: &str, width: u32, height: u32, depth: f32) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
            depth,
            tiles: vec![None; width as usize * height as usize],
            colliding: HashSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn tile_at(&self, x: i32, y: i32) -> Option<u16> {
        self.index_of(x, y).and_then(|index| self.tiles[index])
    }

    /// Writes `tile` at (x, y). Out-of-bounds writes are dropped.
    pub fn put_tile_at(&mut self, tile: u16, x: i32, y: i32) -> bool {
        match self.index_of(x, y) {
            Some(index) => {
                self.tiles[index] = Some(tile);
                true
            }
            None => false,
        }
    }

    pub fn set_collision(&mut self, indices: &[u16]) {
        self.colliding.extend(indices.iter().copied());
    }

    pub fn is_solid_at(&self, x: i32, y: i32) -> bool {
        self.tile_at(x, y)
            .is_some_and(|tile| self.colliding.contains(&tile))
    }

    pub fn has_collision(&self) -> bool {
        !self.colliding.is_empty()
    }

    /// Occupied cells in row-major order.
    pub fn iter_tiles(&self) -> impl Iterator<Item = (u32, u32, u16)> + '_ {
        let width = self.width;
        self.tiles.iter().enumerate().filter_map(move |(index, tile)| {
            tile.map(|tile| (index as u32 % width, index as u32 / width, tile))
        })
    }
}

/// Layered orthogonal tilemap. Tile (0,0) has its top-left corner at the
/// world origin and the world is y-down.
#[derive(Debug, Clone, PartialEq)]
pub struct Tilemap {
    width: u32,
    height: u32,
    tile_size: u32,
    tileset_key: String,
    layers: Vec<TileLayer>,
}

impl Tilemap {
    pub fn new(
        width: u32,
        height: u32,
        tile_size: u32,
        tileset_key: &str,
    ) -> Result<Self, TilemapError> {
        if width == 0 || height == 0 || tile_size == 0 {
            return Err(TilemapError::ZeroSize {
                width,
                height,
                tile_size,
            });
        }
        Ok(Self {
            width,
            height,
            tile_size,
            tileset_key: tileset_key.to_string(),
            layers: Vec::new(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn tileset_key(&self) -> &str {
        &self.tileset_key
    }

    pub fn world_size(&self) -> Vec2 {
        Vec2 {
            x: (self.width * self.tile_size) as f32,
            y: (self.height * self.tile_size) as f32,
        }
    }

    pub fn create_blank_layer(&mut self, name: &str, depth: f32) -> Result<LayerId, TilemapError> {
        if self.layers.iter().any(|layer| layer.name == name) {
            return Err(TilemapError::DuplicateLayer {
                name: name.to_string(),
            });
        }
        self.layers
            .push(TileLayer::blank(name, self.width, self.height, depth));
        Ok(LayerId(self.layers.len() - 1))
    }

    pub fn layer(&self, id: LayerId) -> Option<&TileLayer> {
        self.layers.get(id.0)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut TileLayer> {
        self.layers.get_mut(id.0)
    }

    pub fn layer_by_name(&self, name: &str) -> Option<LayerId> {
        self.layers
            .iter()
            .position(|layer| layer.name == name)
            .map(LayerId)
    }

    pub fn layers(&self) -> &[TileLayer] {
        &self.layers
    }

    /// World position of the center of tile (x, y). Accepts coordinates
    /// outside the grid.
    pub fn tile_to_world_center(&self, x: i32, y: i32) -> Vec2 {
        let size = self.tile_size as f32;
        Vec2 {
            x: x as f32 * size + size * 0.5,
            y: y as f32 * size + size * 0.5,
        }
    }

    pub fn world_to_tile(&self, position: Vec2) -> (i32, i32) {
        let size = self.tile_size as f32;
        (
            (position.x / size).floor() as i32,
            (position.y / size).floor() as i32,
        )
    }

    /// World rectangles of solid tiles on `layer` that overlap `area`.
    pub fn solid_tiles_overlapping(&self, layer: LayerId, area: &Rect) -> Vec<Rect> {
        let Some(tile_layer) = self.layer(layer) else {
            return Vec::new();
        };
        if !tile_layer.has_collision() {
            return Vec::new();
        }
        let size = self.tile_size as f32;
        let min_x = (area.x / size).floor() as i32;
        let min_y = (area.y / size).floor() as i32;
        let max_x = ((area.right() - f32::EPSILON) / size).floor() as i32;
        let max_y = ((area.bottom() - f32::EPSILON) / size).floor() as i32;

        let mut solids = Vec::new();
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                if tile_layer.is_solid_at(x, y) {
                    let rect = Rect::new(x as f32 * size, y as f32 * size, size, size);
                    if rect.intersects(area) {
                        solids.push(rect);
                    }
                }
            }
        }
        solids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_map() -> Tilemap {
        Tilemap::new(8, 6, 16, "tiles").expect("tilemap")
    }

    #[test]
    fn zero_sized_map_is_rejected() {
        assert!(matches!(
            Tilemap::new(0, 4, 16, "tiles"),
            Err(TilemapError::ZeroSize { .. })
        ));
    }

    #[test]
    fn duplicate_layer_names_are_rejected() {
        let mut map = make_map();
        map.create_blank_layer("ground", 0.0).expect("ground");
        assert_eq!(
            map.create_blank_layer("ground", 1.0),
            Err(TilemapError::DuplicateLayer {
                name: "ground".to_string()
            })
        );
    }

    #[test]
    fn put_and_read_tiles_with_bounds_checks() {
        let mut map = make_map();
        let ground = map.create_blank_layer("ground", 0.0).expect("ground");
        let layer = map.layer_mut(ground).expect("layer");
        assert_eq!(layer.tile_at(1, 1), None);
        assert!(layer.put_tile_at(5, 1, 1));
        assert!(!layer.put_tile_at(5, 8, 0));
        assert!(!layer.put_tile_at(5, -1, 0));
        assert_eq!(layer.tile_at(1, 1), Some(5));
        assert_eq!(layer.iter_tiles().collect::<Vec<_>>(), vec![(1, 1, 5)]);
    }

    #[test]
    fn tile_centers_follow_tile_size() {
        let map = make_map();
        assert_eq!(map.tile_to_world_center(10, 18), Vec2::new(168.0, 296.0));
        assert_eq!(map.tile_to_world_center(10, -2), Vec2::new(168.0, -24.0));
        assert_eq!(map.world_to_tile(Vec2::new(168.0, 296.0)), (10, 18));
    }

    #[test]
    fn solid_tile_query_only_returns_colliding_indices() {
        let mut map = make_map();
        let ground = map.create_blank_layer("ground", 0.0).expect("ground");
        {
            let layer = map.layer_mut(ground).expect("layer");
            layer.put_tile_at(5, 2, 2);
            layer.put_tile_at(1, 3, 2);
            layer.set_collision(&[5, 6]);
        }
        let area = Rect::new(20.0, 20.0, 40.0, 20.0);
        let solids = map.solid_tiles_overlapping(ground, &area);
        assert_eq!(solids, vec![Rect::new(32.0, 32.0, 16.0, 16.0)]);
    }

    #[test]
    fn area_touching_tile_edge_is_not_blocked() {
        let mut map = make_map();
        let ground = map.create_blank_layer("ground", 0.0).expect("ground");
        {
            let layer = map.layer_mut(ground).expect("layer");
            layer.put_tile_at(5, 2, 2);
            layer.set_collision(&[5]);
        }
        let area = Rect::new(16.0, 32.0, 16.0, 16.0);
        assert!(map.solid_tiles_overlapping(ground, &area).is_empty());
    }
}
