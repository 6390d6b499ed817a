use std::collections::BTreeMap;

use super::geometry::{Rect, Vec2};
use super::sprite::SpriteId;
use super::tilemap::{LayerId, Tilemap};

/// Body shape and motion parameters. `offset` is the body's top-left corner
/// relative to the owning sprite's position, in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub size: Vec2,
    pub offset: Vec2,
    /// Linear deceleration in units/s² applied every step.
    pub drag: f32,
    pub max_velocity: Option<f32>,
    pub collide_world_bounds: bool,
    pub is_static: bool,
}

impl Default for BodyDesc {
    fn default() -> Self {
        Self {
            size: Vec2::new(16.0, 16.0),
            offset: Vec2::new(-8.0, -8.0),
            drag: 0.0,
            max_velocity: None,
            collide_world_bounds: false,
            is_static: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    desc: BodyDesc,
    position: Vec2,
    velocity: Vec2,
    enabled: bool,
}

impl Body {
    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn desc(&self) -> &BodyDesc {
        &self.desc
    }

    pub fn rect(&self) -> Rect {
        Rect::new(
            self.position.x + self.desc.offset.x,
            self.position.y + self.desc.offset.y,
            self.desc.size.x,
            self.desc.size.y,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColliderTarget {
    TileLayer(LayerId),
    /// The other body acts as an immovable obstacle.
    Body(SpriteId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Collider {
    body: SpriteId,
    target: ColliderTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

/// Arcade-style AABB world: velocities integrate per axis and are resolved
/// against registered obstacles after each axis move.
#[derive(Debug, Default)]
pub struct PhysicsWorld {
    bodies: BTreeMap<SpriteId, Body>,
    colliders: Vec<Collider>,
    bounds: Option<Rect>,
    paused: bool,
}

impl PhysicsWorld {
    pub fn add_body(&mut self, id: SpriteId, desc: BodyDesc, position: Vec2) {
        self.bodies.insert(
            id,
            Body {
                desc,
                position,
                velocity: Vec2::ZERO,
                enabled: true,
            },
        );
    }

    pub fn remove_body(&mut self, id: SpriteId) {
        self.bodies.remove(&id);
        self.colliders.retain(|collider| {
            collider.body != id && collider.target != ColliderTarget::Body(id)
        });
    }

    pub fn body(&self, id: SpriteId) -> Option<&Body> {
        self.bodies.get(&id)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn set_velocity(&mut self, id: SpriteId, velocity: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id) {
            if !body.desc.is_static {
                body.velocity = velocity;
            }
        }
    }

    pub fn set_enabled(&mut self, id: SpriteId, enabled: bool) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.enabled = enabled;
        }
    }

    pub fn set_position(&mut self, id: SpriteId, position: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.position = position;
        }
    }

    pub fn add_collider(&mut self, body: SpriteId, target: ColliderTarget) {
        let collider = Collider { body, target };
        if !self.colliders.contains(&collider) {
            self.colliders.push(collider);
        }
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = Some(bounds);
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
        self.colliders.clear();
        self.bounds = None;
        self.paused = false;
    }

    pub fn bodies(&self) -> impl Iterator<Item = (SpriteId, &Body)> {
        self.bodies.iter().map(|(id, body)| (*id, body))
    }

    pub fn step(&mut self, dt_seconds: f32, tilemap: Option<&Tilemap>) {
        if self.paused || dt_seconds <= 0.0 {
            return;
        }
        let ids: Vec<SpriteId> = self.bodies.keys().copied().collect();
        for id in ids {
            let obstacles = self.obstacles_for(id);
            let Some(body) = self.bodies.get_mut(&id) else {
                continue;
            };
            if !body.enabled || body.desc.is_static {
                continue;
            }

            body.velocity.x = apply_drag(body.velocity.x, body.desc.drag, dt_seconds);
            body.velocity.y = apply_drag(body.velocity.y, body.desc.drag, dt_seconds);
            if let Some(max) = body.desc.max_velocity {
                body.velocity.x = body.velocity.x.clamp(-max, max);
                body.velocity.y = body.velocity.y.clamp(-max, max);
            }

            let delta = body.velocity * dt_seconds;
            body.position.x += delta.x;
            resolve_axis(body, Axis::X, delta.x, &obstacles, tilemap);
            body.position.y += delta.y;
            resolve_axis(body, Axis::Y, delta.y, &obstacles, tilemap);

            if body.desc.collide_world_bounds {
                if let Some(bounds) = self.bounds {
                    clamp_to_bounds(body, bounds);
                }
            }
        }
    }

    fn obstacles_for(&self, id: SpriteId) -> Vec<Obstacle> {
        self.colliders
            .iter()
            .filter(|collider| collider.body == id)
            .filter_map(|collider| match collider.target {
                ColliderTarget::TileLayer(layer) => Some(Obstacle::Tiles(layer)),
                ColliderTarget::Body(other) => self
                    .bodies
                    .get(&other)
                    .filter(|body| body.enabled)
                    .map(|body| Obstacle::Rect(body.rect())),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
enum Obstacle {
    Tiles(LayerId),
    Rect(Rect),
}

fn apply_drag(velocity: f32, drag: f32, dt_seconds: f32) -> f32 {
    if drag <= 0.0 || velocity == 0.0 {
        return velocity;
    }
    let reduced = velocity.abs() - drag * dt_seconds;
    if reduced <= 0.0 {
        0.0
    } else {
        reduced.copysign(velocity)
    }
}

fn resolve_axis(
    body: &mut Body,
    axis: Axis,
    moved: f32,
    obstacles: &[Obstacle],
    tilemap: Option<&Tilemap>,
) {
    if moved == 0.0 {
        return;
    }
    let rect = body.rect();
    let mut blockers = Vec::new();
    for obstacle in obstacles {
        match *obstacle {
            Obstacle::Tiles(layer) => {
                if let Some(map) = tilemap {
                    blockers.extend(map.solid_tiles_overlapping(layer, &rect));
                }
            }
            Obstacle::Rect(other) => {
                if other.intersects(&rect) {
                    blockers.push(other);
                }
            }
        }
    }
    if blockers.is_empty() {
        return;
    }

    match axis {
        Axis::X => {
            let edge = if moved > 0.0 {
                blockers.iter().map(|b| b.x).fold(f32::INFINITY, f32::min) - rect.width
            } else {
                blockers.iter().map(|b| b.right()).fold(f32::NEG_INFINITY, f32::max)
            };
            body.position.x += edge - rect.x;
            body.velocity.x = 0.0;
        }
        Axis::Y => {
            let edge = if moved > 0.0 {
                blockers.iter().map(|b| b.y).fold(f32::INFINITY, f32::min) - rect.height
            } else {
                blockers.iter().map(|b| b.bottom()).fold(f32::NEG_INFINITY, f32::max)
            };
            body.position.y += edge - rect.y;
            body.velocity.y = 0.0;
        }
    }
}

fn clamp_to_bounds(body: &mut Body, bounds: Rect) {
    let rect = body.rect();
    if rect.x < bounds.x {
        body.position.x += bounds.x - rect.x;
        body.velocity.x = 0.0;
    } else if rect.right() > bounds.right() {
        body.position.x -= rect.right() - bounds.right();
        body.velocity.x = 0.0;
    }
    if rect.y < bounds.y {
        body.position.y += bounds.y - rect.y;
        body.velocity.y = 0.0;
    } else if rect.bottom() > bounds.bottom() {
        body.position.y -= rect.bottom() - bounds.bottom();
        body.velocity.y = 0.0;
    }
}
