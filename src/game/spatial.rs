//! Spatial queries against the ground-plane world
//!
//! `SpatialQuery` is the capability every AI component is handed. `World` is
//! the in-memory implementation: circles and axis-aligned boxes on layers,
//! bucketed into a uniform hash grid so ray and overlap queries only visit
//! the cells they touch.
//!
//! Casts ignore colliders that contain the cast origin, so an agent never
//! hits its own body.

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::ops::BitOr;

use crate::game::constants::world::{GRID_CELL_SIZE, MAX_INDEXED_CELLS};
use crate::util::vec2::Vec2;

/// Grid cell key - (x, z) cell coordinates
pub type CellKey = (i32, i32);

/// Collision layer of a collider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Ground,
    Wall,
    Obstacle,
    Player,
    Enemy,
    Breakable,
}

impl Layer {
    #[inline]
    pub fn bit(self) -> u32 {
        match self {
            Layer::Ground => 1 << 0,
            Layer::Wall => 1 << 1,
            Layer::Obstacle => 1 << 2,
            Layer::Player => 1 << 3,
            Layer::Enemy => 1 << 4,
            Layer::Breakable => 1 << 5,
        }
    }
}

/// Set of layers a query considers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LayerMask(u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const GROUND: LayerMask = LayerMask(1 << 0);
    pub const WALL: LayerMask = LayerMask(1 << 1);
    pub const OBSTACLE: LayerMask = LayerMask(1 << 2);
    pub const PLAYER: LayerMask = LayerMask(1 << 3);
    pub const ENEMY: LayerMask = LayerMask(1 << 4);
    pub const BREAKABLE: LayerMask = LayerMask(1 << 5);
    /// Geometry that blocks sight
    pub const SIGHT_BLOCKERS: LayerMask = LayerMask((1 << 1) | (1 << 2));

    #[inline]
    pub fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn contains(self, layer: Layer) -> bool {
        self.0 & layer.bit() != 0
    }
}

impl From<Layer> for LayerMask {
    fn from(layer: Layer) -> Self {
        LayerMask(layer.bit())
    }
}

impl BitOr for LayerMask {
    type Output = LayerMask;
    fn bitor(self, rhs: Self) -> Self {
        LayerMask(self.0 | rhs.0)
    }
}

/// Classification of a collider's owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    Player,
    Enemy,
    Breakable,
    Projectile,
    #[default]
    Untagged,
}

/// Collider handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderId(pub u64);

/// Collider geometry on the ground plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Circle { center: Vec2, radius: f32 },
    Rect { min: Vec2, max: Vec2 },
}

impl Shape {
    pub fn bounds(&self) -> (Vec2, Vec2) {
        match *self {
            Shape::Circle { center, radius } => (
                center - Vec2::new(radius, radius),
                center + Vec2::new(radius, radius),
            ),
            Shape::Rect { min, max } => (min, max),
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        match *self {
            Shape::Circle { center, radius } => point.distance_sq_to(center) <= radius * radius,
            Shape::Rect { min, max } => {
                point.x >= min.x && point.x <= max.x && point.z >= min.z && point.z <= max.z
            }
        }
    }

    /// Minkowski-inflated shape used for sphere casts
    fn inflated(&self, by: f32) -> Shape {
        match *self {
            Shape::Circle { center, radius } => Shape::Circle {
                center,
                radius: radius + by,
            },
            Shape::Rect { min, max } => Shape::Rect {
                min: min - Vec2::new(by, by),
                max: max + Vec2::new(by, by),
            },
        }
    }

    fn overlaps_circle(&self, center: Vec2, radius: f32) -> bool {
        match *self {
            Shape::Circle { center: c, radius: r } => {
                let reach = r + radius;
                c.distance_sq_to(center) <= reach * reach
            }
            Shape::Rect { min, max } => {
                let closest = center.max(min).min(max);
                closest.distance_sq_to(center) <= radius * radius
            }
        }
    }

    /// Entry distance of a unit ray, `None` on a miss or when the origin is
    /// already inside the shape
    fn ray_entry(&self, origin: Vec2, dir: Vec2, max_distance: f32) -> Option<f32> {
        if self.contains(origin) {
            return None;
        }
        let t = match *self {
            Shape::Circle { center, radius } => {
                let m = origin - center;
                let b = m.dot(dir);
                let c = m.length_sq() - radius * radius;
                if c > 0.0 && b > 0.0 {
                    return None;
                }
                let disc = b * b - c;
                if disc < 0.0 {
                    return None;
                }
                -b - disc.sqrt()
            }
            Shape::Rect { min, max } => {
                let mut t_min = 0.0_f32;
                let mut t_max = max_distance;
                for (o, d, lo, hi) in [
                    (origin.x, dir.x, min.x, max.x),
                    (origin.z, dir.z, min.z, max.z),
                ] {
                    if d.abs() < f32::EPSILON {
                        if o < lo || o > hi {
                            return None;
                        }
                    } else {
                        let inv = 1.0 / d;
                        let mut t1 = (lo - o) * inv;
                        let mut t2 = (hi - o) * inv;
                        if t1 > t2 {
                            std::mem::swap(&mut t1, &mut t2);
                        }
                        t_min = t_min.max(t1);
                        t_max = t_max.min(t2);
                        if t_min > t_max {
                            return None;
                        }
                    }
                }
                t_min
            }
        };
        (t >= 0.0 && t <= max_distance).then_some(t)
    }
}

/// A collider registered in the world
#[derive(Debug, Clone, Copy)]
pub struct Collider {
    pub id: ColliderId,
    pub shape: Shape,
    pub layer: Layer,
    pub tag: Tag,
}

/// First hit of a ray or sphere cast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub collider: ColliderId,
    pub layer: Layer,
    pub point: Vec2,
    pub distance: f32,
}

/// Spatial query capability injected into every AI component
pub trait SpatialQuery {
    /// First collider on `mask` along the ray, within `max_distance`
    fn raycast(&self, origin: Vec2, direction: Vec2, max_distance: f32, mask: LayerMask) -> Option<RayHit>;

    /// Colliders on `mask` overlapping the sphere
    fn overlap_sphere(&self, center: Vec2, radius: f32, mask: LayerMask) -> Vec<ColliderId>;

    /// First collider on `mask` swept by a sphere of `radius` along the ray
    fn sphere_cast(
        &self,
        origin: Vec2,
        radius: f32,
        direction: Vec2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit>;

    /// Downward probe starting `height` above `point`; returns the distance
    /// travelled to the ground if it is reached within `max_distance`
    fn ground_probe(&self, point: Vec2, height: f32, max_distance: f32, mask: LayerMask) -> Option<f32>;

    /// Classification of a collider's owner
    fn classify(&self, collider: ColliderId) -> Option<Tag>;
}

/// In-memory world with a spatial hash grid broadphase
#[derive(Debug, Clone)]
pub struct World {
    /// Inverse cell size for fast position-to-cell conversion
    inv_cell_size: f32,
    colliders: HashMap<ColliderId, Collider>,
    /// Map from cell key to colliders whose bounds touch that cell
    cells: HashMap<CellKey, SmallVec<[ColliderId; 4]>>,
    /// Colliders too big to bucket; every query checks them directly
    large: Vec<ColliderId>,
    next_id: u64,
}

impl World {
    pub fn new(cell_size: f32) -> Self {
        Self {
            inv_cell_size: 1.0 / cell_size,
            colliders: HashMap::new(),
            cells: HashMap::new(),
            large: Vec::new(),
            next_id: 1,
        }
    }

    /// Convert world position to cell key
    #[inline]
    fn position_to_cell(&self, position: Vec2) -> CellKey {
        (
            (position.x * self.inv_cell_size).floor() as i32,
            (position.z * self.inv_cell_size).floor() as i32,
        )
    }

    fn cells_covering(&self, min: Vec2, max: Vec2) -> impl Iterator<Item = CellKey> {
        let (x0, z0) = self.position_to_cell(min);
        let (x1, z1) = self.position_to_cell(max);
        (x0..=x1).flat_map(move |x| (z0..=z1).map(move |z| (x, z)))
    }

    /// Number of grid cells the box touches, saturating
    fn cell_count(&self, min: Vec2, max: Vec2) -> u64 {
        let (x0, z0) = self.position_to_cell(min);
        let (x1, z1) = self.position_to_cell(max);
        let span = |lo: i32, hi: i32| (i64::from(hi) - i64::from(lo) + 1).max(0) as u64;
        span(x0, x1).saturating_mul(span(z0, z1))
    }

    fn is_large(&self, min: Vec2, max: Vec2) -> bool {
        self.cell_count(min, max) > MAX_INDEXED_CELLS
    }

    fn index(&mut self, collider: &Collider) {
        let (min, max) = collider.shape.bounds();
        if self.is_large(min, max) {
            self.large.push(collider.id);
            return;
        }
        let keys: Vec<CellKey> = self.cells_covering(min, max).collect();
        for key in keys {
            self.cells.entry(key).or_default().push(collider.id);
        }
    }

    fn unindex(&mut self, collider: &Collider) {
        if let Some(idx) = self.large.iter().position(|&id| id == collider.id) {
            self.large.swap_remove(idx);
            return;
        }
        let (min, max) = collider.shape.bounds();
        let keys: Vec<CellKey> = self.cells_covering(min, max).collect();
        for key in keys {
            if let Some(cell) = self.cells.get_mut(&key) {
                if let Some(idx) = cell.iter().position(|&id| id == collider.id) {
                    cell.swap_remove(idx);
                }
            }
        }
    }

    /// Register a collider and return its handle
    pub fn insert(&mut self, shape: Shape, layer: Layer, tag: Tag) -> ColliderId {
        let id = ColliderId(self.next_id);
        self.next_id += 1;
        let collider = Collider { id, shape, layer, tag };
        self.index(&collider);
        self.colliders.insert(id, collider);
        id
    }

    /// Remove a collider. Returns true if it was present.
    pub fn remove(&mut self, id: ColliderId) -> bool {
        match self.colliders.remove(&id) {
            Some(collider) => {
                self.unindex(&collider);
                true
            }
            None => false,
        }
    }

    /// Move a collider so its center sits at `position`
    pub fn set_position(&mut self, id: ColliderId, position: Vec2) -> bool {
        let Some(collider) = self.colliders.get(&id).copied() else {
            return false;
        };
        self.unindex(&collider);
        let shape = match collider.shape {
            Shape::Circle { radius, .. } => Shape::Circle {
                center: position,
                radius,
            },
            Shape::Rect { min, max } => {
                let half = (max - min) * 0.5;
                Shape::Rect {
                    min: position - half,
                    max: position + half,
                }
            }
        };
        let moved = Collider { shape, ..collider };
        self.index(&moved);
        self.colliders.insert(id, moved);
        true
    }

    pub fn get(&self, id: ColliderId) -> Option<&Collider> {
        self.colliders.get(&id)
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Colliders on `mask` whose cells intersect the box, deduplicated.
    /// Boxes too big for the grid fall back to a scan of every collider.
    fn broadphase(&self, min: Vec2, max: Vec2, mask: LayerMask) -> Vec<&Collider> {
        if self.is_large(min, max) {
            return self
                .colliders
                .values()
                .filter(|collider| mask.contains(collider.layer))
                .collect();
        }

        let mut seen: HashSet<ColliderId> = HashSet::new();
        let mut found = Vec::new();
        let bucketed = self
            .cells_covering(min, max)
            .filter_map(|key| self.cells.get(&key))
            .flatten();
        for id in self.large.iter().chain(bucketed) {
            if !seen.insert(*id) {
                continue;
            }
            if let Some(collider) = self.colliders.get(id) {
                if mask.contains(collider.layer) {
                    found.push(collider);
                }
            }
        }
        found
    }

    fn cast(
        &self,
        origin: Vec2,
        inflate: f32,
        direction: Vec2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit> {
        let dir = direction.normalize();
        if dir == Vec2::ZERO || max_distance <= 0.0 {
            return None;
        }
        let end = origin + dir * max_distance;
        let pad = Vec2::new(inflate, inflate);
        let min = origin.min(end) - pad;
        let max = origin.max(end) + pad;

        self.broadphase(min, max, mask)
            .into_iter()
            .filter_map(|collider| {
                let shape = if inflate > 0.0 {
                    collider.shape.inflated(inflate)
                } else {
                    collider.shape
                };
                shape.ray_entry(origin, dir, max_distance).map(|t| RayHit {
                    collider: collider.id,
                    layer: collider.layer,
                    point: origin + dir * t,
                    distance: t,
                })
            })
            .min_by(|a, b| {
                a.distance
                    .partial_cmp(&b.distance)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.collider.cmp(&b.collider))
            })
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(GRID_CELL_SIZE)
    }
}

impl SpatialQuery for World {
    fn raycast(&self, origin: Vec2, direction: Vec2, max_distance: f32, mask: LayerMask) -> Option<RayHit> {
        self.cast(origin, 0.0, direction, max_distance, mask)
    }

    fn overlap_sphere(&self, center: Vec2, radius: f32, mask: LayerMask) -> Vec<ColliderId> {
        let pad = Vec2::new(radius, radius);
        let mut ids: Vec<ColliderId> = self
            .broadphase(center - pad, center + pad, mask)
            .into_iter()
            .filter(|collider| collider.shape.overlaps_circle(center, radius))
            .map(|collider| collider.id)
            .collect();
        ids.sort();
        ids
    }

    fn sphere_cast(
        &self,
        origin: Vec2,
        radius: f32,
        direction: Vec2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit> {
        self.cast(origin, radius.max(0.0), direction, max_distance, mask)
    }

    fn ground_probe(&self, point: Vec2, height: f32, max_distance: f32, mask: LayerMask) -> Option<f32> {
        // Ground is the y = 0 plane wherever a ground collider covers the point
        if height < 0.0 || height > max_distance {
            return None;
        }
        self.broadphase(point, point, mask)
            .into_iter()
            .any(|collider| collider.shape.contains(point))
            .then_some(height)
    }

    fn classify(&self, collider: ColliderId) -> Option<Tag> {
        self.colliders.get(&collider).map(|c| c.tag)
    }
}
