//! ColliderScene — встроенный collision oracle (spheres + AABB)
//!
//! Используется headless симуляцией и тестами, когда внешнего physics
//! движка нет. Семантика как у engine raycast: ближайший hit, коллайдер
//! с origin внутри не репортится.

use bevy::prelude::*;

use crate::ballistics::oracle::{ColliderId, CollisionOracle, RayHit};
use crate::ballistics::profile::HitMask;
use crate::error::OracleError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    Sphere { center: Vec3, radius: f32 },
    Aabb { min: Vec3, max: Vec3 },
}

impl ColliderShape {
    /// Box по центру и половинам размеров
    pub fn cuboid(center: Vec3, half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        ColliderShape::Aabb {
            min: center - half,
            max: center + half,
        }
    }

    /// (t, normal) первого входа луча в shape
    fn intersect(&self, origin: Vec3, direction: Vec3) -> Option<(f32, Vec3)> {
        match *self {
            ColliderShape::Sphere { center, radius } => {
                let offset = origin - center;
                let c = offset.length_squared() - radius * radius;
                if c <= 0.0 {
                    return None; // origin внутри
                }
                let b = offset.dot(direction);
                if b > 0.0 {
                    return None; // летим от сферы
                }
                let discriminant = b * b - c;
                if discriminant < 0.0 {
                    return None;
                }
                let t = -b - discriminant.sqrt();
                let point = origin + direction * t;
                Some((t, (point - center).normalize_or_zero()))
            }
            ColliderShape::Aabb { min, max } => {
                let inside = origin.cmpgt(min).all() && origin.cmplt(max).all();
                if inside {
                    return None;
                }

                let mut t_enter = f32::NEG_INFINITY;
                let mut t_exit = f32::INFINITY;
                let mut enter_axis = 0usize;

                for axis in 0..3 {
                    let o = origin[axis];
                    let d = direction[axis];
                    if d.abs() < f32::EPSILON {
                        if o < min[axis] || o > max[axis] {
                            return None;
                        }
                        continue;
                    }
                    let mut t0 = (min[axis] - o) / d;
                    let mut t1 = (max[axis] - o) / d;
                    if t0 > t1 {
                        std::mem::swap(&mut t0, &mut t1);
                    }
                    if t0 > t_enter {
                        t_enter = t0;
                        enter_axis = axis;
                    }
                    t_exit = t_exit.min(t1);
                    if t_enter > t_exit {
                        return None;
                    }
                }

                if t_enter < 0.0 || !t_enter.is_finite() {
                    return None;
                }

                let mut normal = Vec3::ZERO;
                normal[enter_axis] = -direction[enter_axis].signum();
                Some((t_enter, normal))
            }
        }
    }
}

/// Коллайдер сцены
#[derive(Debug, Clone)]
pub struct SceneCollider {
    pub shape: ColliderShape,
    pub layers: HitMask,
    pub target: Option<Entity>,
    pub tag: Option<String>,
}

impl SceneCollider {
    pub fn new(shape: ColliderShape) -> Self {
        Self {
            shape,
            layers: HitMask::layer(0),
            target: None,
            tag: None,
        }
    }

    pub fn sphere(center: Vec3, radius: f32) -> Self {
        Self::new(ColliderShape::Sphere { center, radius })
    }

    pub fn cuboid(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(ColliderShape::cuboid(center, half_extents))
    }

    pub fn on_layers(mut self, layers: HitMask) -> Self {
        self.layers = layers;
        self
    }

    pub fn owned_by(mut self, target: Entity) -> Self {
        self.target = Some(target);
        self
    }

    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

/// Набор коллайдеров мира (Resource)
#[derive(Resource, Debug, Default, Clone)]
pub struct ColliderScene {
    colliders: Vec<(ColliderId, SceneCollider)>,
    next_id: u32,
}

impl ColliderScene {
    pub fn insert(&mut self, collider: SceneCollider) -> ColliderId {
        let id = ColliderId(self.next_id);
        self.next_id += 1;
        self.colliders.push((id, collider));
        id
    }

    pub fn remove(&mut self, id: ColliderId) -> Option<SceneCollider> {
        let index = self.colliders.iter().position(|(existing, _)| *existing == id)?;
        Some(self.colliders.remove(index).1)
    }

    /// Удалить все коллайдеры entity (despawn)
    pub fn remove_owned_by(&mut self, target: Entity) {
        self.colliders
            .retain(|(_, collider)| collider.target != Some(target));
    }

    pub fn get(&self, id: ColliderId) -> Option<&SceneCollider> {
        self.colliders
            .iter()
            .find(|(existing, _)| *existing == id)
            .map(|(_, collider)| collider)
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }
}

impl CollisionOracle for ColliderScene {
    fn raycast(
        &self,
        origin: Vec3,
        direction: Dir3,
        max_distance: f32,
        mask: HitMask,
    ) -> Result<Option<RayHit>, OracleError> {
        if max_distance <= 0.0 {
            return Ok(None);
        }

        let dir = Vec3::from(direction);
        let nearest = self
            .colliders
            .iter()
            .filter(|(_, collider)| collider.layers.intersects(mask))
            .filter_map(|(id, collider)| {
                let (t, normal) = collider.shape.intersect(origin, dir)?;
                (t <= max_distance).then_some((t, normal, *id, collider.target))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0));

        Ok(nearest.map(|(distance, normal, collider, target)| RayHit {
            point: origin + dir * distance,
            normal,
            distance,
            collider,
            target,
        }))
    }

    fn collider_tag(&self, collider: ColliderId) -> Result<Option<&str>, OracleError> {
        self.get(collider)
            .map(|found| found.tag.as_deref())
            .ok_or(OracleError::UnknownCollider(collider.0))
    }
}
