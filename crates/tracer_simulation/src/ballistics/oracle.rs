//! Collision oracle — внешний raycast движок за trait'ом
//!
//! Ballistics не знает, чем реализован raycast (rapier, engine physics,
//! `ColliderScene`). Контракт: один ближайший hit на вызов.

use bevy::prelude::*;

use crate::ballistics::profile::HitMask;
use crate::error::OracleError;

/// Opaque handle коллайдера
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderId(pub u32);

/// Результат raycast (ближайшее пересечение)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    pub normal: Vec3,
    /// Дистанция от origin этого луча
    pub distance: f32,
    pub collider: ColliderId,
    /// Entity-владелец коллайдера (`None` для статичной геометрии)
    pub target: Option<Entity>,
}

pub trait CollisionOracle {
    /// Ближайший hit вдоль луча в пределах `max_distance`, фильтр по `mask`.
    ///
    /// Коллайдеры, внутри которых стартует луч, не репортятся.
    fn raycast(
        &self,
        origin: Vec3,
        direction: Dir3,
        max_distance: f32,
        mask: HitMask,
    ) -> Result<Option<RayHit>, OracleError>;

    /// Тег коллайдера (для headshot predicate)
    fn collider_tag(&self, collider: ColliderId) -> Result<Option<&str>, OracleError>;
}

/// Oracle без collision мира: каждый запрос = `Unavailable`
///
/// Подставляется, когда в мире нет collision сцены; resolver деградирует
/// такие выстрелы до miss.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableOracle;

impl CollisionOracle for UnavailableOracle {
    fn raycast(
        &self,
        _origin: Vec3,
        _direction: Dir3,
        _max_distance: f32,
        _mask: HitMask,
    ) -> Result<Option<RayHit>, OracleError> {
        Err(OracleError::Unavailable)
    }

    fn collider_tag(&self, _collider: ColliderId) -> Result<Option<&str>, OracleError> {
        Err(OracleError::Unavailable)
    }
}
