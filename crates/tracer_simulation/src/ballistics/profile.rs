//! Fire profiles (immutable shot configuration) + ShotContext
//!
//! Два варианта профиля под одним контрактом:
//! - **Hitscan**: мгновенный луч длиной `range`, falloff нормализован по range
//! - **Projectile** (caliber): симулируемая пуля с гравитацией, falloff в метрах
//!
//! Профиль иммутабелен и шарится через `Arc` между оружием и выстрелами.

use std::collections::HashMap;
use std::sync::Arc;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ballistics::curve::{DamageCurve, FalloffDomain};
use crate::ballistics::oracle::{ColliderId, CollisionOracle};
use crate::error::ConfigError;
use crate::logger::log_warning;

/// Collision layer bitset (фильтр для raycast)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HitMask(pub u32);

impl HitMask {
    pub const ALL: HitMask = HitMask(u32::MAX);
    pub const NONE: HitMask = HitMask(0);

    /// Маска одного слоя (0..32)
    pub const fn layer(index: u32) -> Self {
        HitMask(1 << (index % 32))
    }

    pub const fn union(self, other: HitMask) -> Self {
        HitMask(self.0 | other.0)
    }

    pub const fn intersects(self, other: HitMask) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn bits(self) -> u32 {
        self.0
    }
}

impl Default for HitMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Как распознать попадание в голову
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadshotRule {
    /// Headshot не распознаётся
    Never,
    /// Коллайдер помечен тегом (по умолчанию "Head")
    Tag(String),
}

impl Default for HeadshotRule {
    fn default() -> Self {
        HeadshotRule::Tag("Head".to_string())
    }
}

impl HeadshotRule {
    /// Headshot predicate: Collider → bool
    ///
    /// Сбой oracle (нет такого коллайдера, oracle недоступен) = не headshot.
    pub fn is_headshot(&self, oracle: &dyn CollisionOracle, collider: ColliderId) -> bool {
        let HeadshotRule::Tag(expected) = self else {
            return false;
        };

        match oracle.collider_tag(collider) {
            Ok(tag) => tag == Some(expected.as_str()),
            Err(err) => {
                log_warning(&format!("Headshot lookup failed for {:?}: {}", collider, err));
                false
            }
        }
    }
}

/// Режим полёта выстрела
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FlightModel {
    /// Мгновенный луч
    Hitscan {
        /// Максимальная дальность (метры)
        range: f32,
    },
    /// Симулируемая пуля
    Projectile {
        /// Начальная скорость (м/с)
        muzzle_speed: f32,
        /// Множитель гравитации (1 = обычная)
        gravity_multiplier: f32,
        /// Жёсткий дедлайн полёта (секунды)
        max_lifetime: f32,
    },
}

/// Fire profile — иммутабельная конфигурация выстрела
///
/// Инварианты (проверяются `validate`):
/// - `penetration_damage_multiplier ∈ [0, 1]`
/// - hitscan: `range > 0`; projectile: `muzzle_speed > 0`, `max_lifetime > 0`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireProfile {
    #[serde(default)]
    pub name: String,

    /// Базовый урон за попадание
    pub base_damage: f32,

    #[serde(default = "default_headshot_multiplier")]
    pub headshot_multiplier: f32,

    #[serde(default)]
    pub falloff: DamageCurve,

    pub flight: FlightModel,

    /// Сколько препятствий пуля может пробить (0 = без пробития)
    #[serde(default)]
    pub penetration_count: u32,

    /// Множитель урона после каждого пробития
    #[serde(default = "default_penetration_multiplier")]
    pub penetration_damage_multiplier: f32,

    #[serde(default)]
    pub hit_mask: HitMask,

    #[serde(default)]
    pub headshot: HeadshotRule,
}

fn default_headshot_multiplier() -> f32 {
    2.0
}

fn default_penetration_multiplier() -> f32 {
    0.5
}

impl FireProfile {
    /// Hitscan винтовка: 25 урона, ×2 в голову, 100м, falloff 1.0 → 0.5
    pub fn rifle_hitscan() -> Self {
        Self {
            name: "rifle_hitscan".to_string(),
            base_damage: 25.0,
            headshot_multiplier: 2.0,
            falloff: DamageCurve::linear(0.0, 1.0, 1.0, 0.5),
            flight: FlightModel::Hitscan { range: 100.0 },
            penetration_count: 0,
            penetration_damage_multiplier: 0.5,
            hit_mask: HitMask::ALL,
            headshot: HeadshotRule::default(),
        }
    }

    /// 9x19mm: 360 м/с, обычная гравитация, 5с жизни, falloff до 0.5 на 100м
    pub fn pistol_caliber() -> Self {
        Self {
            name: "9x19mm".to_string(),
            base_damage: 25.0,
            headshot_multiplier: 2.0,
            falloff: DamageCurve::linear(0.0, 1.0, 100.0, 0.5),
            flight: FlightModel::Projectile {
                muzzle_speed: 360.0,
                gravity_multiplier: 1.0,
                max_lifetime: 5.0,
            },
            penetration_count: 0,
            penetration_damage_multiplier: 0.5,
            hit_mask: HitMask::ALL,
            headshot: HeadshotRule::default(),
        }
    }

    pub fn with_penetration(mut self, count: u32, damage_multiplier: f32) -> Self {
        self.penetration_count = count;
        self.penetration_damage_multiplier = damage_multiplier;
        self
    }

    pub fn with_falloff(mut self, falloff: DamageCurve) -> Self {
        self.falloff = falloff;
        self
    }

    pub fn with_hit_mask(mut self, hit_mask: HitMask) -> Self {
        self.hit_mask = hit_mask;
        self
    }

    pub fn is_hitscan(&self) -> bool {
        matches!(self.flight, FlightModel::Hitscan { .. })
    }

    /// Hitscan нормализует по range, projectile читает метры
    pub fn falloff_domain(&self) -> FalloffDomain {
        match self.flight {
            FlightModel::Hitscan { range } => FalloffDomain::NormalizedByRange(range),
            FlightModel::Projectile { .. } => FalloffDomain::AbsoluteMetres,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidProfile {
            profile: self.name.clone(),
            reason: reason.to_string(),
        };

        if !self.base_damage.is_finite() || self.base_damage < 0.0 {
            return Err(invalid("base_damage must be finite and >= 0"));
        }
        if !self.headshot_multiplier.is_finite() || self.headshot_multiplier < 0.0 {
            return Err(invalid("headshot_multiplier must be finite and >= 0"));
        }
        if !(0.0..=1.0).contains(&self.penetration_damage_multiplier) {
            return Err(invalid("penetration_damage_multiplier must be in [0, 1]"));
        }

        match self.flight {
            FlightModel::Hitscan { range } => {
                if !(range > 0.0 && range.is_finite()) {
                    return Err(invalid("hitscan range must be > 0"));
                }
            }
            FlightModel::Projectile {
                muzzle_speed,
                gravity_multiplier,
                max_lifetime,
            } => {
                if !(muzzle_speed > 0.0 && muzzle_speed.is_finite()) {
                    return Err(invalid("muzzle_speed must be > 0"));
                }
                if !gravity_multiplier.is_finite() {
                    return Err(invalid("gravity_multiplier must be finite"));
                }
                if !(max_lifetime > 0.0 && max_lifetime.is_finite()) {
                    return Err(invalid("max_lifetime must be > 0"));
                }
            }
        }

        self.falloff.validate()
    }
}

/// Номер выстрела стрелка (монотонный per attacker)
pub type ShotId = u64;

/// Уникальный id попадания: стрелок + его выстрел + порядковый номер hit
///
/// Номер выстрела считается per attacker, поэтому один и тот же выстрел
/// получает одинаковый id на server и на client, а выстрелы разных
/// стрелков не пересекаются.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HitId {
    pub attacker: u64,
    pub shot: ShotId,
    pub index: u32,
}

impl HitId {
    pub fn new(attacker: u64, shot: ShotId, index: u32) -> Self {
        Self {
            attacker,
            shot,
            index,
        }
    }
}

/// Контекст одного выстрела (эфемерный)
#[derive(Debug, Clone)]
pub struct ShotContext {
    pub shot: ShotId,
    pub origin: Vec3,
    /// Нормализованное направление (`None` если на вход пришёл нулевой вектор)
    pub direction: Option<Dir3>,
    pub attacker_id: u64,
    pub profile: Arc<FireProfile>,
}

impl ShotContext {
    pub fn new(
        shot: ShotId,
        origin: Vec3,
        direction: Vec3,
        attacker_id: u64,
        profile: Arc<FireProfile>,
    ) -> Self {
        Self {
            shot,
            origin,
            direction: Dir3::new(direction).ok(),
            attacker_id,
            profile,
        }
    }
}

/// Счётчики выстрелов per attacker
#[derive(Resource, Debug, Default, Clone)]
pub struct ShotSequence {
    per_attacker: HashMap<u64, ShotId>,
    total: u64,
}

impl ShotSequence {
    pub fn next_shot(&mut self, attacker_id: u64) -> ShotId {
        self.total += 1;
        let last = self.per_attacker.entry(attacker_id).or_default();
        *last += 1;
        *last
    }

    /// Последний выстрел стрелка (0 если ещё не стрелял)
    pub fn last(&self, attacker_id: u64) -> ShotId {
        self.per_attacker.get(&attacker_id).copied().unwrap_or_default()
    }

    /// Всего выстрелов в мире
    pub fn total(&self) -> u64 {
        self.total
    }
}
