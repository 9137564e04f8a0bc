//! DamageModel — урон за одно попадание
//!
//! Формула:
//! - `base_damage × falloff(distance)` (домен кривой зависит от режима профиля)
//! - `× m^k` за k предыдущих пробитий
//! - `× headshot_multiplier` если headshot
//! - зажато ≥ 0
//!
//! Чистая функция, детерминирована по входам.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ballistics::events::HitEvent;
use crate::ballistics::profile::{FireProfile, ShotContext};

/// Урон для hit
pub fn compute_damage(
    profile: &FireProfile,
    travel_distance: f32,
    is_headshot: bool,
    penetration_multiplier: f32,
) -> f32 {
    let falloff = profile
        .falloff
        .evaluate_in(profile.falloff_domain(), travel_distance);

    let body_damage = (profile.base_damage * falloff * penetration_multiplier).max(0.0);

    if is_headshot {
        body_damage * profile.headshot_multiplier
    } else {
        body_damage
    }
}

/// Множитель после `penetrations` пробитий: m^k
pub fn penetration_multiplier(penetration_damage_multiplier: f32, penetrations: u32) -> f32 {
    penetration_damage_multiplier.powi(penetrations as i32)
}

/// Damage payload (wire/application level)
///
/// Иммутабелен после создания; передаётся authority как есть.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageInfo {
    pub damage: f32,
    pub hit_point: Vec3,
    pub hit_normal: Vec3,
    pub attacker_id: u64,
    pub is_headshot: bool,
}

impl DamageInfo {
    pub fn new(
        damage: f32,
        hit_point: Vec3,
        hit_normal: Vec3,
        attacker_id: u64,
        is_headshot: bool,
    ) -> Self {
        Self {
            damage,
            hit_point,
            hit_normal,
            attacker_id,
            is_headshot,
        }
    }

    /// DamageModel + упаковка hit в payload
    pub fn from_hit(hit: &HitEvent, shot: &ShotContext) -> Self {
        let damage = compute_damage(
            &shot.profile,
            hit.travel_distance,
            hit.is_headshot,
            hit.damage_multiplier,
        );

        Self::new(damage, hit.point, hit.normal, shot.attacker_id, hit.is_headshot)
    }
}
