//! Shot events — результат resolution выстрела
//!
//! `HitEvent`/`ShotEvent` — чистые данные resolver'а.
//! `ShotFired`/`HitRegistered`/`ShotMissed` — ECS события для effects/UI
//! и для DamageAuthority (только `HitRegistered` ведёт к урону).

use std::sync::Arc;

use bevy::prelude::*;

use crate::ballistics::oracle::ColliderId;
use crate::ballistics::profile::{HitId, ShotContext, ShotId};

/// Одно попадание выстрела
#[derive(Debug, Clone, PartialEq)]
pub struct HitEvent {
    pub id: HitId,
    pub point: Vec3,
    pub normal: Vec3,
    pub collider: ColliderId,
    pub target: Option<Entity>,
    /// Дистанция от origin выстрела (не от последней точки пробития)
    pub travel_distance: f32,
    pub is_headshot: bool,
    /// m^k, где k: число пробитий до этого hit
    pub damage_multiplier: f32,
}

/// Hit или Miss в порядке возникновения
#[derive(Debug, Clone, PartialEq)]
pub enum ShotEvent {
    Hit(HitEvent),
    Miss { shot: ShotId },
}

impl ShotEvent {
    pub fn as_hit(&self) -> Option<&HitEvent> {
        match self {
            ShotEvent::Hit(hit) => Some(hit),
            ShotEvent::Miss { .. } => None,
        }
    }

    pub fn is_miss(&self) -> bool {
        matches!(self, ShotEvent::Miss { .. })
    }
}

/// Event: оружие выстрелило (1 на патрон, не на hit)
///
/// Резолвится в `resolve_fired_shots`: hitscan сразу, projectile уходит
/// в `ProjectileSimulator` оружия.
#[derive(Event, Debug, Clone)]
pub struct ShotFired {
    pub weapon: Entity,
    pub shot: Arc<ShotContext>,
}

/// Event: выстрел попал (hitscan или projectile step)
#[derive(Event, Debug, Clone)]
pub struct HitRegistered {
    pub hit: HitEvent,
    pub shot: Arc<ShotContext>,
}

/// Event: hitscan луч ничего не задел
#[derive(Event, Debug, Clone)]
pub struct ShotMissed {
    pub shot: ShotId,
    pub attacker_id: u64,
}
