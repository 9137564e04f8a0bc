//! BallisticsResolver — resolution одного выстрела
//!
//! Hitscan: луч вдоль direction, при пробитии re-cast от точки hit + ε
//! до того же абсолютного предела range. Projectile профили уходят
//! в `ProjectileSimulator` и резолвятся по тикам.

use std::sync::Arc;

use bevy::prelude::*;

use crate::ballistics::events::{HitEvent, ShotEvent};
use crate::ballistics::oracle::{CollisionOracle, RayHit};
use crate::ballistics::profile::{FlightModel, HitId, ShotContext};
use crate::ballistics::projectile::ProjectileSimulator;
use crate::logger::{log, log_warning};

/// Смещение за точку пробития (1 см)
pub const PENETRATION_EPSILON: f32 = 0.01;

/// Что произошло с выстрелом
#[derive(Debug, Clone, PartialEq)]
pub enum FireOutcome {
    /// Hitscan: все Hit/Miss уже известны
    Resolved(Vec<ShotEvent>),
    /// Projectile: пуля в полёте, hits придут из `ProjectileSimulator::tick`
    Launched,
    /// Projectile не запущен (нулевое направление)
    Dropped,
}

pub struct BallisticsResolver<'a> {
    oracle: &'a dyn CollisionOracle,
}

impl<'a> BallisticsResolver<'a> {
    pub fn new(oracle: &'a dyn CollisionOracle) -> Self {
        Self { oracle }
    }

    /// Выбирает режим по профилю
    pub fn fire(
        &self,
        shot: Arc<ShotContext>,
        projectiles: &mut ProjectileSimulator,
        now: f32,
    ) -> FireOutcome {
        match shot.profile.flight {
            FlightModel::Hitscan { .. } => FireOutcome::Resolved(self.hitscan(&shot)),
            FlightModel::Projectile { .. } => {
                if projectiles.launch(shot, now) {
                    FireOutcome::Launched
                } else {
                    FireOutcome::Dropped
                }
            }
        }
    }

    /// Hitscan resolution (eager, конечная последовательность)
    ///
    /// Завершается на miss, исчерпании пробитий или достижении range.
    pub fn hitscan(&self, shot: &ShotContext) -> Vec<ShotEvent> {
        let profile = &shot.profile;
        let mut events = Vec::new();

        let FlightModel::Hitscan { range } = profile.flight else {
            log_warning(&format!(
                "[Shot #{}] hitscan requested for projectile profile '{}'",
                shot.shot, profile.name
            ));
            events.push(ShotEvent::Miss { shot: shot.shot });
            return events;
        };

        let Some(direction) = shot.direction else {
            log_warning(&format!("[Shot #{}] zero fire direction, treated as miss", shot.shot));
            events.push(ShotEvent::Miss { shot: shot.shot });
            return events;
        };

        let mut penetrations_remaining = profile.penetration_count;
        let mut damage_multiplier = 1.0_f32;
        let mut cast_origin = shot.origin;
        let mut index = 0u32;

        loop {
            let travelled = cast_origin.distance(shot.origin);
            let remaining_range = range - travelled;
            if remaining_range <= 0.0 {
                break;
            }

            let Some(hit) = self.cast(cast_origin, direction, remaining_range, shot) else {
                log(&format!(
                    "[Shot #{}] MISS: no hit within {:.1}m",
                    shot.shot, range
                ));
                events.push(ShotEvent::Miss { shot: shot.shot });
                break;
            };

            let hit_event = HitEvent {
                id: HitId::new(shot.attacker_id, shot.shot, index),
                point: hit.point,
                normal: hit.normal,
                collider: hit.collider,
                target: hit.target,
                travel_distance: hit.point.distance(shot.origin),
                is_headshot: profile.headshot.is_headshot(self.oracle, hit.collider),
                damage_multiplier,
            };
            events.push(ShotEvent::Hit(hit_event));
            index += 1;

            if penetrations_remaining == 0 {
                break;
            }
            penetrations_remaining -= 1;
            damage_multiplier *= profile.penetration_damage_multiplier;
            cast_origin = hit.point + direction * PENETRATION_EPSILON;
        }

        events
    }

    /// Raycast с деградацией ошибок oracle в "no hit"
    fn cast(
        &self,
        origin: Vec3,
        direction: Dir3,
        max_distance: f32,
        shot: &ShotContext,
    ) -> Option<RayHit> {
        match self
            .oracle
            .raycast(origin, direction, max_distance, shot.profile.hit_mask)
        {
            Ok(hit) => hit,
            Err(err) => {
                log_warning(&format!("[Shot #{}] raycast failed: {}", shot.shot, err));
                None
            }
        }
    }
}
