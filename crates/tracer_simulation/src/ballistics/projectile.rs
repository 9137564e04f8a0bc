//! ProjectileSimulator — пули в полёте (projectile/caliber режим)
//!
//! Каждый тик:
//! 1. Kinematic step: `v' = v + g·k·dt`, `p' = p + v·dt + ½·g·k·dt²`
//! 2. Raycast по сегменту `p → p'` (ближайший hit)
//! 3. Hit → пробитие или уничтожение; позиция коммитится в `p'` в любом случае
//!
//! Известное упрощение: после пробития пуля продолжает с `p'`, а не с точки
//! пробития. Для быстрых пуль и тонкой геометрии hit point и falloff внутри
//! одного шага могут быть неточными.
//!
//! Симулятор владеет своими пулями эксклюзивно (один на оружие).

use std::sync::Arc;

use bevy::prelude::*;

use crate::ballistics::events::HitEvent;
use crate::ballistics::oracle::CollisionOracle;
use crate::ballistics::profile::{FlightModel, HitId, ShotContext};
use crate::logger::{log, log_warning};

/// Стандартная гравитация (м/с²)
pub const DEFAULT_GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

/// Hit пули вместе с контекстом её выстрела
#[derive(Debug, Clone)]
pub struct ProjectileHit {
    pub shot: Arc<ShotContext>,
    pub hit: HitEvent,
}

/// Пуля в полёте
#[derive(Debug, Clone)]
pub struct ActiveProjectile {
    pub shot: Arc<ShotContext>,
    pub position: Vec3,
    pub velocity: Vec3,
    pub start_position: Vec3,
    pub spawn_time: f32,
    pub penetrations_remaining: u32,
    pub damage_multiplier: f32,
    /// Сколько hits уже выдала пуля (для HitId)
    pub hits: u32,
}

#[derive(Component, Debug, Clone)]
pub struct ProjectileSimulator {
    active: Vec<ActiveProjectile>,
    gravity: Vec3,
}

impl Default for ProjectileSimulator {
    fn default() -> Self {
        Self::new(DEFAULT_GRAVITY)
    }
}

impl ProjectileSimulator {
    pub fn new(gravity: Vec3) -> Self {
        Self {
            active: Vec::new(),
            gravity,
        }
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    pub fn active(&self) -> &[ActiveProjectile] {
        &self.active
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Запустить пулю. `false` если профиль не projectile или нет направления.
    pub fn launch(&mut self, shot: Arc<ShotContext>, now: f32) -> bool {
        let FlightModel::Projectile { muzzle_speed, .. } = shot.profile.flight else {
            log_warning(&format!(
                "[Shot #{}] launch requested for hitscan profile '{}'",
                shot.shot, shot.profile.name
            ));
            return false;
        };
        let Some(direction) = shot.direction else {
            log_warning(&format!("[Shot #{}] zero fire direction, projectile dropped", shot.shot));
            return false;
        };

        self.active.push(ActiveProjectile {
            position: shot.origin,
            velocity: direction * muzzle_speed,
            start_position: shot.origin,
            spawn_time: now,
            penetrations_remaining: shot.profile.penetration_count,
            damage_multiplier: 1.0,
            hits: 0,
            shot,
        });
        true
    }

    /// Один шаг симуляции для всех пуль. Возвращает hits в порядке пуль.
    pub fn tick(&mut self, oracle: &dyn CollisionOracle, dt: f32, now: f32) -> Vec<ProjectileHit> {
        let gravity = self.gravity;
        let mut hits = Vec::new();

        self.active.retain_mut(|projectile| {
            let FlightModel::Projectile {
                gravity_multiplier,
                max_lifetime,
                ..
            } = projectile.shot.profile.flight
            else {
                return false;
            };

            // Lifetime: жёсткий дедлайн, без событий
            if now - projectile.spawn_time > max_lifetime {
                log(&format!("[Shot #{}] projectile expired", projectile.shot.shot));
                return false;
            }

            let acceleration = gravity * gravity_multiplier;
            let next_velocity = projectile.velocity + acceleration * dt;
            let next_position = projectile.position
                + projectile.velocity * dt
                + 0.5 * acceleration * dt * dt;

            if let Some(hit) = step_collision(oracle, projectile, next_position) {
                hits.push(ProjectileHit {
                    shot: projectile.shot.clone(),
                    hit,
                });
                projectile.hits += 1;

                if projectile.penetrations_remaining == 0 {
                    return false;
                }
                projectile.penetrations_remaining -= 1;
                projectile.damage_multiplier *= projectile.shot.profile.penetration_damage_multiplier;
            }

            projectile.position = next_position;
            projectile.velocity = next_velocity;
            true
        });

        hits
    }

    /// Teardown: все пули исчезают без событий
    pub fn clear(&mut self) {
        self.active.clear();
    }
}

/// Raycast по сегменту шага
fn step_collision(
    oracle: &dyn CollisionOracle,
    projectile: &ActiveProjectile,
    next_position: Vec3,
) -> Option<HitEvent> {
    let segment = next_position - projectile.position;
    let direction = Dir3::new(segment).ok()?;
    let profile = &projectile.shot.profile;

    let hit = match oracle.raycast(
        projectile.position,
        direction,
        segment.length(),
        profile.hit_mask,
    ) {
        Ok(hit) => hit?,
        Err(err) => {
            log_warning(&format!(
                "[Shot #{}] projectile raycast failed: {}",
                projectile.shot.shot, err
            ));
            return None;
        }
    };

    Some(HitEvent {
        id: HitId::new(
            projectile.shot.attacker_id,
            projectile.shot.shot,
            projectile.hits,
        ),
        point: hit.point,
        normal: hit.normal,
        collider: hit.collider,
        target: hit.target,
        travel_distance: hit.point.distance(projectile.start_position),
        is_headshot: profile.headshot.is_headshot(oracle, hit.collider),
        damage_multiplier: projectile.damage_multiplier,
    })
}
