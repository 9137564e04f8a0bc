//! Ballistics module: как выстрел находит цель
//!
//! ECS ответственность:
//! - FireProfile / DamageCurve: иммутабельная конфигурация выстрела
//! - BallisticsResolver: hitscan с пробитием
//! - ProjectileSimulator: пули с гравитацией, segment raycast по шагам
//! - Events: ShotFired → HitRegistered / ShotMissed
//!
//! Collision движок скрыт за `CollisionOracle`; в мире им служит
//! resource `ColliderScene`. Урон здесь не считается.

use bevy::prelude::*;

pub mod curve;
pub mod events;
pub mod hitscan;
pub mod oracle;
pub mod profile;
pub mod projectile;
pub mod scene;
pub mod systems;

#[cfg(test)]
mod projectile_tests;

pub use curve::{CurveKey, DamageCurve, FalloffDomain};
pub use events::{HitEvent, HitRegistered, ShotEvent, ShotFired, ShotMissed};
pub use hitscan::{BallisticsResolver, FireOutcome, PENETRATION_EPSILON};
pub use oracle::{ColliderId, CollisionOracle, RayHit, UnavailableOracle};
pub use profile::{
    FireProfile, FlightModel, HeadshotRule, HitId, HitMask, ShotContext, ShotId, ShotSequence,
};
pub use projectile::{ActiveProjectile, ProjectileHit, ProjectileSimulator, DEFAULT_GRAVITY};
pub use scene::{ColliderScene, ColliderShape, SceneCollider};

use crate::SimulationSet;

/// Ballistics Plugin
///
/// Порядок выполнения:
/// 1. release_despawned_colliders — коллайдеры удалённых целей до raycast
/// 2. resolve_fired_shots — hitscan сразу, projectile → launch
/// 3. step_projectiles — Verlet step + segment raycast
/// 4. clear_orphaned_projectiles — teardown пуль снятого оружия
pub struct BallisticsPlugin;

impl Plugin for BallisticsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ShotSequence>()
            .init_resource::<ColliderScene>();

        app.add_event::<ShotFired>()
            .add_event::<HitRegistered>()
            .add_event::<ShotMissed>();

        app.add_systems(
            FixedUpdate,
            (
                systems::release_despawned_colliders,
                systems::resolve_fired_shots,
                systems::step_projectiles,
                systems::clear_orphaned_projectiles,
            )
                .chain()
                .in_set(SimulationSet::Ballistics),
        );
    }
}
