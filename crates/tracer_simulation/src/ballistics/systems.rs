//! Ballistics systems: ShotFired → hitscan / projectile launch, projectile stepping.

use bevy::prelude::*;

use crate::ballistics::events::{HitRegistered, ShotEvent, ShotFired, ShotMissed};
use crate::ballistics::hitscan::{BallisticsResolver, FireOutcome};
use crate::ballistics::oracle::{CollisionOracle, UnavailableOracle};
use crate::ballistics::projectile::ProjectileSimulator;
use crate::ballistics::scene::ColliderScene;
use crate::clock::SimClock;
use crate::logger::{log, log_warning};

/// Collision сцена мира, или oracle-заглушка (все выстрелы = miss)
fn oracle_or_unavailable(scene: Option<&ColliderScene>) -> &dyn CollisionOracle {
    match scene {
        Some(scene) => scene,
        None => &UnavailableOracle,
    }
}

/// Система: резолв выпущенных выстрелов
///
/// Hitscan резолвится сразу (HitRegistered/ShotMissed в этом же тике),
/// projectile уходит в `ProjectileSimulator` оружия.
pub fn resolve_fired_shots(
    mut fired: EventReader<ShotFired>,
    scene: Option<Res<ColliderScene>>,
    clock: Res<SimClock>,
    mut simulators: Query<&mut ProjectileSimulator>,
    mut hits: EventWriter<HitRegistered>,
    mut misses: EventWriter<ShotMissed>,
) {
    let oracle = oracle_or_unavailable(scene.as_deref());
    let resolver = BallisticsResolver::new(oracle);

    for event in fired.read() {
        let shot = &event.shot;

        let outcome = match simulators.get_mut(event.weapon) {
            Ok(mut simulator) => resolver.fire(shot.clone(), &mut simulator, clock.now()),
            Err(_) if shot.profile.is_hitscan() => FireOutcome::Resolved(resolver.hitscan(shot)),
            Err(_) => {
                log_warning(&format!(
                    "[Shot #{}] weapon {:?} has no ProjectileSimulator",
                    shot.shot, event.weapon
                ));
                FireOutcome::Dropped
            }
        };

        match outcome {
            FireOutcome::Resolved(events) => {
                for shot_event in events {
                    match shot_event {
                        ShotEvent::Hit(hit) => {
                            hits.write(HitRegistered {
                                hit,
                                shot: shot.clone(),
                            });
                        }
                        ShotEvent::Miss { shot: id } => {
                            misses.write(ShotMissed {
                                shot: id,
                                attacker_id: shot.attacker_id,
                            });
                        }
                    }
                }
            }
            FireOutcome::Launched => {
                log(&format!(
                    "[Shot #{}] projectile '{}' launched",
                    shot.shot, shot.profile.name
                ));
            }
            FireOutcome::Dropped => {}
        }
    }
}

/// Система: один kinematic step всех пуль в полёте
pub fn step_projectiles(
    scene: Option<Res<ColliderScene>>,
    clock: Res<SimClock>,
    mut simulators: Query<&mut ProjectileSimulator>,
    mut hits: EventWriter<HitRegistered>,
) {
    let oracle = oracle_or_unavailable(scene.as_deref());

    for mut simulator in simulators.iter_mut() {
        if simulator.active_count() == 0 {
            continue;
        }

        for projectile_hit in simulator.tick(oracle, clock.delta(), clock.now()) {
            hits.write(HitRegistered {
                hit: projectile_hit.hit,
                shot: projectile_hit.shot,
            });
        }
    }
}

/// Система: цель удалена (или перестала быть Damageable) → её коллайдеры уходят из сцены
pub fn release_despawned_colliders(
    mut removed: RemovedComponents<crate::combat::Damageable>,
    scene: Option<ResMut<ColliderScene>>,
) {
    let Some(mut scene) = scene else {
        removed.clear();
        return;
    };

    for entity in removed.read() {
        let before = scene.len();
        scene.remove_owned_by(entity);
        let released = before - scene.len();
        if released > 0 {
            log(&format!("{:?} removed: {} colliders released", entity, released));
        }
    }
}

/// Система: оружие удалено → его пули исчезают без событий
pub fn clear_orphaned_projectiles(
    mut removed: RemovedComponents<crate::weapon::Weapon>,
    mut simulators: Query<&mut ProjectileSimulator>,
) {
    for entity in removed.read() {
        if let Ok(mut simulator) = simulators.get_mut(entity) {
            simulator.clear();
        }
    }
}
