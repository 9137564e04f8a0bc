//! Weapon component + input/fire control systems.

use std::sync::Arc;

use bevy::prelude::*;

use crate::ballistics::events::ShotFired;
use crate::ballistics::profile::{FireProfile, ShotContext, ShotSequence};
use crate::ballistics::projectile::ProjectileSimulator;
use crate::clock::SimClock;
use crate::error::FireError;
use crate::logger::{log, log_warning};
use crate::weapon::fire_control::{FireControl, FireMode, WeaponNotice, WeaponState};

/// Оружие в руках стрелка
///
/// Архитектура:
/// - `FireControl` решает, можно ли стрелять (ammo, rate, режим)
/// - `ProjectileSimulator` (required) держит пули этого оружия
/// - aim origin/direction приходят явно из input событий
#[derive(Component, Debug, Clone)]
#[require(ProjectileSimulator)]
pub struct Weapon {
    /// `None` = конфигурация битая, любой fire отклоняется
    pub profile: Option<Arc<FireProfile>>,
    pub fire_control: FireControl,
    pub attacker_id: u64,
    /// Последний прицел (для Burst/Auto continuation)
    pub aim_origin: Vec3,
    pub aim_direction: Vec3,
}

impl Weapon {
    pub fn new(profile: Arc<FireProfile>, fire_control: FireControl, attacker_id: u64) -> Self {
        Self {
            profile: Some(profile),
            fire_control,
            attacker_id,
            aim_origin: Vec3::ZERO,
            aim_direction: Vec3::NEG_Z,
        }
    }

    /// Оружие без профиля (fail-closed)
    pub fn unconfigured(fire_control: FireControl, attacker_id: u64) -> Self {
        Self {
            profile: None,
            fire_control,
            attacker_id,
            aim_origin: Vec3::ZERO,
            aim_direction: Vec3::NEG_Z,
        }
    }
}

// ============================================================================
// Input events
// ============================================================================

/// Trigger press с явным прицелом
#[derive(Event, Debug, Clone, Copy)]
pub struct TriggerPressed {
    pub weapon: Entity,
    pub origin: Vec3,
    pub direction: Vec3,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct TriggerReleased {
    pub weapon: Entity,
}

/// Прицел сдвинулся, пока trigger зажат
#[derive(Event, Debug, Clone, Copy)]
pub struct AimUpdated {
    pub weapon: Entity,
    pub origin: Vec3,
    pub direction: Vec3,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct ReloadRequested {
    pub weapon: Entity,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct CycleFireMode {
    pub weapon: Entity,
}

/// Подбор патронов в резерв
#[derive(Event, Debug, Clone, Copy)]
pub struct AmmoPickup {
    pub weapon: Entity,
    pub amount: u32,
}

// ============================================================================
// Output events (UI)
// ============================================================================

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FireRejected {
    pub weapon: Entity,
    pub reason: FireError,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmmoChanged {
    pub weapon: Entity,
    pub current: u32,
    pub reserve: u32,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeaponStateChanged {
    pub weapon: Entity,
    pub state: WeaponState,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FireModeChanged {
    pub weapon: Entity,
    pub mode: FireMode,
}

// ============================================================================
// Systems
// ============================================================================

/// Система: equip → initialize (idempotent)
pub fn initialize_weapons(mut weapons: Query<(Entity, &mut Weapon), Added<Weapon>>) {
    for (entity, mut weapon) in weapons.iter_mut() {
        if weapon.fire_control.initialize() {
            log(&format!(
                "🔫 Weapon {:?} equipped ({}/{})",
                entity,
                weapon.fire_control.ammo_in_magazine(),
                weapon.fire_control.ammo_in_reserve()
            ));
        }
    }
}

/// Система: input events → FireControl
///
/// Порядок внутри тика: aim → fire mode → press → release → reload → pickup.
#[allow(clippy::too_many_arguments)]
pub fn process_weapon_input(
    mut aims: EventReader<AimUpdated>,
    mut cycles: EventReader<CycleFireMode>,
    mut presses: EventReader<TriggerPressed>,
    mut releases: EventReader<TriggerReleased>,
    mut reloads: EventReader<ReloadRequested>,
    mut pickups: EventReader<AmmoPickup>,
    mut weapons: Query<&mut Weapon>,
    clock: Res<SimClock>,
    mut sequence: ResMut<ShotSequence>,
    mut fired: EventWriter<ShotFired>,
    mut rejected: EventWriter<FireRejected>,
    mut mode_changed: EventWriter<FireModeChanged>,
) {
    let now = clock.now();

    for aim in aims.read() {
        if let Ok(mut weapon) = weapons.get_mut(aim.weapon) {
            weapon.aim_origin = aim.origin;
            weapon.aim_direction = aim.direction;
        }
    }

    for cycle in cycles.read() {
        if let Ok(mut weapon) = weapons.get_mut(cycle.weapon) {
            let mode = weapon.fire_control.cycle_fire_mode();
            log(&format!("Weapon {:?} fire mode → {:?}", cycle.weapon, mode));
            mode_changed.write(FireModeChanged {
                weapon: cycle.weapon,
                mode,
            });
        }
    }

    for press in presses.read() {
        let Ok(mut weapon) = weapons.get_mut(press.weapon) else {
            log_warning(&format!("TriggerPressed for unknown weapon {:?}", press.weapon));
            continue;
        };
        weapon.aim_origin = press.origin;
        weapon.aim_direction = press.direction;

        let result = match weapon.profile.clone() {
            None => Err(FireError::MissingProfile),
            Some(profile) => weapon.fire_control.try_fire(now).map(|()| profile),
        };

        match result {
            Ok(profile) => {
                let shot = next_shot(&mut sequence, &weapon, profile);
                fired.write(ShotFired {
                    weapon: press.weapon,
                    shot,
                });
            }
            Err(reason) => {
                if reason == FireError::MissingProfile {
                    log_warning(&format!("Weapon {:?}: {}", press.weapon, reason));
                } else {
                    log(&format!("Weapon {:?} fire rejected: {}", press.weapon, reason));
                }
                rejected.write(FireRejected {
                    weapon: press.weapon,
                    reason,
                });
            }
        }
    }

    for release in releases.read() {
        if let Ok(mut weapon) = weapons.get_mut(release.weapon) {
            weapon.fire_control.release_trigger();
        }
    }

    for reload in reloads.read() {
        let Ok(mut weapon) = weapons.get_mut(reload.weapon) else {
            continue;
        };
        if weapon.fire_control.begin_reload(now) {
            log(&format!("🔄 Weapon {:?} reloading", reload.weapon));
        } else {
            log(&format!(
                "Weapon {:?} reload rejected ({:?}, {}/{})",
                reload.weapon,
                weapon.fire_control.state(),
                weapon.fire_control.ammo_in_magazine(),
                weapon.fire_control.ammo_in_reserve()
            ));
        }
    }

    for pickup in pickups.read() {
        if let Ok(mut weapon) = weapons.get_mut(pickup.weapon) {
            weapon.fire_control.add_reserve_ammo(pickup.amount);
        }
    }
}

/// Система: Burst/Auto continuation + завершение перезарядки
pub fn tick_fire_control(
    mut weapons: Query<(Entity, &mut Weapon)>,
    clock: Res<SimClock>,
    mut sequence: ResMut<ShotSequence>,
    mut fired: EventWriter<ShotFired>,
) {
    let now = clock.now();

    for (entity, mut weapon) in weapons.iter_mut() {
        let shots = weapon.fire_control.tick(now);
        let Some(profile) = weapon.profile.clone() else {
            continue;
        };

        for _ in 0..shots {
            let shot = next_shot(&mut sequence, &weapon, profile.clone());
            fired.write(ShotFired {
                weapon: entity,
                shot,
            });
        }
    }
}

/// Система: FireControl notices → UI события
pub fn publish_weapon_notices(
    mut weapons: Query<(Entity, &mut Weapon)>,
    mut ammo_changed: EventWriter<AmmoChanged>,
    mut state_changed: EventWriter<WeaponStateChanged>,
) {
    for (entity, mut weapon) in weapons.iter_mut() {
        if !weapon.fire_control.has_notices() {
            continue;
        }

        for notice in weapon.fire_control.drain_notices() {
            match notice {
                WeaponNotice::AmmoChanged { current, reserve } => {
                    ammo_changed.write(AmmoChanged {
                        weapon: entity,
                        current,
                        reserve,
                    });
                }
                WeaponNotice::StateChanged(state) => {
                    state_changed.write(WeaponStateChanged {
                        weapon: entity,
                        state,
                    });
                }
            }
        }
    }
}

fn next_shot(
    sequence: &mut ShotSequence,
    weapon: &Weapon,
    profile: Arc<FireProfile>,
) -> Arc<ShotContext> {
    Arc::new(ShotContext::new(
        sequence.next_shot(weapon.attacker_id),
        weapon.aim_origin,
        weapon.aim_direction,
        weapon.attacker_id,
        profile,
    ))
}
