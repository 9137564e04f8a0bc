//! Weapon module: fire control state machine + catalog
//!
//! ECS ответственность:
//! - FireControl: ammo, fire mode, rate limit, reload
//! - Input (trigger/reload/fire mode) → `ShotFired`
//! - Events для UI: AmmoChanged, WeaponStateChanged, FireRejected
//!
//! Резолв выстрела — в `ballistics`, урон — в `combat`.

use bevy::prelude::*;

pub mod config;
pub mod fire_control;
pub mod systems;

#[cfg(test)]
mod fire_control_tests;

pub use config::{AmmoConfig, FireControlConfig, WeaponCatalog, WeaponDefinition};
pub use fire_control::{FireControl, FireMode, WeaponNotice, WeaponState};
pub use systems::{
    AimUpdated, AmmoChanged, AmmoPickup, CycleFireMode, FireModeChanged, FireRejected,
    ReloadRequested, TriggerPressed, TriggerReleased, Weapon, WeaponStateChanged,
};

use crate::SimulationSet;

/// Weapon Plugin
///
/// Порядок выполнения (FixedUpdate):
/// 1. initialize_weapons — equip новых оружий
/// 2. process_weapon_input — trigger/reload/fire mode
/// 3. tick_fire_control — Burst/Auto continuation, конец перезарядки
/// 4. publish_weapon_notices — AmmoChanged / WeaponStateChanged
pub struct WeaponPlugin;

impl Plugin for WeaponPlugin {
    fn build(&self, app: &mut App) {
        // Каталог из TOML можно вставить до плагина; иначе встроенные пресеты
        if !app.world().contains_resource::<WeaponCatalog>() {
            app.insert_resource(WeaponCatalog::builtin());
        }

        app.add_event::<TriggerPressed>()
            .add_event::<TriggerReleased>()
            .add_event::<AimUpdated>()
            .add_event::<ReloadRequested>()
            .add_event::<CycleFireMode>()
            .add_event::<AmmoPickup>()
            .add_event::<FireRejected>()
            .add_event::<FireModeChanged>()
            .add_event::<AmmoChanged>()
            .add_event::<WeaponStateChanged>();

        app.add_systems(
            FixedUpdate,
            (
                (systems::initialize_weapons, systems::process_weapon_input)
                    .chain()
                    .in_set(SimulationSet::WeaponInput),
                systems::tick_fire_control.in_set(SimulationSet::FireControl),
                systems::publish_weapon_notices.in_set(SimulationSet::Bookkeeping),
            ),
        );
    }
}
