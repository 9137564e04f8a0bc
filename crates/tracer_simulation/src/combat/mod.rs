//! Combat module: DamageModel, Damageable, DamageAuthority
//!
//! ECS ответственность:
//! - Damage rules: falloff × penetration × headshot
//! - Health state: Damageable (authority-gated)
//! - Authority: локальное применение или форвард hit на server
//! - Events: DamageTaken, HealthChanged, EntityDied, DamageForwarded
//!
//! Ballistics ничего не знает про health: единственный вход сюда:
//! `HitRegistered` (и `DamageRequestReceived` от транспорта).

use bevy::prelude::*;

pub mod authority;
pub mod damage;
pub mod damageable;
pub mod events;
pub mod systems;

// Re-export основных типов
pub use authority::{
    ApplyResult, DamageAuthority, DamageForwarded, DamageRequest, DamageRequestReceived,
    DamageRoute, HealRequest, NetRole, ResetHealthRequest,
};
pub use damage::{compute_damage, penetration_multiplier, DamageInfo};
pub use damageable::{Damageable, Dead, HealthNotice};
pub use events::{DamageTaken, EntityDied, HealthChanged};

use crate::SimulationSet;

/// Combat Plugin
///
/// Регистрирует combat системы в FixedUpdate.
///
/// Порядок выполнения:
/// 1. apply_registered_hits — hits этого тика → authority (или форвард)
/// 2. process_damage_requests — форварды от клиентов (только authority)
/// 3. process_health_requests — heal/reset
/// 4. publish_health_notices — события для UI + Dead маркер
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DamageAuthority>();

        // Регистрация событий
        app.add_event::<DamageTaken>()
            .add_event::<HealthChanged>()
            .add_event::<EntityDied>()
            .add_event::<DamageForwarded>()
            .add_event::<DamageRequestReceived>()
            .add_event::<HealRequest>()
            .add_event::<ResetHealthRequest>();

        app.add_systems(
            FixedUpdate,
            (
                // Фаза 1: Damage application (authority)
                (
                    systems::apply_registered_hits,
                    systems::process_damage_requests,
                    systems::process_health_requests,
                )
                    .chain()
                    .in_set(SimulationSet::Damage),
                // Фаза 2: Notifications + death bookkeeping
                systems::publish_health_notices.in_set(SimulationSet::Bookkeeping),
            ),
        );
    }
}
