//! Combat events (observer notifications для UI/animation)

use bevy::prelude::*;

use crate::combat::damage::DamageInfo;

/// Event: authority применил урон к цели
#[derive(Event, Debug, Clone, Copy)]
pub struct DamageTaken {
    pub target: Entity,
    pub info: DamageInfo,
}

/// Event: health цели изменился (урон, лечение, reset, спаун)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct HealthChanged {
    pub target: Entity,
    pub current: f32,
    pub max: f32,
}

/// Event: entity умер (ровно один раз на смерть)
#[derive(Event, Debug, Clone, Copy)]
pub struct EntityDied {
    pub entity: Entity,
    /// attacker_id последнего hit
    pub killer: Option<u64>,
}
