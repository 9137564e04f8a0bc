//! Damageable — здоровье цели
//!
//! Инварианты:
//! - `0 ≤ current_health ≤ max_health`
//! - health мутирует только authoritative owner (server или offline процесс)
//! - после смерти меняет состояние только `reset`
//!
//! Observer notifications копятся в outbox (`drain_notices`),
//! ECS система публикует их как события.

use bevy::prelude::*;

use crate::combat::authority::NetRole;
use crate::combat::damage::DamageInfo;

/// Notification для UI/animation
#[derive(Debug, Clone, PartialEq)]
pub enum HealthNotice {
    Damaged(DamageInfo),
    HealthChanged { current: f32, max: f32 },
    /// Ровно один раз на смерть
    Died { killer: Option<u64> },
}

#[derive(Component, Debug, Clone)]
pub struct Damageable {
    max_health: f32,
    current_health: f32,
    is_dead: bool,
    notices: Vec<HealthNotice>,
}

impl Default for Damageable {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Damageable {
    pub fn new(max_health: f32) -> Self {
        let max_health = max_health.max(0.0);
        Self {
            max_health,
            current_health: max_health,
            is_dead: false,
            // Начальное значение для UI
            notices: vec![HealthNotice::HealthChanged {
                current: max_health,
                max: max_health,
            }],
        }
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    pub fn current_health(&self) -> f32 {
        self.current_health
    }

    pub fn is_dead(&self) -> bool {
        self.is_dead
    }

    pub fn health_percent(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        self.current_health / self.max_health
    }

    /// Применить урон. `false` если мёртв или caller не authority.
    pub fn take_damage(&mut self, info: &DamageInfo, role: NetRole) -> bool {
        if !role.is_authoritative() || self.is_dead {
            return false;
        }

        self.current_health = (self.current_health - info.damage.max(0.0)).max(0.0);
        self.notices.push(HealthNotice::Damaged(*info));
        self.push_health_changed();

        if self.current_health <= 0.0 {
            self.is_dead = true;
            self.notices.push(HealthNotice::Died {
                killer: Some(info.attacker_id),
            });
        }

        true
    }

    /// Лечение (clamp к max). No-op если мёртв или не authority.
    pub fn heal(&mut self, amount: f32, role: NetRole) -> bool {
        if !role.is_authoritative() || self.is_dead || amount <= 0.0 {
            return false;
        }

        self.current_health = (self.current_health + amount).min(self.max_health);
        self.push_health_changed();
        true
    }

    /// Воскрешение: health = max, снимает dead.
    pub fn reset(&mut self, role: NetRole) -> bool {
        if !role.is_authoritative() {
            return false;
        }

        self.is_dead = false;
        self.current_health = self.max_health;
        self.push_health_changed();
        true
    }

    pub fn has_notices(&self) -> bool {
        !self.notices.is_empty()
    }

    pub fn drain_notices(&mut self) -> Vec<HealthNotice> {
        std::mem::take(&mut self.notices)
    }

    fn push_health_changed(&mut self) {
        self.notices.push(HealthNotice::HealthChanged {
            current: self.current_health,
            max: self.max_health,
        });
    }
}

/// Компонент-маркер: entity мертв
///
/// Вешается при EntityDied, снимается после reset.
#[derive(Component, Debug)]
pub struct Dead;

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(damage: f32) -> DamageInfo {
        DamageInfo::new(damage, Vec3::ZERO, Vec3::Z, 7, false)
    }

    #[test]
    fn test_damage_and_death() {
        let mut target = Damageable::new(100.0);
        target.drain_notices();

        assert!(target.take_damage(&hit(30.0), NetRole::Offline));
        assert_eq!(target.current_health(), 70.0);
        assert!(!target.is_dead());

        assert!(target.take_damage(&hit(500.0), NetRole::Offline));
        assert_eq!(target.current_health(), 0.0);
        assert!(target.is_dead());

        let deaths = target
            .drain_notices()
            .into_iter()
            .filter(|notice| matches!(notice, HealthNotice::Died { .. }))
            .count();
        assert_eq!(deaths, 1);
    }

    #[test]
    fn test_idempotent_death() {
        let mut target = Damageable::new(50.0);
        target.take_damage(&hit(50.0), NetRole::Server);
        target.drain_notices();

        for _ in 0..10 {
            assert!(!target.take_damage(&hit(25.0), NetRole::Server));
        }
        assert!(!target.heal(10.0, NetRole::Server));

        assert_eq!(target.current_health(), 0.0);
        assert!(target.is_dead());
        assert!(!target.has_notices());
    }

    #[test]
    fn test_client_cannot_mutate() {
        let mut target = Damageable::new(100.0);

        assert!(!target.take_damage(&hit(40.0), NetRole::Client));
        assert!(!target.heal(10.0, NetRole::Client));
        assert!(!target.reset(NetRole::Client));
        assert_eq!(target.current_health(), 100.0);
    }

    #[test]
    fn test_heal_clamps_to_max() {
        let mut target = Damageable::new(100.0);
        target.take_damage(&hit(50.0), NetRole::Offline);

        assert!(target.heal(30.0, NetRole::Offline));
        assert_eq!(target.current_health(), 80.0);

        assert!(target.heal(100.0, NetRole::Offline));
        assert_eq!(target.current_health(), 100.0);
        assert_eq!(target.health_percent(), 1.0);
    }

    #[test]
    fn test_reset_revives() {
        let mut target = Damageable::new(100.0);
        target.take_damage(&hit(100.0), NetRole::Offline);
        assert!(target.is_dead());

        assert!(target.reset(NetRole::Offline));
        assert!(!target.is_dead());
        assert_eq!(target.current_health(), 100.0);

        // После reset снова можно получать урон
        assert!(target.take_damage(&hit(10.0), NetRole::Offline));
        assert_eq!(target.current_health(), 90.0);
    }

    #[test]
    fn test_spawn_announces_health() {
        let mut target = Damageable::new(80.0);
        assert_eq!(
            target.drain_notices(),
            vec![HealthNotice::HealthChanged {
                current: 80.0,
                max: 80.0
            }]
        );
    }
}
