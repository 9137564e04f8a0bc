//! Damage application и death bookkeeping systems.

use bevy::prelude::*;

use crate::ballistics::events::HitRegistered;
use crate::combat::authority::{
    ApplyResult, DamageAuthority, DamageForwarded, DamageRequest, DamageRequestReceived,
    DamageRoute, HealRequest, ResetHealthRequest,
};
use crate::combat::damage::DamageInfo;
use crate::combat::damageable::{Damageable, Dead, HealthNotice};
use crate::combat::events::{DamageTaken, EntityDied, HealthChanged};
use crate::logger::{log, log_info, log_warning};

/// Система: HitRegistered → DamageModel → authority
///
/// Authoritative роль применяет урон сразу, остальные форвардят
/// `DamageRequest` (health на клиенте не трогается никогда).
/// Hits по статичной геометрии (без target) урона не дают.
pub fn apply_registered_hits(
    mut hits: EventReader<HitRegistered>,
    mut authority: ResMut<DamageAuthority>,
    mut targets: Query<&mut Damageable>,
    mut forwarded: EventWriter<DamageForwarded>,
) {
    for event in hits.read() {
        let Some(target) = event.hit.target else {
            continue;
        };

        let request = DamageRequest {
            hit: event.hit.id,
            target,
            info: DamageInfo::from_hit(&event.hit, &event.shot),
        };

        match authority.route() {
            DamageRoute::Forward => {
                log(&format!(
                    "📡 [Shot #{}] hit {:?} forwarded to authority ({:.1} dmg)",
                    request.hit.shot, target, request.info.damage
                ));
                forwarded.write(DamageForwarded(request));
            }
            DamageRoute::ApplyLocal => {
                apply_request(
                    &mut authority,
                    &mut targets,
                    &request,
                    Some(event.hit.travel_distance),
                );
            }
        }
    }
}

/// Система: forwarded hits, доставленные транспортом
///
/// Обрабатывается только на authority; дубль hit, который authority
/// уже применил сам, отбрасывается ledger'ом.
pub fn process_damage_requests(
    mut requests: EventReader<DamageRequestReceived>,
    mut authority: ResMut<DamageAuthority>,
    mut targets: Query<&mut Damageable>,
) {
    for DamageRequestReceived(request) in requests.read() {
        if authority.route() == DamageRoute::Forward {
            log_warning(&format!(
                "[Shot #{}] damage request ignored: {:?} is not authoritative",
                request.hit.shot,
                authority.role()
            ));
            continue;
        }

        apply_request(&mut authority, &mut targets, request, None);
    }
}

fn apply_request(
    authority: &mut DamageAuthority,
    targets: &mut Query<&mut Damageable>,
    request: &DamageRequest,
    travel_distance: Option<f32>,
) {
    let Ok(mut damageable) = targets.get_mut(request.target) else {
        log(&format!(
            "[Shot #{}] hit {:?}: not damageable",
            request.hit.shot, request.target
        ));
        return;
    };

    match authority.apply(request.hit, &mut damageable, &request.info) {
        ApplyResult::Applied => {
            let distance = travel_distance
                .map(|d| format!(" at {:.1}m", d))
                .unwrap_or_default();
            log(&format!(
                "🎯 [Shot #{}] HIT {:?}{}: {:.1} dmg{} → {:.0}/{:.0} HP",
                request.hit.shot,
                request.target,
                distance,
                request.info.damage,
                if request.info.is_headshot { " (HEADSHOT)" } else { "" },
                damageable.current_health(),
                damageable.max_health()
            ));
        }
        ApplyResult::TargetDead => {
            log(&format!(
                "[Shot #{}] hit {:?} absorbed: target already dead",
                request.hit.shot, request.target
            ));
        }
        ApplyResult::Duplicate => {
            log(&format!(
                "[Shot #{}] duplicate hit {} from attacker {} ignored",
                request.hit.shot, request.hit.index, request.hit.attacker
            ));
        }
        ApplyResult::NotAuthoritative => {
            log_warning(&format!(
                "[Shot #{}] apply rejected: not authoritative",
                request.hit.shot
            ));
        }
    }
}

/// Система: heal/reset запросы (authority-gated)
pub fn process_health_requests(
    mut heals: EventReader<HealRequest>,
    mut resets: EventReader<ResetHealthRequest>,
    authority: Res<DamageAuthority>,
    mut targets: Query<&mut Damageable>,
) {
    let role = authority.role();

    for request in heals.read() {
        let Ok(mut damageable) = targets.get_mut(request.target) else {
            continue;
        };
        if !damageable.heal(request.amount, role) {
            log(&format!(
                "Heal {:?} (+{:.1}) rejected (dead or {:?})",
                request.target, request.amount, role
            ));
        }
    }

    for request in resets.read() {
        let Ok(mut damageable) = targets.get_mut(request.target) else {
            continue;
        };
        if damageable.reset(role) {
            log_info(&format!("♻️ {:?} reset to full health", request.target));
        }
    }
}

/// Система: Damageable notices → ECS события, Dead маркер
///
/// Маркер `Dead` ставится при смерти и снимается после reset.
pub fn publish_health_notices(
    mut commands: Commands,
    mut targets: Query<(Entity, &mut Damageable, Has<Dead>)>,
    mut damage_taken: EventWriter<DamageTaken>,
    mut health_changed: EventWriter<HealthChanged>,
    mut entity_died: EventWriter<EntityDied>,
) {
    for (entity, mut damageable, has_dead_marker) in targets.iter_mut() {
        // Deref без DerefMut: change detection не трогаем
        if damageable.has_notices() {
            for notice in damageable.drain_notices() {
                match notice {
                    HealthNotice::Damaged(info) => {
                        damage_taken.write(DamageTaken {
                            target: entity,
                            info,
                        });
                    }
                    HealthNotice::HealthChanged { current, max } => {
                        health_changed.write(HealthChanged {
                            target: entity,
                            current,
                            max,
                        });
                    }
                    HealthNotice::Died { killer } => {
                        log_info(&format!("💀 {:?} died (killer: {:?})", entity, killer));
                        entity_died.write(EntityDied { entity, killer });
                    }
                }
            }
        }

        match (damageable.is_dead(), has_dead_marker) {
            (true, false) => {
                commands.entity(entity).insert(Dead);
            }
            (false, true) => {
                commands.entity(entity).remove::<Dead>();
            }
            _ => {}
        }
    }
}
