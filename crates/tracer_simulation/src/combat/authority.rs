//! DamageAuthority — кто имеет право мутировать health
//!
//! Правило: health мутирует ровно один раз и только на authoritative instance.
//! - Offline / Server → применяет урон локально
//! - Client → не трогает health, форвардит `DamageRequest` на authority
//!
//! Authority ведёт ledger применённых `HitId` (attacker + shot + index): hit,
//! который authority увидел сам и получил ещё раз форвардом от клиента,
//! применяется один раз.

use std::collections::{HashSet, VecDeque};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ballistics::profile::HitId;
use crate::combat::damage::DamageInfo;
use crate::combat::damageable::Damageable;

/// Сколько последних HitId помнит ledger
///
/// Это окно дедупликации: форвард, пришедший после того, как его id вытеснили
/// более новые hits, применится повторно.
pub const DEFAULT_LEDGER_CAPACITY: usize = 4096;

/// Роль процесса в сессии
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NetRole {
    /// Единственная симуляция (singleplayer)
    #[default]
    Offline,
    /// Authoritative host в сетевой сессии
    Server,
    /// Non-authoritative наблюдатель
    Client,
}

impl NetRole {
    pub fn is_authoritative(self) -> bool {
        matches!(self, NetRole::Offline | NetRole::Server)
    }
}

/// Куда идёт hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageRoute {
    ApplyLocal,
    Forward,
}

/// Результат `DamageAuthority::apply`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyResult {
    Applied,
    /// Цель уже мертва (hit поглощён)
    TargetDead,
    /// Этот HitId уже применён
    Duplicate,
    NotAuthoritative,
}

/// Damage payload для authority (wire-level)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageRequest {
    pub hit: HitId,
    pub target: Entity,
    pub info: DamageInfo,
}

/// Outbound: non-authoritative процесс отдаёт hit транспорту
#[derive(Event, Debug, Clone, Copy)]
pub struct DamageForwarded(pub DamageRequest);

/// Inbound: транспорт доставил hit на authority
#[derive(Event, Debug, Clone, Copy)]
pub struct DamageRequestReceived(pub DamageRequest);

/// Лечение (pickup, ability)
#[derive(Event, Debug, Clone, Copy)]
pub struct HealRequest {
    pub target: Entity,
    pub amount: f32,
}

/// Респаун: health = max, снимает Dead
#[derive(Event, Debug, Clone, Copy)]
pub struct ResetHealthRequest {
    pub target: Entity,
}

/// Роль процесса + ledger применённых hits
///
/// Ledger ограничен `capacity` последними id (FIFO), так что exactly-once
/// гарантируется только внутри этого окна.
#[derive(Resource, Debug, Clone)]
pub struct DamageAuthority {
    role: NetRole,
    applied: HashSet<HitId>,
    order: VecDeque<HitId>,
    capacity: usize,
}

impl Default for DamageAuthority {
    fn default() -> Self {
        Self::new(NetRole::Offline)
    }
}

impl DamageAuthority {
    pub fn new(role: NetRole) -> Self {
        Self::with_capacity(role, DEFAULT_LEDGER_CAPACITY)
    }

    pub fn with_capacity(role: NetRole, capacity: usize) -> Self {
        Self {
            role,
            applied: HashSet::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn role(&self) -> NetRole {
        self.role
    }

    pub fn set_role(&mut self, role: NetRole) {
        self.role = role;
    }

    pub fn route(&self) -> DamageRoute {
        if self.role.is_authoritative() {
            DamageRoute::ApplyLocal
        } else {
            DamageRoute::Forward
        }
    }

    pub fn was_applied(&self, hit: HitId) -> bool {
        self.applied.contains(&hit)
    }

    /// Применить hit к цели (exactly-once по HitId)
    pub fn apply(&mut self, hit: HitId, target: &mut Damageable, info: &DamageInfo) -> ApplyResult {
        if !self.role.is_authoritative() {
            return ApplyResult::NotAuthoritative;
        }
        if self.applied.contains(&hit) {
            return ApplyResult::Duplicate;
        }

        // HitId сгорает даже если цель мертва: повтор не должен попасть в респаун
        self.remember(hit);

        if target.take_damage(info, self.role) {
            ApplyResult::Applied
        } else {
            ApplyResult::TargetDead
        }
    }

    fn remember(&mut self, hit: HitId) {
        if self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.applied.remove(&oldest);
            }
        }
        self.applied.insert(hit);
        self.order.push_back(hit);
    }
}
