//! FireControl — per-weapon state machine (ammo, fire mode, reload)
//!
//! Переходы:
//! ```text
//! Ready ──fire (ammo > 0)──▶ Ready | Empty
//! Ready | Empty ──reload (reserve > 0)──▶ Reloading ──complete──▶ Ready | Empty
//! ```
//!
//! Время приходит снаружи (`now`, секунды симуляции). Continuation shots
//! (Burst/Auto) не таймеры, а `next_shot_at`, который забирает `tick`.
//! Release trigger и начало перезарядки отменяют continuation.

use serde::{Deserialize, Serialize};

use crate::error::FireError;
use crate::logger::log;
use crate::weapon::config::{AmmoConfig, FireControlConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FireMode {
    #[default]
    Semi,
    Burst,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WeaponState {
    #[default]
    Ready,
    Empty,
    Reloading,
}

/// Notification для UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponNotice {
    AmmoChanged { current: u32, reserve: u32 },
    StateChanged(WeaponState),
}

#[derive(Debug, Clone)]
pub struct FireControl {
    config: FireControlConfig,
    ammo: Option<AmmoConfig>,
    initialized: bool,
    ammo_in_magazine: u32,
    ammo_in_reserve: u32,
    state: WeaponState,
    fire_mode: FireMode,
    burst_rounds_remaining: u32,
    last_fire: Option<f32>,
    /// Следующий continuation shot (Burst/Auto), пока trigger зажат
    next_shot_at: Option<f32>,
    reload_complete_at: Option<f32>,
    notices: Vec<WeaponNotice>,
}

impl FireControl {
    pub fn new(config: FireControlConfig, ammo: Option<AmmoConfig>) -> Self {
        Self {
            config,
            ammo,
            initialized: false,
            ammo_in_magazine: 0,
            ammo_in_reserve: 0,
            state: WeaponState::Ready,
            fire_mode: FireMode::Semi,
            burst_rounds_remaining: 0,
            last_fire: None,
            next_shot_at: None,
            reload_complete_at: None,
            notices: Vec::new(),
        }
    }

    /// Equip: полный магазин + стартовый резерв.
    ///
    /// Повторный вызов: no-op (состояние переживает unequip/equip).
    pub fn initialize(&mut self) -> bool {
        if self.initialized {
            return false;
        }
        self.initialized = true;

        if let Some(ammo) = &self.ammo {
            self.ammo_in_magazine = ammo.magazine_size;
            self.ammo_in_reserve = ammo.starting_reserve_ammo;
            self.state = WeaponState::Ready;
            self.push_ammo_changed();
            self.notices.push(WeaponNotice::StateChanged(self.state));
        }
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn config(&self) -> &FireControlConfig {
        &self.config
    }

    pub fn has_ammo_system(&self) -> bool {
        self.ammo.is_some()
    }

    pub fn ammo_in_magazine(&self) -> u32 {
        self.ammo_in_magazine
    }

    pub fn ammo_in_reserve(&self) -> u32 {
        self.ammo_in_reserve
    }

    pub fn state(&self) -> WeaponState {
        self.state
    }

    pub fn fire_mode(&self) -> FireMode {
        self.fire_mode
    }

    pub fn burst_rounds_remaining(&self) -> u32 {
        self.burst_rounds_remaining
    }

    pub fn last_fire(&self) -> Option<f32> {
        self.last_fire
    }

    /// Trigger зажат и continuation запланирован
    pub fn is_firing(&self) -> bool {
        self.next_shot_at.is_some()
    }

    /// Без ammo system: всегда true
    pub fn can_fire(&self) -> bool {
        if self.ammo.is_none() {
            return true;
        }
        self.state == WeaponState::Ready && self.ammo_in_magazine > 0
    }

    /// Trigger press: первый выстрел серии.
    ///
    /// `Ok(())` = один патрон выпущен, вызывающий резолвит выстрел.
    pub fn try_fire(&mut self, now: f32) -> Result<(), FireError> {
        if !self.can_fire() {
            return Err(FireError::NotReady);
        }

        if let Some(last) = self.last_fire {
            if now - last < self.config.fire_interval() {
                return Err(FireError::RateLimited);
            }
        }

        self.burst_rounds_remaining = self.config.burst_length;
        self.discharge(now);
        Ok(())
    }

    /// Trigger release: отменяет запланированный continuation.
    ///
    /// Уже выпущенные пули не отзываются.
    pub fn release_trigger(&mut self) -> bool {
        self.next_shot_at.take().is_some()
    }

    /// Continuation shots и завершение перезарядки к моменту `now`.
    ///
    /// Возвращает число выстрелов, которые надо резолвить.
    pub fn tick(&mut self, now: f32) -> u32 {
        if let Some(complete_at) = self.reload_complete_at {
            if now >= complete_at {
                self.complete_reload();
            }
        }

        let mut shots = 0;
        while let Some(at) = self.next_shot_at {
            if at > now {
                break;
            }
            self.next_shot_at = None;
            if !self.can_fire() {
                break;
            }
            self.discharge(at);
            shots += 1;
        }
        shots
    }

    /// Выпустить один патрон и запланировать следующий (Burst/Auto)
    fn discharge(&mut self, now: f32) {
        self.last_fire = Some(now);

        if self.ammo.is_some() {
            self.ammo_in_magazine = self.ammo_in_magazine.saturating_sub(1);
            self.push_ammo_changed();
            if self.ammo_in_magazine == 0 {
                self.set_state(WeaponState::Empty);
            }
        }

        self.next_shot_at = None;
        match self.fire_mode {
            FireMode::Semi => return,
            FireMode::Burst => {
                self.burst_rounds_remaining = self.burst_rounds_remaining.saturating_sub(1);
                if self.burst_rounds_remaining == 0 {
                    return;
                }
            }
            FireMode::Auto => {}
        }

        // Магазин пуст, серия обрывается
        if self.ammo.is_some() && self.ammo_in_magazine == 0 {
            return;
        }

        self.next_shot_at = Some(now + self.config.fire_interval());
    }

    /// Ёмкость с учётом патрона в патроннике
    pub fn max_magazine_capacity(&self) -> u32 {
        let Some(ammo) = &self.ammo else {
            return 0;
        };

        if ammo.use_chambered_round && self.ammo_in_magazine > 0 {
            ammo.magazine_size + 1
        } else {
            ammo.magazine_size
        }
    }

    /// Без ammo system перезарядка не нужна, false
    pub fn can_reload(&self) -> bool {
        let Some(ammo) = &self.ammo else {
            return false;
        };

        if !matches!(self.state, WeaponState::Ready | WeaponState::Empty) {
            return false;
        }
        if self.ammo_in_reserve == 0 {
            return false;
        }
        if !ammo.allow_partial_reload && self.ammo_in_magazine > 0 {
            return false;
        }

        self.ammo_in_magazine < self.max_magazine_capacity()
    }

    /// Начать перезарядку. Патроны переносятся через `reload_duration`.
    pub fn begin_reload(&mut self, now: f32) -> bool {
        if !self.can_reload() {
            return false;
        }

        self.release_trigger();
        self.set_state(WeaponState::Reloading);

        let duration = self.config.reload_duration;
        if duration <= 0.0 {
            self.complete_reload();
        } else {
            self.reload_complete_at = Some(now + duration);
        }
        true
    }

    /// Перенос `min(needed, reserve)` патронов из резерва в магазин
    pub fn complete_reload(&mut self) -> bool {
        if self.ammo.is_none() || self.state != WeaponState::Reloading {
            return false;
        }
        self.reload_complete_at = None;

        let needed = self
            .max_magazine_capacity()
            .saturating_sub(self.ammo_in_magazine);
        let loaded = needed.min(self.ammo_in_reserve);

        self.ammo_in_magazine += loaded;
        self.ammo_in_reserve -= loaded;

        log(&format!(
            "🔄 Reload complete: +{} → {}/{}",
            loaded, self.ammo_in_magazine, self.ammo_in_reserve
        ));

        self.push_ammo_changed();
        let state = if self.ammo_in_magazine > 0 {
            WeaponState::Ready
        } else {
            WeaponState::Empty
        };
        self.set_state(state);
        true
    }

    /// Semi → Burst → Auto → Semi (пропуская неподдерживаемые)
    pub fn cycle_fire_mode(&mut self) -> FireMode {
        self.fire_mode = match self.fire_mode {
            FireMode::Semi if self.config.supports_burst => {
                self.burst_rounds_remaining = self.config.burst_length;
                FireMode::Burst
            }
            FireMode::Semi | FireMode::Burst if self.config.supports_auto => FireMode::Auto,
            _ => FireMode::Semi,
        };
        self.fire_mode
    }

    /// Pickup: резерв клампится к `max_reserve_ammo`. Возвращает сколько взято.
    pub fn add_reserve_ammo(&mut self, amount: u32) -> u32 {
        let Some(ammo) = &self.ammo else {
            return 0;
        };

        let before = self.ammo_in_reserve;
        self.ammo_in_reserve = before.saturating_add(amount).min(ammo.max_reserve_ammo);
        let added = self.ammo_in_reserve.saturating_sub(before);
        if added > 0 {
            self.push_ammo_changed();
        }
        added
    }

    pub fn drain_notices(&mut self) -> Vec<WeaponNotice> {
        std::mem::take(&mut self.notices)
    }

    pub fn has_notices(&self) -> bool {
        !self.notices.is_empty()
    }

    fn set_state(&mut self, state: WeaponState) {
        if self.state == state {
            return;
        }
        self.state = state;
        self.notices.push(WeaponNotice::StateChanged(state));
    }

    fn push_ammo_changed(&mut self) {
        self.notices.push(WeaponNotice::AmmoChanged {
            current: self.ammo_in_magazine,
            reserve: self.ammo_in_reserve,
        });
    }
}
