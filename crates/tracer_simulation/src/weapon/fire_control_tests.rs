//! Tests for FireControl state machine.

#[cfg(test)]
mod tests {
    use crate::error::FireError;
    use crate::weapon::config::{AmmoConfig, FireControlConfig};
    use crate::weapon::fire_control::{FireControl, FireMode, WeaponNotice, WeaponState};

    fn rifle(ammo: AmmoConfig) -> FireControl {
        let mut control = FireControl::new(FireControlConfig::default(), Some(ammo));
        control.initialize();
        control.drain_notices();
        control
    }

    fn full_auto() -> FireControl {
        let config = FireControlConfig {
            supports_burst: true,
            supports_auto: true,
            ..FireControlConfig::default()
        };
        let mut control = FireControl::new(config, Some(AmmoConfig::default()));
        control.initialize();
        control
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let mut control = FireControl::new(FireControlConfig::default(), Some(AmmoConfig::default()));
        assert!(control.initialize());
        assert_eq!(control.ammo_in_magazine(), 30);
        assert_eq!(control.ammo_in_reserve(), 90);

        control.try_fire(0.0).expect("first shot");
        assert!(!control.initialize());
        assert_eq!(control.ammo_in_magazine(), 29);

        let notices = control.drain_notices();
        assert_eq!(
            notices[..2],
            [
                WeaponNotice::AmmoChanged {
                    current: 30,
                    reserve: 90
                },
                WeaponNotice::StateChanged(WeaponState::Ready),
            ]
        );
    }

    #[test]
    fn test_uninitialized_weapon_cannot_fire() {
        let mut control = FireControl::new(FireControlConfig::default(), Some(AmmoConfig::default()));
        assert!(!control.can_fire());
        assert_eq!(control.try_fire(0.0), Err(FireError::NotReady));
    }

    #[test]
    fn test_fire_rate_gating() {
        // 600 rpm → 100ms интервал
        let mut control = rifle(AmmoConfig::default());

        assert_eq!(control.try_fire(0.0), Ok(()));
        assert_eq!(control.try_fire(0.05), Err(FireError::RateLimited));
        assert_eq!(control.ammo_in_magazine(), 29);

        assert_eq!(control.try_fire(0.15), Ok(()));
        assert_eq!(control.ammo_in_magazine(), 28);
    }

    #[test]
    fn test_empty_magazine_scenario() {
        let mut control = rifle(AmmoConfig::default());

        for shot in 0..30 {
            let now = shot as f32 * 0.2;
            assert_eq!(control.try_fire(now), Ok(()), "shot {}", shot);
        }

        assert_eq!(control.ammo_in_magazine(), 0);
        assert_eq!(control.state(), WeaponState::Empty);
        assert!(!control.can_fire());
        assert_eq!(control.try_fire(100.0), Err(FireError::NotReady));
    }

    #[test]
    fn test_reload_without_chambered_round() {
        let mut control = rifle(AmmoConfig {
            use_chambered_round: false,
            ..AmmoConfig::default()
        });

        for shot in 0..20 {
            control.try_fire(shot as f32 * 0.2).expect("shot");
        }
        assert_eq!(control.ammo_in_magazine(), 10);

        assert!(control.begin_reload(10.0));
        assert_eq!(control.state(), WeaponState::Reloading);
        assert!(!control.can_fire());

        // reload_duration = 2s
        control.tick(11.0);
        assert_eq!(control.state(), WeaponState::Reloading);
        control.tick(12.0);

        assert_eq!(control.ammo_in_magazine(), 30);
        assert_eq!(control.ammo_in_reserve(), 70);
        assert_eq!(control.state(), WeaponState::Ready);
    }

    #[test]
    fn test_chambered_round_adds_capacity() {
        let mut control = rifle(AmmoConfig::default());
        control.try_fire(0.0).expect("shot");

        assert_eq!(control.max_magazine_capacity(), 31);
        assert!(control.begin_reload(1.0));
        assert!(control.complete_reload());

        // 29 в магазине + 2 = 31
        assert_eq!(control.ammo_in_magazine(), 31);
        assert_eq!(control.ammo_in_reserve(), 88);
    }

    #[test]
    fn test_reload_from_empty_has_no_chamber_bonus() {
        let mut control = rifle(AmmoConfig {
            magazine_size: 2,
            ..AmmoConfig::default()
        });
        control.try_fire(0.0).expect("shot");
        control.try_fire(0.2).expect("shot");
        assert_eq!(control.state(), WeaponState::Empty);
        assert_eq!(control.max_magazine_capacity(), 2);

        assert!(control.begin_reload(1.0));
        assert!(control.complete_reload());
        assert_eq!(control.ammo_in_magazine(), 2);
        assert_eq!(control.state(), WeaponState::Ready);
    }

    #[test]
    fn test_reload_limited_by_reserve() {
        let mut control = rifle(AmmoConfig {
            magazine_size: 10,
            starting_reserve_ammo: 3,
            use_chambered_round: false,
            ..AmmoConfig::default()
        });
        for shot in 0..10 {
            control.try_fire(shot as f32 * 0.2).expect("shot");
        }

        assert!(control.begin_reload(5.0));
        control.tick(7.0);
        assert_eq!(control.ammo_in_magazine(), 3);
        assert_eq!(control.ammo_in_reserve(), 0);
        assert!(!control.can_reload());
    }

    #[test]
    fn test_can_reload_rules() {
        // Полный магазин
        let control = rifle(AmmoConfig {
            use_chambered_round: false,
            ..AmmoConfig::default()
        });
        assert!(!control.can_reload());

        // С патронником полный магазин дозаряжается до +1
        let chambered = rifle(AmmoConfig::default());
        assert!(chambered.can_reload());

        // Без резерва
        let mut dry = rifle(AmmoConfig {
            starting_reserve_ammo: 0,
            ..AmmoConfig::default()
        });
        dry.try_fire(0.0).expect("shot");
        assert!(!dry.can_reload());

        // Partial reload запрещён
        let mut strict = rifle(AmmoConfig {
            allow_partial_reload: false,
            ..AmmoConfig::default()
        });
        strict.try_fire(0.0).expect("shot");
        assert!(!strict.can_reload());

        // Без ammo system перезарядка не имеет смысла
        let infinite = FireControl::new(FireControlConfig::default(), None);
        assert!(!infinite.can_reload());
    }

    #[test]
    fn test_reload_while_reloading_rejected() {
        let mut control = rifle(AmmoConfig::default());
        control.try_fire(0.0).expect("shot");

        assert!(control.begin_reload(1.0));
        assert!(!control.begin_reload(1.5));
        assert_eq!(control.state(), WeaponState::Reloading);
    }

    #[test]
    fn test_infinite_ammo_always_fires() {
        let mut control = FireControl::new(FireControlConfig::default(), None);
        control.initialize();

        for shot in 0..100 {
            assert_eq!(control.try_fire(shot as f32 * 0.2), Ok(()));
        }
        assert!(control.can_fire());
        assert!(!control.has_notices());
    }

    #[test]
    fn test_cycle_fire_mode() {
        let mut control = full_auto();
        assert_eq!(control.fire_mode(), FireMode::Semi);
        assert_eq!(control.cycle_fire_mode(), FireMode::Burst);
        assert_eq!(control.cycle_fire_mode(), FireMode::Auto);
        assert_eq!(control.cycle_fire_mode(), FireMode::Semi);

        let mut semi_only = FireControl::new(FireControlConfig::default(), None);
        assert_eq!(semi_only.cycle_fire_mode(), FireMode::Semi);

        let mut no_burst = FireControl::new(
            FireControlConfig {
                supports_auto: true,
                ..FireControlConfig::default()
            },
            None,
        );
        assert_eq!(no_burst.cycle_fire_mode(), FireMode::Auto);
    }

    #[test]
    fn test_semi_fires_once_per_press() {
        let mut control = full_auto();
        control.try_fire(0.0).expect("shot");

        assert!(!control.is_firing());
        assert_eq!(control.tick(1.0), 0);
        assert_eq!(control.ammo_in_magazine(), 29);
    }

    #[test]
    fn test_burst_stops_after_burst_length() {
        let mut control = full_auto();
        control.cycle_fire_mode();
        assert_eq!(control.fire_mode(), FireMode::Burst);

        control.try_fire(0.0).expect("shot");
        assert!(control.is_firing());

        let continuation = control.tick(0.15) + control.tick(0.25) + control.tick(0.35);
        assert_eq!(continuation, 2);
        assert_eq!(control.ammo_in_magazine(), 27);
        assert!(!control.is_firing());
    }

    #[test]
    fn test_auto_until_release() {
        let mut control = full_auto();
        control.cycle_fire_mode();
        control.cycle_fire_mode();
        assert_eq!(control.fire_mode(), FireMode::Auto);

        control.try_fire(0.0).expect("shot");
        assert_eq!(control.tick(0.15), 1);
        assert_eq!(control.tick(0.25), 1);

        assert!(control.release_trigger());
        assert_eq!(control.tick(0.45), 0);
        assert_eq!(control.ammo_in_magazine(), 27);
    }

    #[test]
    fn test_auto_stops_on_empty_magazine() {
        let config = FireControlConfig {
            supports_auto: true,
            ..FireControlConfig::default()
        };
        let mut control = FireControl::new(
            config,
            Some(AmmoConfig {
                magazine_size: 3,
                ..AmmoConfig::default()
            }),
        );
        control.initialize();
        control.cycle_fire_mode();

        control.try_fire(0.0).expect("shot");
        // Догоняющий tick выпускает все запланированные выстрелы
        assert_eq!(control.tick(1.0), 2);
        assert_eq!(control.state(), WeaponState::Empty);
        assert!(!control.is_firing());
    }

    #[test]
    fn test_reload_cancels_continuation() {
        let mut control = full_auto();
        control.cycle_fire_mode();
        control.cycle_fire_mode();

        control.try_fire(0.0).expect("shot");
        assert!(control.begin_reload(0.05));
        assert!(!control.is_firing());
        assert_eq!(control.tick(0.5), 0);
    }

    #[test]
    fn test_add_reserve_ammo_clamps() {
        let mut control = rifle(AmmoConfig::default());

        assert_eq!(control.add_reserve_ammo(20), 20);
        assert_eq!(control.ammo_in_reserve(), 110);
        assert_eq!(control.add_reserve_ammo(50), 10);
        assert_eq!(control.ammo_in_reserve(), 120);
        assert_eq!(control.add_reserve_ammo(5), 0);

        let notices = control.drain_notices();
        assert_eq!(notices.len(), 2);
    }
}
