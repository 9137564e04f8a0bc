//! Weapon configuration: fire control, ammo, catalog (TOML)
//!
//! Каталог: единственное место, откуда оружие получает `Arc<FireProfile>`.
//! Всё валидируется при загрузке: битый профиль не доходит до runtime.

use std::collections::BTreeMap;
use std::sync::Arc;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ballistics::profile::FireProfile;
use crate::error::ConfigError;
use crate::weapon::fire_control::FireControl;
use crate::weapon::systems::Weapon;

/// Магазин + резерв
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmmoConfig {
    pub magazine_size: u32,
    /// Резерв никогда не превышает это значение (pickup клампится)
    pub max_reserve_ammo: u32,
    pub starting_reserve_ammo: u32,
    /// Можно ли перезаряжаться, не расстреляв магазин
    pub allow_partial_reload: bool,
    /// +1 патрон в патроннике при перезарядке непустого магазина
    pub use_chambered_round: bool,
}

impl Default for AmmoConfig {
    fn default() -> Self {
        Self {
            magazine_size: 30,
            max_reserve_ammo: 120,
            starting_reserve_ammo: 90,
            allow_partial_reload: true,
            use_chambered_round: true,
        }
    }
}

impl AmmoConfig {
    pub fn validate(&self, weapon: &str) -> Result<(), ConfigError> {
        if self.magazine_size == 0 {
            return Err(invalid_weapon(weapon, "magazine_size must be > 0"));
        }
        if self.starting_reserve_ammo > self.max_reserve_ammo {
            return Err(invalid_weapon(
                weapon,
                "starting_reserve_ammo exceeds max_reserve_ammo",
            ));
        }
        Ok(())
    }
}

/// Темп, режимы и перезарядка
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireControlConfig {
    /// Выстрелов в минуту (интервал = 60 / fire_rate)
    pub fire_rate: f32,
    pub supports_burst: bool,
    pub supports_auto: bool,
    pub burst_length: u32,
    /// Секунды от начала перезарядки до переноса патронов
    pub reload_duration: f32,
}

impl Default for FireControlConfig {
    fn default() -> Self {
        Self {
            fire_rate: 600.0,
            supports_burst: false,
            supports_auto: false,
            burst_length: 3,
            reload_duration: 2.0,
        }
    }
}

impl FireControlConfig {
    /// Минимальный интервал между выстрелами (секунды)
    pub fn fire_interval(&self) -> f32 {
        60.0 / self.fire_rate
    }

    pub fn validate(&self, weapon: &str) -> Result<(), ConfigError> {
        if !(self.fire_rate > 0.0 && self.fire_rate.is_finite()) {
            return Err(invalid_weapon(weapon, "fire_rate must be > 0"));
        }
        if self.supports_burst && self.burst_length == 0 {
            return Err(invalid_weapon(weapon, "burst_length must be > 0"));
        }
        if !(self.reload_duration >= 0.0 && self.reload_duration.is_finite()) {
            return Err(invalid_weapon(weapon, "reload_duration must be >= 0"));
        }
        Ok(())
    }
}

/// Оружие в каталоге: ссылка на профиль + fire control + опциональные патроны
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponDefinition {
    pub profile: String,
    #[serde(default)]
    pub fire_control: FireControlConfig,
    /// `None` = бесконечные патроны
    #[serde(default)]
    pub ammo: Option<AmmoConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    profiles: BTreeMap<String, FireProfile>,
    #[serde(default)]
    weapons: BTreeMap<String, WeaponDefinition>,
}

/// Каталог профилей и оружия
#[derive(Resource, Debug, Clone, Default)]
pub struct WeaponCatalog {
    profiles: BTreeMap<String, Arc<FireProfile>>,
    weapons: BTreeMap<String, WeaponDefinition>,
}

impl WeaponCatalog {
    /// Парсинг + валидация TOML каталога
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let file: CatalogFile = toml::from_str(source)?;

        let mut catalog = Self::default();
        for (id, mut profile) in file.profiles {
            if profile.name.is_empty() {
                profile.name = id.clone();
            }
            catalog.insert_profile(id, profile)?;
        }
        for (id, weapon) in file.weapons {
            catalog.insert_weapon(id, weapon)?;
        }

        Ok(catalog)
    }

    /// Встроенные пресеты: hitscan винтовка и 9mm пистолет
    pub fn builtin() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            "rifle_hitscan".to_string(),
            Arc::new(FireProfile::rifle_hitscan()),
        );
        profiles.insert("9x19mm".to_string(), Arc::new(FireProfile::pistol_caliber()));

        let mut weapons = BTreeMap::new();
        weapons.insert(
            "carbine".to_string(),
            WeaponDefinition {
                profile: "rifle_hitscan".to_string(),
                fire_control: FireControlConfig {
                    supports_burst: true,
                    supports_auto: true,
                    ..FireControlConfig::default()
                },
                ammo: Some(AmmoConfig::default()),
            },
        );
        weapons.insert(
            "pistol".to_string(),
            WeaponDefinition {
                profile: "9x19mm".to_string(),
                fire_control: FireControlConfig {
                    fire_rate: 400.0,
                    reload_duration: 1.5,
                    ..FireControlConfig::default()
                },
                ammo: Some(AmmoConfig {
                    magazine_size: 15,
                    max_reserve_ammo: 60,
                    starting_reserve_ammo: 45,
                    ..AmmoConfig::default()
                }),
            },
        );

        Self { profiles, weapons }
    }

    pub fn insert_profile(
        &mut self,
        id: impl Into<String>,
        profile: FireProfile,
    ) -> Result<Arc<FireProfile>, ConfigError> {
        profile.validate()?;
        let profile = Arc::new(profile);
        self.profiles.insert(id.into(), profile.clone());
        Ok(profile)
    }

    pub fn insert_weapon(
        &mut self,
        id: impl Into<String>,
        weapon: WeaponDefinition,
    ) -> Result<(), ConfigError> {
        let id = id.into();
        if !self.profiles.contains_key(&weapon.profile) {
            return Err(ConfigError::UnknownProfile {
                weapon: id,
                profile: weapon.profile.clone(),
            });
        }
        weapon.fire_control.validate(&id)?;
        if let Some(ammo) = &weapon.ammo {
            ammo.validate(&id)?;
        }

        self.weapons.insert(id, weapon);
        Ok(())
    }

    pub fn profile(&self, id: &str) -> Option<Arc<FireProfile>> {
        self.profiles.get(id).cloned()
    }

    pub fn weapon(&self, id: &str) -> Option<&WeaponDefinition> {
        self.weapons.get(id)
    }

    pub fn weapon_ids(&self) -> impl Iterator<Item = &str> {
        self.weapons.keys().map(String::as_str)
    }

    /// Собрать компонент `Weapon` для спауна
    pub fn instantiate(&self, id: &str, attacker_id: u64) -> Result<Weapon, ConfigError> {
        let definition = self.weapon(id).ok_or_else(|| ConfigError::InvalidWeapon {
            weapon: id.to_string(),
            reason: "not in catalog".to_string(),
        })?;
        let profile = self
            .profile(&definition.profile)
            .ok_or_else(|| ConfigError::UnknownProfile {
                weapon: id.to_string(),
                profile: definition.profile.clone(),
            })?;

        let fire_control = FireControl::new(
            definition.fire_control.clone(),
            definition.ammo.clone(),
        );
        Ok(Weapon::new(profile, fire_control, attacker_id))
    }
}

fn invalid_weapon(weapon: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidWeapon {
        weapon: weapon.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ballistics::profile::{FlightModel, HeadshotRule};

    const CATALOG: &str = r#"
        [profiles.dmr]
        base_damage = 40.0
        headshot_multiplier = 2.5
        penetration_count = 1
        penetration_damage_multiplier = 0.6
        flight = { mode = "hitscan", range = 250.0 }
        falloff = [
            { distance = 0.0, multiplier = 1.0 },
            { distance = 1.0, multiplier = 0.8 },
        ]

        [profiles.slug]
        base_damage = 80.0
        headshot = "never"
        flight = { mode = "projectile", muzzle_speed = 450.0, gravity_multiplier = 1.5, max_lifetime = 3.0 }

        [weapons.marksman]
        profile = "dmr"

        [weapons.marksman.fire_control]
        fire_rate = 120.0

        [weapons.marksman.ammo]
        magazine_size = 10
        max_reserve_ammo = 40
        starting_reserve_ammo = 20
        use_chambered_round = false

        [weapons.breacher]
        profile = "slug"
    "#;

    #[test]
    fn test_catalog_parses_profiles_and_weapons() {
        let catalog = WeaponCatalog::from_toml_str(CATALOG).expect("valid catalog");

        let dmr = catalog.profile("dmr").expect("dmr profile");
        assert_eq!(dmr.name, "dmr");
        assert_eq!(dmr.base_damage, 40.0);
        assert_eq!(dmr.flight, FlightModel::Hitscan { range: 250.0 });
        assert_eq!(dmr.falloff.keys().len(), 2);
        assert_eq!(dmr.headshot, HeadshotRule::Tag("Head".to_string()));

        let slug = catalog.profile("slug").expect("slug profile");
        assert_eq!(slug.headshot, HeadshotRule::Never);
        assert!(!slug.is_hitscan());

        let marksman = catalog.weapon("marksman").expect("marksman");
        assert_eq!(marksman.fire_control.fire_rate, 120.0);
        let ammo = marksman.ammo.as_ref().expect("ammo");
        assert_eq!(ammo.magazine_size, 10);
        assert!(ammo.allow_partial_reload);
        assert!(!ammo.use_chambered_round);

        // Без [ammo]: бесконечные патроны
        assert!(catalog.weapon("breacher").expect("breacher").ammo.is_none());
    }

    #[test]
    fn test_unknown_profile_rejected() {
        let source = r#"
            [weapons.broken]
            profile = "missing"
        "#;
        assert_eq!(
            WeaponCatalog::from_toml_str(source).unwrap_err(),
            ConfigError::UnknownProfile {
                weapon: "broken".to_string(),
                profile: "missing".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_profile_rejected() {
        let source = r#"
            [profiles.bad]
            base_damage = 10.0
            penetration_damage_multiplier = 2.0
            flight = { mode = "hitscan", range = 50.0 }
        "#;
        assert!(matches!(
            WeaponCatalog::from_toml_str(source),
            Err(ConfigError::InvalidProfile { .. })
        ));
    }

    #[test]
    fn test_parse_error_surfaces() {
        assert!(matches!(
            WeaponCatalog::from_toml_str("profiles = 12"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_invalid_fire_rate_rejected() {
        let config = FireControlConfig {
            fire_rate: 0.0,
            ..FireControlConfig::default()
        };
        assert!(matches!(
            config.validate("zero"),
            Err(ConfigError::InvalidWeapon { .. })
        ));
    }

    #[test]
    fn test_builtin_instantiate() {
        let catalog = WeaponCatalog::builtin();
        let weapon = catalog.instantiate("carbine", 7).expect("carbine");

        assert_eq!(weapon.attacker_id, 7);
        assert!(weapon.profile.is_some());
        assert!(catalog.instantiate("railgun", 7).is_err());
        assert_eq!(catalog.weapon_ids().count(), 2);
    }

    #[test]
    fn test_default_fire_interval() {
        let config = FireControlConfig::default();
        assert!((config.fire_interval() - 0.1).abs() < 1e-6);
    }
}
