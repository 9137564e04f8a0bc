//! Error taxonomy
//!
//! Ничто здесь не фатально: каждая ошибка означает "действие не произошло"
//! плюс диагностику для вызывающего.

use thiserror::Error;

/// Некорректная конфигурация (профиль, кривая, ammo data, TOML)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("falloff curve keys must be finite and sorted by distance (key {index})")]
    UnsortedCurve { index: usize },

    #[error("invalid fire profile '{profile}': {reason}")]
    InvalidProfile { profile: String, reason: String },

    #[error("invalid weapon '{weapon}': {reason}")]
    InvalidWeapon { weapon: String, reason: String },

    #[error("weapon '{weapon}' references unknown profile '{profile}'")]
    UnknownProfile { weapon: String, profile: String },

    #[error("catalog parse error: {0}")]
    Parse(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

/// Почему fire request отклонён
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FireError {
    #[error("weapon has no fire profile assigned")]
    MissingProfile,

    #[error("weapon is not ready (empty or reloading)")]
    NotReady,

    #[error("fire rate limit not elapsed")]
    RateLimited,
}

/// Сбой collision oracle, деградирует до "no hit" / "not a headshot"
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("collision oracle unavailable")]
    Unavailable,

    #[error("unknown collider {0}")]
    UnknownCollider(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_error_converts_to_parse() {
        let err = toml::from_str::<toml::Value>("= broken").unwrap_err();
        let config_err: ConfigError = err.into();
        assert!(matches!(config_err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_error_messages() {
        let err = ConfigError::UnknownProfile {
            weapon: "rifle".into(),
            profile: "missing".into(),
        };
        assert_eq!(
            err.to_string(),
            "weapon 'rifle' references unknown profile 'missing'"
        );
        assert_eq!(OracleError::UnknownCollider(7).to_string(), "unknown collider 7");
    }
}
