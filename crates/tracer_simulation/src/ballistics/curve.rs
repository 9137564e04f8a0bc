//! Damage falloff curve (distance → multiplier)
//!
//! Piecewise-linear по ключам. Вне диапазона ключей значение зажимается
//! по крайнему ключу: кривая сама решает, есть ли урон за пределами.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Один control point кривой
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    pub distance: f32,
    pub multiplier: f32,
}

impl CurveKey {
    pub const fn new(distance: f32, multiplier: f32) -> Self {
        Self { distance, multiplier }
    }
}

/// В каком домене кривая читает дистанцию
///
/// Hitscan профили нормализуют дистанцию по range (0..1),
/// caliber/projectile профили читают абсолютные метры.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FalloffDomain {
    NormalizedByRange(f32),
    AbsoluteMetres,
}

impl FalloffDomain {
    /// Переводит дистанцию полёта в координату кривой
    pub fn curve_position(&self, travel_distance: f32) -> f32 {
        match *self {
            FalloffDomain::NormalizedByRange(range) => {
                if range <= 0.0 {
                    return 1.0;
                }
                (travel_distance / range).clamp(0.0, 1.0)
            }
            FalloffDomain::AbsoluteMetres => travel_distance.max(0.0),
        }
    }
}

/// Falloff curve
///
/// Инвариант: ключи конечные и отсортированы по distance (неубывающе).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DamageCurve {
    keys: Vec<CurveKey>,
}

impl Default for DamageCurve {
    fn default() -> Self {
        Self::constant(1.0)
    }
}

impl DamageCurve {
    pub fn new(keys: Vec<CurveKey>) -> Result<Self, ConfigError> {
        let curve = Self { keys };
        curve.validate()?;
        Ok(curve)
    }

    /// Кривая без falloff
    pub fn constant(multiplier: f32) -> Self {
        Self {
            keys: vec![CurveKey::new(0.0, multiplier)],
        }
    }

    /// Линейный спад между двумя точками
    pub fn linear(start: f32, start_multiplier: f32, end: f32, end_multiplier: f32) -> Self {
        Self {
            keys: vec![
                CurveKey::new(start, start_multiplier),
                CurveKey::new(end, end_multiplier),
            ],
        }
    }

    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    /// Проверка инварианта (нужна после serde загрузки)
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut previous = f32::NEG_INFINITY;
        for (index, key) in self.keys.iter().enumerate() {
            if !key.distance.is_finite() || !key.multiplier.is_finite() || key.distance < previous {
                return Err(ConfigError::UnsortedCurve { index });
            }
            previous = key.distance;
        }
        Ok(())
    }

    /// Значение кривой в точке `position` (уже в домене кривой)
    pub fn evaluate(&self, position: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 1.0;
        };

        if position <= first.distance {
            return first.multiplier;
        }
        if position >= last.distance {
            return last.multiplier;
        }

        for pair in self.keys.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if position > b.distance {
                continue;
            }
            let span = b.distance - a.distance;
            if span <= f32::EPSILON {
                return b.multiplier;
            }
            let t = (position - a.distance) / span;
            return a.multiplier + (b.multiplier - a.multiplier) * t;
        }

        last.multiplier
    }

    /// Значение кривой для дистанции полёта в заданном домене
    pub fn evaluate_in(&self, domain: FalloffDomain, travel_distance: f32) -> f32 {
        self.evaluate(domain.curve_position(travel_distance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_interpolation() {
        let curve = DamageCurve::linear(0.0, 1.0, 1.0, 0.5);
        assert_eq!(curve.evaluate(0.0), 1.0);
        assert_eq!(curve.evaluate(1.0), 0.5);
        assert!((curve.evaluate(0.5) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_clamps_outside_keys() {
        let curve = DamageCurve::linear(10.0, 1.0, 50.0, 0.2);
        assert_eq!(curve.evaluate(-5.0), 1.0);
        assert_eq!(curve.evaluate(5.0), 1.0);
        assert_eq!(curve.evaluate(500.0), 0.2);
    }

    #[test]
    fn test_zero_beyond_domain_only_when_curve_says_so() {
        let cut_off = DamageCurve::new(vec![
            CurveKey::new(0.0, 1.0),
            CurveKey::new(30.0, 1.0),
            CurveKey::new(31.0, 0.0),
        ])
        .unwrap();
        assert_eq!(cut_off.evaluate(100.0), 0.0);

        let flat = DamageCurve::linear(0.0, 1.0, 30.0, 0.4);
        assert_eq!(flat.evaluate(100.0), 0.4);
    }

    #[test]
    fn test_empty_curve_is_identity() {
        let curve = DamageCurve::new(Vec::new()).unwrap();
        assert_eq!(curve.evaluate(42.0), 1.0);
    }

    #[test]
    fn test_step_key_takes_later_value() {
        let curve = DamageCurve::new(vec![
            CurveKey::new(0.0, 1.0),
            CurveKey::new(10.0, 1.0),
            CurveKey::new(10.0, 0.5),
            CurveKey::new(20.0, 0.5),
        ])
        .unwrap();
        assert_eq!(curve.evaluate(9.0), 1.0);
        assert_eq!(curve.evaluate(15.0), 0.5);
    }

    #[test]
    fn test_rejects_unsorted_keys() {
        let result = DamageCurve::new(vec![CurveKey::new(10.0, 1.0), CurveKey::new(5.0, 0.5)]);
        assert_eq!(result, Err(ConfigError::UnsortedCurve { index: 1 }));

        let nan = DamageCurve::new(vec![CurveKey::new(f32::NAN, 1.0)]);
        assert!(nan.is_err());
    }

    #[test]
    fn test_domains_are_distinct() {
        let curve = DamageCurve::linear(0.0, 1.0, 1.0, 0.5);

        // Hitscan: 50м при range 100м → позиция 0.5
        let normalized = curve.evaluate_in(FalloffDomain::NormalizedByRange(100.0), 50.0);
        assert!((normalized - 0.75).abs() < 1e-6);

        // Caliber: те же 50м читаются как абсолютные метры → за концом кривой
        let absolute = curve.evaluate_in(FalloffDomain::AbsoluteMetres, 50.0);
        assert_eq!(absolute, 0.5);
    }

    #[test]
    fn test_normalized_domain_clamps_past_range() {
        assert_eq!(FalloffDomain::NormalizedByRange(100.0).curve_position(250.0), 1.0);
        assert_eq!(FalloffDomain::NormalizedByRange(100.0).curve_position(-1.0), 0.0);
    }
}
