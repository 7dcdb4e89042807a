use defmt::Format;
use libm::round;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::PlanError;
use crate::pressure::Pressure;

/// Gradient factor pair: allowed supersaturation fraction interpolated
/// linearly from `low` at the deepest pressure reached to `high` at the
/// surface.
#[derive(Debug, Clone, Copy, Format)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GradientFactor {
    low: f64,
    high: f64,
}

impl GradientFactor {
    pub fn new(low: u8, high: u8) -> Result<Self, PlanError> {
        if low > 100 || high > 100 {
            return Err(PlanError::InvalidGradientFactors(low, high));
        }
        Ok(GradientFactor {
            low: low as f64 / 100.0,
            high: high as f64 / 100.0,
        })
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn percentages(&self) -> (u8, u8) {
        (
            round(self.low * 100.0) as u8,
            round(self.high * 100.0) as u8,
        )
    }

    /// Gradient factor at `p_amb`, with `p_deep` the deepest ambient
    /// pressure reached so far. Before any descent `p_deep` equals the
    /// atmosphere and the interpolation would divide by zero, so `high`
    /// applies.
    pub fn at(&self, p_amb: Pressure, p_deep: Pressure) -> f64 {
        if p_deep == Pressure::ATM {
            return self.high;
        }
        self.high + ((p_amb - Pressure::ATM) / (p_deep - Pressure::ATM)) * (self.low - self.high)
    }
}

#[test]
fn test_out_of_range_rejected() {
    assert!(GradientFactor::new(101, 80).is_err());
    assert!(GradientFactor::new(30, 120).is_err());
    assert!(GradientFactor::new(0, 100).is_ok());
}

#[test]
fn test_surface_start_returns_high() {
    let gf = GradientFactor::new(30, 80).unwrap();
    assert_eq!(gf.at(Pressure::ATM, Pressure::ATM), 0.8);
}

#[test]
fn test_interpolation_endpoints() {
    let gf = GradientFactor::new(30, 80).unwrap();
    let p_deep = Pressure::from_depth(40.0);
    assert!((gf.at(p_deep, p_deep) - 0.3).abs() < 1e-12);
    assert!((gf.at(Pressure::ATM, p_deep) - 0.8).abs() < 1e-12);
}

#[test]
fn test_midwater_interpolation() {
    let gf = GradientFactor::new(20, 80).unwrap();
    let p_deep = Pressure::from_depth(40.0);
    let p_mid = Pressure::from_depth(20.0);
    let value = gf.at(p_mid, p_deep);
    assert!(value > 0.2 && value < 0.8);
    // halfway in pressure means halfway in gradient factor
    assert!((value - 0.5).abs() < 1e-9);
}
