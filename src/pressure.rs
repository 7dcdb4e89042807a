use core::fmt;
use core::ops::{Add, Div, Mul, Sub};

use defmt::Format;
use libm::{ceil, floor, pow, round};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{DEPTH_PRECISION, G, P_ATM, P_PRECISION, STOP_INC, WATER_DENSITY};

/// bar of water column per meter of depth
const BAR_PER_METER: f64 = WATER_DENSITY * G * 1e-5;

pub(crate) fn round_to(value: f64, precision: i32) -> f64 {
    let scale = pow(10.0, precision as f64);
    round(value * scale) / scale
}

/// Ambient pressure in bar.
///
/// Every construction rounds to [`P_PRECISION`] decimals, so two pressures
/// reached through different arithmetic paths still compare equal. The value
/// may be transiently negative in tissue tension differences; no validation
/// is applied.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd, Format)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pressure(f64);

impl Pressure {
    /// Atmospheric pressure at sea level.
    pub const ATM: Pressure = Pressure(P_ATM);

    pub fn new(bar: f64) -> Self {
        Pressure(round_to(bar, P_PRECISION))
    }

    pub fn bar(self) -> f64 {
        self.0
    }

    /// Ambient pressure at `depth` meters of seawater.
    pub fn from_depth(depth: f64) -> Self {
        Pressure::new(P_ATM + BAR_PER_METER * depth)
    }

    /// The depth in meters at which this ambient pressure is reached,
    /// rounded to [`DEPTH_PRECISION`] decimals.
    pub fn to_depth(self) -> f64 {
        round_to((self.0 - P_ATM) / BAR_PER_METER, DEPTH_PRECISION)
    }

    /// Snaps to the next *deeper* multiple of the stop increment. Ceilings
    /// are always rounded this way, away from the surface.
    pub fn round_to_deeper_stop(self) -> Self {
        Pressure::from_depth(ceil(self.to_depth() / STOP_INC) * STOP_INC)
    }

    /// Snaps to the next *shallower* multiple of the stop increment, used to
    /// bracket gas switch depths toward the surface.
    pub fn round_to_shallower_stop(self) -> Self {
        Pressure::from_depth(floor(self.to_depth() / STOP_INC) * STOP_INC)
    }
}

impl Add for Pressure {
    type Output = Pressure;

    fn add(self, rhs: Pressure) -> Pressure {
        Pressure::new(self.0 + rhs.0)
    }
}

impl Sub for Pressure {
    type Output = Pressure;

    fn sub(self, rhs: Pressure) -> Pressure {
        Pressure::new(self.0 - rhs.0)
    }
}

impl Mul<f64> for Pressure {
    type Output = Pressure;

    fn mul(self, rhs: f64) -> Pressure {
        Pressure::new(self.0 * rhs)
    }
}

impl Div<f64> for Pressure {
    type Output = Pressure;

    fn div(self, rhs: f64) -> Pressure {
        Pressure::new(self.0 / rhs)
    }
}

/// Ratio of two pressures, unrounded.
impl Div for Pressure {
    type Output = f64;

    fn div(self, rhs: Pressure) -> f64 {
        self.0 / rhs.0
    }
}

impl fmt::Display for Pressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bar", self.0)
    }
}

#[test]
fn test_surface_pressure_is_atmospheric() {
    assert_eq!(Pressure::from_depth(0.0), Pressure::ATM);
}

#[test]
fn test_known_depth_pressures() {
    assert_eq!(Pressure::from_depth(10.0), Pressure::new(2.01387));
    assert_eq!(Pressure::from_depth(40.0), Pressure::new(5.01573));
}

#[test]
fn test_depth_round_trip() {
    for d in [0.0, 3.0, 6.0, 10.0, 21.5, 40.0, 100.0] {
        assert_eq!(Pressure::from_depth(d).to_depth(), d);
    }
}

#[test]
fn test_negative_intermediate_values_are_legal() {
    let diff = Pressure::new(0.5) - Pressure::new(1.5);
    assert_eq!(diff, Pressure::new(-1.0));
}

#[test]
fn test_round_to_deeper_stop() {
    // 1.87m of ceiling snaps down to the 3m stop, never toward the surface
    assert_eq!(
        Pressure::new(1.2).round_to_deeper_stop(),
        Pressure::from_depth(3.0)
    );
    assert_eq!(
        Pressure::from_depth(6.0).round_to_deeper_stop(),
        Pressure::from_depth(6.0)
    );
}

#[test]
fn test_round_to_shallower_stop() {
    assert_eq!(
        Pressure::from_depth(4.0).round_to_shallower_stop(),
        Pressure::from_depth(3.0)
    );
    assert_eq!(
        Pressure::from_depth(21.0).round_to_shallower_stop(),
        Pressure::from_depth(21.0)
    );
}

#[test]
fn test_arithmetic_rounds_on_construction() {
    assert_eq!(Pressure::new(1.000004), Pressure::new(1.0));
    let third = Pressure::new(1.0) / 3.0;
    assert_eq!(third, Pressure::new(0.33333));
}
