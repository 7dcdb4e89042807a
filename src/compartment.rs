use defmt::Format;
use libm::pow;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::gas::Gas;
use crate::pressure::Pressure;
use crate::{AIR_FN2, P_ATM};

/// Single-gas exponential approach to equilibrium over `dt` minutes for a
/// compartment with the given half-time.
pub fn inert_gas_pressure(p_init: f64, p_gas: f64, dt: f64, half_time: f64) -> f64 {
    p_init + (p_gas - p_init) * (1.0 - pow(2.0, -dt / half_time))
}

/// One tissue compartment: fixed half-times and Buhlmann a/b coefficients
/// for both inert gases, plus the current loadings and the last tolerated
/// ambient pressure computed for it.
#[derive(Debug, Clone, Copy, Format)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Compartment {
    h_n2: f64,
    h_he: f64,
    a_n2: f64,
    b_n2: f64,
    a_he: f64,
    b_he: f64,
    pub pp_n2: Pressure,
    pub pp_he: Pressure,
    pub p_tol: Pressure,
}

impl Compartment {
    /// A compartment seeded at surface equilibrium breathing air.
    pub fn new(h_n2: f64, h_he: f64, a_n2: f64, b_n2: f64, a_he: f64, b_he: f64) -> Self {
        Compartment {
            h_n2,
            h_he,
            a_n2,
            b_n2,
            a_he,
            b_he,
            pp_n2: Pressure::new(AIR_FN2 * P_ATM),
            pp_he: Pressure::new(0.0),
            p_tol: Pressure::new(0.0),
        }
    }

    /// Updates both inert gas loadings for `dt` minutes breathing `gas` at
    /// `p_amb`, each against its own half-time.
    pub fn load(&mut self, gas: &Gas, p_amb: Pressure, dt: f64) {
        self.pp_n2 = Pressure::new(inert_gas_pressure(
            self.pp_n2.bar(),
            gas.pp_n2(p_amb).bar(),
            dt,
            self.h_n2,
        ));
        self.pp_he = Pressure::new(inert_gas_pressure(
            self.pp_he.bar(),
            gas.pp_he(p_amb).bar(),
            dt,
            self.h_he,
        ));
    }

    /// Recomputes the tolerated ambient pressure from the current loadings,
    /// blending the N2/He coefficients by helium share of the total inert
    /// pressure and scaling the allowed supersaturation by `gf`.
    ///
    /// `r` is clamped to 0 when no inert gas is loaded at all, which can
    /// only happen transiently when starting on a pure-oxygen mix.
    pub fn update_tolerated(&mut self, gf: f64, p_amb: Pressure) {
        let p_inert = self.pp_n2.bar() + self.pp_he.bar();
        let r = if p_inert > 0.0 {
            self.pp_he.bar() / p_inert
        } else {
            0.0
        };

        let a = self.a_n2 * (1.0 - r) + self.a_he * r;
        let b = self.b_n2 * (1.0 - r) + self.b_he * r;

        let p_tol = (p_inert - a) * b;
        self.p_tol = Pressure::new(p_amb.bar() + gf * (p_tol - p_amb.bar()));
    }
}

#[test]
fn test_no_time_no_change() {
    let p = inert_gas_pressure(2.0, 4.0, 0.0, 5.0);
    assert_eq!(p, 2.0);
}

#[test]
fn test_one_half_time_closes_half_the_gap() {
    let p = inert_gas_pressure(2.0, 4.0, 5.0, 5.0);
    assert!((p - 3.0).abs() < 1e-12);
}

#[test]
fn test_load_approaches_inspired_pressure_monotonically() {
    let mut c = Compartment::new(5.0, 1.88, 1.1696, 0.5578, 1.6189, 0.4770);
    let air = Gas::air();
    let p_amb = Pressure::from_depth(40.0);
    let inspired = air.pp_n2(p_amb);

    let mut previous = c.pp_n2;
    for _ in 0..600 {
        c.load(&air, p_amb, 0.1);
        assert!(c.pp_n2 >= previous, "loading must never decrease");
        assert!(c.pp_n2 <= inspired, "loading must never overshoot");
        previous = c.pp_n2;
    }
    // one hour is 12 half-times, the fast compartment is effectively
    // saturated (the rounding grid stops it a hair below the asymptote)
    assert!(inspired.bar() - c.pp_n2.bar() < 1e-3);
}

#[test]
fn test_zero_inert_gas_clamps_helium_share() {
    let mut c = Compartment::new(5.0, 1.88, 1.1696, 0.5578, 1.6189, 0.4770);
    c.pp_n2 = Pressure::new(0.0);
    c.pp_he = Pressure::new(0.0);
    c.update_tolerated(1.0, Pressure::ATM);
    // falls back to the pure-N2 coefficients instead of dividing 0 by 0
    assert_eq!(
        c.p_tol,
        Pressure::new((0.0 - 1.1696) * 0.5578)
    );
}

#[test]
fn test_tolerated_pressure_with_unit_gradient_factor() {
    let mut c = Compartment::new(5.0, 1.88, 1.1696, 0.5578, 1.6189, 0.4770);
    c.pp_n2 = Pressure::new(4.0);
    c.pp_he = Pressure::new(0.0);
    c.update_tolerated(1.0, Pressure::from_depth(10.0));
    assert_eq!(c.p_tol, Pressure::new((4.0 - 1.1696) * 0.5578));
}
