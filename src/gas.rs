use core::fmt;

use defmt::Format;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::pressure::{Pressure, round_to};
use crate::{AIR_FHE, AIR_FN2, AIR_FO2, DECO_PPO2, MAX_PPN2, MIN_PPO2, PlanError};

/// A breathing gas mixture. Composition is fixed at construction; the only
/// mutable state is the cumulative consumption booked against it while the
/// simulation breathes it.
///
/// Two gases are equal when their (O2, He) fractions are equal, regardless
/// of how much of each has been consumed.
#[derive(Debug, Clone, Format)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Gas {
    frac_o2: f64,
    frac_he: f64,
    frac_n2: f64,
    consumption: f64,
}

impl PartialEq for Gas {
    fn eq(&self, other: &Self) -> bool {
        self.frac_o2 == other.frac_o2 && self.frac_he == other.frac_he
    }
}

impl Gas {
    pub fn new(frac_o2: f64, frac_he: f64) -> Result<Self, PlanError> {
        let frac_n2 = 1.0 - (frac_o2 + frac_he);
        let valid = (0.0..=1.0).contains(&frac_o2)
            && (0.0..=1.0).contains(&frac_he)
            && frac_n2 >= -1e-9;
        if !valid {
            return Err(PlanError::InvalidGasMix {
                o2: frac_o2,
                he: frac_he,
            });
        }
        Ok(Gas {
            frac_o2,
            frac_he,
            frac_n2: if frac_n2 < 0.0 { 0.0 } else { frac_n2 },
            consumption: 0.0,
        })
    }

    pub fn air() -> Self {
        Gas {
            frac_o2: AIR_FO2,
            frac_he: AIR_FHE,
            frac_n2: AIR_FN2,
            consumption: 0.0,
        }
    }

    pub fn frac_o2(&self) -> f64 {
        self.frac_o2
    }

    pub fn frac_he(&self) -> f64 {
        self.frac_he
    }

    pub fn frac_n2(&self) -> f64 {
        self.frac_n2
    }

    pub fn pp_o2(&self, p_amb: Pressure) -> Pressure {
        p_amb * self.frac_o2
    }

    pub fn pp_n2(&self, p_amb: Pressure) -> Pressure {
        p_amb * self.frac_n2
    }

    pub fn pp_he(&self, p_amb: Pressure) -> Pressure {
        p_amb * self.frac_he
    }

    /// Narcotic potency of the mix expressed as the ambient pressure of air
    /// with the same nitrogen narcotic effect (standard END approximation).
    pub fn equivalent_narcotic_pressure(&self, p_amb: Pressure) -> Pressure {
        self.pp_n2(p_amb) / AIR_FO2
    }

    /// The deepest ambient pressure at which this mix keeps its ppO2 at or
    /// below `target_ppo2` (oxygen toxicity bound).
    pub fn max_operating_pressure(&self, target_ppo2: f64) -> Pressure {
        Pressure::new(target_ppo2 / self.frac_o2)
    }

    /// The shallowest ambient pressure at which this mix still delivers
    /// `target_ppo2` (hypoxia bound for lean mixes).
    pub fn min_operating_pressure(&self, target_ppo2: f64) -> Pressure {
        Pressure::new(target_ppo2 / self.frac_o2)
    }

    /// True when the mix is neither hypoxic nor toxic at `p_amb` and its
    /// nitrogen partial pressure stays under the narcotic limit.
    pub fn is_breathable(&self, p_amb: Pressure) -> bool {
        if self.frac_o2 <= 0.0 {
            return false;
        }
        p_amb >= self.min_operating_pressure(MIN_PPO2)
            && p_amb <= self.max_operating_pressure(DECO_PPO2)
            && self.pp_n2(p_amb).bar() <= MAX_PPN2
    }

    /// Books `p_amb * time * sac` liters of surface-equivalent volume.
    pub fn consume(&mut self, p_amb: Pressure, time: f64, sac: f64) -> Result<(), PlanError> {
        if time < 0.0 || sac < 0.0 {
            return Err(PlanError::InvalidConsumption { time, sac });
        }
        self.consumption += p_amb.bar() * time * sac;
        Ok(())
    }

    /// Surface-equivalent liters breathed so far. Compare against cylinder
    /// capacity to detect exhaustion; the planner itself does not enforce
    /// cylinder limits.
    pub fn consumption(&self) -> f64 {
        self.consumption
    }

    pub fn reset_consumption(&mut self) {
        self.consumption = 0.0;
    }

    /// Synthesizes the mix whose ppO2 hits `target_ppo2` at `depth` and
    /// whose narcotic pressure matches air at `end` depth, helium making up
    /// the difference. Fractions are rounded to the nearest 10% so the
    /// result is a realistic blend; helium never goes negative.
    pub fn best_mix(depth: f64, end: f64, target_ppo2: f64) -> Result<Self, PlanError> {
        let p_amb = Pressure::from_depth(depth);
        let pp_n2 = Pressure::from_depth(end).bar() * AIR_FN2;

        let frac_o2 = target_ppo2 / p_amb.bar();
        let frac_he = 1.0 - (pp_n2 / p_amb.bar() + frac_o2);

        let frac_o2 = round_to(frac_o2, 1);
        let frac_he = round_to(if frac_he < 0.0 { 0.0 } else { frac_he }, 1);

        Gas::new(frac_o2, frac_he)
    }
}

impl fmt::Display for Gas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.frac_he > 0.0 {
            write!(
                f,
                "Tx {:.0}/{:.0}",
                self.frac_o2 * 100.0,
                self.frac_he * 100.0
            )
        } else if self.frac_o2 == AIR_FO2 {
            write!(f, "Air")
        } else {
            write!(f, "Nx {:.0}", self.frac_o2 * 100.0)
        }
    }
}

#[test]
fn test_gas_equality_ignores_consumption() {
    let mut a = Gas::new(0.21, 0.0).unwrap();
    let b = Gas::new(0.21, 0.0).unwrap();
    a.consume(Pressure::ATM, 10.0, 20.0).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, Gas::new(0.32, 0.0).unwrap());
}

#[test]
fn test_invalid_fractions_rejected() {
    assert!(Gas::new(-0.1, 0.0).is_err());
    assert!(Gas::new(1.2, 0.0).is_err());
    assert!(Gas::new(0.6, 0.6).is_err());
}

#[test]
fn test_partial_pressures() {
    let air = Gas::air();
    let p = Pressure::new(2.0);
    assert_eq!(air.pp_o2(p), Pressure::new(0.42));
    assert_eq!(air.pp_n2(p), Pressure::new(1.58));
    assert_eq!(air.pp_he(p), Pressure::new(0.0));
}

#[test]
fn test_equivalent_narcotic_pressure_of_air() {
    // for air the END pressure must reproduce pn2 / 0.21
    let air = Gas::air();
    let p = Pressure::new(2.0);
    assert_eq!(
        air.equivalent_narcotic_pressure(p),
        Pressure::new(1.58 / 0.21)
    );
}

#[test]
fn test_operating_pressure_bounds() {
    let nx50 = Gas::new(0.5, 0.0).unwrap();
    assert_eq!(nx50.max_operating_pressure(1.6), Pressure::new(3.2));
    assert_eq!(nx50.min_operating_pressure(0.18), Pressure::new(0.36));
    assert!(nx50.is_breathable(Pressure::new(2.0)));
    assert!(!nx50.is_breathable(Pressure::new(4.0)));
}

#[test]
fn test_narcotic_cap_rules_out_deep_air() {
    let air = Gas::air();
    // air's operating window alone allows 7.68 bar, the ppN2 cap cuts
    // it off earlier: 7.2 bar puts ppN2 at 5.688, past the 5.6 limit
    assert!(Pressure::new(7.2) < air.max_operating_pressure(DECO_PPO2));
    assert!(air.pp_n2(Pressure::new(7.2)).bar() > MAX_PPN2);
    assert!(!air.is_breathable(Pressure::new(7.2)));
    assert!(air.is_breathable(Pressure::new(7.0)));
}

#[test]
fn test_hypoxic_mix_not_breathable_at_surface() {
    let tx10_70 = Gas::new(0.10, 0.70).unwrap();
    assert!(!tx10_70.is_breathable(Pressure::ATM));
    assert!(tx10_70.is_breathable(Pressure::from_depth(60.0)));
}

#[test]
fn test_consume_accumulates() {
    let mut air = Gas::air();
    air.consume(Pressure::new(2.0), 10.0, 20.0).unwrap();
    air.consume(Pressure::new(1.0), 5.0, 20.0).unwrap();
    assert_eq!(air.consumption(), 500.0);
    air.reset_consumption();
    assert_eq!(air.consumption(), 0.0);
}

#[test]
fn test_consume_rejects_negative_inputs() {
    let mut air = Gas::air();
    assert!(air.consume(Pressure::ATM, -1.0, 20.0).is_err());
    assert!(air.consume(Pressure::ATM, 1.0, -20.0).is_err());
}

#[test]
fn test_best_mix_rounds_to_blendable_fractions() {
    let mix = Gas::best_mix(40.0, 30.0, 1.4).unwrap();
    assert_eq!(mix.frac_o2(), 0.3);
    assert_eq!(mix.frac_he(), 0.1);
}

#[test]
fn test_best_mix_never_goes_negative_on_helium() {
    // at the 6m stop pure oxygen hits the deco ppO2 exactly, leaving no
    // room for helium; the fraction floors at zero instead of going negative
    let mix = Gas::best_mix(6.0, 6.0, DECO_PPO2).unwrap();
    assert_eq!(mix.frac_o2(), 1.0);
    assert_eq!(mix.frac_he(), 0.0);
}

#[cfg(feature = "std")]
#[test]
fn test_gas_names() {
    use alloc::string::ToString;
    assert_eq!(Gas::air().to_string(), "Air");
    assert_eq!(Gas::new(0.5, 0.0).unwrap().to_string(), "Nx 50");
    assert_eq!(Gas::new(0.21, 0.35).unwrap().to_string(), "Tx 21/35");
}
