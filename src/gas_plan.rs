use alloc::vec::Vec;
use core::cmp::Ordering;

use defmt::Format;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dive_step::DiveStep;
use crate::gas::Gas;
use crate::pressure::Pressure;
use crate::{PlanError, STOP_INC};

/// The set of gases available on a dive. Owns the canonical `Gas` instances
/// that accumulate consumption, deduplicated by composition.
#[derive(Debug, Clone, Format)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GasPlan {
    gases: Vec<Gas>,
}

impl GasPlan {
    pub fn new(gases: Vec<Gas>) -> Result<Self, PlanError> {
        if gases.is_empty() {
            return Err(PlanError::EmptyGasList);
        }
        let mut unique: Vec<Gas> = Vec::with_capacity(gases.len());
        for gas in gases {
            if !unique.contains(&gas) {
                unique.push(gas);
            }
        }
        Ok(GasPlan { gases: unique })
    }

    pub fn gases(&self) -> &[Gas] {
        &self.gases
    }

    /// The gases breathable at `p_amb`, best first: highest ppO2, then
    /// highest ppHe, as the proxy for the deco/narcosis tradeoff.
    pub fn best_gases(&self, p_amb: Pressure) -> Vec<Gas> {
        let mut best: Vec<Gas> = self
            .gases
            .iter()
            .filter(|gas| gas.is_breathable(p_amb))
            .cloned()
            .collect();
        best.sort_by(|a, b| {
            let ka = (a.pp_o2(p_amb).bar(), a.pp_he(p_amb).bar());
            let kb = (b.pp_o2(p_amb).bar(), b.pp_he(p_amb).bar());
            kb.partial_cmp(&ka).unwrap_or(Ordering::Equal)
        });
        best
    }

    /// Upcoming gas switches for an ascent from `p_amb` breathing
    /// `current`: walks from the next shallower stop depth toward the
    /// surface in stop increments and records every change of best gas.
    /// Switch pressures are strictly decreasing.
    pub fn next_gas_switches(&self, p_amb: Pressure, current: &Gas) -> Vec<(Pressure, Gas)> {
        let mut switches: Vec<(Pressure, Gas)> = Vec::new();
        let mut selected = current.clone();
        let mut p = p_amb.round_to_shallower_stop();

        while p > Pressure::ATM {
            if let Some(best) = self.best_gases(p).into_iter().next() {
                if best != selected {
                    selected = best.clone();
                    switches.push((p, best));
                }
            }
            p = Pressure::from_depth(p.to_depth() - STOP_INC);
        }

        switches
    }

    /// Books the step's consumption on the matching plan gas, adopting the
    /// gas into the plan if it is not listed yet.
    pub fn consume(&mut self, step: &DiveStep, sac: f64) -> Result<(), PlanError> {
        let p_avg = Pressure::from_depth(step.average_depth());
        match self.gases.iter_mut().find(|gas| **gas == step.gas) {
            Some(gas) => gas.consume(p_avg, step.time, sac),
            None => {
                let mut gas = step.gas.clone();
                gas.consume(p_avg, step.time, sac)?;
                self.gases.push(gas);
                Ok(())
            }
        }
    }
}

#[test]
fn test_empty_gas_list_rejected() {
    assert_eq!(
        GasPlan::new(alloc::vec::Vec::new()).unwrap_err(),
        PlanError::EmptyGasList
    );
}

#[test]
fn test_duplicate_gases_removed() {
    use alloc::vec;

    let plan = GasPlan::new(vec![Gas::air(), Gas::air(), Gas::new(0.5, 0.0).unwrap()]).unwrap();
    assert_eq!(plan.gases().len(), 2);
}

#[test]
fn test_best_gases_prefers_oxygen_then_helium() {
    use alloc::vec;

    let air = Gas::air();
    let nx50 = Gas::new(0.5, 0.0).unwrap();
    let tx21_30 = Gas::new(0.21, 0.30).unwrap();
    let plan = GasPlan::new(vec![air.clone(), nx50.clone(), tx21_30.clone()]).unwrap();

    // at 6m everything is breathable, the richest mix wins
    let best = plan.best_gases(Pressure::from_depth(6.0));
    assert_eq!(best[0], nx50);
    // air and trimix tie on ppO2, helium breaks the tie
    assert_eq!(best[1], tx21_30);
    assert_eq!(best[2], air);

    // at 40m the nitrox 50 is beyond its operating pressure
    let best = plan.best_gases(Pressure::from_depth(40.0));
    assert!(!best.contains(&nx50));
}

#[test]
fn test_switch_pressures_strictly_decreasing() {
    use alloc::vec;

    let air = Gas::air();
    let nx50 = Gas::new(0.5, 0.0).unwrap();
    let oxygen = Gas::new(1.0, 0.0).unwrap();
    let plan = GasPlan::new(vec![air.clone(), nx50, oxygen]).unwrap();

    let switches = plan.next_gas_switches(Pressure::from_depth(40.0), &air);
    assert!(!switches.is_empty());
    for pair in switches.windows(2) {
        assert!(pair[1].0 < pair[0].0);
    }
    // every switch is shallower than where we started
    assert!(switches[0].0 <= Pressure::from_depth(40.0));
}

#[test]
fn test_consume_books_on_matching_plan_gas() {
    use alloc::vec;

    let mut plan = GasPlan::new(vec![Gas::air()]).unwrap();
    let step = DiveStep::new(10.0, 20.0, 20.0, Gas::air()).unwrap();
    plan.consume(&step, 20.0).unwrap();
    let expected = Pressure::from_depth(20.0).bar() * 10.0 * 20.0;
    assert_eq!(plan.gases()[0].consumption(), expected);
}

#[test]
fn test_consume_adopts_unknown_gas() {
    use alloc::vec;

    let mut plan = GasPlan::new(vec![Gas::air()]).unwrap();
    let nx50 = Gas::new(0.5, 0.0).unwrap();
    let step = DiveStep::new(1.0, 6.0, 6.0, nx50.clone()).unwrap();
    plan.consume(&step, 15.0).unwrap();
    assert_eq!(plan.gases().len(), 2);
    assert!(plan.gases()[1].consumption() > 0.0);
}
