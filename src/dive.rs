use alloc::vec::Vec;

use defmt::Format;
use libm::round;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::deco_model::{DecoModel, DecoModelKind};
use crate::dive_step::{simplify_steps, DiveStep};
use crate::gas::Gas;
use crate::gas_plan::GasPlan;
use crate::pressure::Pressure;
use crate::{PlanError, ASC_RATE, BOT_SAC, DECO_SAC, MIN_STOP_TIME};

/// Ascent iterations before we declare the schedule divergent. Generous:
/// a week of one-minute stops stays well under it.
const MAX_ASCENT_ITERATIONS: usize = 100_000;

/// One line of the dive table: a merged leg with its depth, duration and
/// cumulative runtime, all rounded to whole units for display.
#[derive(Debug, Clone, Format)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReportRow {
    pub symbol: char,
    pub depth: i32,
    pub time: u32,
    pub runtime: u32,
    pub gas: Gas,
}

/// A dive to be planned: the bottom profile the diver wants, the gases
/// carried, and the decompression model that will shape the ascent.
/// `plan` fills in the ascent schedule; `report` renders the whole dive
/// as a runtime table.
#[derive(Debug, Clone, Format)]
pub struct Dive {
    steps: Vec<DiveStep>,
    ascent: Vec<DiveStep>,
    plan: GasPlan,
    model: DecoModel,
    planned: bool,
}

impl Dive {
    pub fn new(
        steps: Vec<DiveStep>,
        gases: Vec<Gas>,
        model_name: &str,
        gradient_factors: (u8, u8),
        sample_rate: f64,
    ) -> Result<Self, PlanError> {
        let model = DecoModelKind::from_name(model_name)?.build(gradient_factors, sample_rate)?;
        Self::with_model(steps, gases, model)
    }

    /// Builds a dive on an existing model. For repetitive dives, pass the
    /// model recovered from the previous dive via `into_model` so residual
    /// tissue loading carries over.
    pub fn with_model(
        steps: Vec<DiveStep>,
        gases: Vec<Gas>,
        model: DecoModel,
    ) -> Result<Self, PlanError> {
        if steps.is_empty() {
            return Err(PlanError::EmptyProfile);
        }
        Ok(Dive {
            steps,
            ascent: Vec::new(),
            plan: GasPlan::new(gases)?,
            model,
            planned: false,
        })
    }

    pub fn model(&self) -> &DecoModel {
        &self.model
    }

    /// Consumes the dive and hands back the model with its tissue state,
    /// ready to seed the next dive.
    pub fn into_model(self) -> DecoModel {
        self.model
    }

    /// The bottom profile, normalized once planned.
    pub fn steps(&self) -> &[DiveStep] {
        &self.steps
    }

    /// The computed ascent, empty until planned. Fine-grained; use
    /// `report` for the merged table.
    pub fn ascent(&self) -> &[DiveStep] {
        &self.ascent
    }

    pub fn gas_plan(&self) -> &GasPlan {
        &self.plan
    }

    /// Total dive time in minutes, bottom profile plus ascent.
    pub fn runtime(&self) -> f64 {
        self.steps
            .iter()
            .chain(self.ascent.iter())
            .map(|step| step.time)
            .sum()
    }

    /// Runs the profile through the model and computes the ascent
    /// schedule. One-shot: a dive cannot be re-planned because the model
    /// already holds the loading of the first pass.
    pub fn plan(&mut self) -> Result<(), PlanError> {
        if self.planned {
            return Err(PlanError::AlreadyPlanned);
        }
        self.planned = true;

        self.normalize_profile()?;
        for step in &self.steps {
            self.model.integrate_dive_step(step);
            self.plan.consume(step, BOT_SAC)?;
        }
        self.compute_ascent()
    }

    /// Rewrites the profile so every depth change travels at the standard
    /// rate. A leg starting away from the previous depth gets a travel
    /// step inserted ahead of it, and the travel time comes out of the
    /// leg's duration: "40m for 20min" means 20 minutes of runtime, not
    /// 20 minutes at the bottom.
    fn normalize_profile(&mut self) -> Result<(), PlanError> {
        let mut normalized: Vec<DiveStep> = Vec::with_capacity(self.steps.len() * 2);
        let mut depth = 0.0;

        for step in &self.steps {
            if step.start_depth != depth {
                let travel = DiveStep::new(0.0, depth, step.start_depth, step.gas.clone())?;
                let remaining = step.time - travel.time;
                if remaining <= 0.0 {
                    return Err(PlanError::LegTooShort {
                        depth: step.start_depth,
                        travel_time: travel.time,
                    });
                }
                normalized.push(travel);
                normalized.push(DiveStep::new(
                    remaining,
                    step.start_depth,
                    step.end_depth,
                    step.gas.clone(),
                )?);
            } else {
                normalized.push(step.clone());
            }
            depth = step.end_depth;
        }

        self.steps = normalized;
        Ok(())
    }

    /// Walks the diver up from the end of the bottom profile. Each pass
    /// either holds a one-minute stop, creeps one sample shallower toward
    /// the next stop, or ascends straight to the surface, integrating the
    /// model as it goes so later stops see the off-gassing of earlier ones.
    fn compute_ascent(&mut self) -> Result<(), PlanError> {
        let sample_rate = self.model.sample_rate();
        let last = self.steps.last().ok_or(PlanError::EmptyProfile)?;
        let mut p_current = Pressure::from_depth(last.end_depth);
        let mut gas = last.gas.clone();
        let mut iterations = 0usize;

        while p_current > Pressure::ATM {
            iterations += 1;
            if iterations > MAX_ASCENT_ITERATIONS {
                return Err(PlanError::AscentNotConverging);
            }

            let ceiling = self.model.ceiling().round_to_deeper_stop();
            let stop_required = ceiling > Pressure::ATM;

            // the shallowest pressure we may ascend to right now. The
            // ceiling is re-evaluated at every new depth, so stops emerge
            // where it pins the diver and dissolve as it retreats
            let mut p_stop = if stop_required { ceiling } else { Pressure::ATM };
            let switches = self.plan.next_gas_switches(p_current, &gas);
            if let Some((p_switch, _)) = switches.first() {
                if *p_switch > p_stop {
                    p_stop = *p_switch;
                }
            }

            let step = if p_current <= p_stop {
                // already at (or below) the limiting depth: hold a minute,
                // switching gas first if the switch is due right here
                if let Some((p_switch, next_gas)) = switches.first() {
                    if *p_switch == p_current {
                        gas = next_gas.clone();
                    }
                }
                let depth = p_current.to_depth();
                DiveStep::new(MIN_STOP_TIME, depth, depth, gas.clone())?
            } else if stop_required {
                // approach the stop one sample at a time so the model sees
                // the loading picked up on the way up
                let depth = p_current.to_depth();
                let target = f64::max(depth - ASC_RATE * sample_rate, p_stop.to_depth());
                DiveStep::new(0.0, depth, target, gas.clone())?
            } else {
                DiveStep::new(0.0, p_current.to_depth(), p_stop.to_depth(), gas.clone())?
            };

            self.model.integrate_dive_step(&step);
            self.plan.consume(&step, DECO_SAC)?;
            p_current = Pressure::from_depth(step.end_depth);
            self.ascent.push(step);
        }

        // surface exactly, whatever the rounding of the last leg left us at
        if let Some(last) = self.ascent.last() {
            if last.end_depth != 0.0 {
                let step = DiveStep::new(0.0, last.end_depth, 0.0, gas.clone())?;
                self.model.integrate_dive_step(&step);
                self.plan.consume(&step, DECO_SAC)?;
                self.ascent.push(step);
            }
        }

        Ok(())
    }

    /// The dive table: profile and ascent merged into continuous legs,
    /// with whole-minute runtimes accumulated before rounding so the
    /// column never drifts.
    pub fn report(&self) -> Vec<ReportRow> {
        let mut all: Vec<DiveStep> = Vec::with_capacity(self.steps.len() + self.ascent.len());
        all.extend(self.steps.iter().cloned());
        all.extend(self.ascent.iter().cloned());
        let merged = simplify_steps(all);

        let mut runtime = 0.0;
        merged
            .into_iter()
            .map(|step| {
                runtime += step.time;
                ReportRow {
                    symbol: step.kind().symbol(),
                    depth: round(step.end_depth) as i32,
                    time: round(step.time) as u32,
                    runtime: round(runtime) as u32,
                    gas: step.gas,
                }
            })
            .collect()
    }
}

#[test]
fn test_empty_profile_rejected() {
    use crate::zhl16c::ZhL16cGf;
    use crate::SAMPLE_RATE;
    use alloc::vec;

    let err = Dive::new(
        alloc::vec::Vec::new(),
        vec![Gas::air()],
        ZhL16cGf::NAME,
        (30, 80),
        SAMPLE_RATE,
    )
    .unwrap_err();
    assert_eq!(err, PlanError::EmptyProfile);
}

#[test]
fn test_plan_is_one_shot() {
    use crate::zhl16c::ZhL16cGf;
    use crate::SAMPLE_RATE;
    use alloc::vec;

    let steps = vec![DiveStep::new(10.0, 10.0, 10.0, Gas::air()).unwrap()];
    let mut dive = Dive::new(steps, vec![Gas::air()], ZhL16cGf::NAME, (30, 80), SAMPLE_RATE).unwrap();
    dive.plan().unwrap();
    assert_eq!(dive.plan().unwrap_err(), PlanError::AlreadyPlanned);
}

#[test]
fn test_descent_time_comes_out_of_the_leg() {
    use crate::zhl16c::ZhL16cGf;
    use crate::SAMPLE_RATE;
    use alloc::vec;

    let steps = vec![DiveStep::new(20.0, 40.0, 40.0, Gas::air()).unwrap()];
    let mut dive = Dive::new(steps, vec![Gas::air()], ZhL16cGf::NAME, (30, 80), SAMPLE_RATE).unwrap();
    dive.plan().unwrap();

    // 40m at 20m/min is a 2 minute descent, leaving 18 at the bottom
    assert_eq!(dive.steps()[0].start_depth, 0.0);
    assert_eq!(dive.steps()[0].end_depth, 40.0);
    assert_eq!(dive.steps()[0].time, 2.0);
    assert_eq!(dive.steps()[1].time, 18.0);
}

#[test]
fn test_too_short_a_leg_cannot_hide_its_descent() {
    use crate::zhl16c::ZhL16cGf;
    use crate::SAMPLE_RATE;
    use alloc::vec;

    let steps = vec![DiveStep::new(1.0, 40.0, 40.0, Gas::air()).unwrap()];
    let mut dive = Dive::new(steps, vec![Gas::air()], ZhL16cGf::NAME, (30, 80), SAMPLE_RATE).unwrap();
    assert_eq!(
        dive.plan().unwrap_err(),
        PlanError::LegTooShort {
            depth: 40.0,
            travel_time: 2.0
        }
    );
}

#[test]
fn test_travel_time_is_checked_on_every_leg() {
    use crate::SAMPLE_RATE;
    use crate::zhl16c::ZhL16cGf;
    use alloc::vec;

    // the second leg implies a 1 minute ascent from 20m to 10m, which its
    // 0.5 minute duration cannot absorb
    let steps = vec![
        DiveStep::new(10.0, 20.0, 20.0, Gas::air()).unwrap(),
        DiveStep::new(0.5, 10.0, 10.0, Gas::air()).unwrap(),
    ];
    let mut dive = Dive::new(steps, vec![Gas::air()], ZhL16cGf::NAME, (30, 80), SAMPLE_RATE).unwrap();
    assert_eq!(
        dive.plan().unwrap_err(),
        PlanError::LegTooShort {
            depth: 10.0,
            travel_time: 1.0
        }
    );
}
