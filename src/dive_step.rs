use core::fmt;

use alloc::vec::Vec;
use defmt::Format;
use libm::round;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::gas::Gas;
use crate::pressure::{Pressure, round_to};
use crate::{ASC_RATE, DES_RATE, MIN_STOP_TIME, P_PRECISION, PlanError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StepKind {
    Descent,
    Const,
    Ascent,
}

impl StepKind {
    pub fn symbol(self) -> char {
        match self {
            StepKind::Descent => '▼',
            StepKind::Const => '-',
            StepKind::Ascent => '▲',
        }
    }
}

/// One leg of a dive: depths in meters, duration in minutes, and the gas
/// breathed throughout. A zero duration at construction means "derive the
/// duration from the standard ascent/descent rate"; zero is never stored.
#[derive(Debug, Clone, PartialEq, Format)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DiveStep {
    pub start_depth: f64,
    pub end_depth: f64,
    pub time: f64,
    pub gas: Gas,
}

impl DiveStep {
    pub fn new(time: f64, start_depth: f64, end_depth: f64, gas: Gas) -> Result<Self, PlanError> {
        if start_depth < 0.0 {
            return Err(PlanError::NegativeDepth(start_depth));
        }
        if end_depth < 0.0 {
            return Err(PlanError::NegativeDepth(end_depth));
        }
        if time < 0.0 {
            return Err(PlanError::NegativeTime(time));
        }

        let depth_change = end_depth - start_depth;
        let time = if time == 0.0 {
            if depth_change < 0.0 {
                -depth_change / ASC_RATE
            } else if depth_change > 0.0 {
                depth_change / DES_RATE
            } else {
                MIN_STOP_TIME
            }
        } else {
            time
        };

        Ok(DiveStep {
            start_depth,
            end_depth,
            time,
            gas,
        })
    }

    pub fn depth_change(&self) -> f64 {
        self.end_depth - self.start_depth
    }

    pub fn kind(&self) -> StepKind {
        let change = self.depth_change();
        if change < 0.0 {
            StepKind::Ascent
        } else if change > 0.0 {
            StepKind::Descent
        } else {
            StepKind::Const
        }
    }

    /// Depth change per minute, negative while ascending.
    pub fn rate(&self) -> f64 {
        self.depth_change() / self.time
    }

    pub fn average_depth(&self) -> f64 {
        (self.start_depth + self.end_depth) / 2.0
    }

    /// Ambient pressure at time `s` into the leg, interpolating depth
    /// linearly between the endpoints.
    pub fn pressure_at_sample(&self, s: f64) -> Pressure {
        let depth = self.start_depth + (s / self.time) * self.depth_change();
        Pressure::from_depth(depth)
    }

    /// True when this step continues `previous` with the same rate and gas,
    /// so the pair can be reported as one leg. Rates are compared rounded,
    /// since a merged step's duration accumulates float error that would
    /// otherwise break a long run of identical micro-steps.
    pub fn is_continuous(&self, previous: &DiveStep) -> bool {
        self.start_depth == previous.end_depth
            && round_to(self.rate(), P_PRECISION) == round_to(previous.rate(), P_PRECISION)
            && self.gas == previous.gas
    }

    /// Absorbs `next` into this step.
    pub fn extend(&mut self, next: &DiveStep) {
        self.time += next.time;
        self.end_depth = next.end_depth;
    }
}

/// Run-length encodes continuous steps so a minute-by-minute ascent reads
/// as a handful of legs instead of a flood of micro-steps.
pub fn simplify_steps(steps: Vec<DiveStep>) -> Vec<DiveStep> {
    let mut merged: Vec<DiveStep> = Vec::new();
    for step in steps {
        match merged.last_mut() {
            Some(previous) if step.is_continuous(previous) => previous.extend(&step),
            _ => merged.push(step),
        }
    }
    merged
}

impl fmt::Display for DiveStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}m {} {}m {}min {}",
            round(self.start_depth) as i64,
            self.kind().symbol(),
            round(self.end_depth) as i64,
            round(self.time) as i64,
            self.gas
        )
    }
}

#[test]
fn test_negative_inputs_rejected() {
    assert!(DiveStep::new(1.0, -1.0, 10.0, Gas::air()).is_err());
    assert!(DiveStep::new(1.0, 10.0, -1.0, Gas::air()).is_err());
    assert!(DiveStep::new(-1.0, 0.0, 10.0, Gas::air()).is_err());
}

#[test]
fn test_zero_time_derives_from_rates() {
    let descent = DiveStep::new(0.0, 0.0, 40.0, Gas::air()).unwrap();
    assert_eq!(descent.time, 2.0);
    assert_eq!(descent.kind(), StepKind::Descent);

    let ascent = DiveStep::new(0.0, 30.0, 0.0, Gas::air()).unwrap();
    assert_eq!(ascent.time, 3.0);
    assert_eq!(ascent.kind(), StepKind::Ascent);

    let hold = DiveStep::new(0.0, 12.0, 12.0, Gas::air()).unwrap();
    assert_eq!(hold.time, MIN_STOP_TIME);
    assert_eq!(hold.kind(), StepKind::Const);
}

#[test]
fn test_pressure_interpolates_linearly() {
    let step = DiveStep::new(2.0, 0.0, 40.0, Gas::air()).unwrap();
    assert_eq!(step.pressure_at_sample(0.0), Pressure::ATM);
    assert_eq!(step.pressure_at_sample(1.0), Pressure::from_depth(20.0));
    assert_eq!(step.pressure_at_sample(2.0), Pressure::from_depth(40.0));
}

#[test]
fn test_simplify_merges_continuous_steps() {
    use alloc::vec;

    let air = Gas::air();
    let steps = vec![
        DiveStep::new(0.1, 12.0, 11.0, air.clone()).unwrap(),
        DiveStep::new(0.1, 11.0, 10.0, air.clone()).unwrap(),
        DiveStep::new(0.1, 10.0, 9.0, air.clone()).unwrap(),
        DiveStep::new(1.0, 9.0, 9.0, air.clone()).unwrap(),
        DiveStep::new(1.0, 9.0, 9.0, air.clone()).unwrap(),
    ];
    let merged = simplify_steps(steps);
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].start_depth, 12.0);
    assert_eq!(merged[0].end_depth, 9.0);
    assert!((merged[0].time - 0.3).abs() < 1e-12);
    assert_eq!(merged[1].time, 2.0);
}

#[test]
fn test_gas_change_breaks_continuity() {
    let first = DiveStep::new(1.0, 9.0, 9.0, Gas::air()).unwrap();
    let second = DiveStep::new(1.0, 9.0, 9.0, Gas::new(0.5, 0.0).unwrap()).unwrap();
    assert!(!second.is_continuous(&first));
}
