use defmt::Format;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::compartment::Compartment;
use crate::dive_step::DiveStep;
use crate::gradient::GradientFactor;
use crate::pressure::Pressure;
use crate::{PlanError, sample_times};

/// Buhlmann ZHL-16C with gradient factors: sixteen tissue compartments
/// integrated sample by sample over each dive step.
///
/// Integration runs forward in time only; every sample mutates the
/// compartment loadings and the running deepest-pressure reference used for
/// gradient factor interpolation.
#[derive(Debug, Clone, Format)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ZhL16cGf {
    compartments: [Compartment; 16],
    gf: GradientFactor,
    p_deep: Pressure,
    sample_rate: f64,
}

impl ZhL16cGf {
    pub const NAME: &'static str = "Buhlmann ZHL16-C + GF";

    // ZHL-16C published coefficients (Buhlmann / Baker)
    pub const N2_HALF_TIMES: [f64; 16] = [
        5.0, 8.0, 12.5, 18.5, 27.0, 38.3, 54.3, 77.0, 109.0, 146.0, 187.0, 239.0, 305.0, 390.0,
        498.0, 635.0,
    ];
    pub const N2_A: [f64; 16] = [
        1.1696, 1.0000, 0.8618, 0.7562, 0.6200, 0.5043, 0.4410, 0.4000, 0.3750, 0.3500, 0.3295,
        0.3065, 0.2835, 0.2610, 0.2480, 0.2327,
    ];
    pub const N2_B: [f64; 16] = [
        0.5578, 0.6514, 0.7222, 0.7825, 0.8126, 0.8434, 0.8693, 0.8910, 0.9092, 0.9222, 0.9319,
        0.9403, 0.9477, 0.9544, 0.9602, 0.9653,
    ];
    pub const HE_HALF_TIMES: [f64; 16] = [
        1.88, 3.02, 4.72, 6.99, 10.21, 14.48, 20.53, 29.11, 41.20, 55.19, 70.69, 90.34, 115.29,
        147.42, 188.24, 240.03,
    ];
    pub const HE_A: [f64; 16] = [
        1.6189, 1.3830, 1.1919, 1.0458, 0.9220, 0.8205, 0.7305, 0.6502, 0.5950, 0.5545, 0.5333,
        0.5189, 0.5181, 0.5176, 0.5172, 0.5119,
    ];
    pub const HE_B: [f64; 16] = [
        0.4770, 0.5747, 0.6527, 0.7223, 0.7582, 0.7957, 0.8279, 0.8553, 0.8757, 0.8903, 0.8997,
        0.9073, 0.9122, 0.9171, 0.9217, 0.9267,
    ];

    /// Compartments start at surface air equilibrium; the sample rate is in
    /// minutes and must be positive.
    pub fn new(gradient_factors: (u8, u8), sample_rate: f64) -> Result<Self, PlanError> {
        if !(sample_rate > 0.0) {
            return Err(PlanError::InvalidSampleRate(sample_rate));
        }
        let gf = GradientFactor::new(gradient_factors.0, gradient_factors.1)?;
        let compartments = core::array::from_fn(|i| {
            Compartment::new(
                Self::N2_HALF_TIMES[i],
                Self::HE_HALF_TIMES[i],
                Self::N2_A[i],
                Self::N2_B[i],
                Self::HE_A[i],
                Self::HE_B[i],
            )
        });
        Ok(ZhL16cGf {
            compartments,
            gf,
            p_deep: Pressure::ATM,
            sample_rate,
        })
    }

    pub fn gradient(&self) -> &GradientFactor {
        &self.gf
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn deepest_pressure(&self) -> Pressure {
        self.p_deep
    }

    pub fn compartments(&self) -> &[Compartment; 16] {
        &self.compartments
    }

    /// Integrates one dive step, sampling its duration half-open at the
    /// sample rate.
    pub fn integrate_dive_step(&mut self, step: &DiveStep) {
        for s in sample_times(step.time, self.sample_rate) {
            self.integrate_sample(step, s);
        }
    }

    fn integrate_sample(&mut self, step: &DiveStep, s: f64) {
        let p_amb = step.pressure_at_sample(s);
        if p_amb > self.p_deep {
            self.p_deep = p_amb;
        }
        let gf = self.gf.at(p_amb, self.p_deep);
        for compartment in self.compartments.iter_mut() {
            compartment.load(&step.gas, p_amb, self.sample_rate);
            compartment.update_tolerated(gf, p_amb);
        }
    }

    /// The shallowest ambient pressure the diver may currently be at: the
    /// maximum tolerated pressure across all compartments, floored at zero.
    pub fn ceiling(&self) -> Pressure {
        let mut ceiling = Pressure::new(0.0);
        for compartment in &self.compartments {
            if compartment.p_tol > ceiling {
                ceiling = compartment.p_tol;
            }
        }
        ceiling
    }
}

#[test]
fn test_invalid_sample_rate_rejected() {
    assert_eq!(
        ZhL16cGf::new((100, 100), 0.0).unwrap_err(),
        PlanError::InvalidSampleRate(0.0)
    );
    assert!(ZhL16cGf::new((100, 100), -0.1).is_err());
    assert!(ZhL16cGf::new((100, 100), f64::NAN).is_err());
}

#[test]
fn test_fresh_model_has_no_ceiling() {
    let model = ZhL16cGf::new((100, 100), 0.1).unwrap();
    assert!(model.ceiling() < Pressure::ATM);
    assert_eq!(model.deepest_pressure(), Pressure::ATM);
}

#[test]
fn test_deepest_pressure_is_monotonic() {
    use crate::gas::Gas;

    let mut model = ZhL16cGf::new((100, 100), 0.1).unwrap();
    let descent = DiveStep::new(0.0, 0.0, 40.0, Gas::air()).unwrap();
    model.integrate_dive_step(&descent);
    // half-open sampling: the last descent sample sits at s = 1.9 of 2.0min
    assert_eq!(model.deepest_pressure(), Pressure::from_depth(38.0));

    let ascent = DiveStep::new(0.0, 40.0, 20.0, Gas::air()).unwrap();
    model.integrate_dive_step(&ascent);
    assert_eq!(model.deepest_pressure(), Pressure::from_depth(40.0));
}

#[test]
fn test_ceiling_nondecreasing_during_descent_and_hold() {
    use crate::gas::Gas;

    let mut model = ZhL16cGf::new((100, 100), 0.1).unwrap();
    let air = Gas::air();
    let mut previous = model.ceiling();

    let descent = DiveStep::new(0.0, 0.0, 40.0, air.clone()).unwrap();
    model.integrate_dive_step(&descent);
    assert!(model.ceiling() >= previous);
    previous = model.ceiling();

    for _ in 0..20 {
        let hold = DiveStep::new(1.0, 40.0, 40.0, air.clone()).unwrap();
        model.integrate_dive_step(&hold);
        assert!(model.ceiling() >= previous);
        previous = model.ceiling();
    }
    // 20 minutes at 40m on air is well past the no-deco limit
    assert!(model.ceiling() > Pressure::ATM);
}
