use alloc::string::ToString;

use defmt::Format;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::PlanError;
use crate::dive_step::DiveStep;
use crate::pressure::Pressure;
use crate::zhl16c::ZhL16cGf;

/// Fixed registry of the decompression models this planner knows about.
/// Model lookup is by display name so callers can pass a user-supplied
/// string; unknown names fail construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DecoModelKind {
    ZhL16cGf,
}

impl DecoModelKind {
    pub fn from_name(name: &str) -> Result<Self, PlanError> {
        match name {
            ZhL16cGf::NAME => Ok(DecoModelKind::ZhL16cGf),
            _ => Err(PlanError::UnknownModel(name.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DecoModelKind::ZhL16cGf => ZhL16cGf::NAME,
        }
    }

    pub fn build(
        self,
        gradient_factors: (u8, u8),
        sample_rate: f64,
    ) -> Result<DecoModel, PlanError> {
        match self {
            DecoModelKind::ZhL16cGf => Ok(DecoModel::ZhL16cGf(ZhL16cGf::new(
                gradient_factors,
                sample_rate,
            )?)),
        }
    }
}

/// A decompression model instance, dispatched over the registry variants.
#[derive(Debug, Clone, Format)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DecoModel {
    ZhL16cGf(ZhL16cGf),
}

impl DecoModel {
    pub fn kind(&self) -> DecoModelKind {
        match self {
            DecoModel::ZhL16cGf(_) => DecoModelKind::ZhL16cGf,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn sample_rate(&self) -> f64 {
        match self {
            DecoModel::ZhL16cGf(model) => model.sample_rate(),
        }
    }

    pub fn gradient_factors(&self) -> (u8, u8) {
        match self {
            DecoModel::ZhL16cGf(model) => model.gradient().percentages(),
        }
    }

    pub fn integrate_dive_step(&mut self, step: &DiveStep) {
        match self {
            DecoModel::ZhL16cGf(model) => model.integrate_dive_step(step),
        }
    }

    pub fn ceiling(&self) -> Pressure {
        match self {
            DecoModel::ZhL16cGf(model) => model.ceiling(),
        }
    }
}

#[test]
fn test_registry_resolves_known_model() {
    let kind = DecoModelKind::from_name("Buhlmann ZHL16-C + GF").unwrap();
    assert_eq!(kind, DecoModelKind::ZhL16cGf);
    let model = kind.build((30, 80), 0.1).unwrap();
    assert_eq!(model.name(), ZhL16cGf::NAME);
    assert_eq!(model.gradient_factors(), (30, 80));
}

#[test]
fn test_registry_rejects_unknown_model() {
    assert!(matches!(
        DecoModelKind::from_name("VPM-B"),
        Err(PlanError::UnknownModel(_))
    ));
}
