#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

use alloc::string::String;

pub mod compartment;
pub mod deco_model;
pub mod dive;
pub mod dive_step;
pub mod gas;
pub mod gas_plan;
pub mod gradient;
pub mod pressure;
pub mod zhl16c;

// surface air composition
pub const AIR_FO2: f64 = 0.21;
pub const AIR_FN2: f64 = 0.79;
pub const AIR_FHE: f64 = 0.0;

// physics
pub const G: f64 = 9.81; // m/s^2
pub const WATER_DENSITY: f64 = 1020.0; // kg/m^3
pub const P_ATM: f64 = 1.01325; // bar

// every pressure/depth result is rounded to these precisions to keep
// long integrations from accumulating floating point drift
pub const P_PRECISION: i32 = 5;
pub const DEPTH_PRECISION: i32 = 2;

// dive planning defaults
pub const SAMPLE_RATE: f64 = 0.1; // min
pub const ASC_RATE: f64 = 10.0; // m/min
pub const DES_RATE: f64 = 20.0; // m/min
pub const STOP_INC: f64 = 3.0; // m
pub const LAST_STOP: f64 = 6.0; // m
pub const MIN_STOP_TIME: f64 = 1.0; // min

// breathability limits
pub const MIN_PPO2: f64 = 0.18; // bar
pub const DECO_PPO2: f64 = 1.61362; // bar, ppO2 reached exactly at the 6m stop
pub const BOT_PPO2: f64 = 1.4; // bar
pub const MAX_PPN2: f64 = 5.6; // bar

// surface air consumption
pub const BOT_SAC: f64 = 20.0; // L/min
pub const DECO_SAC: f64 = 15.0; // L/min

/// Errors surfaced synchronously from constructors and setters. A failed
/// construction never leaves a partially usable value behind.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    #[error("sample rate must be > 0, got {0}")]
    InvalidSampleRate(f64),
    #[error("unknown decompression model `{0}`")]
    UnknownModel(String),
    #[error("gradient factors must be within 0..=100, got {0}/{1}")]
    InvalidGradientFactors(u8, u8),
    #[error("gas fractions must be within [0, 1] and sum to 1, got O2 {o2} He {he}")]
    InvalidGasMix { o2: f64, he: f64 },
    #[error("at least one breathing gas is required")]
    EmptyGasList,
    #[error("at least one planned dive step is required")]
    EmptyProfile,
    #[error("depth cannot be negative, got {0}")]
    NegativeDepth(f64),
    #[error("time cannot be negative, got {0}")]
    NegativeTime(f64),
    #[error("gas consumption needs non-negative time and SAC, got time {time} sac {sac}")]
    InvalidConsumption { time: f64, sac: f64 },
    #[error("leg at {depth}m is shorter than the {travel_time} min of travel it implies")]
    LegTooShort { depth: f64, travel_time: f64 },
    #[error("plan() was already called on this dive")]
    AlreadyPlanned,
    #[error("ascent did not converge to the surface")]
    AscentNotConverging,
}

/// Half-open sample times `[0, stop)` spaced `step` apart. Times are derived
/// by multiplication rather than accumulation so they do not drift over long
/// segments.
pub(crate) fn sample_times(stop: f64, step: f64) -> SampleTimes {
    SampleTimes { stop, step, n: 0 }
}

pub(crate) struct SampleTimes {
    stop: f64,
    step: f64,
    n: u64,
}

impl Iterator for SampleTimes {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let t = self.n as f64 * self.step;
        if t < self.stop {
            self.n += 1;
            Some(t)
        } else {
            None
        }
    }
}

#[test]
fn test_sample_times_half_open() {
    let samples: alloc::vec::Vec<f64> = sample_times(1.0, 0.1).collect();
    assert_eq!(samples.len(), 10);
    assert_eq!(samples[0], 0.0);
    assert!(samples[9] < 1.0);
}

#[test]
fn test_sample_times_excludes_stop() {
    // 20 * 0.1 lands at or above 2.0 in f64, the half-open range must drop it
    let samples: alloc::vec::Vec<f64> = sample_times(2.0, 0.1).collect();
    assert_eq!(samples.len(), 20);
}
