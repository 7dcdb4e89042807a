use diveplan::PlanError;
use diveplan::dive::Dive;
use diveplan::dive_step::DiveStep;
use diveplan::gas::Gas;
use diveplan::zhl16c::ZhL16cGf;
use diveplan::SAMPLE_RATE;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn air_dive(depth: f64, time: f64, gf: (u8, u8)) -> Dive {
    let steps = vec![DiveStep::new(time, depth, depth, Gas::air()).unwrap()];
    Dive::new(steps, vec![Gas::air()], ZhL16cGf::NAME, gf, SAMPLE_RATE).unwrap()
}

fn rows(dive: &Dive) -> Vec<(char, i32, u32, u32)> {
    dive.report()
        .into_iter()
        .map(|r| (r.symbol, r.depth, r.time, r.runtime))
        .collect()
}

#[test]
fn test_shallow_dive_ascends_directly() {
    let mut dive = air_dive(10.0, 10.0, (30, 80));
    dive.plan().unwrap();

    assert_eq!(
        rows(&dive),
        vec![('▼', 10, 1, 1), ('-', 10, 10, 10), ('▲', 0, 1, 11)],
        "10m/10min is well inside no-deco limits, no stop may appear"
    );
    assert!((dive.runtime() - 11.0).abs() < 1e-9);
}

#[test]
fn test_deco_dive_requires_stops() {
    let mut dive = air_dive(40.0, 20.0, (100, 100));
    dive.plan().unwrap();

    assert_eq!(
        rows(&dive),
        vec![
            ('▼', 40, 2, 2),
            ('-', 40, 18, 20),
            ('▲', 6, 3, 23),
            ('-', 6, 2, 25),
            ('▲', 3, 0, 26),
            ('-', 3, 7, 33),
            ('▲', 0, 0, 33),
        ]
    );
}

#[test]
fn test_gradient_factors_lengthen_the_schedule() {
    let mut conservative = air_dive(40.0, 20.0, (30, 80));
    conservative.plan().unwrap();

    // stops migrate deeper and grow under low gradient factors
    let stops: Vec<(i32, u32)> = conservative
        .report()
        .into_iter()
        .skip(2)
        .filter(|r| r.symbol == '-')
        .map(|r| (r.depth, r.time))
        .collect();
    assert_eq!(stops, vec![(9, 1), (6, 3), (3, 13)]);
    assert!((conservative.runtime() - 41.0).abs() < 1e-6);

    let mut permissive = air_dive(40.0, 20.0, (100, 100));
    permissive.plan().unwrap();
    assert!(conservative.runtime() > permissive.runtime());
}

#[test]
fn test_multilevel_profile_gets_travel_legs() {
    let steps = vec![
        DiveStep::new(10.0, 20.0, 20.0, Gas::air()).unwrap(),
        DiveStep::new(5.0, 10.0, 10.0, Gas::air()).unwrap(),
    ];
    let mut dive = Dive::new(
        steps,
        vec![Gas::air()],
        ZhL16cGf::NAME,
        (30, 80),
        SAMPLE_RATE,
    )
    .unwrap();
    dive.plan().unwrap();

    assert_eq!(
        rows(&dive),
        vec![
            ('▼', 20, 1, 1),
            ('-', 20, 9, 10),
            ('▲', 10, 1, 11),
            ('-', 10, 4, 15),
            ('▲', 0, 1, 16),
        ]
    );
}

#[test]
fn test_ascent_always_reaches_surface() {
    let mut rng = StdRng::seed_from_u64(11);

    for _ in 0..100 {
        let depth: f64 = rng.random_range(10.0..60.0);
        let time: f64 = rng.random_range((depth / 20.0 + 1.1)..40.0);
        let gf_low: u8 = rng.random_range(30..=100);
        let gf_high: u8 = rng.random_range(gf_low.max(70)..=100);

        let mut dive = air_dive(depth, time, (gf_low, gf_high));
        dive.plan().unwrap_or_else(|e| {
            panic!(
                "dive {}m/{}min GF {}/{} failed: {}",
                depth, time, gf_low, gf_high, e
            )
        });

        let last = dive.ascent().last().expect("ascent must not be empty");
        assert_eq!(last.end_depth, 0.0, "ascent must end at the surface");
    }
}

#[test]
fn test_extreme_gradient_factors_fail_loudly() {
    // factors this conservative cannot off-gas below their own ceiling on
    // air; the planner must error out instead of looping forever
    let steps = vec![DiveStep::new(24.0, 8.0, 8.0, Gas::air()).unwrap()];
    let mut dive = Dive::new(steps, vec![Gas::air()], ZhL16cGf::NAME, (10, 20), 1.0).unwrap();
    assert_eq!(dive.plan().unwrap_err(), PlanError::AscentNotConverging);
}

#[test]
fn test_consumption_covers_bottom_and_ascent() {
    use diveplan::pressure::Pressure;
    use diveplan::BOT_SAC;

    let mut dive = air_dive(40.0, 20.0, (100, 100));
    dive.plan().unwrap();

    // the bottom phase alone books descent plus 18 minutes at depth
    let descent = Pressure::from_depth(20.0).bar() * 2.0 * BOT_SAC;
    let bottom = Pressure::from_depth(40.0).bar() * 18.0 * BOT_SAC;
    let consumed = dive.gas_plan().gases()[0].consumption();
    assert!(
        consumed > descent + bottom,
        "ascent legs must add deco consumption on top of the bottom phase"
    );
}
