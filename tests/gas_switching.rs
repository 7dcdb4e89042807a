use diveplan::SAMPLE_RATE;
use diveplan::dive::Dive;
use diveplan::dive_step::DiveStep;
use diveplan::gas::Gas;
use diveplan::zhl16c::ZhL16cGf;

fn deco_dive(gases: Vec<Gas>) -> Dive {
    let steps = vec![DiveStep::new(20.0, 40.0, 40.0, Gas::air()).unwrap()];
    let mut dive = Dive::new(steps, gases, ZhL16cGf::NAME, (30, 80), SAMPLE_RATE).unwrap();
    dive.plan().unwrap();
    dive
}

#[test]
fn test_richer_gases_are_picked_up_on_the_way_up() {
    let dive = deco_dive(vec![
        Gas::air(),
        Gas::new(0.5, 0.0).unwrap(),
        Gas::new(1.0, 0.0).unwrap(),
    ]);

    let report: Vec<(char, i32, u32, u32, String)> = dive
        .report()
        .into_iter()
        .map(|r| (r.symbol, r.depth, r.time, r.runtime, format!("{}", r.gas)))
        .collect();

    assert_eq!(
        report,
        vec![
            ('▼', 40, 2, 2, "Air".into()),
            ('-', 40, 18, 20, "Air".into()),
            ('▲', 21, 2, 22, "Air".into()),
            ('-', 21, 1, 23, "Nx 50".into()),
            ('▲', 6, 2, 24, "Nx 50".into()),
            ('-', 6, 2, 26, "Nx 100".into()),
            ('▲', 3, 0, 27, "Nx 100".into()),
            ('-', 3, 4, 31, "Nx 100".into()),
            ('▲', 0, 0, 31, "Nx 100".into()),
        ]
    );
}

#[test]
fn test_deco_gases_shorten_the_schedule() {
    let multi = deco_dive(vec![
        Gas::air(),
        Gas::new(0.5, 0.0).unwrap(),
        Gas::new(1.0, 0.0).unwrap(),
    ]);
    let air_only = deco_dive(vec![Gas::air()]);

    assert!(
        multi.runtime() < air_only.runtime(),
        "oxygen-rich deco gases must off-gas faster than air"
    );
}

#[test]
fn test_switch_depths_never_deepen_along_the_ascent() {
    let dive = deco_dive(vec![
        Gas::air(),
        Gas::new(0.5, 0.0).unwrap(),
        Gas::new(1.0, 0.0).unwrap(),
    ]);

    let mut last_switch_depth = f64::INFINITY;
    let mut gas = Gas::air();
    for step in dive.ascent() {
        if step.gas != gas {
            assert!(step.start_depth < last_switch_depth);
            last_switch_depth = step.start_depth;
            gas = step.gas.clone();
        }
    }
    assert_eq!(gas, Gas::new(1.0, 0.0).unwrap(), "surfaces on oxygen");
}

#[test]
fn test_every_gas_in_the_plan_gets_consumed() {
    let dive = deco_dive(vec![
        Gas::air(),
        Gas::new(0.5, 0.0).unwrap(),
        Gas::new(1.0, 0.0).unwrap(),
    ]);

    for gas in dive.gas_plan().gases() {
        assert!(
            gas.consumption() > 0.0,
            "{} was scheduled but never breathed",
            gas
        );
    }
}
