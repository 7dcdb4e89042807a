use diveplan::SAMPLE_RATE;
use diveplan::dive::Dive;
use diveplan::dive_step::DiveStep;
use diveplan::gas::Gas;
use diveplan::zhl16c::ZhL16cGf;

fn stop_minutes(dive: &Dive) -> f64 {
    dive.ascent()
        .iter()
        .filter(|s| s.start_depth == s.end_depth)
        .map(|s| s.time)
        .sum()
}

#[test]
fn test_residual_loading_lengthens_the_second_dive() {
    let profile = || vec![DiveStep::new(25.0, 30.0, 30.0, Gas::air()).unwrap()];

    let mut first = Dive::new(
        profile(),
        vec![Gas::air()],
        ZhL16cGf::NAME,
        (30, 80),
        SAMPLE_RATE,
    )
    .unwrap();
    first.plan().unwrap();
    let first_stops = stop_minutes(&first);

    // One hour at the surface, breathing air, on the same tissue state.
    let mut model = first.into_model();
    let interval = DiveStep::new(60.0, 0.0, 0.0, Gas::air()).unwrap();
    model.integrate_dive_step(&interval);

    let mut second = Dive::with_model(profile(), vec![Gas::air()], model).unwrap();
    second.plan().unwrap();
    let second_stops = stop_minutes(&second);

    assert_eq!(first_stops, 9.0);
    assert_eq!(second_stops, 25.0);
    assert!(
        second_stops > first_stops,
        "residual nitrogen must lengthen the repeat dive"
    );
}

#[test]
fn test_a_fresh_model_forgets_nothing_by_itself() {
    let profile = || vec![DiveStep::new(25.0, 30.0, 30.0, Gas::air()).unwrap()];

    let mut first = Dive::new(
        profile(),
        vec![Gas::air()],
        ZhL16cGf::NAME,
        (30, 80),
        SAMPLE_RATE,
    )
    .unwrap();
    first.plan().unwrap();

    let mut repeat = Dive::new(
        profile(),
        vec![Gas::air()],
        ZhL16cGf::NAME,
        (30, 80),
        SAMPLE_RATE,
    )
    .unwrap();
    repeat.plan().unwrap();

    assert_eq!(stop_minutes(&first), stop_minutes(&repeat));
    assert_eq!(first.runtime(), repeat.runtime());
}
