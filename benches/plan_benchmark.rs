use criterion::{Criterion, criterion_group, criterion_main};
use diveplan::SAMPLE_RATE;
use diveplan::compartment::Compartment;
use diveplan::dive::Dive;
use diveplan::dive_step::DiveStep;
use diveplan::gas::Gas;
use diveplan::pressure::Pressure;
use diveplan::zhl16c::ZhL16cGf;

fn compartment(i: usize) -> Compartment {
    Compartment::new(
        ZhL16cGf::N2_HALF_TIMES[i],
        ZhL16cGf::HE_HALF_TIMES[i],
        ZhL16cGf::N2_A[i],
        ZhL16cGf::N2_B[i],
        ZhL16cGf::HE_A[i],
        ZhL16cGf::HE_B[i],
    )
}

fn benchmark_compartment_loading(c: &mut Criterion) {
    let mut group = c.benchmark_group("compartment_loading");
    let air = Gas::air();

    // Benchmark a single-sample load of the fastest compartment
    group.bench_function("load_fastest", |b| {
        let mut comp = compartment(0);
        let p_amb = Pressure::from_depth(30.0);
        b.iter(|| comp.load(&air, p_amb, SAMPLE_RATE))
    });

    // Benchmark a single-sample load of the slowest compartment
    group.bench_function("load_slowest", |b| {
        let mut comp = compartment(15);
        let p_amb = Pressure::from_depth(30.0);
        b.iter(|| comp.load(&air, p_amb, SAMPLE_RATE))
    });

    group.finish();
}

fn benchmark_model_integration(c: &mut Criterion) {
    let mut group = c.benchmark_group("model_integration");

    // Benchmark integrating a 20 minute bottom step across all 16 compartments
    group.bench_function("integrate_20min_bottom", |b| {
        let step = DiveStep::new(20.0, 40.0, 40.0, Gas::air()).unwrap();
        b.iter(|| {
            let mut model = ZhL16cGf::new((30, 80), SAMPLE_RATE).unwrap();
            model.integrate_dive_step(&step);
            model
        })
    });

    // Benchmark the ceiling scan on a loaded model
    group.bench_function("ceiling_after_bottom", |b| {
        let mut model = ZhL16cGf::new((30, 80), SAMPLE_RATE).unwrap();
        model
            .integrate_dive_step(&DiveStep::new(20.0, 40.0, 40.0, Gas::air()).unwrap());
        b.iter(|| model.ceiling())
    });

    group.finish();
}

fn benchmark_full_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_plan");

    // Benchmark a no-deco plan, where the ascent is a single direct leg
    group.bench_function("plan_10m_10min_air", |b| {
        b.iter(|| {
            let steps = vec![DiveStep::new(10.0, 10.0, 10.0, Gas::air()).unwrap()];
            let mut dive =
                Dive::new(steps, vec![Gas::air()], ZhL16cGf::NAME, (30, 80), SAMPLE_RATE)
                    .unwrap();
            dive.plan().unwrap();
            dive
        })
    });

    // Benchmark a staged-decompression plan with gas switches
    group.bench_function("plan_40m_20min_air_nx50_o2", |b| {
        b.iter(|| {
            let steps = vec![DiveStep::new(20.0, 40.0, 40.0, Gas::air()).unwrap()];
            let gases = vec![
                Gas::air(),
                Gas::new(0.5, 0.0).unwrap(),
                Gas::new(1.0, 0.0).unwrap(),
            ];
            let mut dive =
                Dive::new(steps, gases, ZhL16cGf::NAME, (30, 80), SAMPLE_RATE).unwrap();
            dive.plan().unwrap();
            dive
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_compartment_loading,
    benchmark_model_integration,
    benchmark_full_plan
);
criterion_main!(benches);
