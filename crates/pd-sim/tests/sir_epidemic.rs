//! Integration test: SIR epidemic dynamics.

use pd_core::{Tolerances, nearly_equal};
use pd_sim::{RunRequest, Sir, SimError, SirState, run_sim};
use proptest::prelude::*;

fn conserved(state: &SirState, n: f64) -> bool {
    nearly_equal(state.total(), n, Tolerances { abs: 1e-9, rel: 1e-9 })
}

#[test]
fn reference_run_dies_out() {
    // contact_rate * infectivity * recovery_time = 0.75 < 1: no outbreak
    let model = Sir::default();
    let traj = run_sim(&model, &RunRequest::for_model(&model)).expect("default run");

    assert_eq!(traj.len(), 481);
    assert_eq!(traj.last().time, 60.0);

    let peak = traj.max_of("infected").unwrap();
    assert!(peak.value >= 1.0 && peak.value < 1000.0);

    let infected = traj.series("infected").unwrap();
    let peak_idx = infected.iter().position(|&v| v == peak.value).unwrap();
    assert!(infected[peak_idx..].windows(2).all(|w| w[1] <= w[0]));
    assert!(traj.final_value("infected").unwrap() < 0.1);

    assert_eq!(traj.clamped_steps(), 0);
    assert!(traj.iter().all(|r| conserved(&r.state, 1000.0)));
}

#[test]
fn outbreak_rises_then_declines() {
    let model = Sir::default();
    let req = RunRequest::for_model(&model).with_parameter("contact_rate", 40.0);
    let traj = run_sim(&model, &req).unwrap();

    let peak = traj.max_of("infected").unwrap();
    assert!(peak.value > 1.0 && peak.value < 1000.0);
    assert!(peak.time > 0.0 && peak.time < 60.0);

    let infected = traj.series("infected").unwrap();
    let peak_idx = infected.iter().position(|&v| v == peak.value).unwrap();
    assert!(infected[..=peak_idx].windows(2).all(|w| w[1] >= w[0]));
    assert!(infected[peak_idx..].windows(2).all(|w| w[1] <= w[0]));
    assert!(traj.final_value("infected").unwrap() < 1.0);

    let susceptible = traj.series("susceptible").unwrap();
    assert!(susceptible.windows(2).all(|w| w[1] <= w[0]));
    assert!(traj.iter().all(|r| conserved(&r.state, 1000.0)));
}

#[test]
fn derived_rates_match_flows() {
    let model = Sir::default();
    let req = RunRequest::uniform(0.0, 5.0, 0.25).with_parameter("contact_rate", 40.0);
    let traj = run_sim(&model, &req).unwrap();

    for r in &traj {
        let s = &r.state;
        let expected_inf = 40.0 * 0.015 * s.susceptible * s.infected / 1000.0;
        assert!((r.derived.infection_rate - expected_inf).abs() < 1e-12);
        assert!((r.derived.recovery_rate - s.infected / 5.0).abs() < 1e-12);
    }
}

#[test]
fn fresh_trajectory_per_run() {
    let model = Sir::default();
    let short = run_sim(&model, &RunRequest::uniform(0.0, 30.0, 0.125)).unwrap();
    let long = run_sim(&model, &RunRequest::for_model(&model)).unwrap();
    assert_eq!(short.len(), 241);
    assert_eq!(long.len(), 481);
    assert_eq!(short.records(), &long.records()[..241]);
}

#[test]
fn unknown_compartment_rejected() {
    let model = Sir::default();
    let req = RunRequest::for_model(&model).with_initial("exposed", 3.0);
    assert!(matches!(
        run_sim(&model, &req),
        Err(SimError::UnknownParameter { .. })
    ));
}

#[test]
fn concurrent_runs_are_independent() {
    let model = Sir::default();
    let baseline = run_sim(&model, &RunRequest::for_model(&model)).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| run_sim(&model, &RunRequest::for_model(&model)).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), baseline);
        }
    });
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn compartments_stay_non_negative(
        contact_rate in 0.0_f64..100.0,
        infectivity in 0.0_f64..1.0,
        recovery_time in 0.1_f64..30.0,
        infected in 0.0_f64..500.0,
        dt in 0.01_f64..2.0,
    ) {
        let model = Sir::default();
        let req = RunRequest::uniform(0.0, 40.0, dt)
            .with_parameter("contact_rate", contact_rate)
            .with_parameter("infectivity", infectivity)
            .with_parameter("recovery_time", recovery_time)
            .with_initial("infected", infected);
        let traj = run_sim(&model, &req).unwrap();

        for r in &traj {
            prop_assert!(r.state.susceptible >= 0.0);
            prop_assert!(r.state.infected >= 0.0);
            prop_assert!(r.state.recovered >= 0.0);
        }
        if traj.clamped_steps() == 0 {
            let tol = Tolerances { abs: 1e-6, rel: 1e-9 };
            for r in &traj {
                prop_assert!(nearly_equal(r.state.total(), 1000.0, tol));
            }
        }
    }
}
