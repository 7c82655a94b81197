#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

mod helpers;

use helpers::brute_force_optimum;
use helpers::instance;
use helpers::TOLERANCE;
use tbpp_solver::backends::MicroLpSolver;
use tbpp_solver::core::enumset::EnumSet;
use tbpp_solver::core::rand::rngs::SmallRng;
use tbpp_solver::core::rand::SeedableRng;
use tbpp_solver::formulations::FormulationError;
use tbpp_solver::formulations::FormulationKind;
use tbpp_solver::formulations::Modifier;
use tbpp_solver::formulations::ServerBounds;
use tbpp_solver::instance::InstanceFu;
use tbpp_solver::instance::RandomInstanceParameters;
use tbpp_solver::instance::ValueFunction;
use tbpp_solver::lifting::lift;
use tbpp_solver::pipeline::evaluate_kind;
use tbpp_solver::pipeline::EvaluationError;
use tbpp_solver::pipeline::EvaluationSettings;
use tbpp_solver::pipeline::FormulationReport;
use tbpp_solver::solver::SolveStatus;
use tbpp_solver::termination::Indefinite;

/// Every formulation together with a few of its modifier sets.
fn configurations() -> Vec<(FormulationKind, EnumSet<Modifier>)> {
    vec![
        (FormulationKind::TimeIndexed, EnumSet::empty()),
        (FormulationKind::TimeIndexed, Modifier::Conflicts.into()),
        (FormulationKind::TimeIndexed, Modifier::Conflicts | Modifier::ExactFireUps),
        (FormulationKind::TimeIndexed, Modifier::ContinuousFireUps.into()),
        (FormulationKind::CumulativeLoad, EnumSet::empty()),
        (FormulationKind::CumulativeLoad, Modifier::Conflicts.into()),
        (FormulationKind::ServerIdentity, EnumSet::empty()),
        (
            FormulationKind::ServerIdentity,
            Modifier::OpeningFireUp | Modifier::OpenedServerOnly | Modifier::Dominance,
        ),
        (FormulationKind::ServerIdentity, Modifier::ContinuousFireUps.into()),
    ]
}

fn solve(
    kind: FormulationKind,
    modifiers: EnumSet<Modifier>,
    instance: &InstanceFu,
    settings: &EvaluationSettings<'_>,
) -> FormulationReport {
    evaluate_kind(
        kind,
        Some(modifiers),
        instance,
        settings,
        &mut MicroLpSolver::default(),
        &mut Indefinite,
    )
    .unwrap_or_else(|error| panic!("{kind} with {modifiers:?} failed: {error}"))
}

fn assert_optimum(instance: &InstanceFu, expected: f64) {
    for (kind, modifiers) in configurations() {
        let report = solve(kind, modifiers, instance, &EvaluationSettings::default());

        assert_eq!(report.status, SolveStatus::Optimal, "{kind} with {modifiers:?}");
        let value = report.value.expect("optimal solves have a value");
        assert!(
            (value - expected).abs() < TOLERANCE,
            "{kind} with {modifiers:?}: {value} instead of {expected}"
        );

        let allocation = report.allocation.expect("optimal solves are decoded");
        assert!(instance.is_feasible(&allocation), "{kind} with {modifiers:?}");
        assert!((instance.compute_value(&allocation) - expected).abs() < TOLERANCE);

        let relaxation = report
            .relaxation
            .and_then(|relaxation| relaxation.value)
            .expect("relaxation is solved");
        assert!(relaxation <= value + TOLERANCE, "{kind} with {modifiers:?}");
    }
}

#[test]
fn staircase_fits_on_one_server() {
    let staircase = instance(&[(0, 2, 5), (1, 3, 5), (2, 4, 5)], 10, 1.0);

    assert_optimum(&staircase, 2.0);
}

#[test]
fn touching_jobs_share_a_fire_up() {
    let touching = instance(&[(0, 2, 6), (2, 4, 6)], 10, 1.0);

    assert_optimum(&touching, 2.0);
}

#[test]
fn gap_costs_a_second_fire_up() {
    let gap = instance(&[(0, 2, 6), (3, 4, 6)], 10, 1.0);

    assert_optimum(&gap, 3.0);
}

#[test]
fn overlapping_large_jobs_need_separate_servers() {
    let conflicting = instance(&[(0, 4, 6), (1, 5, 6), (2, 6, 3), (3, 7, 5)], 10, 0.5);

    assert_optimum(&conflicting, brute_force_optimum(&conflicting));
}

#[test]
fn job_larger_than_a_server_is_rejected() {
    let oversized = instance(&[(0, 2, 11)], 10, 1.0);

    for (kind, modifiers) in configurations() {
        let result = evaluate_kind(
            kind,
            Some(modifiers),
            &oversized,
            &EvaluationSettings::default(),
            &mut MicroLpSolver::default(),
            &mut Indefinite,
        );

        assert!(
            matches!(
                result,
                Err(EvaluationError::Formulation(FormulationError::OversizedJob {
                    job: 0,
                    demand: 11,
                    capacity: 10
                }))
            ),
            "{kind} with {modifiers:?}"
        );
    }
}

#[test]
fn all_formulations_agree_with_brute_force() {
    let mut rng = SmallRng::seed_from_u64(7);
    let parameters = RandomInstanceParameters {
        max_start: 6,
        max_duration: 4,
        ..RandomInstanceParameters::new(5, 10)
    };

    for _ in 0..6 {
        let instance = InstanceFu::random(&mut rng, parameters, 0.5).expect("valid gamma");
        assert_optimum(&instance, brute_force_optimum(&instance));
    }
}

#[test]
fn lifting_keeps_the_optimum() {
    let mut rng = SmallRng::seed_from_u64(11);
    let parameters = RandomInstanceParameters {
        max_start: 5,
        max_duration: 4,
        ..RandomInstanceParameters::new(5, 10)
    };

    for _ in 0..4 {
        let instance = InstanceFu::random(&mut rng, parameters, 1.0).expect("valid gamma");
        let lifted = InstanceFu::extend(lift(&instance).expect("demands fit"), 1.0)
            .expect("valid gamma");

        let expected = brute_force_optimum(&instance);
        assert!((brute_force_optimum(&lifted) - expected).abs() < TOLERANCE);
        assert_optimum(&lifted, expected);
    }
}

#[test]
fn warm_start_and_bounds_keep_the_optimum() {
    let instance = instance(&[(0, 4, 6), (1, 5, 6), (2, 6, 3), (3, 7, 5)], 10, 0.5);
    let expected = brute_force_optimum(&instance);
    let allocation = helpers::set_partitions(instance.num_jobs())
        .into_iter()
        .filter(|allocation| instance.is_feasible(allocation))
        .find(|allocation| (instance.compute_value(allocation) - expected).abs() < TOLERANCE)
        .expect("an optimal allocation exists");

    let settings = EvaluationSettings {
        bounds: ServerBounds::from_heuristic_value(1, expected, instance.gamma()),
        warm_start: Some(&allocation),
        ..EvaluationSettings::default()
    };
    for (kind, modifiers) in configurations() {
        let report = solve(kind, modifiers, &instance, &settings);

        assert!(report.solved(), "{kind} with {modifiers:?}");
        let value = report.value.expect("optimal solves have a value");
        assert!((value - expected).abs() < TOLERANCE, "{kind} with {modifiers:?}");
    }
}
