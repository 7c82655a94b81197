//! Building, solving and relaxing a formulation, and reporting on the outcome.
mod report;

use std::time::Instant;

use enumset::EnumSet;
use log::debug;
use log::info;
use log::warn;
pub use report::*;
use thiserror::Error;

use crate::formulations::CumulativeLoad;
use crate::formulations::Formulation;
use crate::formulations::FormulationError;
use crate::formulations::FormulationKind;
use crate::formulations::Modifier;
use crate::formulations::ServerBounds;
use crate::formulations::ServerIdentity;
use crate::formulations::TimeIndexed;
use crate::formulations::WarmStartError;
use crate::instance::Allocation;
use crate::instance::InstanceFu;
use crate::solver::MipSolver;
use crate::solver::SolveOptions;
use crate::solver::SolveResult;
use crate::solver::SolveStatus;
use crate::termination::TerminationCondition;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("failed to build the model: {0}")]
    Formulation(#[from] FormulationError),
    #[error("failed to set the warm start: {0}")]
    WarmStart(#[from] WarmStartError),
    #[error("the solve was interrupted")]
    Interrupted,
    #[error("the relaxation of an optimally solved model finished with status {0}")]
    InconsistentRelaxation(SolveStatus),
    #[error("the solver failed: {0}")]
    Solver(String),
}

/// What to do besides building and solving a formulation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EvaluationSettings<'a> {
    pub bounds: ServerBounds,
    /// An allocation whose encoding is handed to the solver as start values.
    pub warm_start: Option<&'a Allocation>,
    pub solve_options: SolveOptions,
    /// Do not solve the continuous relaxation afterwards.
    pub skip_relaxation: bool,
}

/// Builds `formulation` for `instance`, solves it and its continuous relaxation, and reports on
/// both solves.
///
/// An interruption of either solve is an error, as is a relaxation which is not solved to
/// optimality although the integer model was.
pub fn evaluate_formulation<F: Formulation>(
    formulation: &F,
    instance: &InstanceFu,
    settings: &EvaluationSettings<'_>,
    solver: &mut impl MipSolver,
    termination: &mut impl TerminationCondition,
) -> Result<FormulationReport, EvaluationError> {
    let kind = formulation.kind();

    let build_started = Instant::now();
    let mut built = formulation.build(instance, settings.bounds)?;
    let build_time = build_started.elapsed();
    info!("built {kind} model {} in {build_time:?}", built.model());

    if let Some(allocation) = settings.warm_start {
        formulation.apply_warm_start(&mut built, instance, allocation)?;
        debug!("set warm start with {} servers", allocation.num_patterns());
    }

    let solve_started = Instant::now();
    let result = solver.optimise(built.model(), &settings.solve_options, termination);
    let solve_time = solve_started.elapsed();
    let status = result.status();
    info!("solved {kind} model with status {status} in {solve_time:?}");

    let solution = match result {
        SolveResult::Interrupted(_) => return Err(EvaluationError::Interrupted),
        SolveResult::Error(message) => return Err(EvaluationError::Solver(message)),
        SolveResult::Infeasible => None,
        SolveResult::Optimal(solution) => Some(solution),
        SolveResult::TimeLimitReached(solution) => solution,
    };

    let mut relaxation = None;
    if !settings.skip_relaxation {
        let relaxed = built.model().relax();
        let relaxation_started = Instant::now();
        let result = solver.optimise(&relaxed, &settings.solve_options, termination);
        let relaxation_time = relaxation_started.elapsed();

        let relaxation_status = result.status();
        match result {
            SolveResult::Interrupted(_) => return Err(EvaluationError::Interrupted),
            SolveResult::Error(message) => return Err(EvaluationError::Solver(message)),
            _ if status == SolveStatus::Optimal && relaxation_status != SolveStatus::Optimal => {
                return Err(EvaluationError::InconsistentRelaxation(relaxation_status));
            }
            _ => {}
        }
        if relaxation_status != SolveStatus::Optimal {
            warn!("relaxation of the {kind} model finished with status {relaxation_status}");
        }

        relaxation = Some(RelaxationReport {
            status: relaxation_status,
            value: result.objective(),
            time: relaxation_time,
        });
    }

    let context = built.context();
    Ok(FormulationReport {
        formulation: kind,
        modifiers: formulation.modifiers(),
        num_variables: built.model().num_variables(),
        num_constraints: built.model().num_constraints(),
        num_nonzeros: built.model().num_nonzeros(),
        build_time,
        solve_time,
        status,
        value: solution.as_ref().map(|solution| solution.objective()),
        servers: solution.as_ref().map(|solution| solution.evaluate(context.servers())),
        fire_ups: solution.as_ref().map(|solution| solution.evaluate(context.fire_ups())),
        allocation: solution
            .as_ref()
            .map(|solution| formulation.decode_allocation(&built, solution)),
        relaxation,
    })
}

/// Like [`evaluate_formulation`] for the formulation of the given kind; without modifiers the
/// defaults of the formulation are used.
pub fn evaluate_kind(
    kind: FormulationKind,
    modifiers: Option<EnumSet<Modifier>>,
    instance: &InstanceFu,
    settings: &EvaluationSettings<'_>,
    solver: &mut impl MipSolver,
    termination: &mut impl TerminationCondition,
) -> Result<FormulationReport, EvaluationError> {
    let modifiers = modifiers.unwrap_or(kind.default_modifiers());
    match kind {
        FormulationKind::TimeIndexed => {
            evaluate_formulation(&TimeIndexed::new(modifiers)?, instance, settings, solver, termination)
        }
        FormulationKind::CumulativeLoad => evaluate_formulation(
            &CumulativeLoad::new(modifiers)?,
            instance,
            settings,
            solver,
            termination,
        ),
        FormulationKind::ServerIdentity => evaluate_formulation(
            &ServerIdentity::new(modifiers)?,
            instance,
            settings,
            solver,
            termination,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formulations::tests::staircase;
    use crate::solver::Solution;
    use crate::termination::Indefinite;
    use crate::test_helpers::ScriptedSolver;

    fn single_server() -> Allocation {
        Allocation::new([[0, 1, 2].into_iter().collect()])
    }

    fn optimal_single_server() -> SolveResult {
        let instance = staircase();
        let formulation = TimeIndexed::default();
        let built = formulation
            .build(&instance, ServerBounds::default())
            .expect("sorted instance");
        let values = formulation
            .encode_warm_start(&built, &instance, &single_server())
            .expect("valid allocation");
        SolveResult::Optimal(Solution::new(values, 2.0))
    }

    fn evaluate(script: Vec<SolveResult>) -> (Result<FormulationReport, EvaluationError>, ScriptedSolver) {
        let allocation = single_server();
        let settings = EvaluationSettings {
            warm_start: Some(&allocation),
            ..EvaluationSettings::default()
        };
        let mut solver = ScriptedSolver::new(script);
        let result = evaluate_formulation(
            &TimeIndexed::default(),
            &staircase(),
            &settings,
            &mut solver,
            &mut Indefinite,
        );
        (result, solver)
    }

    #[test]
    fn report_of_an_optimal_solve() {
        let (result, solver) = evaluate(vec![optimal_single_server(), optimal_single_server()]);
        let report = result.expect("both solves are optimal");

        assert!(report.solved());
        assert_eq!(report.value, Some(2.0));
        assert_eq!(report.servers, Some(1.0));
        assert_eq!(report.fire_ups, Some(1.0));
        assert_eq!(report.allocation, Some(single_server()));
        assert_eq!(report.relaxation.map(|relaxation| relaxation.value), Some(Some(2.0)));
        assert_eq!(solver.models_with_start(), vec![true, true]);
        assert_eq!(solver.relaxed_models(), vec![false, true]);
    }

    #[test]
    fn interruption_is_an_error() {
        let (result, _) = evaluate(vec![SolveResult::Interrupted(None)]);
        assert_eq!(result.err(), Some(EvaluationError::Interrupted));

        let (result, _) = evaluate(vec![optimal_single_server(), SolveResult::Interrupted(None)]);
        assert_eq!(result.err(), Some(EvaluationError::Interrupted));
    }

    #[test]
    fn relaxation_must_be_solved_when_the_model_is() {
        let (result, _) = evaluate(vec![optimal_single_server(), SolveResult::Infeasible]);

        assert_eq!(
            result.err(),
            Some(EvaluationError::InconsistentRelaxation(SolveStatus::Infeasible))
        );
    }

    #[test]
    fn time_limit_keeps_the_incumbent() {
        let SolveResult::Optimal(incumbent) = optimal_single_server() else {
            unreachable!()
        };
        let (result, _) = evaluate(vec![
            SolveResult::TimeLimitReached(Some(incumbent)),
            SolveResult::TimeLimitReached(None),
        ]);
        let report = result.expect("a time limit is not an error");

        assert!(!report.solved());
        assert_eq!(report.status, SolveStatus::TimeLimitReached);
        assert_eq!(report.value, Some(2.0));
    }

    #[test]
    fn unsupported_modifiers_fail_before_solving() {
        let mut solver = ScriptedSolver::new(vec![]);
        let result = evaluate_kind(
            FormulationKind::CumulativeLoad,
            Some(EnumSet::only(Modifier::Dominance)),
            &staircase(),
            &EvaluationSettings::default(),
            &mut solver,
            &mut Indefinite,
        );

        assert!(matches!(
            result,
            Err(EvaluationError::Formulation(FormulationError::UnsupportedModifier { .. }))
        ));
        assert!(solver.models_with_start().is_empty());
    }
}
