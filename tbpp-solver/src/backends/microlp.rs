use std::sync::mpsc;
use std::sync::mpsc::RecvTimeoutError;
use std::thread;
use std::time::Duration;

use good_lp::constraint;
use good_lp::microlp;
use good_lp::Expression;
use good_lp::ProblemVariables;
use good_lp::ResolutionError;
use good_lp::Solution as _;
use good_lp::SolutionStatus;
use good_lp::SolverModel;
use good_lp::WithInitialSolution;
use good_lp::WithTimeLimit;
use log::debug;
use log::info;
use log::warn;

use crate::model::Model;
use crate::model::OptimisationDirection;
use crate::model::Sense;
use crate::model::Variable;
use crate::model::VariableKind;
use crate::solver::MipSolver;
use crate::solver::Solution;
use crate::solver::SolveOptions;
use crate::solver::SolveResult;
use crate::solver::Verbosity;
use crate::termination::TerminationCondition;

/// The tolerance used when checking start values before they are reported as incumbent.
const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// Solves models with the pure Rust `microlp` solver through `good_lp`.
///
/// The start values of the model are handed to `microlp` as initial solution and the time limit
/// of the [`SolveOptions`] is enforced by `microlp` itself. The solve runs on a worker thread so
/// that the calling thread can watch the [`TerminationCondition`]; an interrupted worker is left
/// to finish on its own.
///
/// When the time limit or an interruption stops the solve before `microlp` found a solution, the
/// start values are reported as incumbent if they are feasible.
#[derive(Debug, Clone, Copy)]
pub struct MicroLpSolver {
    poll_interval: Duration,
}

impl Default for MicroLpSolver {
    fn default() -> Self {
        MicroLpSolver {
            poll_interval: Duration::from_millis(10),
        }
    }
}

impl MicroLpSolver {
    /// Sets how often the termination condition is checked during a solve.
    pub fn with_poll_interval(poll_interval: Duration) -> MicroLpSolver {
        MicroLpSolver { poll_interval }
    }
}

impl MipSolver for MicroLpSolver {
    fn optimise(
        &mut self,
        model: &Model,
        options: &SolveOptions,
        termination: &mut impl TerminationCondition,
    ) -> SolveResult {
        if termination.should_stop() {
            return SolveResult::Interrupted(feasible_start(model));
        }

        if options.verbosity != Verbosity::Quiet {
            info!("solving {model} with microlp");
        }

        let (sender, receiver) = mpsc::channel();
        let owned = model.clone();
        let time_limit = options.time_limit;
        let spawned = thread::Builder::new()
            .name("microlp-worker".to_owned())
            .spawn(move || {
                let _ = sender.send(solve(&owned, time_limit));
            });
        if let Err(error) = spawned {
            return SolveResult::Error(format!("failed to start the solver thread: {error}"));
        }

        loop {
            match receiver.recv_timeout(self.poll_interval) {
                Ok(result) => {
                    if options.verbosity == Verbosity::Verbose {
                        debug!("microlp finished {} with status {}", model.name(), result.status());
                    }
                    return result;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return SolveResult::Error("the solver thread stopped without a result".to_owned());
                }
                Err(RecvTimeoutError::Timeout) => {
                    if termination.should_stop() {
                        warn!("solve of {} interrupted", model.name());
                        return SolveResult::Interrupted(feasible_start(model));
                    }
                }
            }
        }
    }
}

/// The start values of `model` as a solution, if all of them are set and feasible.
fn feasible_start(model: &Model) -> Option<Solution> {
    let values = model.start_values()?;
    match model.check_solution(&values, FEASIBILITY_TOLERANCE) {
        Ok(()) => {
            let objective = model.objective_value(&values);
            Some(Solution::new(values, objective))
        }
        Err(error) => {
            warn!("ignoring start values of {}: {error}", model.name());
            None
        }
    }
}

fn definition(variable: &Variable) -> good_lp::VariableDefinition {
    let definition = good_lp::variable()
        .name(variable.name())
        .min(variable.lower())
        .max(variable.upper());
    match variable.kind() {
        VariableKind::Binary => definition.binary(),
        VariableKind::Integer => definition.integer(),
        VariableKind::Continuous => definition,
    }
}

fn solve(model: &Model, time_limit: Option<Duration>) -> SolveResult {
    let mut problem = ProblemVariables::new();
    let handles = model
        .variables()
        .map(|(_, variable)| problem.add(definition(variable)))
        .collect::<Vec<_>>();

    let mut objective = Expression::with_capacity(handles.len());
    for (id, variable) in model.variables() {
        if variable.objective() != 0.0 {
            objective += variable.objective() * handles[id.position()];
        }
    }

    let problem = match model.direction() {
        OptimisationDirection::Minimise => problem.minimise(objective),
        OptimisationDirection::Maximise => problem.maximise(objective),
    };
    let mut lp = problem.using(microlp);

    let start = model
        .variables()
        .filter_map(|(id, _)| Some((handles[id.position()], model.start(id)?)))
        .collect::<Vec<_>>();
    if !start.is_empty() {
        debug!("passing {} start values of {} to microlp", start.len(), model.name());
        lp = lp.with_initial_solution(start);
    }
    if let Some(limit) = time_limit {
        lp = lp.with_time_limit(limit.as_secs_f64());
    }

    for linear in model.constraints() {
        if linear.terms().is_empty() {
            if linear.is_satisfied_by(&[], FEASIBILITY_TOLERANCE) {
                continue;
            }
            debug!("constraint {} cannot be satisfied", linear.name());
            return SolveResult::Infeasible;
        }

        let mut lhs = Expression::with_capacity(linear.terms().len());
        for &(id, coefficient) in linear.terms() {
            lhs += coefficient * handles[id.position()];
        }
        let rhs = linear.rhs();
        let _ = lp.add_constraint(match linear.sense() {
            Sense::LessOrEqual => constraint::leq(lhs, rhs),
            Sense::GreaterOrEqual => constraint::geq(lhs, rhs),
            Sense::Equal => constraint::eq(lhs, rhs),
        });
    }

    match lp.solve() {
        Ok(solution) => {
            let values = handles
                .iter()
                .map(|&handle| solution.value(handle))
                .collect::<Vec<_>>();
            let objective = model.objective_value(&values);
            match solution.status() {
                // No gap is configured, so a gap stop proves optimality as well.
                SolutionStatus::Optimal | SolutionStatus::GapLimit => {
                    SolveResult::Optimal(Solution::new(values, objective))
                }
                SolutionStatus::TimeLimit => {
                    info!("time limit reached while solving {}", model.name());
                    SolveResult::TimeLimitReached(Some(Solution::new(values, objective)))
                }
            }
        }
        Err(ResolutionError::Infeasible) => SolveResult::Infeasible,
        // microlp reports a time limit without any feasible solution as an error.
        Err(ResolutionError::Other(message)) if time_limit.is_some() => {
            info!("time limit reached while solving {}: {message}", model.name());
            SolveResult::TimeLimitReached(feasible_start(model))
        }
        Err(error) => SolveResult::Error(error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::equals;
    use crate::model::less_than_or_equals;
    use crate::model::LinearExpression;
    use crate::model::VariableId;
    use crate::solver::SolveStatus;
    use crate::termination::Indefinite;
    use crate::termination::TimeBudget;

    /// max x + 2y subject to x + y <= 1.5 with binary x and integer y in [0, 3].
    fn small_model() -> (Model, Vec<VariableId>) {
        let mut model = Model::new("small", OptimisationDirection::Maximise);
        let x = model.add_variable(Variable::binary("x").with_objective(1.0));
        let y = model.add_variable(Variable::integer("y", 0.0, 3.0).with_objective(2.0));
        model.add_constraint(less_than_or_equals(
            "sum",
            LinearExpression::sum_of([x, y]),
            1.5,
        ));
        (model, vec![x, y])
    }

    #[test]
    fn solves_an_integer_program() {
        let (model, variables) = small_model();
        let result = MicroLpSolver::default().optimise(&model, &SolveOptions::default(), &mut Indefinite);

        let solution = result.solution().expect("optimal");
        assert_eq!(result.status(), SolveStatus::Optimal);
        assert!((solution.value(variables[1]) - 1.0).abs() < 1e-6);
        assert!((solution.objective() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn relaxation_is_fractional() {
        let (model, _) = small_model();
        let result = MicroLpSolver::default().optimise(
            &model.relax(),
            &SolveOptions::default(),
            &mut Indefinite,
        );

        let objective = result.objective().expect("optimal");
        assert!((objective - 3.0).abs() < 1e-6);
    }

    #[test]
    fn detects_infeasibility() {
        let mut model = Model::new("infeasible", OptimisationDirection::Minimise);
        let x = model.add_variable(Variable::binary("x"));
        model.add_constraint(equals("x_is_two", x, 2.0));

        let result = MicroLpSolver::default().optimise(&model, &SolveOptions::default(), &mut Indefinite);

        assert_eq!(result, SolveResult::Infeasible);
    }

    #[test]
    fn start_values_do_not_change_the_optimum() {
        let (mut model, variables) = small_model();
        model.set_start(variables[0], 1.0);
        model.set_start(variables[1], 0.0);

        let result = MicroLpSolver::default().optimise(&model, &SolveOptions::default(), &mut Indefinite);

        assert_eq!(result.status(), SolveStatus::Optimal);
        assert!((result.objective().expect("optimal") - 2.0).abs() < 1e-6);
    }

    #[test]
    fn time_limit_reports_feasible_start_values() {
        let (mut model, variables) = small_model();
        model.set_start(variables[0], 1.0);
        model.set_start(variables[1], 0.0);
        let options = SolveOptions {
            time_limit: Some(Duration::ZERO),
            ..SolveOptions::default()
        };

        let result = MicroLpSolver::default().optimise(&model, &options, &mut Indefinite);

        assert_eq!(
            result,
            SolveResult::TimeLimitReached(Some(Solution::new(vec![1.0, 0.0], 1.0)))
        );
    }

    #[test]
    fn time_limit_without_start_values_has_no_incumbent() {
        let (model, _) = small_model();
        let options = SolveOptions {
            time_limit: Some(Duration::ZERO),
            ..SolveOptions::default()
        };

        let result = MicroLpSolver::default().optimise(&model, &options, &mut Indefinite);

        assert_eq!(result, SolveResult::TimeLimitReached(None));
    }

    #[test]
    fn stopped_solve_reports_feasible_start_values() {
        let (mut model, variables) = small_model();
        model.set_start(variables[0], 1.0);
        model.set_start(variables[1], 0.0);

        let mut stop = Some(TimeBudget::starting_now(Duration::ZERO));
        let result = MicroLpSolver::default().optimise(&model, &SolveOptions::default(), &mut stop);

        assert_eq!(
            result,
            SolveResult::Interrupted(Some(Solution::new(vec![1.0, 0.0], 1.0)))
        );
    }

    #[test]
    fn infeasible_start_values_are_not_reported() {
        let (mut model, variables) = small_model();
        model.set_start(variables[0], 1.0);
        model.set_start(variables[1], 1.0);

        let mut stop = TimeBudget::starting_now(Duration::ZERO);
        let result = MicroLpSolver::default().optimise(&model, &SolveOptions::default(), &mut stop);

        assert_eq!(result, SolveResult::Interrupted(None));
    }
}
