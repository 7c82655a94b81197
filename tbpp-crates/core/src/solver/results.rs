use std::fmt::Display;

use crate::containers::StorageKey;
use crate::model::LinearExpression;
use crate::model::VariableId;

/// Values for every variable of a model together with the objective value they attain.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    values: Vec<f64>,
    objective: f64,
}

impl Solution {
    pub fn new(values: Vec<f64>, objective: f64) -> Solution {
        Solution { values, objective }
    }

    pub fn value(&self, variable: VariableId) -> f64 {
        self.values[variable.index()]
    }

    /// Whether a binary variable is set, allowing for the usual solver tolerances.
    pub fn is_set(&self, variable: VariableId) -> bool {
        self.value(variable) > 0.5
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn objective(&self) -> f64 {
        self.objective
    }

    pub fn evaluate(&self, expression: &LinearExpression) -> f64 {
        expression.evaluate(&self.values)
    }
}

/// The status with which a solve finished, without the solution itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    TimeLimitReached,
    Interrupted,
    Error,
}

impl Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "optimal"),
            SolveStatus::Infeasible => write!(f, "infeasible"),
            SolveStatus::TimeLimitReached => write!(f, "time-limit"),
            SolveStatus::Interrupted => write!(f, "interrupted"),
            SolveStatus::Error => write!(f, "error"),
        }
    }
}

/// The result of a call to [`super::MipSolver::optimise`].
#[derive(Debug, Clone, PartialEq)]
pub enum SolveResult {
    /// An optimal solution was found and proven to be optimal.
    Optimal(Solution),
    /// The model has no solution.
    Infeasible,
    /// The time limit passed before optimality was proven; provides the best known solution, if
    /// any.
    TimeLimitReached(Option<Solution>),
    /// The termination condition triggered; provides the best known solution, if any.
    Interrupted(Option<Solution>),
    /// The solver failed for another reason.
    Error(String),
}

impl SolveResult {
    pub fn status(&self) -> SolveStatus {
        match self {
            SolveResult::Optimal(_) => SolveStatus::Optimal,
            SolveResult::Infeasible => SolveStatus::Infeasible,
            SolveResult::TimeLimitReached(_) => SolveStatus::TimeLimitReached,
            SolveResult::Interrupted(_) => SolveStatus::Interrupted,
            SolveResult::Error(_) => SolveStatus::Error,
        }
    }

    /// The best known solution.
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SolveResult::Optimal(solution) => Some(solution),
            SolveResult::TimeLimitReached(solution) | SolveResult::Interrupted(solution) => {
                solution.as_ref()
            }
            SolveResult::Infeasible | SolveResult::Error(_) => None,
        }
    }

    pub fn objective(&self) -> Option<f64> {
        self.solution().map(Solution::objective)
    }
}
