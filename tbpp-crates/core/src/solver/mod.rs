//! The boundary between the models and the MILP solvers which optimise them.
mod results;

use std::time::Duration;

pub use results::*;

use crate::model::Model;
use crate::termination::TerminationCondition;

/// How much the solver reports about its progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Verbosity {
    #[default]
    Quiet,
    Normal,
    Verbose,
}

/// Settings which are passed to every solve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveOptions {
    pub verbosity: Verbosity,
    pub time_limit: Option<Duration>,
}

/// A mixed-integer linear programming solver.
///
/// Implementations are expected to honour the start values of the model where they can, to stop
/// with [`SolveResult::TimeLimitReached`] once `options.time_limit` has passed, and with
/// [`SolveResult::Interrupted`] once `termination` triggers.
pub trait MipSolver {
    fn optimise(
        &mut self,
        model: &Model,
        options: &SolveOptions,
        termination: &mut impl TerminationCondition,
    ) -> SolveResult;
}
