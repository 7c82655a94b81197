//! A [`TerminationCondition`] is polled by a [`crate::solver::MipSolver`] while a model is being
//! solved. It indicates when the solve should be abandoned, even though no conclusion has been
//! reached, e.g. because the user pressed Ctrl-C or a [`TimeBudget`] ran out.

mod combinator;
mod indefinite;
mod time_budget;

pub use combinator::*;
pub use indefinite::*;
pub use time_budget::*;

/// The central trait that defines a termination condition.
pub trait TerminationCondition {
    /// Returns `true` when the solver should stop, `false` otherwise.
    fn should_stop(&mut self) -> bool;
}

impl<T: TerminationCondition> TerminationCondition for Option<T> {
    fn should_stop(&mut self) -> bool {
        match self {
            Some(t) => t.should_stop(),
            None => false,
        }
    }
}

impl<T: TerminationCondition + ?Sized> TerminationCondition for &mut T {
    fn should_stop(&mut self) -> bool {
        (**self).should_stop()
    }
}
