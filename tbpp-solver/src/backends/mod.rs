//! Implementations of [`MipSolver`](crate::solver::MipSolver) on top of external solvers.
mod microlp;

pub use microlp::*;
