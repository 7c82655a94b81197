//! # tbpp-solver
//! Compact mixed-integer models for the temporal bin packing problem with fire-ups (TBPP-FU).
//!
//! A TBPP-FU instance consists of jobs, each requiring part of a server's capacity during a time
//! interval. The jobs have to be packed onto servers such that the running jobs never exceed the
//! capacity of their server, while minimising the number of servers plus `gamma` times the
//! number of fire-ups, i.e. the number of times a server is switched on.
//!
//! This crate bundles the models of [`tbpp_core`] with a solver backend based on `good_lp` and
//! `microlp`, readers for the benchmark instance formats and the `tbpp-solver` binary.
//!
//! # Solving an instance
//! ```rust
//! # use tbpp_solver::backends::MicroLpSolver;
//! # use tbpp_solver::formulations::FormulationKind;
//! # use tbpp_solver::pipeline::evaluate_kind;
//! # use tbpp_solver::pipeline::EvaluationSettings;
//! # use tbpp_solver::termination::Indefinite;
//! # use tbpp_solver::Instance;
//! # use tbpp_solver::InstanceFu;
//! let instance = Instance::from_columns(&[0, 1, 2], &[2, 3, 4], &[5, 5, 5], 10)
//!     .expect("valid jobs");
//! let instance = InstanceFu::extend(instance, 1.0).expect("valid gamma");
//!
//! let report = evaluate_kind(
//!     FormulationKind::TimeIndexed,
//!     None,
//!     &instance,
//!     &EvaluationSettings::default(),
//!     &mut MicroLpSolver::default(),
//!     &mut Indefinite,
//! )
//! .expect("solved without interruption");
//!
//! // All jobs share one server, which is fired up once.
//! assert_eq!(report.value.map(f64::round), Some(2.0));
//! ```
pub mod backends;
pub mod readers;

pub use tbpp_core as core;
pub use tbpp_core::*;
