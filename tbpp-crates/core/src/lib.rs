//! Compact mixed-integer models for the temporal bin packing problem with fire-ups.
//!
//! Jobs occupy part of a server's capacity during a time interval; they have to be packed onto
//! as few servers as possible while also keeping the number of times a server is switched on
//! (fired up) low. This crate contains the instances and allocations of the problem, a
//! preprocessing step which lifts job demands, the conflict cliques used as cuts, and three
//! formulations as mixed-integer linear programs which can be handed to any [`solver::MipSolver`].
pub mod cliques;
pub mod containers;
pub mod formulations;
pub mod instance;
pub mod lifting;
pub mod model;
pub mod pipeline;
pub mod solver;
pub mod statistics;
pub mod termination;
#[doc(hidden)]
pub mod tbpp_asserts;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use convert_case;
pub use enumset;
pub use rand;

pub use crate::formulations::build_model;
pub use crate::formulations::Formulation;
pub use crate::formulations::FormulationKind;
pub use crate::formulations::Modifier;
pub use crate::formulations::ServerBounds;
pub use crate::instance::Allocation;
pub use crate::instance::Instance;
pub use crate::instance::InstanceFu;
pub use crate::instance::Job;
pub use crate::instance::Pattern;
pub use crate::instance::ValueFunction;
pub use crate::lifting::lift;
pub use crate::pipeline::evaluate_formulation;
pub use crate::pipeline::evaluate_kind;
