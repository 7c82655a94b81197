use thiserror::Error;

use super::FormulationKind;
use super::Modifier;
use crate::instance::AllocationError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormulationError {
    #[error("modifier '{modifier}' is not supported by the {formulation} formulation")]
    UnsupportedModifier {
        formulation: FormulationKind,
        modifier: Modifier,
    },
    #[error("unknown modifier '{0}'")]
    UnknownModifier(String),
    #[error("the lower bound of {lower} servers exceeds the {slots} available server slots")]
    InvalidBounds { lower: usize, slots: usize },
    #[error("an upper bound of zero servers leaves no room for {0} jobs")]
    NoServers(usize),
    #[error("the jobs must be sorted by start time, but job {0} starts before its predecessor")]
    UnsortedInstance(usize),
    #[error("job {job} has demand {demand} exceeding the capacity {capacity}")]
    OversizedJob { job: usize, demand: u64, capacity: u64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WarmStartError {
    #[error("the allocation is not a partition of the jobs: {0}")]
    NotAPartition(#[from] AllocationError),
    #[error("the allocation uses {patterns} servers but the model has only {slots} server slots")]
    TooManyPatterns { patterns: usize, slots: usize },
    #[error("the model has no variable to place job {job} on server {server}")]
    MissingAssignment { job: usize, server: usize },
    #[error("the model was built for {expected} jobs but the instance has {actual}")]
    InstanceMismatch { expected: usize, actual: usize },
}
