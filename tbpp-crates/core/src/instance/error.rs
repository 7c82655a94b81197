use thiserror::Error;

use super::Time;

/// Errors raised while constructing an instance.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InstanceError {
    #[error("job {index} starts at {start} which is not before its end {end}")]
    EmptyInterval {
        index: usize,
        start: Time,
        end: Time,
    },
    #[error(
        "the columns of the instance have different lengths ({starts} starts, {ends} ends, {demands} demands)"
    )]
    ColumnLengthMismatch {
        starts: usize,
        ends: usize,
        demands: usize,
    },
    #[error("the fire-up weight must be finite and non-negative, got {0}")]
    InvalidGamma(f64),
}

/// Reasons for which an allocation is not a feasible solution of an instance.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationError {
    #[error("job {0} does not exist")]
    UnknownJob(usize),
    #[error("job {0} is assigned to more than one server")]
    DuplicateJob(usize),
    #[error("job {0} is not assigned to any server")]
    MissingJob(usize),
    #[error("pattern {pattern} carries load {load} at the start of job {job}, exceeding the capacity {capacity}")]
    Overloaded {
        pattern: usize,
        job: usize,
        load: u64,
        capacity: u64,
    },
}
