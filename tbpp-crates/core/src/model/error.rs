use thiserror::Error;

use super::Sense;

/// Reasons for which a vector of values is not a feasible point of a model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolutionCheckError {
    #[error("expected {expected} values but got {actual}")]
    WrongLength { expected: usize, actual: usize },
    #[error("variable {name} has value {value} outside of its bounds [{lower}, {upper}]")]
    OutOfBounds {
        name: String,
        value: f64,
        lower: f64,
        upper: f64,
    },
    #[error("variable {name} has fractional value {value}")]
    Fractional { name: String, value: f64 },
    #[error("constraint {name} is violated: {activity} {sense} {rhs} does not hold")]
    Violated {
        name: String,
        activity: f64,
        sense: Sense,
        rhs: f64,
    },
}
