use tbpp_solver::formulations::FormulationError;
use tbpp_solver::instance::AllocationError;
use tbpp_solver::instance::InstanceError;
use tbpp_solver::lifting::LiftingError;
use tbpp_solver::pipeline::EvaluationError;
use tbpp_solver::readers::ReadError;
use thiserror::Error;

pub(crate) type TbppResult<T> = Result<T, TbppError>;

#[derive(Error, Debug)]
pub(crate) enum TbppError {
    #[error("IO error, more details: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Failed to read the input, more details: {0}")]
    Read(#[from] ReadError),
    #[error("The instance is invalid, more details: {0}")]
    Instance(#[from] InstanceError),
    #[error("Failed to lift the instance, more details: {0}")]
    Lifting(#[from] LiftingError),
    #[error("The given allocation is not a solution, more details: {0}")]
    Allocation(#[from] AllocationError),
    #[error("Invalid formulation settings, more details: {0}")]
    Formulation(#[from] FormulationError),
    #[error("Failed to evaluate the formulation, more details: {0}")]
    Evaluation(#[from] EvaluationError),
}

impl TbppError {
    /// Whether the run was stopped by the user rather than failing.
    pub(crate) fn is_interruption(&self) -> bool {
        matches!(self, TbppError::Evaluation(EvaluationError::Interrupted))
    }
}
