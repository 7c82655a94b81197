use std::time::Duration;

use enumset::EnumSet;
use itertools::Itertools;

use crate::formulations::FormulationKind;
use crate::formulations::Modifier;
use crate::instance::Allocation;
use crate::solver::SolveStatus;
use crate::statistics::should_log_statistics;
use crate::statistics::StatisticLogger;

/// The outcome of solving the continuous relaxation of a model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelaxationReport {
    pub status: SolveStatus,
    pub value: Option<f64>,
    pub time: Duration,
}

/// Size of a built model and the outcome of solving it.
#[derive(Debug, Clone, PartialEq)]
pub struct FormulationReport {
    pub formulation: FormulationKind,
    pub modifiers: EnumSet<Modifier>,
    pub num_variables: usize,
    pub num_constraints: usize,
    pub num_nonzeros: usize,
    pub build_time: Duration,
    pub solve_time: Duration,
    pub status: SolveStatus,
    /// The objective value of the best known solution.
    pub value: Option<f64>,
    pub servers: Option<f64>,
    pub fire_ups: Option<f64>,
    pub allocation: Option<Allocation>,
    /// Absent when the relaxation was skipped.
    pub relaxation: Option<RelaxationReport>,
}

impl FormulationReport {
    /// Whether the model was solved to proven optimality.
    pub fn solved(&self) -> bool {
        self.status == SolveStatus::Optimal
    }

    /// Logs every field as a statistic, prefixed with the formulation.
    pub fn log_statistics(&self) {
        if !should_log_statistics() {
            return;
        }
        let logger = StatisticLogger::new([self.formulation]);
        let optional = |value: Option<f64>| value.map_or_else(|| "-".to_owned(), |value| value.to_string());

        logger.log_statistic("modifiers", self.modifiers.iter().join(","));
        logger.log_statistic("num_variables", self.num_variables);
        logger.log_statistic("num_constraints", self.num_constraints);
        logger.log_statistic("num_nonzeros", self.num_nonzeros);
        logger.log_statistic("build_time_ms", self.build_time.as_millis());
        logger.log_statistic("solve_time_ms", self.solve_time.as_millis());
        logger.log_statistic("status", self.status);
        logger.log_statistic("solved", self.solved());
        logger.log_statistic("value", optional(self.value));
        logger.log_statistic("servers", optional(self.servers));
        logger.log_statistic("fire_ups", optional(self.fire_ups));
        if let Some(relaxation) = &self.relaxation {
            logger.log_statistic("relaxation_status", relaxation.status);
            logger.log_statistic("relaxation_value", optional(relaxation.value));
            logger.log_statistic("relaxation_time_ms", relaxation.time.as_millis());
        }
    }
}
