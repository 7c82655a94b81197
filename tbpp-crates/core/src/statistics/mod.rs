//! Statistics about built models and solves, written as `{prefix} {name}={value}` lines.
mod statistic_logging;

use std::fmt::Display;

use itertools::Itertools;
pub use statistic_logging::*;

/// Logs statistics under a common name prefix, e.g. the formulation they belong to.
#[derive(Debug, Default, Clone)]
pub struct StatisticLogger {
    name_prefix: String,
}

impl StatisticLogger {
    pub fn new<Input: IntoIterator<Item = impl Display>>(name_prefix: Input) -> Self {
        Self {
            name_prefix: name_prefix.into_iter().join("_"),
        }
    }

    /// Logs `{name_prefix}_{name}={value}`.
    pub fn log_statistic(&self, name: impl Display, value: impl Display) {
        if self.name_prefix.is_empty() {
            log_statistic(name, value);
        } else {
            log_statistic(format!("{}_{name}", self.name_prefix), value);
        }
    }
}
