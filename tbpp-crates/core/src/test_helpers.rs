use std::collections::VecDeque;

use crate::instance::Allocation;
use crate::instance::Pattern;
use crate::model::Model;
use crate::solver::MipSolver;
use crate::solver::SolveOptions;
use crate::solver::SolveResult;
use crate::termination::TerminationCondition;

/// All partitions of the jobs `0..num_jobs`, enumerated through restricted growth strings.
pub(crate) fn set_partitions(num_jobs: usize) -> Vec<Allocation> {
    fn extend(labels: &mut Vec<usize>, num_jobs: usize, partitions: &mut Vec<Allocation>) {
        if labels.len() == num_jobs {
            let num_blocks = labels.iter().max().map_or(0, |&label| label + 1);
            let patterns = (0..num_blocks).map(|block| {
                labels
                    .iter()
                    .enumerate()
                    .filter(|&(_, &label)| label == block)
                    .map(|(job, _)| job)
                    .collect::<Pattern>()
            });
            partitions.push(Allocation::new(patterns));
            return;
        }

        let next_label = labels.iter().max().map_or(0, |&label| label + 1);
        for label in 0..=next_label {
            labels.push(label);
            extend(labels, num_jobs, partitions);
            let _ = labels.pop();
        }
    }

    let mut partitions = Vec::new();
    extend(&mut Vec::new(), num_jobs, &mut partitions);
    partitions
}

/// A solver which replays a fixed sequence of results and records what it was asked to solve.
#[derive(Debug, Default)]
pub(crate) struct ScriptedSolver {
    script: VecDeque<SolveResult>,
    models_with_start: Vec<bool>,
    relaxed_models: Vec<bool>,
}

impl ScriptedSolver {
    pub(crate) fn new(script: Vec<SolveResult>) -> ScriptedSolver {
        ScriptedSolver {
            script: script.into(),
            ..ScriptedSolver::default()
        }
    }

    pub(crate) fn models_with_start(&self) -> Vec<bool> {
        self.models_with_start.clone()
    }

    pub(crate) fn relaxed_models(&self) -> Vec<bool> {
        self.relaxed_models.clone()
    }
}

impl MipSolver for ScriptedSolver {
    fn optimise(
        &mut self,
        model: &Model,
        _options: &SolveOptions,
        _termination: &mut impl TerminationCondition,
    ) -> SolveResult {
        self.models_with_start.push(model.start_values().is_some());
        self.relaxed_models
            .push(model.variables().all(|(_, variable)| !variable.is_integral()));
        self.script
            .pop_front()
            .unwrap_or_else(|| SolveResult::Error("script exhausted".to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bell_numbers() {
        let counts = (0..6).map(|n| set_partitions(n).len()).collect::<Vec<_>>();

        assert_eq!(counts, vec![1, 1, 2, 5, 15, 52]);
    }
}
