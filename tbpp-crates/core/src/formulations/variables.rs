use std::collections::BTreeMap;

use super::WarmStartError;
use crate::instance::Allocation;
use crate::instance::Instance;
use crate::instance::Time;
use crate::model::LinearExpression;
use crate::model::Model;
use crate::model::Variable;
use crate::model::VariableId;
use crate::solver::Solution;

/// Assignment variables `x(i,k)` of the slot-based formulations; job `i` can only be placed in
/// slot `k` if `i >= k`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotAssignments {
    slots: Vec<Vec<VariableId>>,
}

impl SlotAssignments {
    pub(crate) fn create(model: &mut Model, num_jobs: usize, num_slots: usize) -> SlotAssignments {
        let slots = (0..num_slots)
            .map(|slot| {
                (slot..num_jobs)
                    .map(|job| model.add_variable(Variable::binary(format!("x({job},{slot})"))))
                    .collect()
            })
            .collect();
        SlotAssignments { slots }
    }

    pub fn num_slots(&self) -> usize {
        self.slots.len()
    }

    pub fn get(&self, job: usize, slot: usize) -> Option<VariableId> {
        self.slots
            .get(slot)?
            .get(job.checked_sub(slot)?)
            .copied()
    }

    /// The jobs which can be placed in `slot`, with their assignment variable.
    pub fn slot(&self, slot: usize) -> impl Iterator<Item = (usize, VariableId)> + '_ {
        self.slots
            .get(slot)
            .into_iter()
            .flatten()
            .enumerate()
            .map(move |(offset, &variable)| (slot + offset, variable))
    }

    /// The jobs of `slot` which run at time `t`.
    pub(crate) fn running_at<'a>(
        &'a self,
        instance: &'a Instance,
        slot: usize,
        t: Time,
    ) -> impl Iterator<Item = (usize, VariableId)> + 'a {
        self.slot(slot)
            .filter(move |&(job, _)| instance[job].is_active_at(t))
    }

    /// The slots which can take `job`, with their assignment variable.
    pub fn job(&self, job: usize) -> impl Iterator<Item = (usize, VariableId)> + '_ {
        (0..self.slots.len().min(job + 1)).filter_map(move |slot| Some((slot, self.get(job, slot)?)))
    }

    /// Sets `x(i,k)` for every job `i` of the `k`-th pattern.
    pub(crate) fn encode(
        &self,
        patterns: &Allocation,
        values: &mut [f64],
    ) -> Result<(), WarmStartError> {
        for (slot, pattern) in patterns.iter().enumerate() {
            for job in pattern.iter() {
                let variable = self
                    .get(job, slot)
                    .ok_or(WarmStartError::MissingAssignment { job, server: slot })?;
                values[variable.position()] = 1.0;
            }
        }
        Ok(())
    }

    pub(crate) fn decode(&self, solution: &Solution) -> Allocation {
        (0..self.slots.len())
            .map(|slot| {
                self.slot(slot)
                    .filter(|&(_, variable)| solution.is_set(variable))
                    .map(|(job, _)| job)
                    .collect()
            })
            .collect()
    }
}

/// Variables indexed by a point in time and a server slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotTimeVariables {
    slots: Vec<BTreeMap<Time, VariableId>>,
}

impl SlotTimeVariables {
    pub(crate) fn create<'a>(
        model: &mut Model,
        times: impl IntoIterator<Item = impl IntoIterator<Item = &'a Time>>,
        mut variable: impl FnMut(Time, usize) -> Variable,
    ) -> SlotTimeVariables {
        let mut slots = Vec::new();
        for (slot, times) in times.into_iter().enumerate() {
            let mut variables = BTreeMap::new();
            for &t in times {
                let _ = variables.insert(t, model.add_variable(variable(t, slot)));
            }
            slots.push(variables);
        }
        SlotTimeVariables { slots }
    }

    pub fn get(&self, t: Time, slot: usize) -> Option<VariableId> {
        self.slots.get(slot)?.get(&t).copied()
    }

    /// The variable of `(t, slot)`.
    ///
    /// # Panics
    /// If the formulation did not create a variable for this pair.
    pub(crate) fn at(&self, t: Time, slot: usize) -> VariableId {
        self.slots[slot][&t]
    }

    pub fn slot(&self, slot: usize) -> impl Iterator<Item = (Time, VariableId)> + '_ {
        self.slots
            .get(slot)
            .into_iter()
            .flatten()
            .map(|(&t, &variable)| (t, variable))
    }

    /// The sum of all variables of one slot.
    pub(crate) fn slot_sum(&self, slot: usize) -> LinearExpression {
        LinearExpression::sum_of(self.slot(slot).map(|(_, variable)| variable))
    }

    /// The sum over all slots.
    pub(crate) fn sum(&self) -> LinearExpression {
        LinearExpression::sum_of(
            (0..self.slots.len()).flat_map(|slot| self.slot(slot).map(|(_, variable)| variable)),
        )
    }
}
