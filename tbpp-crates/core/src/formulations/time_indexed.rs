use enumset::EnumSet;
use log::debug;

use super::check_allocation;
use super::check_instance;
use super::fire_up_variable;
use super::indicator;
use super::slot_grid::SlotGrid;
use super::BuiltFormulation;
use super::Formulation;
use super::FormulationContext;
use super::FormulationError;
use super::FormulationKind;
use super::Modifier;
use super::ServerBounds;
use super::SlotAssignments;
use super::SlotTimeVariables;
use super::WarmStartError;
use crate::cliques::ConflictCliques;
use crate::instance::Allocation;
use crate::instance::InstanceFu;
use crate::instance::Time;
use crate::model::equals;
use crate::model::greater_than_or_equals;
use crate::model::less_than_or_equals;
use crate::model::LinearExpression;
use crate::model::Model;
use crate::model::OptimisationDirection;
use crate::model::Variable;
use crate::model::VariableId;
use crate::solver::Solution;

/// The time-indexed formulation.
///
/// Server slot `k` may host the jobs `k..`. Next to the assignment variables `x(i,k)` and the
/// usage variables `z(k)` it has an activity variable `y(t,k)` for every relevant time `t` of the
/// slot, and a fire-up variable `w(t,k)` for every start time. A fire-up is forced whenever the
/// slot is active at a start time but was not at the preceding time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeIndexed {
    modifiers: EnumSet<Modifier>,
}

impl TimeIndexed {
    pub fn new(modifiers: EnumSet<Modifier>) -> Result<TimeIndexed, FormulationError> {
        let modifiers = FormulationKind::TimeIndexed.validate(modifiers)?;
        Ok(TimeIndexed { modifiers })
    }
}

impl Default for TimeIndexed {
    fn default() -> Self {
        TimeIndexed {
            modifiers: FormulationKind::TimeIndexed.default_modifiers(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TimeIndexedHandles {
    assignments: SlotAssignments,
    usage: Vec<VariableId>,
    activity: SlotTimeVariables,
    fire_ups: SlotTimeVariables,
    grids: Vec<SlotGrid>,
}

impl TimeIndexedHandles {
    pub fn assignments(&self) -> &SlotAssignments {
        &self.assignments
    }

    pub fn usage(&self, slot: usize) -> Option<VariableId> {
        self.usage.get(slot).copied()
    }

    pub fn activity(&self, t: Time, slot: usize) -> Option<VariableId> {
        self.activity.get(t, slot)
    }

    pub fn fire_up(&self, t: Time, slot: usize) -> Option<VariableId> {
        self.fire_ups.get(t, slot)
    }
}

impl Formulation for TimeIndexed {
    type Handles = TimeIndexedHandles;

    fn kind(&self) -> FormulationKind {
        FormulationKind::TimeIndexed
    }

    fn modifiers(&self) -> EnumSet<Modifier> {
        self.modifiers
    }

    fn build(
        &self,
        instance: &InstanceFu,
        bounds: ServerBounds,
    ) -> Result<BuiltFormulation<TimeIndexedHandles>, FormulationError> {
        check_instance(instance)?;
        let num_jobs = instance.num_jobs();
        let num_slots = bounds.num_slots(num_jobs)?;
        let capacity = instance.capacity() as f64;
        let continuous = self.modifiers.contains(Modifier::ContinuousFireUps);

        let mut model = Model::new("time-indexed", OptimisationDirection::Minimise);
        let grids = (0..num_slots)
            .map(|slot| SlotGrid::trimmed(instance, slot))
            .collect::<Vec<_>>();

        let assignments = SlotAssignments::create(&mut model, num_jobs, num_slots);
        let usage = (0..num_slots)
            .map(|slot| model.add_variable(Variable::binary(format!("z({slot})")).with_objective(1.0)))
            .collect::<Vec<_>>();
        let activity = SlotTimeVariables::create(
            &mut model,
            grids.iter().map(SlotGrid::times),
            |t, slot| Variable::binary(format!("y({t},{slot})")),
        );
        let fire_ups = SlotTimeVariables::create(
            &mut model,
            grids.iter().map(SlotGrid::starts),
            |t, slot| fire_up_variable(format!("w({t},{slot})"), continuous, instance.gamma()),
        );

        for (slot, grid) in grids.iter().enumerate() {
            // The capacity is only checked where the load of the slot peaks.
            for &t in grid.peaks() {
                let load = assignments
                    .running_at(instance, slot, t)
                    .map(|(job, x)| (x, instance.demand(job) as f64))
                    .collect::<LinearExpression>();
                model.add_constraint(less_than_or_equals(
                    format!("on({t},{slot})"),
                    load,
                    LinearExpression::new().with_term(activity.at(t, slot), capacity),
                ));
            }

            for &t in grid.ends() {
                let running =
                    LinearExpression::sum_of(assignments.running_at(instance, slot, t).map(|(_, x)| x));
                model.add_constraint(greater_than_or_equals(
                    format!("off({t},{slot})"),
                    running,
                    activity.at(t, slot),
                ));
            }

            for (job, x) in assignments.slot(slot) {
                model.add_constraint(less_than_or_equals(
                    format!("act({job},{slot})"),
                    x,
                    activity.at(instance.start(job), slot),
                ));
            }

            for (previous, t) in grid.starts_with_predecessor() {
                let mut switched_on = LinearExpression::from(fire_ups.at(t, slot));
                if let Some(previous) = previous {
                    switched_on.add_term(activity.at(previous, slot), 1.0);
                }
                model.add_constraint(less_than_or_equals(
                    format!("fireup({t},{slot})"),
                    activity.at(t, slot),
                    switched_on,
                ));

                if self.modifiers.contains(Modifier::ExactFireUps) {
                    if let Some(previous) = previous {
                        model.add_constraint(less_than_or_equals(
                            format!("wy_on({t},{slot})"),
                            fire_ups.at(t, slot),
                            activity.at(t, slot),
                        ));
                        model.add_constraint(less_than_or_equals(
                            format!("wy_off({t},{slot})"),
                            LinearExpression::sum_of([
                                fire_ups.at(t, slot),
                                activity.at(previous, slot),
                            ]),
                            1.0,
                        ));
                    }
                }
            }

            // Times at which slot 0 peaks are the only ones where an unused slot could be active.
            for &t in grids[0].peaks().intersection(grid.starts()) {
                model.add_constraint(less_than_or_equals(
                    format!("use_y({t},{slot})"),
                    activity.at(t, slot),
                    usage[slot],
                ));
            }

            model.add_constraint(less_than_or_equals(
                format!("vi({slot})"),
                usage[slot],
                fire_ups.slot_sum(slot),
            ));
        }

        for job in 0..num_jobs {
            model.add_constraint(equals(
                format!("assign({job})"),
                LinearExpression::sum_of(assignments.job(job).map(|(_, x)| x)),
                1.0,
            ));
        }

        for (slot, &z) in usage.iter().enumerate().take(bounds.lower) {
            model.add_constraint(equals(format!("lb({slot})"), z, 1.0));
        }
        for slot in bounds.lower..num_slots.saturating_sub(1) {
            model.add_constraint(greater_than_or_equals(
                format!("symmetry({slot})"),
                usage[slot],
                usage[slot + 1],
            ));
        }

        if self.modifiers.contains(Modifier::Conflicts) {
            let conflicts = ConflictCliques::compute(instance, num_slots);
            for (slot, layer) in conflicts.layers().iter().enumerate() {
                for (driver, cliques) in layer.iter() {
                    for (index, clique) in cliques.iter().enumerate() {
                        let Some(latest_start) = clique.iter().map(|&job| instance.start(job)).max()
                        else {
                            continue;
                        };
                        let members = clique.iter().filter_map(|&job| assignments.get(job, slot));
                        model.add_constraint(less_than_or_equals(
                            format!("conflict({slot},{driver},{index})"),
                            LinearExpression::sum_of(members),
                            activity.at(latest_start, slot),
                        ));
                    }
                }
            }
        }

        debug!("built {model}");

        let servers = LinearExpression::sum_of(usage.iter().copied());
        Ok(BuiltFormulation {
            model,
            context: FormulationContext {
                servers,
                fire_ups: fire_ups.sum(),
                num_jobs,
                num_slots,
                handles: TimeIndexedHandles {
                    assignments,
                    usage,
                    activity,
                    fire_ups,
                    grids,
                },
            },
        })
    }

    fn encode_warm_start(
        &self,
        built: &BuiltFormulation<TimeIndexedHandles>,
        instance: &InstanceFu,
        allocation: &Allocation,
    ) -> Result<Vec<f64>, WarmStartError> {
        check_allocation(built, instance, allocation)?;
        let handles = built.context.handles();
        let patterns = allocation.sorted_by_first_job();
        if patterns.num_patterns() > built.context.num_slots {
            return Err(WarmStartError::TooManyPatterns {
                patterns: patterns.num_patterns(),
                slots: built.context.num_slots,
            });
        }

        let mut values = vec![0.0; built.model.num_variables()];
        handles.assignments.encode(&patterns, &mut values)?;

        for (slot, grid) in handles.grids.iter().enumerate() {
            let pattern = patterns.patterns().get(slot);
            if pattern.is_some() {
                values[handles.usage[slot].position()] = 1.0;
            }
            let is_active =
                |t: Time| pattern.is_some_and(|pattern| pattern.iter().any(|job| instance[job].is_active_at(t)));

            let mut was_active = None;
            for &t in grid.times() {
                let active = is_active(t);
                values[handles.activity.at(t, slot).position()] = indicator(active);
                if grid.starts().contains(&t) {
                    let fires_up = active && !was_active.unwrap_or(false);
                    values[handles.fire_ups.at(t, slot).position()] = indicator(fires_up);
                }
                was_active = Some(active);
            }
        }

        Ok(values)
    }

    fn decode_allocation(
        &self,
        built: &BuiltFormulation<TimeIndexedHandles>,
        solution: &Solution,
    ) -> Allocation {
        built.context.handles().assignments.decode(solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formulations::tests::assert_warm_starts_match_brute_force;
    use crate::formulations::tests::staircase;

    #[test]
    fn variables_of_the_staircase() {
        let instance = staircase();
        let built = TimeIndexed::default()
            .build(&instance, ServerBounds::default())
            .expect("sorted instance");
        let handles = built.context().handles();

        assert_eq!(built.context().num_slots(), 3);
        // Slot 2 only hosts the last job.
        assert!(handles.assignments().get(2, 2).is_some());
        assert!(handles.assignments().get(1, 2).is_none());
        assert!(handles.activity(4, 0).is_none());
        assert!(handles.activity(2, 0).is_some());
        assert!(handles.fire_up(2, 1).is_some());
        assert!(handles.fire_up(3, 1).is_none());
        assert!(handles.usage(3).is_none());
    }

    #[test]
    fn warm_start_of_the_staircase() {
        let instance = staircase();
        let formulation = TimeIndexed::default();
        let built = formulation
            .build(&instance, ServerBounds::default())
            .expect("sorted instance");
        let allocation = Allocation::new([[0, 1, 2].into_iter().collect()]);
        let values = formulation
            .encode_warm_start(&built, &instance, &allocation)
            .expect("valid allocation");

        assert_eq!(built.model().check_solution(&values, 1e-9), Ok(()));
        assert_eq!(built.model().objective_value(&values), 2.0);
        assert_eq!(built.context().servers().evaluate(&values), 1.0);
        assert_eq!(built.context().fire_ups().evaluate(&values), 1.0);
    }

    #[test]
    fn too_many_patterns_for_the_slots() {
        let instance = staircase();
        let formulation = TimeIndexed::default();
        let built = formulation
            .build(&instance, ServerBounds::new(0, Some(1)))
            .expect("sorted instance");
        let allocation = Allocation::new([
            [0, 2].into_iter().collect(),
            [1].into_iter().collect(),
        ]);

        assert_eq!(
            formulation.encode_warm_start(&built, &instance, &allocation),
            Err(WarmStartError::TooManyPatterns {
                patterns: 2,
                slots: 1
            })
        );
    }

    #[test]
    fn warm_starts_agree_with_the_allocation_value() {
        for modifiers in [
            EnumSet::empty(),
            Modifier::Conflicts | Modifier::ExactFireUps,
            Modifier::ContinuousFireUps | Modifier::Conflicts,
        ] {
            assert_warm_starts_match_brute_force(&TimeIndexed::new(modifiers).expect("supported"));
        }
    }
}
