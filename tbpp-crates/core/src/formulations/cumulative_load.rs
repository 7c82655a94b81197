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

/// The cumulative-load formulation.
///
/// It uses the same slots, assignment variables `x(i,k)` and usage variables `z(k)` as
/// [`super::TimeIndexed`], but no activity variables. Instead, the load of a slot is bounded at
/// the start of every job at a load peak, counting the earlier jobs which are still running, and
/// a job fires its slot up unless an earlier job of the slot runs until at least its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CumulativeLoad {
    modifiers: EnumSet<Modifier>,
}

impl CumulativeLoad {
    pub fn new(modifiers: EnumSet<Modifier>) -> Result<CumulativeLoad, FormulationError> {
        let modifiers = FormulationKind::CumulativeLoad.validate(modifiers)?;
        Ok(CumulativeLoad { modifiers })
    }
}

impl Default for CumulativeLoad {
    fn default() -> Self {
        CumulativeLoad {
            modifiers: FormulationKind::CumulativeLoad.default_modifiers(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CumulativeLoadHandles {
    assignments: SlotAssignments,
    usage: Vec<VariableId>,
    fire_ups: SlotTimeVariables,
    grids: Vec<SlotGrid>,
}

impl CumulativeLoadHandles {
    pub fn assignments(&self) -> &SlotAssignments {
        &self.assignments
    }

    pub fn usage(&self, slot: usize) -> Option<VariableId> {
        self.usage.get(slot).copied()
    }

    pub fn fire_up(&self, t: Time, slot: usize) -> Option<VariableId> {
        self.fire_ups.get(t, slot)
    }
}

impl Formulation for CumulativeLoad {
    type Handles = CumulativeLoadHandles;

    fn kind(&self) -> FormulationKind {
        FormulationKind::CumulativeLoad
    }

    fn modifiers(&self) -> EnumSet<Modifier> {
        self.modifiers
    }

    fn build(
        &self,
        instance: &InstanceFu,
        bounds: ServerBounds,
    ) -> Result<BuiltFormulation<CumulativeLoadHandles>, FormulationError> {
        check_instance(instance)?;
        let num_jobs = instance.num_jobs();
        let num_slots = bounds.num_slots(num_jobs)?;
        let capacity = instance.capacity() as f64;

        let mut model = Model::new("cumulative-load", OptimisationDirection::Minimise);
        // The breakpoints are derived per slot from the jobs the slot can host.
        let grids = (0..num_slots)
            .map(|slot| SlotGrid::full(instance, slot))
            .collect::<Vec<_>>();

        let assignments = SlotAssignments::create(&mut model, num_jobs, num_slots);
        let fire_ups = SlotTimeVariables::create(
            &mut model,
            grids.iter().map(SlotGrid::starts),
            |t, slot| fire_up_variable(format!("w({t},{slot})"), false, instance.gamma()),
        );
        let usage = (0..num_slots)
            .map(|slot| model.add_variable(Variable::binary(format!("z({slot})")).with_objective(1.0)))
            .collect::<Vec<_>>();

        for job in 0..num_jobs {
            model.add_constraint(equals(
                format!("assign({job})"),
                LinearExpression::sum_of(assignments.job(job).map(|(_, x)| x)),
                1.0,
            ));
        }

        for (slot, grid) in grids.iter().enumerate() {
            let z = usage[slot];
            let hosted = assignments.slot(slot).collect::<Vec<_>>();

            for (position, &(job, x)) in hosted.iter().enumerate() {
                let start = instance.start(job);
                let earlier = &hosted[..position];

                if grid.peaks().contains(&start) {
                    let load = earlier
                        .iter()
                        .chain(std::iter::once(&(job, x)))
                        .filter(|&&(other, _)| instance.end(other) > start)
                        .map(|&(other, x_other)| (x_other, instance.demand(other) as f64))
                        .collect::<LinearExpression>();
                    model.add_constraint(less_than_or_equals(
                        format!("cap({job},{slot})"),
                        load,
                        LinearExpression::new().with_term(z, capacity),
                    ));
                }

                model.add_constraint(less_than_or_equals(format!("use({job},{slot})"), x, z));

                let mut continued = LinearExpression::from(fire_ups.at(start, slot));
                continued.extend(
                    earlier
                        .iter()
                        .filter(|&&(other, _)| instance.end(other) >= start)
                        .map(|&(_, x_other)| (x_other, 1.0)),
                );
                model.add_constraint(less_than_or_equals(
                    format!("fireup({job},{slot})"),
                    x,
                    continued,
                ));
            }

            model.add_constraint(less_than_or_equals(
                format!("vi({slot})"),
                z,
                fire_ups.slot_sum(slot),
            ));
        }

        if bounds.lower > 0 {
            model.add_constraint(equals(
                "lb",
                LinearExpression::sum_of(usage.iter().copied().take(bounds.lower)),
                bounds.lower as f64,
            ));
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
                        let members = clique.iter().filter_map(|&job| assignments.get(job, slot));
                        model.add_constraint(less_than_or_equals(
                            format!("conflict({slot},{driver},{index})"),
                            LinearExpression::sum_of(members),
                            usage[slot],
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
                handles: CumulativeLoadHandles {
                    assignments,
                    usage,
                    fire_ups,
                    grids,
                },
            },
        })
    }

    fn encode_warm_start(
        &self,
        built: &BuiltFormulation<CumulativeLoadHandles>,
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
            let Some(pattern) = patterns.patterns().get(slot) else {
                continue;
            };
            values[handles.usage[slot].position()] = 1.0;

            let is_active = |t: Time| pattern.iter().any(|job| instance[job].is_active_at(t));
            for (previous, t) in grid.starts_with_predecessor() {
                let fires_up = is_active(t) && !previous.is_some_and(is_active);
                values[handles.fire_ups.at(t, slot).position()] = indicator(fires_up);
            }
        }

        Ok(values)
    }

    fn decode_allocation(
        &self,
        built: &BuiltFormulation<CumulativeLoadHandles>,
        solution: &Solution,
    ) -> Allocation {
        built.context.handles().assignments.decode(solution)
    }
}
