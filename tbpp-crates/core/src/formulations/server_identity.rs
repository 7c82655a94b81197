use std::collections::BTreeMap;

use enumset::EnumSet;
use log::debug;

use super::check_allocation;
use super::check_instance;
use super::fire_up_variable;
use super::indicator;
use super::BuiltFormulation;
use super::Formulation;
use super::FormulationContext;
use super::FormulationError;
use super::FormulationKind;
use super::Modifier;
use super::ServerBounds;
use super::WarmStartError;
use crate::instance::Allocation;
use crate::instance::Instance;
use crate::instance::InstanceFu;
use crate::model::equals;
use crate::model::greater_than_or_equals;
use crate::model::less_than_or_equals;
use crate::model::LinearExpression;
use crate::model::Model;
use crate::model::OptimisationDirection;
use crate::model::Variable;
use crate::model::VariableId;
use crate::solver::Solution;

/// The server-identity formulation.
///
/// Every server is named after the first job it runs, its leader. `x(i,k)` places job `i` on the
/// server led by job `k <= i`; `x(k,k)` opens that server. Pairs which can never share a server
/// (overlapping jobs that together exceed the capacity) get no variable. Every job has one
/// fire-up variable `w(i)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerIdentity {
    modifiers: EnumSet<Modifier>,
}

impl ServerIdentity {
    pub fn new(modifiers: EnumSet<Modifier>) -> Result<ServerIdentity, FormulationError> {
        let modifiers = FormulationKind::ServerIdentity.validate(modifiers)?;
        Ok(ServerIdentity { modifiers })
    }
}

impl Default for ServerIdentity {
    fn default() -> Self {
        ServerIdentity {
            modifiers: FormulationKind::ServerIdentity.default_modifiers(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerIdentityHandles {
    assignments: BTreeMap<(usize, usize), VariableId>,
    /// For every leader, the jobs which may join its server in increasing order.
    members: Vec<Vec<usize>>,
    fire_ups: Vec<VariableId>,
}

impl ServerIdentityHandles {
    /// The variable which places `job` on the server led by `leader`.
    pub fn assignment(&self, job: usize, leader: usize) -> Option<VariableId> {
        self.assignments.get(&(job, leader)).copied()
    }

    pub fn fire_up(&self, job: usize) -> Option<VariableId> {
        self.fire_ups.get(job).copied()
    }

    /// The jobs which may share the server led by `leader`, the leader included.
    pub fn members(&self, leader: usize) -> &[usize] {
        self.members.get(leader).map_or(&[], Vec::as_slice)
    }

    fn at(&self, job: usize, leader: usize) -> VariableId {
        self.assignments[&(job, leader)]
    }
}

fn can_share(instance: &Instance, job: usize, leader: usize) -> bool {
    job == leader
        || instance.end(leader) <= instance.start(job)
        || instance.demand(job).saturating_add(instance.demand(leader)) <= instance.capacity()
}

impl Formulation for ServerIdentity {
    type Handles = ServerIdentityHandles;

    fn kind(&self) -> FormulationKind {
        FormulationKind::ServerIdentity
    }

    fn modifiers(&self) -> EnumSet<Modifier> {
        self.modifiers
    }

    fn build(
        &self,
        instance: &InstanceFu,
        bounds: ServerBounds,
    ) -> Result<BuiltFormulation<ServerIdentityHandles>, FormulationError> {
        check_instance(instance)?;
        let num_jobs = instance.num_jobs();
        let num_slots = bounds.num_slots(num_jobs)?;
        let capacity = instance.capacity() as f64;
        let continuous = self.modifiers.contains(Modifier::ContinuousFireUps);

        let mut model = Model::new("server-identity", OptimisationDirection::Minimise);

        let mut assignments = BTreeMap::new();
        let mut members = vec![Vec::new(); num_jobs];
        for job in 0..num_jobs {
            for leader in (0..=job).filter(|&leader| can_share(instance, job, leader)) {
                let opening_cost = if leader == job { 1.0 } else { 0.0 };
                let variable = model
                    .add_variable(Variable::binary(format!("x({job},{leader})")).with_objective(opening_cost));
                let _ = assignments.insert((job, leader), variable);
                members[leader].push(job);
            }
        }
        let fire_ups = (0..num_jobs)
            .map(|job| model.add_variable(fire_up_variable(format!("w({job})"), continuous, instance.gamma())))
            .collect::<Vec<_>>();
        let handles = ServerIdentityHandles {
            assignments,
            members,
            fire_ups,
        };

        for job in 0..num_jobs {
            let placements = (0..=job).filter_map(|leader| handles.assignment(job, leader));
            model.add_constraint(equals(
                format!("assign({job})"),
                LinearExpression::sum_of(placements),
                1.0,
            ));
        }

        for (leader, members) in handles.members.iter().enumerate() {
            let opened = handles.at(leader, leader);

            for (position, &job) in members.iter().enumerate() {
                let start = instance.start(job);
                let earlier = &members[..position];
                let x = handles.at(job, leader);

                // A later member with the same start time has the stronger capacity row.
                let is_dominated = self.modifiers.contains(Modifier::Dominance)
                    && members
                        .get(position + 1)
                        .is_some_and(|&next| instance.start(next) == start);
                if job != leader && !is_dominated {
                    let load = earlier
                        .iter()
                        .chain(std::iter::once(&job))
                        .filter(|&&other| instance.end(other) > start)
                        .map(|&other| (handles.at(other, leader), instance.demand(other) as f64))
                        .collect::<LinearExpression>();
                    model.add_constraint(less_than_or_equals(
                        format!("cap({job},{leader})"),
                        load,
                        LinearExpression::new().with_term(opened, capacity),
                    ));
                }

                let mut continued = LinearExpression::from(handles.fire_ups[job]);
                continued.extend(
                    earlier
                        .iter()
                        .filter(|&&other| instance.end(other) >= start)
                        .map(|&other| (handles.at(other, leader), 1.0)),
                );
                model.add_constraint(less_than_or_equals(
                    format!("fireup({job},{leader})"),
                    x,
                    continued,
                ));

                if job != leader && self.modifiers.contains(Modifier::OpenedServerOnly) {
                    model.add_constraint(less_than_or_equals(
                        format!("vi2({job},{leader})"),
                        x,
                        opened,
                    ));
                } else if job != leader && instance.demand(job) == 0 {
                    // The capacity row does not keep a job without demand off unopened servers.
                    model.add_constraint(less_than_or_equals(
                        format!("open({job},{leader})"),
                        x,
                        opened,
                    ));
                }
            }

            if self.modifiers.contains(Modifier::OpeningFireUp) {
                model.add_constraint(less_than_or_equals(
                    format!("vi1({leader})"),
                    opened,
                    handles.fire_ups[leader],
                ));
            }
        }

        let servers =
            LinearExpression::sum_of((0..num_jobs).map(|leader| handles.at(leader, leader)));
        if bounds.lower > 0 {
            model.add_constraint(greater_than_or_equals("lb", servers.clone(), bounds.lower as f64));
        }
        if num_slots < num_jobs {
            model.add_constraint(less_than_or_equals("ub", servers.clone(), num_slots as f64));
        }

        debug!("built {model}");

        Ok(BuiltFormulation {
            model,
            context: FormulationContext {
                servers,
                fire_ups: LinearExpression::sum_of(handles.fire_ups.iter().copied()),
                num_jobs,
                num_slots,
                handles,
            },
        })
    }

    fn encode_warm_start(
        &self,
        built: &BuiltFormulation<ServerIdentityHandles>,
        instance: &InstanceFu,
        allocation: &Allocation,
    ) -> Result<Vec<f64>, WarmStartError> {
        check_allocation(built, instance, allocation)?;
        if allocation.num_patterns() > built.context.num_slots {
            return Err(WarmStartError::TooManyPatterns {
                patterns: allocation.num_patterns(),
                slots: built.context.num_slots,
            });
        }
        let handles = built.context.handles();
        let mut values = vec![0.0; built.model.num_variables()];

        for pattern in allocation.iter() {
            let jobs = pattern.jobs();
            let Some(&leader) = jobs.first() else {
                continue;
            };

            for (position, &job) in jobs.iter().enumerate() {
                let x = handles
                    .assignment(job, leader)
                    .ok_or(WarmStartError::MissingAssignment {
                        job,
                        server: leader,
                    })?;
                values[x.position()] = 1.0;

                let start = instance.start(job);
                let continues = jobs[..position]
                    .iter()
                    .any(|&other| instance.end(other) >= start);
                values[handles.fire_ups[job].position()] = indicator(!continues);
            }
        }

        Ok(values)
    }

    fn decode_allocation(
        &self,
        built: &BuiltFormulation<ServerIdentityHandles>,
        solution: &Solution,
    ) -> Allocation {
        let mut servers: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (&(job, leader), &x) in &built.context.handles().assignments {
            if solution.is_set(x) {
                servers.entry(leader).or_default().push(job);
            }
        }
        servers.into_values().map(|jobs| jobs.into_iter().collect()).collect()
    }
}
