//! The three compact formulations of the temporal bin packing problem with fire-ups.
//!
//! * [`TimeIndexed`] gives every server slot an activity variable per relevant point in time.
//! * [`CumulativeLoad`] drops the activity variables and bounds the cumulative load of a slot at
//!   the start of each job directly.
//! * [`ServerIdentity`] names every server after the first job it runs, which removes the slot
//!   symmetry altogether.
//!
//! All formulations require the jobs to be sorted by start time.
mod bounds;
mod cumulative_load;
mod error;
mod modifiers;
mod server_identity;
mod slot_grid;
mod time_indexed;
mod variables;

use std::fmt::Debug;
use std::fmt::Display;

use enumset::EnumSet;
pub use bounds::*;
pub use cumulative_load::*;
pub use error::*;
pub use modifiers::*;
pub use server_identity::*;
pub use time_indexed::*;
pub use variables::*;

use crate::instance::Allocation;
use crate::instance::InstanceFu;
use crate::model::LinearExpression;
use crate::model::Model;
use crate::model::Variable;
use crate::solver::Solution;

/// Identifies one of the formulations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum FormulationKind {
    #[cfg_attr(feature = "clap", value(alias = "a"))]
    TimeIndexed,
    #[cfg_attr(feature = "clap", value(alias = "b"))]
    CumulativeLoad,
    #[cfg_attr(feature = "clap", value(alias = "c"))]
    ServerIdentity,
}

impl FormulationKind {
    pub const ALL: [FormulationKind; 3] = [
        FormulationKind::TimeIndexed,
        FormulationKind::CumulativeLoad,
        FormulationKind::ServerIdentity,
    ];

    pub fn supported_modifiers(self) -> EnumSet<Modifier> {
        match self {
            FormulationKind::TimeIndexed => {
                Modifier::Conflicts | Modifier::ExactFireUps | Modifier::ContinuousFireUps
            }
            FormulationKind::CumulativeLoad => EnumSet::only(Modifier::Conflicts),
            FormulationKind::ServerIdentity => {
                Modifier::OpeningFireUp
                    | Modifier::OpenedServerOnly
                    | Modifier::Dominance
                    | Modifier::ContinuousFireUps
            }
        }
    }

    pub fn default_modifiers(self) -> EnumSet<Modifier> {
        match self {
            FormulationKind::TimeIndexed | FormulationKind::CumulativeLoad => {
                EnumSet::only(Modifier::Conflicts)
            }
            FormulationKind::ServerIdentity => {
                Modifier::OpeningFireUp | Modifier::OpenedServerOnly | Modifier::Dominance
            }
        }
    }

    /// Returns the modifiers unchanged if this formulation supports all of them.
    pub fn validate(self, modifiers: EnumSet<Modifier>) -> Result<EnumSet<Modifier>, FormulationError> {
        match (modifiers - self.supported_modifiers()).iter().next() {
            Some(modifier) => Err(FormulationError::UnsupportedModifier {
                formulation: self,
                modifier,
            }),
            None => Ok(modifiers),
        }
    }
}

impl Display for FormulationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormulationKind::TimeIndexed => write!(f, "time-indexed"),
            FormulationKind::CumulativeLoad => write!(f, "cumulative-load"),
            FormulationKind::ServerIdentity => write!(f, "server-identity"),
        }
    }
}

/// Expressions and variable handles which are returned alongside a built model.
#[derive(Debug, Clone)]
pub struct FormulationContext<Handles> {
    servers: LinearExpression,
    fire_ups: LinearExpression,
    num_jobs: usize,
    num_slots: usize,
    handles: Handles,
}

impl<Handles> FormulationContext<Handles> {
    /// The number of used servers as an expression over the model variables.
    pub fn servers(&self) -> &LinearExpression {
        &self.servers
    }

    /// The number of fire-ups as an expression over the model variables.
    pub fn fire_ups(&self) -> &LinearExpression {
        &self.fire_ups
    }

    pub fn num_jobs(&self) -> usize {
        self.num_jobs
    }

    /// The number of servers the model can use at most.
    pub fn num_slots(&self) -> usize {
        self.num_slots
    }

    pub fn handles(&self) -> &Handles {
        &self.handles
    }
}

/// A model together with its [`FormulationContext`].
#[derive(Debug, Clone)]
pub struct BuiltFormulation<Handles> {
    model: Model,
    context: FormulationContext<Handles>,
}

impl<Handles> BuiltFormulation<Handles> {
    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    pub fn context(&self) -> &FormulationContext<Handles> {
        &self.context
    }

    pub fn into_model(self) -> Model {
        self.model
    }
}

/// A formulation turns an instance into a model, and translates allocations to and from values of
/// that model.
pub trait Formulation {
    /// The variable handles which are needed to translate allocations.
    type Handles: Debug + Clone;

    fn kind(&self) -> FormulationKind;

    fn modifiers(&self) -> EnumSet<Modifier>;

    /// Builds the model for a start-sorted instance.
    fn build(
        &self,
        instance: &InstanceFu,
        bounds: ServerBounds,
    ) -> Result<BuiltFormulation<Self::Handles>, FormulationError>;

    /// Computes model values which represent `allocation`, indexed by variable.
    ///
    /// The allocation has to partition the jobs, but it need not be feasible; the values of an
    /// infeasible allocation violate at least one constraint.
    fn encode_warm_start(
        &self,
        built: &BuiltFormulation<Self::Handles>,
        instance: &InstanceFu,
        allocation: &Allocation,
    ) -> Result<Vec<f64>, WarmStartError>;

    /// Reads the allocation off a solution of the model.
    fn decode_allocation(
        &self,
        built: &BuiltFormulation<Self::Handles>,
        solution: &Solution,
    ) -> Allocation;

    /// Stores the encoding of `allocation` as the start values of the model.
    fn apply_warm_start(
        &self,
        built: &mut BuiltFormulation<Self::Handles>,
        instance: &InstanceFu,
        allocation: &Allocation,
    ) -> Result<(), WarmStartError> {
        let values = self.encode_warm_start(built, instance, allocation)?;
        crate::tbpp_assert_eq_simple!(values.len(), built.model.num_variables());
        built.model.set_start_values(&values);
        Ok(())
    }
}

/// Builds the model of the given kind, with the default modifiers when none are given.
pub fn build_model(
    kind: FormulationKind,
    modifiers: Option<EnumSet<Modifier>>,
    instance: &InstanceFu,
    bounds: ServerBounds,
) -> Result<Model, FormulationError> {
    let modifiers = modifiers.unwrap_or(kind.default_modifiers());
    let model = match kind {
        FormulationKind::TimeIndexed => TimeIndexed::new(modifiers)?.build(instance, bounds)?.into_model(),
        FormulationKind::CumulativeLoad => {
            CumulativeLoad::new(modifiers)?.build(instance, bounds)?.into_model()
        }
        FormulationKind::ServerIdentity => {
            ServerIdentity::new(modifiers)?.build(instance, bounds)?.into_model()
        }
    };
    Ok(model)
}

/// Checks what every formulation needs from the instance: jobs sorted by start and demands that
/// fit on a server.
fn check_instance(instance: &InstanceFu) -> Result<(), FormulationError> {
    if let Some(job) = instance.first_unsorted_job() {
        return Err(FormulationError::UnsortedInstance(job));
    }
    if let Some(job) = instance.first_oversized_job() {
        return Err(FormulationError::OversizedJob {
            job,
            demand: instance.demand(job),
            capacity: instance.capacity(),
        });
    }
    Ok(())
}

fn check_allocation<Handles>(
    built: &BuiltFormulation<Handles>,
    instance: &InstanceFu,
    allocation: &Allocation,
) -> Result<(), WarmStartError> {
    let expected = built.context.num_jobs;
    if instance.num_jobs() != expected {
        return Err(WarmStartError::InstanceMismatch {
            expected,
            actual: instance.num_jobs(),
        });
    }
    allocation.check_partition(expected)?;
    Ok(())
}

fn fire_up_variable(name: String, continuous: bool, gamma: f64) -> Variable {
    let variable = if continuous {
        Variable::continuous(name, 0.0, 1.0)
    } else {
        Variable::binary(name)
    };
    variable.with_objective(gamma)
}

fn indicator(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}
