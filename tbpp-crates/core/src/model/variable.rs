use std::fmt::Display;

use crate::containers::StorageKey;

/// Identifies a variable of a [`super::Model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId(u32);

impl StorageKey for VariableId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        VariableId(index as u32)
    }
}

impl Display for VariableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Binary,
    Integer,
    Continuous,
}

/// A decision variable with its bounds and its coefficient in the objective.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    name: String,
    kind: VariableKind,
    lower: f64,
    upper: f64,
    objective: f64,
}

impl Variable {
    pub fn binary(name: impl Into<String>) -> Variable {
        Variable {
            name: name.into(),
            kind: VariableKind::Binary,
            lower: 0.0,
            upper: 1.0,
            objective: 0.0,
        }
    }

    pub fn integer(name: impl Into<String>, lower: f64, upper: f64) -> Variable {
        Variable {
            name: name.into(),
            kind: VariableKind::Integer,
            lower,
            upper,
            objective: 0.0,
        }
    }

    pub fn continuous(name: impl Into<String>, lower: f64, upper: f64) -> Variable {
        Variable {
            name: name.into(),
            kind: VariableKind::Continuous,
            lower,
            upper,
            objective: 0.0,
        }
    }

    /// Sets the coefficient of the variable in the objective.
    pub fn with_objective(mut self, coefficient: f64) -> Variable {
        self.objective = coefficient;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> VariableKind {
        self.kind
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn objective(&self) -> f64 {
        self.objective
    }

    pub fn is_integral(&self) -> bool {
        self.kind != VariableKind::Continuous
    }

    /// The same variable with its integrality requirement dropped.
    pub(crate) fn relaxed(&self) -> Variable {
        Variable {
            kind: VariableKind::Continuous,
            ..self.clone()
        }
    }
}
