use super::VariableId;
use crate::containers::StorageKey;

/// A linear expression `sum(coefficient * variable) + constant`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpression {
    terms: Vec<(VariableId, f64)>,
    constant: f64,
}

impl LinearExpression {
    pub fn new() -> LinearExpression {
        LinearExpression::default()
    }

    pub fn constant(value: f64) -> LinearExpression {
        LinearExpression {
            terms: Vec::new(),
            constant: value,
        }
    }

    /// The sum of the given variables, each with coefficient one.
    pub fn sum_of(variables: impl IntoIterator<Item = VariableId>) -> LinearExpression {
        variables.into_iter().map(|variable| (variable, 1.0)).collect()
    }

    pub fn with_term(mut self, variable: VariableId, coefficient: f64) -> LinearExpression {
        self.add_term(variable, coefficient);
        self
    }

    pub fn add_term(&mut self, variable: VariableId, coefficient: f64) {
        self.terms.push((variable, coefficient));
    }

    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    /// The terms in insertion order; a variable may occur more than once.
    pub fn terms(&self) -> &[(VariableId, f64)] {
        &self.terms
    }

    pub fn constant_term(&self) -> f64 {
        self.constant
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluates the expression for values indexed by variable.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(variable, coefficient)| {
                coefficient * values.get(variable.index()).copied().unwrap_or(0.0)
            })
            .sum::<f64>()
            + self.constant
    }
}

impl From<VariableId> for LinearExpression {
    fn from(variable: VariableId) -> Self {
        LinearExpression::new().with_term(variable, 1.0)
    }
}

impl FromIterator<(VariableId, f64)> for LinearExpression {
    fn from_iter<T: IntoIterator<Item = (VariableId, f64)>>(iter: T) -> Self {
        LinearExpression {
            terms: iter.into_iter().collect(),
            constant: 0.0,
        }
    }
}

impl Extend<(VariableId, f64)> for LinearExpression {
    fn extend<T: IntoIterator<Item = (VariableId, f64)>>(&mut self, iter: T) {
        self.terms.extend(iter)
    }
}
