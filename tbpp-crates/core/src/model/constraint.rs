use std::fmt::Display;

use super::LinearExpression;
use super::VariableId;
use crate::containers::HashMap;
use crate::containers::StorageKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sense {
    LessOrEqual,
    GreaterOrEqual,
    Equal,
}

impl Display for Sense {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sense::LessOrEqual => write!(f, "<="),
            Sense::GreaterOrEqual => write!(f, ">="),
            Sense::Equal => write!(f, "="),
        }
    }
}

/// A named linear constraint in normal form: every variable occurs once on the left-hand side and
/// the right-hand side is a constant.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    name: String,
    terms: Vec<(VariableId, f64)>,
    sense: Sense,
    rhs: f64,
}

impl LinearConstraint {
    /// Creates the constraint `lhs sense rhs`, moving all variables to the left and all constants
    /// to the right. Coefficients of repeated variables are merged and zero terms are dropped.
    pub fn new(
        name: impl Into<String>,
        lhs: LinearExpression,
        sense: Sense,
        rhs: LinearExpression,
    ) -> LinearConstraint {
        let mut positions: HashMap<VariableId, usize> = HashMap::default();
        let mut terms: Vec<(VariableId, f64)> = Vec::new();

        let moved = lhs
            .terms()
            .iter()
            .copied()
            .chain(rhs.terms().iter().map(|&(variable, coefficient)| (variable, -coefficient)));
        for (variable, coefficient) in moved {
            match positions.get(&variable) {
                Some(&position) => terms[position].1 += coefficient,
                None => {
                    let _ = positions.insert(variable, terms.len());
                    terms.push((variable, coefficient));
                }
            }
        }
        terms.retain(|&(_, coefficient)| coefficient != 0.0);

        LinearConstraint {
            name: name.into(),
            terms,
            sense,
            rhs: rhs.constant_term() - lhs.constant_term(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn terms(&self) -> &[(VariableId, f64)] {
        &self.terms
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    /// The value of the left-hand side for values indexed by variable.
    pub fn activity(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(variable, coefficient)| {
                coefficient * values.get(variable.index()).copied().unwrap_or(0.0)
            })
            .sum()
    }

    pub fn is_satisfied_by(&self, values: &[f64], tolerance: f64) -> bool {
        let activity = self.activity(values);
        match self.sense {
            Sense::LessOrEqual => activity <= self.rhs + tolerance,
            Sense::GreaterOrEqual => activity >= self.rhs - tolerance,
            Sense::Equal => (activity - self.rhs).abs() <= tolerance,
        }
    }
}

/// Creates the constraint `lhs <= rhs`.
pub fn less_than_or_equals(
    name: impl Into<String>,
    lhs: impl Into<LinearExpression>,
    rhs: impl Into<LinearExpression>,
) -> LinearConstraint {
    LinearConstraint::new(name, lhs.into(), Sense::LessOrEqual, rhs.into())
}

/// Creates the constraint `lhs >= rhs`.
pub fn greater_than_or_equals(
    name: impl Into<String>,
    lhs: impl Into<LinearExpression>,
    rhs: impl Into<LinearExpression>,
) -> LinearConstraint {
    LinearConstraint::new(name, lhs.into(), Sense::GreaterOrEqual, rhs.into())
}

/// Creates the constraint `lhs == rhs`.
pub fn equals(
    name: impl Into<String>,
    lhs: impl Into<LinearExpression>,
    rhs: impl Into<LinearExpression>,
) -> LinearConstraint {
    LinearConstraint::new(name, lhs.into(), Sense::Equal, rhs.into())
}

impl From<f64> for LinearExpression {
    fn from(value: f64) -> Self {
        LinearExpression::constant(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variable(index: usize) -> VariableId {
        VariableId::create_from_index(index)
    }

    #[test]
    fn variables_move_to_the_left() {
        // x0 + 2 <= 3 x1 + x0 + 5
        let mut lhs = LinearExpression::from(variable(0)).with_term(variable(2), 0.0);
        lhs.add_constant(2.0);
        let mut rhs = LinearExpression::new()
            .with_term(variable(1), 3.0)
            .with_term(variable(0), 1.0);
        rhs.add_constant(5.0);

        let constraint = less_than_or_equals("c", lhs, rhs);

        assert_eq!(constraint.terms(), &[(variable(1), -3.0)]);
        assert_eq!(constraint.rhs(), 3.0);
        assert_eq!(constraint.sense(), Sense::LessOrEqual);
    }

    #[test]
    fn satisfaction_respects_the_tolerance() {
        let constraint = equals("c", LinearExpression::sum_of([variable(0), variable(1)]), 1.0);

        assert!(constraint.is_satisfied_by(&[0.4, 0.6], 1e-9));
        assert!(constraint.is_satisfied_by(&[0.4, 0.6000001], 1e-6));
        assert!(!constraint.is_satisfied_by(&[1.0, 1.0], 1e-6));
    }

    #[test]
    fn greater_than_uses_lower_side() {
        let constraint = greater_than_or_equals("c", variable(0), variable(1));

        assert!(constraint.is_satisfied_by(&[1.0, 0.0], 0.0));
        assert!(!constraint.is_satisfied_by(&[0.0, 1.0], 0.0));
    }
}
