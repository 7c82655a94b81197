//! A small mixed-integer linear model representation which formulations build and solvers
//! consume.
mod constraint;
mod error;
mod expression;
mod lp_format;
mod variable;

use std::fmt::Display;
use std::io::Write;

pub use constraint::*;
pub use error::*;
pub use expression::*;
pub use variable::*;

use crate::containers::KeyedVec;
use crate::containers::StorageKey;

/// The direction of the objective of a [`Model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptimisationDirection {
    Maximise,
    Minimise,
}

/// A mixed-integer linear program together with optional start values for its variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    name: String,
    direction: OptimisationDirection,
    variables: KeyedVec<VariableId, Variable>,
    start: KeyedVec<VariableId, Option<f64>>,
    constraints: Vec<LinearConstraint>,
}

impl Model {
    pub fn new(name: impl Into<String>, direction: OptimisationDirection) -> Model {
        Model {
            name: name.into(),
            direction,
            variables: KeyedVec::default(),
            start: KeyedVec::default(),
            constraints: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn direction(&self) -> OptimisationDirection {
        self.direction
    }

    pub fn add_variable(&mut self, variable: Variable) -> VariableId {
        let _ = self.start.push(None);
        self.variables.push(variable)
    }

    pub fn add_constraint(&mut self, constraint: LinearConstraint) {
        self.constraints.push(constraint);
    }

    pub fn variable(&self, id: VariableId) -> &Variable {
        &self.variables[id]
    }

    pub fn variables(&self) -> impl Iterator<Item = (VariableId, &Variable)> {
        self.variables.keyed_iter()
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// The number of non-zero coefficients in the constraint matrix.
    pub fn num_nonzeros(&self) -> usize {
        self.constraints
            .iter()
            .map(|constraint| constraint.terms().len())
            .sum()
    }

    /// The objective as an expression over the variables.
    pub fn objective(&self) -> LinearExpression {
        self.variables
            .keyed_iter()
            .filter(|(_, variable)| variable.objective() != 0.0)
            .map(|(id, variable)| (id, variable.objective()))
            .collect()
    }

    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.variables
            .iter()
            .zip(values)
            .map(|(variable, value)| variable.objective() * value)
            .sum()
    }

    pub fn set_start(&mut self, variable: VariableId, value: f64) {
        self.start[variable] = Some(value);
    }

    /// Replaces all start values; `values` is indexed by variable.
    pub fn set_start_values(&mut self, values: &[f64]) {
        self.start.fill(None);
        for (slot, &value) in self.start.iter_mut().zip(values) {
            *slot = Some(value);
        }
    }

    pub fn clear_start(&mut self) {
        self.start.fill(None);
    }

    pub fn start(&self, variable: VariableId) -> Option<f64> {
        self.start[variable]
    }

    /// The start values of all variables, if every variable has one.
    pub fn start_values(&self) -> Option<Vec<f64>> {
        self.start.iter().copied().collect()
    }

    /// The continuous relaxation: the same model with every integrality requirement dropped.
    pub fn relax(&self) -> Model {
        Model {
            name: format!("{}-relaxed", self.name),
            direction: self.direction,
            variables: self.variables.iter().map(Variable::relaxed).collect(),
            start: self.start.clone(),
            constraints: self.constraints.clone(),
        }
    }

    pub fn violated_constraints<'model>(
        &'model self,
        values: &'model [f64],
        tolerance: f64,
    ) -> impl Iterator<Item = &'model LinearConstraint> + 'model {
        self.constraints
            .iter()
            .filter(move |constraint| !constraint.is_satisfied_by(values, tolerance))
    }

    /// Checks bounds, integrality and every constraint for the given values.
    pub fn check_solution(&self, values: &[f64], tolerance: f64) -> Result<(), SolutionCheckError> {
        if values.len() != self.num_variables() {
            return Err(SolutionCheckError::WrongLength {
                expected: self.num_variables(),
                actual: values.len(),
            });
        }

        for (variable, &value) in self.variables.iter().zip(values) {
            if value < variable.lower() - tolerance || value > variable.upper() + tolerance {
                return Err(SolutionCheckError::OutOfBounds {
                    name: variable.name().to_owned(),
                    value,
                    lower: variable.lower(),
                    upper: variable.upper(),
                });
            }
            if variable.is_integral() && (value - value.round()).abs() > tolerance {
                return Err(SolutionCheckError::Fractional {
                    name: variable.name().to_owned(),
                    value,
                });
            }
        }

        if let Some(constraint) = self.violated_constraints(values, tolerance).next() {
            return Err(SolutionCheckError::Violated {
                name: constraint.name().to_owned(),
                activity: constraint.activity(values),
                sense: constraint.sense(),
                rhs: constraint.rhs(),
            });
        }

        Ok(())
    }

    /// Writes the model in the CPLEX LP file format.
    pub fn write_lp(&self, writer: impl Write) -> std::io::Result<()> {
        lp_format::write_lp(self, writer)
    }

    /// Looks a variable up by name.
    pub fn find_variable(&self, name: &str) -> Option<VariableId> {
        self.variables
            .keyed_iter()
            .find(|(_, variable)| variable.name() == name)
            .map(|(id, _)| id)
    }
}

impl Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({} variables, {} constraints, {} non-zeros)",
            self.name,
            self.num_variables(),
            self.num_constraints(),
            self.num_nonzeros()
        )
    }
}

impl VariableId {
    /// The position of the variable in value vectors of its model.
    pub fn position(self) -> usize {
        self.index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knapsack() -> (Model, VariableId, VariableId) {
        let mut model = Model::new("knapsack", OptimisationDirection::Maximise);
        let x = model.add_variable(Variable::binary("x").with_objective(3.0));
        let y = model.add_variable(Variable::binary("y").with_objective(2.0));
        model.add_constraint(less_than_or_equals(
            "weight",
            LinearExpression::new().with_term(x, 2.0).with_term(y, 2.0),
            3.0,
        ));
        (model, x, y)
    }

    #[test]
    fn statistics_of_the_model() {
        let (model, x, _) = knapsack();

        assert_eq!(model.num_variables(), 2);
        assert_eq!(model.num_constraints(), 1);
        assert_eq!(model.num_nonzeros(), 2);
        assert_eq!(model.find_variable("x"), Some(x));
        assert_eq!(model.objective_value(&[1.0, 0.0]), 3.0);
    }

    #[test]
    fn solution_check_reports_the_first_problem() {
        let (model, _, _) = knapsack();

        assert_eq!(model.check_solution(&[1.0, 0.0], 1e-9), Ok(()));
        assert!(matches!(
            model.check_solution(&[1.0, 1.0], 1e-9),
            Err(SolutionCheckError::Violated { .. })
        ));
        assert!(matches!(
            model.check_solution(&[0.5, 0.0], 1e-9),
            Err(SolutionCheckError::Fractional { .. })
        ));
        assert!(matches!(
            model.check_solution(&[2.0, 0.0], 1e-9),
            Err(SolutionCheckError::OutOfBounds { .. })
        ));
        assert!(matches!(
            model.check_solution(&[1.0], 1e-9),
            Err(SolutionCheckError::WrongLength {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn relaxation_accepts_fractional_values() {
        let (model, _, _) = knapsack();
        let relaxed = model.relax();

        assert_eq!(relaxed.check_solution(&[1.0, 0.5], 1e-9), Ok(()));
        assert_eq!(relaxed.num_constraints(), model.num_constraints());
    }

    #[test]
    fn start_values_are_complete_or_absent() {
        let (mut model, x, y) = knapsack();
        assert_eq!(model.start_values(), None);

        model.set_start(x, 1.0);
        assert_eq!(model.start_values(), None);

        model.set_start(y, 0.0);
        assert_eq!(model.start_values(), Some(vec![1.0, 0.0]));

        model.clear_start();
        assert_eq!(model.start(x), None);
    }

    #[test]
    fn lp_output_contains_all_sections() {
        let (model, _, _) = knapsack();
        let mut output = Vec::new();
        model.write_lp(&mut output).expect("writing to memory");
        let output = String::from_utf8(output).expect("ascii output");

        assert!(output.starts_with("\\ Model knapsack\nMaximize\n obj: + 3 x + 2 y\n"));
        assert!(output.contains(" weight: + 2 x + 2 y <= 3\n"));
        assert!(output.contains("Binaries\n x\n y\n"));
        assert!(output.ends_with("End\n"));
    }
}
