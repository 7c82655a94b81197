use std::io::Write;

use super::LinearConstraint;
use super::Model;
use super::OptimisationDirection;
use super::VariableKind;
use crate::containers::StorageKey;

/// Maximum length of a line before the writer starts a new one.
const LINE_LENGTH: usize = 200;

fn sanitise(name: &str) -> String {
    name.chars()
        .map(|character| match character {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '(' | ')' | ',' | '.' => character,
            _ => '_',
        })
        .collect()
}

fn write_terms(
    writer: &mut impl Write,
    model: &Model,
    terms: impl IntoIterator<Item = (usize, f64)>,
) -> std::io::Result<()> {
    let mut line_length = 0;
    let mut is_empty = true;
    for (index, coefficient) in terms {
        let name = sanitise(model.variables.as_slice()[index].name());
        let sign = if coefficient < 0.0 { '-' } else { '+' };
        let term = format!(" {sign} {} {name}", coefficient.abs());
        if line_length + term.len() > LINE_LENGTH {
            writeln!(writer)?;
            line_length = 0;
        }
        line_length += term.len();
        write!(writer, "{term}")?;
        is_empty = false;
    }
    if is_empty {
        write!(writer, " 0")?;
    }
    Ok(())
}

fn write_constraint(
    writer: &mut impl Write,
    model: &Model,
    constraint: &LinearConstraint,
) -> std::io::Result<()> {
    write!(writer, " {}:", sanitise(constraint.name()))?;
    write_terms(
        writer,
        model,
        constraint
            .terms()
            .iter()
            .map(|(variable, coefficient)| (variable.index(), *coefficient)),
    )?;
    writeln!(writer, " {} {}", constraint.sense(), constraint.rhs())
}

/// Writes the model in the CPLEX LP file format.
pub(super) fn write_lp(model: &Model, mut writer: impl Write) -> std::io::Result<()> {
    writeln!(writer, "\\ Model {}", model.name())?;
    match model.direction() {
        OptimisationDirection::Minimise => writeln!(writer, "Minimize")?,
        OptimisationDirection::Maximise => writeln!(writer, "Maximize")?,
    }
    write!(writer, " obj:")?;
    write_terms(
        &mut writer,
        model,
        model
            .variables
            .iter()
            .enumerate()
            .filter(|(_, variable)| variable.objective() != 0.0)
            .map(|(index, variable)| (index, variable.objective())),
    )?;
    writeln!(writer)?;

    writeln!(writer, "Subject To")?;
    for constraint in model.constraints() {
        write_constraint(&mut writer, model, constraint)?;
    }

    writeln!(writer, "Bounds")?;
    for variable in model.variables.iter() {
        let name = sanitise(variable.name());
        match (variable.lower().is_finite(), variable.upper().is_finite()) {
            (true, true) => writeln!(writer, " {} <= {name} <= {}", variable.lower(), variable.upper())?,
            (true, false) => writeln!(writer, " {name} >= {}", variable.lower())?,
            (false, true) => writeln!(writer, " -inf <= {name} <= {}", variable.upper())?,
            (false, false) => writeln!(writer, " {name} free")?,
        }
    }

    for (section, kind) in [("Binaries", VariableKind::Binary), ("Generals", VariableKind::Integer)] {
        let names = model
            .variables
            .iter()
            .filter(|variable| variable.kind() == kind)
            .map(|variable| sanitise(variable.name()))
            .collect::<Vec<_>>();
        if !names.is_empty() {
            writeln!(writer, "{section}")?;
            for name in names {
                writeln!(writer, " {name}")?;
            }
        }
    }

    writeln!(writer, "End")
}
