use std::fmt::Display;
use std::str::FromStr;

use enumset::EnumSet;
use enumset::EnumSetType;

use super::FormulationError;

/// Optional strengthenings and relaxations of the formulations.
#[derive(Debug, EnumSetType, Hash)]
pub enum Modifier {
    /// Add conflict clique inequalities.
    Conflicts,
    /// Tie the fire-up variables exactly to the switch-on events of the activity variables.
    ExactFireUps,
    /// Declare the fire-up variables continuous in `[0, 1]`.
    ContinuousFireUps,
    /// Every opened server fires up at its opening job.
    OpeningFireUp,
    /// Jobs can only be assigned to opened servers.
    OpenedServerOnly,
    /// Only keep the capacity constraint of the last job of a group with equal start times.
    Dominance,
}

impl Modifier {
    /// The short name used on the command line and in reports.
    pub fn name(self) -> &'static str {
        match self {
            Modifier::Conflicts => "conflicts",
            Modifier::ExactFireUps => "wy",
            Modifier::ContinuousFireUps => "continuous_w",
            Modifier::OpeningFireUp => "vi1",
            Modifier::OpenedServerOnly => "vi2",
            Modifier::Dominance => "dominance",
        }
    }
}

impl Display for Modifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Modifier {
    type Err = FormulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EnumSet::<Modifier>::all()
            .iter()
            .find(|modifier| modifier.name() == s)
            .ok_or_else(|| FormulationError::UnknownModifier(s.to_owned()))
    }
}

/// Parses a comma separated list of modifier names; the empty string is the empty set.
pub fn parse_modifiers(s: &str) -> Result<EnumSet<Modifier>, FormulationError> {
    s.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(Modifier::from_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for modifier in EnumSet::<Modifier>::all() {
            assert_eq!(modifier.name().parse::<Modifier>(), Ok(modifier));
        }
    }

    #[test]
    fn lists_are_parsed() {
        assert_eq!(
            parse_modifiers("vi1, dominance"),
            Ok(Modifier::OpeningFireUp | Modifier::Dominance)
        );
        assert_eq!(parse_modifiers(""), Ok(EnumSet::empty()));
        assert_eq!(
            parse_modifiers("conflicts,cuts"),
            Err(FormulationError::UnknownModifier("cuts".to_owned()))
        );
    }
}
