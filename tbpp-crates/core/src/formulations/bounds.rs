use super::FormulationError;

/// Known bounds on the number of servers of an optimal allocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ServerBounds {
    pub lower: usize,
    pub upper: Option<usize>,
}

impl ServerBounds {
    pub fn new(lower: usize, upper: Option<usize>) -> ServerBounds {
        ServerBounds { lower, upper }
    }

    /// Derives an upper bound from the value of a known allocation.
    ///
    /// Every server costs at least `1 + gamma` since it fires up at least once, so an optimal
    /// allocation uses at most `value / (1 + gamma)` servers.
    pub fn from_heuristic_value(lower: usize, value: f64, gamma: f64) -> ServerBounds {
        let upper = (value.round() / (1.0 + gamma) - 1e-8).ceil().max(0.0) as usize;
        ServerBounds {
            lower,
            upper: Some(upper),
        }
    }

    /// The number of server slots a model needs for `num_jobs` jobs.
    pub(crate) fn num_slots(&self, num_jobs: usize) -> Result<usize, FormulationError> {
        let slots = self.upper.unwrap_or(num_jobs).min(num_jobs);
        if slots == 0 && num_jobs > 0 {
            return Err(FormulationError::NoServers(num_jobs));
        }
        if self.lower > slots {
            return Err(FormulationError::InvalidBounds {
                lower: self.lower,
                slots,
            });
        }
        Ok(slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heuristic_value_bound() {
        assert_eq!(ServerBounds::from_heuristic_value(0, 10.0, 1.0).upper, Some(5));
        assert_eq!(ServerBounds::from_heuristic_value(0, 11.0, 1.0).upper, Some(6));
        assert_eq!(ServerBounds::from_heuristic_value(2, 4.0, 0.0).upper, Some(4));
    }

    #[test]
    fn slots_are_capped_by_the_number_of_jobs() {
        assert_eq!(ServerBounds::new(0, Some(10)).num_slots(4), Ok(4));
        assert_eq!(ServerBounds::new(1, None).num_slots(4), Ok(4));
        assert_eq!(ServerBounds::new(0, Some(2)).num_slots(4), Ok(2));
    }

    #[test]
    fn inconsistent_bounds_are_rejected() {
        assert_eq!(
            ServerBounds::new(3, Some(2)).num_slots(4),
            Err(FormulationError::InvalidBounds { lower: 3, slots: 2 })
        );
        assert_eq!(
            ServerBounds::new(0, Some(0)).num_slots(4),
            Err(FormulationError::NoServers(4))
        );
        assert_eq!(ServerBounds::new(0, Some(0)).num_slots(0), Ok(0));
    }
}
