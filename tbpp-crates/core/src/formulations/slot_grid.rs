use std::collections::BTreeSet;

use crate::cliques::Breakpoints;
use crate::instance::Instance;
use crate::instance::Time;

/// The points in time which matter for server slot `k`, derived from the jobs `k..`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SlotGrid {
    starts: BTreeSet<Time>,
    ends: BTreeSet<Time>,
    times: Vec<Time>,
    peaks: BTreeSet<Time>,
}

impl SlotGrid {
    /// All start and end times of the jobs `slot..`.
    pub(crate) fn full(instance: &Instance, slot: usize) -> SlotGrid {
        let breakpoints = Breakpoints::from_job(instance, slot);
        SlotGrid {
            times: breakpoints.all(),
            peaks: breakpoints.non_dominated_starts().into_iter().collect(),
            starts: breakpoints.starts().clone(),
            ends: breakpoints.ends().clone(),
        }
    }

    /// Like [`SlotGrid::full`], without the end times from the last start time onwards; nothing
    /// can switch a server on after them.
    pub(crate) fn trimmed(instance: &Instance, slot: usize) -> SlotGrid {
        let mut grid = SlotGrid::full(instance, slot);
        if let Some(&last_start) = grid.starts.last() {
            grid.ends.retain(|&t| t < last_start);
        }
        grid.times = grid.starts.union(&grid.ends).copied().collect();
        grid
    }

    pub(crate) fn starts(&self) -> &BTreeSet<Time> {
        &self.starts
    }

    pub(crate) fn ends(&self) -> &BTreeSet<Time> {
        &self.ends
    }

    /// Start and end times in ascending order.
    pub(crate) fn times(&self) -> &[Time] {
        &self.times
    }

    /// The non-dominated start times of the jobs `slot..`, at which their load peaks.
    pub(crate) fn peaks(&self) -> &BTreeSet<Time> {
        &self.peaks
    }

    /// Iterates over the start times, each paired with the preceding grid time if there is one.
    pub(crate) fn starts_with_predecessor(&self) -> impl Iterator<Item = (Option<Time>, Time)> + '_ {
        self.times
            .iter()
            .enumerate()
            .filter(|&(_, &t)| self.starts.contains(&t))
            .map(|(position, &t)| {
                let previous = position.checked_sub(1).map(|previous| self.times[previous]);
                (previous, t)
            })
    }
}
