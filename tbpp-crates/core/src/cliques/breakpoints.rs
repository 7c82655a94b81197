use std::collections::BTreeSet;

use itertools::Itertools;

use crate::instance::Instance;
use crate::instance::Time;

/// The distinct start and end times of a suffix `first_job..` of the jobs of an instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoints {
    starts: BTreeSet<Time>,
    ends: BTreeSet<Time>,
}

impl Breakpoints {
    /// The breakpoints of all jobs.
    pub fn of(instance: &Instance) -> Breakpoints {
        Breakpoints::from_job(instance, 0)
    }

    /// The breakpoints of the jobs with index at least `first_job`.
    pub fn from_job(instance: &Instance, first_job: usize) -> Breakpoints {
        let jobs = instance.jobs().get(first_job..).unwrap_or_default();
        Breakpoints {
            starts: jobs.iter().map(|job| job.start).collect(),
            ends: jobs.iter().map(|job| job.end).collect(),
        }
    }

    pub fn starts(&self) -> &BTreeSet<Time> {
        &self.starts
    }

    pub fn ends(&self) -> &BTreeSet<Time> {
        &self.ends
    }

    pub fn is_start(&self, t: Time) -> bool {
        self.starts.contains(&t)
    }

    /// The union of start and end times in ascending order.
    pub fn all(&self) -> Vec<Time> {
        self.starts.union(&self.ends).copied().collect()
    }

    /// The start times after which the next breakpoint is an end time.
    ///
    /// Between such a start and the following breakpoint the set of running jobs is maximal, so
    /// every load peak of the jobs is attained at one of these times.
    pub fn non_dominated_starts(&self) -> Vec<Time> {
        self.all()
            .into_iter()
            .tuple_windows()
            .filter(|&(t0, t1)| self.starts.contains(&t0) && self.ends.contains(&t1))
            .map(|(t0, _)| t0)
            .collect()
    }
}
