use std::fmt::Display;

use itertools::Itertools;

use super::AllocationError;

/// The set of jobs that share one server. The jobs are kept sorted and without duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Pattern {
    jobs: Vec<usize>,
}

impl Pattern {
    pub fn new(jobs: impl IntoIterator<Item = usize>) -> Pattern {
        let mut jobs = jobs.into_iter().collect::<Vec<_>>();
        jobs.sort_unstable();
        jobs.dedup();
        Pattern { jobs }
    }

    pub fn jobs(&self) -> &[usize] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn contains(&self, job: usize) -> bool {
        self.jobs.binary_search(&job).is_ok()
    }

    /// The job with the smallest index in the pattern.
    pub fn first(&self) -> Option<usize> {
        self.jobs.first().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.jobs.iter().copied()
    }
}

impl FromIterator<usize> for Pattern {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        Pattern::new(iter)
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.jobs.iter().join(" "))
    }
}

/// A solution candidate: a collection of patterns, one per used server.
///
/// Empty patterns are dropped on construction since they do not correspond to a used server.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Allocation {
    patterns: Vec<Pattern>,
}

impl Allocation {
    pub fn new(patterns: impl IntoIterator<Item = Pattern>) -> Allocation {
        Allocation {
            patterns: patterns
                .into_iter()
                .filter(|pattern| !pattern.is_empty())
                .collect(),
        }
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn num_patterns(&self) -> usize {
        self.patterns.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }

    /// Returns the allocation with the patterns ordered by their smallest job index.
    ///
    /// On a start-sorted instance the `k`-th pattern in this order only contains jobs with index
    /// at least `k`, which is what the slot-based models rely on.
    pub fn sorted_by_first_job(&self) -> Allocation {
        let mut patterns = self.patterns.clone();
        patterns.sort_by_key(Pattern::first);
        Allocation { patterns }
    }

    /// Renames every job through `mapping`, which maps old indices to new indices.
    pub fn remap(&self, mapping: impl Fn(usize) -> usize) -> Allocation {
        Allocation::new(
            self.patterns
                .iter()
                .map(|pattern| pattern.iter().map(&mapping).collect()),
        )
    }

    /// Checks that every job `0..num_jobs` occurs in exactly one pattern.
    pub fn check_partition(&self, num_jobs: usize) -> Result<(), AllocationError> {
        let mut seen = vec![false; num_jobs];
        for job in self.patterns.iter().flat_map(Pattern::iter) {
            match seen.get_mut(job) {
                None => return Err(AllocationError::UnknownJob(job)),
                Some(true) => return Err(AllocationError::DuplicateJob(job)),
                Some(flag) => *flag = true,
            }
        }

        match seen.iter().position(|assigned| !assigned) {
            Some(job) => Err(AllocationError::MissingJob(job)),
            None => Ok(()),
        }
    }
}

impl FromIterator<Pattern> for Allocation {
    fn from_iter<T: IntoIterator<Item = Pattern>>(iter: T) -> Self {
        Allocation::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allocation(patterns: &[&[usize]]) -> Allocation {
        patterns
            .iter()
            .map(|jobs| jobs.iter().copied().collect())
            .collect()
    }

    #[test]
    fn patterns_are_normalised() {
        let pattern = Pattern::new([3, 1, 3, 2]);

        assert_eq!(pattern.jobs(), &[1, 2, 3]);
        assert_eq!(pattern.first(), Some(1));
        assert!(pattern.contains(2));
        assert!(!pattern.contains(0));
    }

    #[test]
    fn empty_patterns_are_dropped() {
        let allocation = allocation(&[&[0], &[], &[1, 2]]);

        assert_eq!(allocation.num_patterns(), 2);
    }

    #[test]
    fn sorting_by_first_job() {
        let allocation = allocation(&[&[2, 4], &[0, 3], &[1]]).sorted_by_first_job();

        let firsts = allocation
            .iter()
            .map(|pattern| pattern.first())
            .collect::<Vec<_>>();
        assert_eq!(firsts, vec![Some(0), Some(1), Some(2)]);
    }

    #[test]
    fn partition_errors() {
        assert_eq!(allocation(&[&[0, 1], &[2]]).check_partition(3), Ok(()));
        assert_eq!(
            allocation(&[&[0, 1], &[1, 2]]).check_partition(3),
            Err(AllocationError::DuplicateJob(1))
        );
        assert_eq!(
            allocation(&[&[0], &[2]]).check_partition(3),
            Err(AllocationError::MissingJob(1))
        );
        assert_eq!(
            allocation(&[&[0, 1, 2, 3]]).check_partition(3),
            Err(AllocationError::UnknownJob(3))
        );
    }

    #[test]
    fn remapping_renames_jobs() {
        let remapped = allocation(&[&[0, 2], &[1]]).remap(|job| 2 - job);

        assert_eq!(remapped, allocation(&[&[2, 0], &[1]]));
    }
}
