//! Instances of the temporal bin packing problem, with and without fire-up costs, together with
//! the allocations that solve them.
mod allocation;
mod error;
mod instance_fu;
mod job;
mod random;

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::ops::Index;

pub use allocation::*;
pub use error::*;
pub use instance_fu::*;
pub use job::*;
pub use random::*;

/// The value an allocation achieves for an instance; smaller is better.
pub trait ValueFunction {
    fn compute_value(&self, allocation: &Allocation) -> f64;
}

/// An instance of the temporal bin packing problem: jobs with a time interval and a demand, and
/// identical servers of capacity `capacity`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    jobs: Vec<Job>,
    capacity: u64,
}

impl Instance {
    /// Creates an instance, rejecting jobs whose interval is empty.
    pub fn new(jobs: Vec<Job>, capacity: u64) -> Result<Instance, InstanceError> {
        if let Some((index, job)) = jobs.iter().enumerate().find(|(_, job)| job.start >= job.end) {
            return Err(InstanceError::EmptyInterval {
                index,
                start: job.start,
                end: job.end,
            });
        }

        Ok(Instance { jobs, capacity })
    }

    /// Creates an instance from separate columns of start times, end times and demands.
    pub fn from_columns(
        starts: &[Time],
        ends: &[Time],
        demands: &[u64],
        capacity: u64,
    ) -> Result<Instance, InstanceError> {
        if starts.len() != ends.len() || starts.len() != demands.len() {
            return Err(InstanceError::ColumnLengthMismatch {
                starts: starts.len(),
                ends: ends.len(),
                demands: demands.len(),
            });
        }

        let jobs = starts
            .iter()
            .zip(ends)
            .zip(demands)
            .map(|((&start, &end), &demand)| Job::new(start, end, demand))
            .collect();
        Instance::new(jobs, capacity)
    }

    pub fn num_jobs(&self) -> usize {
        self.jobs.len()
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn start(&self, job: usize) -> Time {
        self.jobs[job].start
    }

    pub fn end(&self, job: usize) -> Time {
        self.jobs[job].end
    }

    pub fn demand(&self, job: usize) -> u64 {
        self.jobs[job].demand
    }

    /// Whether the jobs are ordered by non-decreasing start time.
    pub fn is_sorted(&self) -> bool {
        self.jobs.windows(2).all(|pair| pair[0].start <= pair[1].start)
    }

    /// Returns the index of the first job which starts before its predecessor.
    pub fn first_unsorted_job(&self) -> Option<usize> {
        self.jobs
            .windows(2)
            .position(|pair| pair[0].start > pair[1].start)
            .map(|position| position + 1)
    }

    /// Returns the index of the first job whose demand exceeds the capacity.
    pub fn first_oversized_job(&self) -> Option<usize> {
        self.jobs.iter().position(|job| job.demand > self.capacity)
    }

    /// Returns a copy with the jobs sorted by `(start, end, demand)`.
    pub fn sorted(&self) -> Instance {
        self.sorted_with_order().0
    }

    /// Sorts the jobs like [`Instance::sorted`] and also returns, for every new index, the index
    /// of the job in `self`.
    pub fn sorted_with_order(&self) -> (Instance, Vec<usize>) {
        let mut order = (0..self.jobs.len()).collect::<Vec<_>>();
        order.sort_by_key(|&job| (self.jobs[job], job));
        let jobs = order.iter().map(|&job| self.jobs[job]).collect();

        (
            Instance {
                jobs,
                capacity: self.capacity,
            },
            order,
        )
    }

    /// Returns the instance restricted to the given jobs, in the given order.
    ///
    /// # Panics
    /// If one of the indices does not refer to a job of this instance.
    pub fn sub(&self, subset: &[usize]) -> Instance {
        Instance {
            jobs: subset.iter().map(|&job| self.jobs[job]).collect(),
            capacity: self.capacity,
        }
    }

    /// Returns a copy in which every job has the corresponding demand of `demands`.
    pub(crate) fn with_demands(&self, demands: &[u64]) -> Instance {
        Instance {
            jobs: self
                .jobs
                .iter()
                .zip(demands)
                .map(|(job, &demand)| Job { demand, ..*job })
                .collect(),
            capacity: self.capacity,
        }
    }

    /// The jobs which are running at time `t`, in index order.
    pub fn active_jobs_at(&self, t: Time) -> impl Iterator<Item = usize> + '_ {
        self.jobs
            .iter()
            .enumerate()
            .filter(move |(_, job)| job.is_active_at(t))
            .map(|(index, _)| index)
    }

    /// Maps every start time to the jobs which are running at that moment.
    pub fn jobs_for_time(&self) -> BTreeMap<Time, BTreeSet<usize>> {
        self.jobs
            .iter()
            .map(|job| (job.start, self.active_jobs_at(job.start).collect()))
            .collect()
    }

    /// The number of fire-ups of a single pattern.
    ///
    /// The jobs are visited by `(start, index)`; a job fires the server up when it starts strictly
    /// after every earlier visited job has ended. Jobs that touch (`end == start`) therefore keep
    /// the server running.
    pub fn count_pattern_fire_ups(&self, pattern: &Pattern) -> usize {
        let mut jobs = pattern.jobs().to_vec();
        jobs.sort_by_key(|&job| (self.jobs[job].start, job));

        let mut last_end: Option<Time> = None;
        let mut fire_ups = 0;
        for job in jobs {
            let Job { start, end, .. } = self.jobs[job];
            if last_end.map_or(true, |last_end| start > last_end) {
                fire_ups += 1;
            }
            last_end = Some(last_end.map_or(end, |last_end| last_end.max(end)));
        }
        fire_ups
    }

    /// The total number of fire-ups over all patterns of the allocation.
    pub fn count_fire_ups(&self, allocation: &Allocation) -> usize {
        allocation
            .iter()
            .map(|pattern| self.count_pattern_fire_ups(pattern))
            .sum()
    }

    /// The load of `pattern` at time `t`.
    pub fn load_at(&self, pattern: &Pattern, t: Time) -> u64 {
        pattern
            .iter()
            .filter(|&job| self.jobs[job].is_active_at(t))
            .map(|job| self.jobs[job].demand)
            .sum()
    }

    /// Checks that the allocation partitions the jobs and that no server is overloaded.
    ///
    /// The load of a pattern can only increase at the start of one of its jobs, so it suffices to
    /// check those moments.
    pub fn check_allocation(&self, allocation: &Allocation) -> Result<(), AllocationError> {
        allocation.check_partition(self.num_jobs())?;

        for (index, pattern) in allocation.iter().enumerate() {
            for job in pattern.iter() {
                let load = self.load_at(pattern, self.jobs[job].start);
                if load > self.capacity {
                    return Err(AllocationError::Overloaded {
                        pattern: index,
                        job,
                        load,
                        capacity: self.capacity,
                    });
                }
            }
        }

        Ok(())
    }

    pub fn is_feasible(&self, allocation: &Allocation) -> bool {
        self.check_allocation(allocation).is_ok()
    }
}

impl ValueFunction for Instance {
    /// The number of used servers.
    fn compute_value(&self, allocation: &Allocation) -> f64 {
        allocation.num_patterns() as f64
    }
}

impl Index<usize> for Instance {
    type Output = Job;

    fn index(&self, index: usize) -> &Self::Output {
        &self.jobs[index]
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn instance(jobs: &[(Time, Time, u64)], capacity: u64) -> Instance {
        Instance::new(
            jobs.iter()
                .map(|&(start, end, demand)| Job::new(start, end, demand))
                .collect(),
            capacity,
        )
        .expect("valid jobs")
    }

    pub(crate) fn allocation(patterns: &[&[usize]]) -> Allocation {
        patterns
            .iter()
            .map(|jobs| jobs.iter().copied().collect())
            .collect()
    }

    #[test]
    fn empty_intervals_are_rejected() {
        let result = Instance::new(vec![Job::new(0, 1, 1), Job::new(3, 3, 1)], 5);

        assert_eq!(
            result,
            Err(InstanceError::EmptyInterval {
                index: 1,
                start: 3,
                end: 3
            })
        );
    }

    #[test]
    fn columns_must_have_equal_length() {
        let result = Instance::from_columns(&[0, 1], &[2], &[1, 1], 2);

        assert!(matches!(
            result,
            Err(InstanceError::ColumnLengthMismatch { .. })
        ));
    }

    #[test]
    fn staircase_fits_on_one_server_with_one_fire_up() {
        let instance = instance(&[(0, 2, 5), (1, 3, 5), (2, 4, 5)], 10);
        let allocation = allocation(&[&[0, 1, 2]]);

        assert!(instance.is_feasible(&allocation));
        assert_eq!(instance.count_fire_ups(&allocation), 1);
        assert_eq!(instance.compute_value(&allocation), 1.0);
    }

    #[test]
    fn a_gap_causes_a_second_fire_up() {
        let instance = instance(&[(0, 2, 1), (3, 5, 1)], 10);

        assert_eq!(instance.count_fire_ups(&allocation(&[&[0, 1]])), 2);
    }

    #[test]
    fn overlapping_jobs_share_a_fire_up() {
        let instance = instance(&[(0, 3, 1), (2, 5, 1)], 10);

        assert_eq!(instance.count_fire_ups(&allocation(&[&[0, 1]])), 1);
    }

    #[test]
    fn touching_jobs_share_a_fire_up() {
        let instance = instance(&[(0, 2, 1), (2, 4, 1)], 10);

        assert_eq!(instance.count_fire_ups(&allocation(&[&[0, 1]])), 1);
    }

    #[test]
    fn fire_ups_follow_the_running_maximum_of_end_times() {
        // The short job ends before the third starts, but the long one keeps the server busy.
        let instance = instance(&[(0, 10, 1), (1, 2, 1), (5, 6, 1)], 10);

        assert_eq!(instance.count_fire_ups(&allocation(&[&[0, 1, 2]])), 1);
    }

    #[test]
    fn overloaded_pattern_is_reported() {
        let instance = instance(&[(0, 4, 6), (1, 3, 5)], 10);

        assert_eq!(
            instance.check_allocation(&allocation(&[&[0, 1]])),
            Err(AllocationError::Overloaded {
                pattern: 0,
                job: 1,
                load: 11,
                capacity: 10
            })
        );
        assert!(instance.is_feasible(&allocation(&[&[0], &[1]])));
    }

    #[test]
    fn sorting_reports_the_original_positions() {
        let instance = instance(&[(3, 4, 1), (0, 2, 1), (1, 5, 1)], 2);
        let (sorted, order) = instance.sorted_with_order();

        assert!(!instance.is_sorted());
        assert_eq!(instance.first_unsorted_job(), Some(1));
        assert!(sorted.is_sorted());
        assert_eq!(order, vec![1, 2, 0]);
        assert_eq!(sorted[0], instance[1]);
    }

    #[test]
    fn sub_instance_keeps_capacity() {
        let instance = instance(&[(0, 1, 1), (1, 2, 2), (2, 3, 3)], 7);
        let sub = instance.sub(&[2, 0]);

        assert_eq!(sub.num_jobs(), 2);
        assert_eq!(sub.capacity(), 7);
        assert_eq!(sub.demand(0), 3);
    }

    #[test]
    fn jobs_for_time_lists_running_jobs() {
        let instance = instance(&[(0, 2, 1), (1, 3, 1), (2, 4, 1)], 7);
        let map = instance.jobs_for_time();

        assert_eq!(map[&0], BTreeSet::from([0]));
        assert_eq!(map[&1], BTreeSet::from([0, 1]));
        assert_eq!(map[&2], BTreeSet::from([1, 2]));
    }
}
