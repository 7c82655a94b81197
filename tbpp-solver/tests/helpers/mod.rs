#![allow(
    dead_code,
    reason = "every test binary uses a different part of the helpers"
)]

use tbpp_solver::instance::Allocation;
use tbpp_solver::instance::Instance;
use tbpp_solver::instance::InstanceFu;
use tbpp_solver::instance::Job;
use tbpp_solver::instance::Pattern;
use tbpp_solver::instance::ValueFunction;

pub(crate) const TOLERANCE: f64 = 1e-6;

/// Builds an instance from `(start, end, demand)` triples.
pub(crate) fn instance(jobs: &[(i64, i64, u64)], capacity: u64, gamma: f64) -> InstanceFu {
    let jobs = jobs
        .iter()
        .map(|&(start, end, demand)| Job::new(start, end, demand))
        .collect();
    let instance = Instance::new(jobs, capacity).expect("valid jobs");
    InstanceFu::extend(instance, gamma).expect("valid gamma")
}

/// All partitions of the jobs `0..num_jobs`.
pub(crate) fn set_partitions(num_jobs: usize) -> Vec<Allocation> {
    let mut partitions = Vec::new();
    let mut labels = Vec::with_capacity(num_jobs);
    extend_partitions(&mut labels, num_jobs, &mut partitions);
    partitions
}

fn extend_partitions(labels: &mut Vec<usize>, num_jobs: usize, partitions: &mut Vec<Allocation>) {
    let num_blocks = labels.iter().max().map_or(0, |&label| label + 1);
    if labels.len() == num_jobs {
        partitions.push(Allocation::new((0..num_blocks).map(|block| {
            labels
                .iter()
                .enumerate()
                .filter(|&(_, &label)| label == block)
                .map(|(job, _)| job)
                .collect::<Pattern>()
        })));
        return;
    }

    for label in 0..=num_blocks {
        labels.push(label);
        extend_partitions(labels, num_jobs, partitions);
        let _ = labels.pop();
    }
}

/// The value of the best feasible allocation, found by enumerating all of them.
pub(crate) fn brute_force_optimum(instance: &InstanceFu) -> f64 {
    set_partitions(instance.num_jobs())
        .iter()
        .filter(|allocation| instance.is_feasible(allocation))
        .map(|allocation| instance.compute_value(allocation))
        .fold(f64::INFINITY, f64::min)
}
