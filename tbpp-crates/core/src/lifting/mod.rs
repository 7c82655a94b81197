//! Strengthening of job demands which leaves the set of feasible allocations unchanged.
mod knapsack;

use log::debug;
use thiserror::Error;

pub use knapsack::max_subset_weight;

use crate::instance::Instance;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiftingError {
    #[error("precondition violated: job {job} has demand {demand} exceeding the capacity {capacity}")]
    PreconditionViolated { job: usize, demand: u64, capacity: u64 },
}

/// Raises every demand as far as possible without changing which allocations are feasible.
///
/// Jobs are lifted one after the other. For job `i` the largest load that the jobs overlapping it
/// can put next to it, at most `capacity - c_i`, is computed with the demands lifted so far; the
/// new demand is whatever remains of the capacity. Demands never decrease.
pub fn lift(instance: &Instance) -> Result<Instance, LiftingError> {
    let capacity = instance.capacity();
    if let Some(job) = instance.first_oversized_job() {
        return Err(LiftingError::PreconditionViolated {
            job,
            demand: instance.demand(job),
            capacity,
        });
    }

    let jobs = instance.jobs();
    let mut demands = jobs.iter().map(|job| job.demand).collect::<Vec<_>>();

    for (index, job) in jobs.iter().enumerate() {
        let neighbours = jobs
            .iter()
            .enumerate()
            .filter(|&(other, other_job)| other != index && job.overlaps(other_job))
            .map(|(other, _)| demands[other])
            .collect::<Vec<_>>();

        let slack = max_subset_weight(&neighbours, capacity - demands[index]);
        let lifted = capacity - slack;
        crate::tbpp_assert_simple!(lifted >= demands[index], "lifting decreased a demand");
        if lifted != demands[index] {
            debug!("lifted demand of job {index} from {} to {lifted}", demands[index]);
        }
        demands[index] = lifted;
    }

    let lifted = instance.with_demands(&demands);
    crate::tbpp_assert_moderate!(
        lifted.jobs().iter().all(|job| job.demand <= capacity),
        "lifted demands have to fit on a server"
    );
    Ok(lifted)
}
