use rand::Rng;

use super::Instance;
use super::InstanceError;
use super::InstanceFu;
use super::Job;
use super::Time;

/// Parameters of the random instance generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomInstanceParameters {
    pub num_jobs: usize,
    pub capacity: u64,
    /// Start times are drawn from `1..=max_start`.
    pub max_start: Time,
    /// Durations are drawn from `1..=max_duration`.
    pub max_duration: Time,
    pub min_demand: u64,
    /// Demands are drawn up to this value; `None` means up to the capacity.
    pub max_demand: Option<u64>,
}

impl RandomInstanceParameters {
    pub fn new(num_jobs: usize, capacity: u64) -> RandomInstanceParameters {
        RandomInstanceParameters {
            num_jobs,
            capacity,
            max_start: 10,
            max_duration: 10,
            min_demand: 1,
            max_demand: None,
        }
    }
}

impl Instance {
    /// Draws a random instance and returns it sorted by start time.
    pub fn random(rng: &mut impl Rng, parameters: RandomInstanceParameters) -> Instance {
        let max_start = parameters.max_start.max(1);
        let max_duration = parameters.max_duration.max(1);
        let max_demand = parameters.max_demand.unwrap_or(parameters.capacity);
        let min_demand = parameters.min_demand.min(max_demand);

        let mut jobs = (0..parameters.num_jobs)
            .map(|_| {
                let start = rng.gen_range(1..=max_start);
                let end = start + rng.gen_range(1..=max_duration);
                Job::new(start, end, rng.gen_range(min_demand..=max_demand))
            })
            .collect::<Vec<_>>();
        jobs.sort();

        let instance = Instance {
            jobs,
            capacity: parameters.capacity,
        };
        crate::tbpp_assert_advanced!(instance.is_sorted());
        instance
    }
}

impl InstanceFu {
    pub fn random(
        rng: &mut impl Rng,
        parameters: RandomInstanceParameters,
        gamma: f64,
    ) -> Result<InstanceFu, InstanceError> {
        InstanceFu::extend(Instance::random(rng, parameters), gamma)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn random_instances_respect_the_parameters() {
        let mut rng = SmallRng::seed_from_u64(42);
        let parameters = RandomInstanceParameters {
            max_demand: Some(6),
            min_demand: 2,
            ..RandomInstanceParameters::new(50, 10)
        };
        let instance = Instance::random(&mut rng, parameters);

        assert_eq!(instance.num_jobs(), 50);
        assert!(instance.is_sorted());
        for job in instance.jobs() {
            assert!((1..=10).contains(&job.start));
            assert!((1..=10).contains(&job.duration()));
            assert!((2..=6).contains(&job.demand));
        }
    }

    #[test]
    fn the_generator_is_deterministic_for_a_seed() {
        let parameters = RandomInstanceParameters::new(20, 8);
        let first = Instance::random(&mut SmallRng::seed_from_u64(7), parameters);
        let second = Instance::random(&mut SmallRng::seed_from_u64(7), parameters);

        assert_eq!(first, second);
    }
}
