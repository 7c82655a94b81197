use std::collections::BTreeMap;
use std::fmt::Display;

use super::compute_cliques;
use super::prune_dominated;
use super::Clique;
use crate::instance::Instance;

/// The job around which a group of conflict cliques is built.
///
/// `LargeJobs` groups the cliques of jobs which each occupy more than half of a server, so any
/// two of them conflict; it orders before every single-job driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Driver {
    LargeJobs,
    Job(usize),
}

impl Display for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Driver::LargeJobs => write!(f, "large"),
            Driver::Job(job) => write!(f, "{job}"),
        }
    }
}

/// The conflict cliques which are valid for one server slot, grouped by driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictLayer {
    cliques: BTreeMap<Driver, Vec<Clique>>,
}

impl ConflictLayer {
    pub fn get(&self, driver: Driver) -> Option<&[Clique]> {
        self.cliques.get(&driver).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Driver, &[Clique])> {
        self.cliques
            .iter()
            .map(|(&driver, cliques)| (driver, cliques.as_slice()))
    }

    /// All cliques of the layer, ordered by driver.
    pub fn cliques(&self) -> impl Iterator<Item = &Clique> {
        self.cliques.values().flatten()
    }

    pub fn num_drivers(&self) -> usize {
        self.cliques.len()
    }

    pub fn num_cliques(&self) -> usize {
        self.cliques.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cliques.is_empty()
    }

    /// Removes `job` from every clique, prunes again and drops drivers without cliques.
    fn without_job(&self, job: usize) -> ConflictLayer {
        ConflictLayer {
            cliques: self
                .cliques
                .iter()
                .filter_map(|(&driver, cliques)| {
                    let pruned = prune_dominated(cliques.iter().map(|clique| {
                        let mut clique = clique.clone();
                        let _ = clique.remove(&job);
                        clique
                    }));
                    (!pruned.is_empty()).then_some((driver, pruned))
                })
                .collect(),
        }
    }
}

/// Sets of jobs of which at most one can run on a server at the moment the latest of them starts.
///
/// Layer `k` only contains jobs with index at least `k`, matching the jobs which may be placed in
/// server slot `k` of the slot-based models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictCliques {
    layers: Vec<ConflictLayer>,
}

impl ConflictCliques {
    /// Computes one layer per server slot, `num_slots` in total.
    pub fn compute(instance: &Instance, num_slots: usize) -> ConflictCliques {
        let mut layers = Vec::with_capacity(num_slots);
        if num_slots == 0 {
            return ConflictCliques { layers };
        }

        let capacity = instance.capacity();
        let is_large = |job: usize| instance.demand(job) > capacity / 2;
        let cliques = compute_cliques(instance);

        let mut first = BTreeMap::new();

        let large = prune_dominated(
            cliques
                .iter()
                .map(|clique| clique.iter().copied().filter(|&job| is_large(job)).collect()),
        );
        if !large.is_empty() {
            let _ = first.insert(Driver::LargeJobs, large);
        }

        for driver in (0..instance.num_jobs()).filter(|&job| !is_large(job)) {
            let demand = instance.demand(driver);
            let conflicts = prune_dominated(
                cliques
                    .iter()
                    .filter(|clique| clique.contains(&driver))
                    .map(|clique| {
                        clique
                            .iter()
                            .copied()
                            .filter(|&job| demand.saturating_add(instance.demand(job)) > capacity)
                            .chain(std::iter::once(driver))
                            .collect()
                    }),
            );
            if !conflicts.is_empty() {
                let _ = first.insert(Driver::Job(driver), conflicts);
            }
        }

        layers.push(ConflictLayer { cliques: first });
        for slot in 1..num_slots {
            let next = layers[slot - 1].without_job(slot - 1);
            layers.push(next);
        }

        ConflictCliques { layers }
    }

    pub fn layer(&self, slot: usize) -> Option<&ConflictLayer> {
        self.layers.get(slot)
    }

    pub fn layers(&self) -> &[ConflictLayer] {
        &self.layers
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::tests::instance;

    fn clique(jobs: &[usize]) -> Clique {
        jobs.iter().copied().collect()
    }

    fn example() -> Instance {
        instance(&[(0, 4, 6), (1, 5, 6), (2, 6, 3), (3, 7, 5)], 10)
    }

    #[test]
    fn first_layer_groups_large_jobs_and_drivers() {
        let conflicts = ConflictCliques::compute(&example(), 3);
        let layer = conflicts.layer(0).expect("three layers");

        assert_eq!(layer.get(Driver::LargeJobs), Some(&[clique(&[0, 1])][..]));
        assert_eq!(layer.get(Driver::Job(3)), Some(&[clique(&[0, 1, 3])][..]));
        // Job 2 conflicts with nobody, so it does not drive a clique.
        assert_eq!(layer.get(Driver::Job(2)), None);
        assert_eq!(layer.num_drivers(), 2);
        assert_eq!(
            layer.iter().map(|(driver, _)| driver).collect::<Vec<_>>(),
            vec![Driver::LargeJobs, Driver::Job(3)]
        );
    }

    #[test]
    fn later_layers_drop_earlier_jobs() {
        let conflicts = ConflictCliques::compute(&example(), 3);

        assert_eq!(conflicts.num_layers(), 3);
        let second = conflicts.layer(1).expect("three layers");
        assert_eq!(second.get(Driver::LargeJobs), None);
        assert_eq!(second.get(Driver::Job(3)), Some(&[clique(&[1, 3])][..]));
        assert!(conflicts.layer(2).expect("three layers").is_empty());
    }

    #[test]
    fn layer_cliques_only_contain_admissible_jobs() {
        let instance = instance(
            &[(0, 5, 7), (1, 4, 6), (1, 6, 2), (2, 3, 9), (2, 8, 4), (4, 9, 8)],
            10,
        );
        let conflicts = ConflictCliques::compute(&instance, 6);

        for (slot, layer) in conflicts.layers().iter().enumerate() {
            for clique in layer.cliques() {
                assert!(clique.len() > 1);
                assert!(clique.iter().all(|&job| job >= slot));
            }
        }
    }

    #[test]
    fn no_slots_means_no_layers() {
        assert_eq!(ConflictCliques::compute(&example(), 0).num_layers(), 0);
    }
}
