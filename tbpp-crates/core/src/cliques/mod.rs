//! Maximal sets of simultaneously running jobs and the conflict cliques derived from them.
mod breakpoints;
mod conflict;

use std::collections::BTreeSet;

pub use breakpoints::*;
pub use conflict::*;

use crate::instance::Instance;

/// A set of jobs, identified by their index.
pub type Clique = BTreeSet<usize>;

/// Computes the sets of jobs running at the non-dominated start times, in ascending time order.
pub fn compute_cliques(instance: &Instance) -> Vec<Clique> {
    Breakpoints::of(instance)
        .non_dominated_starts()
        .into_iter()
        .map(|t| instance.active_jobs_at(t).collect())
        .collect()
}

/// Removes cliques with fewer than two jobs and cliques contained in a neighbour.
///
/// The cliques are scanned in order while a stack of kept cliques is maintained: a clique that is
/// contained in the top of the stack is skipped, otherwise every kept clique it contains is popped
/// before it is pushed. Of two equal cliques only the first survives. In the result no clique is
/// a subset of the clique that follows it.
pub fn prune_dominated(cliques: impl IntoIterator<Item = Clique>) -> Vec<Clique> {
    let mut kept: Vec<Clique> = Vec::new();

    for clique in cliques.into_iter().filter(|clique| clique.len() > 1) {
        if kept.last().is_some_and(|top| clique.is_subset(top)) {
            continue;
        }
        while kept.last().is_some_and(|top| top.is_subset(&clique)) {
            let _ = kept.pop();
        }
        kept.push(clique);
    }

    kept
}
