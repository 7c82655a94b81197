use itertools::Itertools;

/// Capacities up to this bound are handled with a dense subset-sum table.
const DENSE_TABLE_LIMIT: u64 = 1 << 20;

/// The largest total weight of a subset of `weights` that does not exceed `capacity`.
///
/// Small capacities fill a subset-sum table over `0..=capacity` item by item. Larger capacities
/// keep the sorted list of reachable sums instead, so the memory depends on the number of distinct
/// sums rather than on the capacity.
pub fn max_subset_weight(weights: &[u64], capacity: u64) -> u64 {
    let total = weights.iter().fold(0_u64, |sum, &weight| sum.saturating_add(weight));
    if total <= capacity {
        return total;
    }

    if capacity <= DENSE_TABLE_LIMIT {
        dense_max_subset_weight(weights, capacity as usize)
    } else {
        sparse_max_subset_weight(weights, capacity)
    }
}

fn dense_max_subset_weight(weights: &[u64], bound: usize) -> u64 {
    let mut reachable = vec![false; bound + 1];
    reachable[0] = true;

    for &weight in weights {
        let Ok(weight) = usize::try_from(weight) else {
            continue;
        };
        if weight == 0 || weight > bound {
            continue;
        }
        for sum in (weight..=bound).rev() {
            if reachable[sum - weight] {
                reachable[sum] = true;
            }
        }
        if reachable[bound] {
            break;
        }
    }

    reachable
        .iter()
        .rposition(|&is_reachable| is_reachable)
        .map_or(0, |sum| sum as u64)
}

fn sparse_max_subset_weight(weights: &[u64], capacity: u64) -> u64 {
    let mut sums = vec![0_u64];

    for &weight in weights {
        if weight == 0 || weight > capacity {
            continue;
        }
        sums = sums
            .iter()
            .copied()
            .merge(
                sums.iter()
                    .map(|&sum| sum.saturating_add(weight))
                    .take_while(|&sum| sum <= capacity),
            )
            .dedup()
            .collect();
        if sums.last() == Some(&capacity) {
            break;
        }
    }

    sums.last().copied().unwrap_or(0)
}
