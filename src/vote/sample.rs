use rand::Rng;

/// Fisher–Yates shuffle: every permutation of `items` is equally likely.
pub(crate) fn shuffle<T>(items: &mut [T], rng: &mut impl Rng) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Picks `k` distinct elements of `candidates` uniformly at random, without replacement.
///
/// The candidates are copied before shuffling, so the caller's slice is left as is. Asking for
/// more elements than there are candidates returns all of them in shuffled order.
pub(crate) fn sample<T: Clone>(candidates: &[T], k: usize, rng: &mut impl Rng) -> Vec<T> {
    let mut pool = candidates.to_vec();
    shuffle(&mut pool, rng);
    pool.truncate(k);
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn sample_returns_k_distinct_candidates() {
        let candidates = (0..20).collect_vec();

        for seed in 0..50 {
            let picked = sample(&candidates, 7, &mut StdRng::seed_from_u64(seed));

            assert_eq!(picked.len(), 7);
            assert!(picked.iter().all_unique());
            assert!(picked.iter().all(|p| candidates.contains(p)));
        }
    }

    #[test]
    fn oversized_sample_returns_every_candidate() {
        let candidates = (0..10).collect_vec();

        let picked = sample(&candidates, 25, &mut StdRng::seed_from_u64(7));

        assert_eq!(picked.len(), candidates.len());
        assert_eq!(picked.into_iter().sorted().collect_vec(), candidates);
    }

    #[test]
    fn same_seed_gives_same_sample() {
        let candidates = (1..=10).map(|i| format!("M{i}")).collect_vec();

        let first = sample(&candidates, 3, &mut StdRng::seed_from_u64(2024));
        let second = sample(&candidates, 3, &mut StdRng::seed_from_u64(2024));

        assert_eq!(first, second);
        assert_eq!(first, ["M2", "M5", "M1"]);
        assert_eq!(candidates.len(), 10);
    }

    #[test]
    fn every_permutation_is_reachable() {
        let candidates = [1, 2, 3];

        let seen = (0..600)
            .map(|seed| sample(&candidates, 3, &mut StdRng::seed_from_u64(seed)))
            .collect::<HashSet<_>>();

        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn empty_pool_gives_empty_sample() {
        let picked = sample::<u8>(&[], 3, &mut StdRng::seed_from_u64(1));
        assert!(picked.is_empty());
    }
}
