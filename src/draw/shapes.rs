use super::Sampler;
use rand::seq::SliceRandom;
use rand::Rng;

/// Tire un dérangement de `0..n` selon `sampler`. Suppose `n >= 2`.
pub(super) fn sample<R: Rng + ?Sized>(sampler: Sampler, n: usize, rng: &mut R) -> Vec<usize> {
    match sampler {
        Sampler::Cycle => single_cycle(n, rng),
        Sampler::Uniform => uniform(n, rng),
    }
}

/// Mélange puis relie chaque élément au suivant dans l'ordre mélangé.
pub(super) fn single_cycle<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    debug_assert!(n >= 2);
    let mut perm: Vec<usize> = (0..n).collect();
    perm.shuffle(rng);

    let mut der = vec![0usize; n];
    for (i, &p) in perm.iter().enumerate() {
        der[p] = perm[(i + 1) % n];
    }
    der
}

/// Permutation uniforme rejetée tant qu'elle a un point fixe (≈ e essais en moyenne).
pub(super) fn uniform<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    debug_assert!(n >= 2);
    let mut perm: Vec<usize> = (0..n).collect();
    loop {
        perm.shuffle(rng);
        if perm.iter().enumerate().all(|(i, &p)| i != p) {
            return perm;
        }
    }
}
