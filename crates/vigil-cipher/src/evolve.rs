//! Alphabet Mutation Search
//!
//! Heuristic extension, outside the core cracking contract: hill-climb
//! over alphabet permutations, keeping a mutant whenever it resolves at
//! least as many key positions against a known plaintext fragment as the
//! incumbent. Useful when the alphabet ordering itself is uncertain and
//! only a ciphertext/plaintext alignment is available.

use rand::Rng;

use crate::alphabet::Alphabet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvolveParams {
    pub generations: usize,
    pub swaps_per_generation: usize,
}

impl Default for EvolveParams {
    fn default() -> Self {
        Self {
            generations: 100,
            swaps_per_generation: 3,
        }
    }
}

pub struct AlphabetSearch;

impl AlphabetSearch {
    /// Aligned positions where both the ciphertext and the known fragment
    /// fall inside the alphabet, i.e. key positions a derivation would
    /// resolve rather than mark with the wildcard.
    pub fn resolved_positions(ciphertext: &str, known: &str, alphabet: &Alphabet) -> usize {
        ciphertext
            .chars()
            .zip(known.chars())
            .filter(|&(c, p)| alphabet.contains(c) && alphabet.contains(p))
            .count()
    }

    /// Swap `swaps` random symbol pairs in a copy of `alphabet`.
    pub fn mutate(alphabet: &Alphabet, swaps: usize, rng: &mut impl Rng) -> Alphabet {
        let mut symbols = alphabet.symbols().to_vec();
        for _ in 0..swaps {
            let a = rng.random_range(0..symbols.len());
            let b = rng.random_range(0..symbols.len());
            symbols.swap(a, b);
        }
        Alphabet::from_valid_symbols(symbols)
    }

    /// Hill-climb from `base`, returning the best alphabet found and its
    /// resolved-position score.
    pub fn optimize(
        ciphertext: &str,
        known: &str,
        base: &Alphabet,
        params: EvolveParams,
        rng: &mut impl Rng,
    ) -> (Alphabet, usize) {
        let mut best = base.clone();
        let mut best_score = Self::resolved_positions(ciphertext, known, &best);

        for _ in 0..params.generations {
            let candidate = Self::mutate(&best, params.swaps_per_generation, rng);
            let score = Self::resolved_positions(ciphertext, known, &candidate);
            if score > best_score {
                best_score = score;
                best = candidate;
            }
        }

        (best, best_score)
    }
}
