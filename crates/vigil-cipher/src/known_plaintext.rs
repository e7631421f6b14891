//! Known-Plaintext Attack
//!
//! Sliding a known word along the ciphertext and subtracting it position
//! by position yields the key segment in effect at that alignment. Each
//! surviving segment, reduced to its minimal repeating period, becomes a
//! candidate for the scorer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::alphabet::Alphabet;
use crate::{Error, Result};

/// Where a key hypothesis came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Provenance {
    /// Derived by aligning a known word at this ciphertext offset.
    KnownPlaintext { offset: usize },
    /// Recovered by column frequency analysis at this period.
    FrequencyAnalysis { period: usize },
}

/// A key hypothesis awaiting scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyCandidate {
    pub key: String,
    pub provenance: Provenance,
    /// Independent derivations agreeing on this key: distinct alignment
    /// offsets, or prefix-merged segments. Starts at 1.
    pub support: usize,
}

/// Smallest period p such that the whole segment repeats its own first p
/// symbols. Not restricted to divisors: a 12-symbol stretch of a 5-symbol
/// key has period 5 even though 5 does not divide 12.
pub fn minimal_period(segment: &[char]) -> usize {
    let n = segment.len();
    for p in 1..n {
        if (p..n).all(|i| segment[i] == segment[i - p]) {
            return p;
        }
    }
    n.max(1)
}

pub struct CandidateKeyGenerator;

impl CandidateKeyGenerator {
    /// Try every known word at every alignment offset. Offsets where any
    /// aligned symbol on either side falls outside the alphabet yield no
    /// candidate. Segments are reduced to their minimal repeating period
    /// and prefix-merged toward the longer segment; every further offset
    /// deriving the same key raises its support count, since agreement
    /// across independent alignments is evidence the key is real.
    pub fn generate(
        ciphertext: &str,
        known_words: &[&str],
        alphabet: &Alphabet,
    ) -> Result<Vec<KeyCandidate>> {
        let cipher_indices = alphabet.indices(ciphertext);
        let words: Vec<Vec<usize>> = known_words
            .iter()
            .map(|w| alphabet.indices(w))
            .filter(|w| !w.is_empty())
            .collect();

        if words.is_empty() {
            return Err(Error::NoValidWords);
        }

        let m = alphabet.len();
        let symbols = alphabet.symbols();
        let mut by_key: HashMap<String, usize> = HashMap::new();
        let mut candidates: Vec<KeyCandidate> = Vec::new();

        for word in &words {
            if word.len() > cipher_indices.len() {
                continue;
            }
            for offset in 0..=cipher_indices.len() - word.len() {
                let segment: Vec<char> = word
                    .iter()
                    .enumerate()
                    .map(|(i, &p)| symbols[(cipher_indices[offset + i] + m - p) % m])
                    .collect();

                // The key repeats, so rotate the segment back to the key's
                // origin before reducing it.
                let period = minimal_period(&segment);
                let rotation = offset % period;
                let key: String = (0..period)
                    .map(|i| segment[(i + period - rotation) % period])
                    .collect();

                match by_key.get(&key) {
                    Some(&i) => candidates[i].support += 1,
                    None => {
                        debug!(offset, key = %key, "known-plaintext candidate");
                        by_key.insert(key.clone(), candidates.len());
                        candidates.push(KeyCandidate {
                            key,
                            provenance: Provenance::KnownPlaintext { offset },
                            support: 1,
                        });
                    }
                }
            }
        }

        Ok(Self::merge_prefixes(candidates))
    }

    /// Cross-validate candidates from distinct derivations: when one key
    /// is a prefix of another, the two agree, the longer more specific
    /// segment wins, and the merged candidate carries both derivations'
    /// support.
    fn merge_prefixes(candidates: Vec<KeyCandidate>) -> Vec<KeyCandidate> {
        let mut merged: Vec<KeyCandidate> = Vec::new();
        for candidate in candidates {
            if let Some(existing) = merged
                .iter_mut()
                .find(|c| c.key.starts_with(&candidate.key) || candidate.key.starts_with(&c.key))
            {
                existing.support += candidate.support;
                if candidate.key.len() > existing.key.len() {
                    existing.key = candidate.key;
                    existing.provenance = candidate.provenance;
                }
            } else {
                merged.push(candidate);
            }
        }
        merged
    }
}
