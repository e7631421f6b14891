//! Key-Length Estimation
//!
//! Kasiski examination: repeated short sequences in the ciphertext sit at
//! distances divisible by the key length. When the text has no usable
//! repeats, the estimator falls back to scoring candidate periods by the
//! average index of coincidence of their columns.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use crate::alphabet::Alphabet;
use crate::analysis::FrequencyTable;
use crate::columns::ColumnAnalyzer;
use crate::config::AnalysisConfig;
use crate::{Error, Result};

/// A ranked key-length guess. Kasiski candidates are scored by factor
/// support counts, fallback candidates by average column IC; the two
/// scales never mix within one estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyLengthCandidate {
    pub length: usize,
    pub score: f64,
}

/// Factors of `distance` inside the candidate period range.
pub fn factors_in_range(distance: usize, min: usize, max: usize) -> Vec<usize> {
    (min..=max.min(distance))
        .filter(|&f| f > 0 && distance % f == 0)
        .collect()
}

/// Incremental repeated-sequence scan. The orchestrator drives it a chunk
/// at a time so cancellation checks can run between chunks; one-shot
/// callers pass a budget covering the whole text.
pub struct KasiskiScan {
    seed_len: usize,
    cursor: usize,
    positions: HashMap<Vec<usize>, Vec<usize>>,
}

impl KasiskiScan {
    pub fn new(seed_len: usize) -> Self {
        Self {
            seed_len,
            cursor: 0,
            positions: HashMap::new(),
        }
    }

    /// How many seed grams a full scan of `indices` visits.
    pub fn total_grams(indices: &[usize], seed_len: usize) -> usize {
        if seed_len == 0 {
            return 0;
        }
        indices.len().saturating_sub(seed_len - 1)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Process up to `budget` grams. Returns true once the scan is complete.
    pub fn advance(&mut self, indices: &[usize], budget: usize) -> bool {
        let total = Self::total_grams(indices, self.seed_len);
        let end = self.cursor.saturating_add(budget).min(total);
        while self.cursor < end {
            let gram = indices[self.cursor..self.cursor + self.seed_len].to_vec();
            self.positions.entry(gram).or_default().push(self.cursor);
            self.cursor += 1;
        }
        self.cursor >= total
    }

    /// Fold repeat distances into per-period support counts, restricted to
    /// the candidate range.
    pub fn into_support(self, min_period: usize, max_period: usize) -> HashMap<usize, usize> {
        let mut support: HashMap<usize, usize> = HashMap::new();
        for positions in self.positions.values().filter(|p| p.len() > 1) {
            for window in positions.windows(2) {
                let distance = window[1] - window[0];
                for factor in factors_in_range(distance, min_period, max_period) {
                    *support.entry(factor).or_insert(0) += 1;
                }
            }
        }
        support
    }
}

pub struct KeyLengthEstimator;

impl KeyLengthEstimator {
    /// Number of ranked candidates an estimate returns.
    pub const TOP_CANDIDATES: usize = 3;

    pub fn estimate(
        ciphertext: &str,
        alphabet: &Alphabet,
        config: &AnalysisConfig,
    ) -> Result<Vec<KeyLengthCandidate>> {
        let indices = alphabet.indices(ciphertext);
        Self::estimate_indices(&indices, alphabet.len(), config)
    }

    /// Estimate over pre-mapped alphabet indices.
    pub fn estimate_indices(
        indices: &[usize],
        m: usize,
        config: &AnalysisConfig,
    ) -> Result<Vec<KeyLengthCandidate>> {
        if indices.len() < config.min_ciphertext_len {
            return Err(Error::InsufficientCiphertext {
                got: indices.len(),
                need: config.min_ciphertext_len,
            });
        }

        let mut scan = KasiskiScan::new(config.seed_len);
        scan.advance(indices, usize::MAX);
        let support = scan.into_support(config.min_key_length, config.max_key_length);
        Ok(Self::rank_support(support, indices, m, config))
    }

    /// Rank factor support into the top candidate periods. Ties prefer the
    /// smaller period. Empty support falls back to IC scoring.
    pub fn rank_support(
        support: HashMap<usize, usize>,
        indices: &[usize],
        m: usize,
        config: &AnalysisConfig,
    ) -> Vec<KeyLengthCandidate> {
        let mut candidates: Vec<KeyLengthCandidate> = if support.is_empty() {
            debug!("no repeated sequences found, falling back to index of coincidence");
            Self::ic_candidates(indices, m, config)
        } else {
            debug!("kasiski support spans {} candidate periods", support.len());
            support
                .into_iter()
                .map(|(length, count)| KeyLengthCandidate {
                    length,
                    score: count as f64,
                })
                .collect()
        };

        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.length.cmp(&b.length))
        });
        candidates.truncate(Self::TOP_CANDIDATES);
        candidates
    }

    /// Score every period in range by the average IC of its columns.
    /// Columns of text encrypted at the true period look like shifted
    /// plain language, so their IC sits near the language's own.
    fn ic_candidates(indices: &[usize], m: usize, config: &AnalysisConfig) -> Vec<KeyLengthCandidate> {
        (config.min_key_length..=config.max_key_length)
            .filter(|&p| p > 0 && p < indices.len())
            .map(|period| {
                let cols = ColumnAnalyzer::columns(indices, period);
                let sum: f64 = cols
                    .iter()
                    .map(|col| FrequencyTable::from_indices(col, m).index_of_coincidence())
                    .sum();
                KeyLengthCandidate {
                    length: period,
                    score: sum / cols.len().max(1) as f64,
                }
            })
            .collect()
    }
}
