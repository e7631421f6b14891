//! Candidate Scoring
//!
//! Decrypt under each key hypothesis and grade the result: frequency fit
//! against the reference distribution, dictionary hits weighted heavily,
//! and a small bonus for short minimal periods. Known words, when given,
//! are a hard filter rather than a score term.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::alphabet::Alphabet;
use crate::analysis::FrequencyTable;
use crate::known_plaintext::{minimal_period, KeyCandidate};
use crate::language::Language;
use crate::transform::CipherTransform;
use crate::{Error, Result};

/// Weight of one dictionary-word hit relative to one unit of frequency fit.
const DICTIONARY_WEIGHT: f64 = 10.0;

/// Weight of each corroborating derivation beyond the first. Independent
/// alignments agreeing on one key is evidence on par with a dictionary
/// hit, and on short ciphertext it is the evidence that separates the
/// true key from same-length noise.
const CORROBORATION_WEIGHT: f64 = 10.0;

/// Ceiling of the parsimony bonus. Kept below one dictionary hit so
/// vocabulary evidence always outranks brevity.
const PARSIMONY_WEIGHT: f64 = 5.0;

/// A candidate annotated with its composite score and decryption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub candidate: KeyCandidate,
    pub score: f64,
    pub decrypted: String,
}

pub struct KeyScorer;

impl KeyScorer {
    /// Score a single candidate. `NoValidKey` when a supplied known word
    /// is missing from the decryption.
    pub fn score(
        ciphertext: &str,
        candidate: &KeyCandidate,
        alphabet: &Alphabet,
        language: Language,
        known_words: &[&str],
    ) -> Result<ScoredCandidate> {
        let decrypted = CipherTransform::decrypt(ciphertext, &candidate.key, alphabet)?;

        for word in known_words {
            let normalized = alphabet.normalize(word);
            if !normalized.is_empty() && !decrypted.contains(&normalized) {
                return Err(Error::NoValidKey);
            }
        }

        let reference = language.reference_table(alphabet);
        let observed = FrequencyTable::observe(&decrypted, alphabet);
        let frequency_fit: f64 = (0..alphabet.len())
            .map(|i| 1.0 - (observed.frequency(i) - reference[i]).abs())
            .sum();

        let dictionary_hits = language
            .common_words()
            .iter()
            .filter(|w| decrypted.contains(*w))
            .count();

        let key_chars: Vec<char> = candidate.key.chars().collect();
        let parsimony = PARSIMONY_WEIGHT / minimal_period(&key_chars) as f64;
        let corroboration = CORROBORATION_WEIGHT * candidate.support.saturating_sub(1) as f64;

        let score = frequency_fit
            + DICTIONARY_WEIGHT * dictionary_hits as f64
            + parsimony
            + corroboration;
        debug!(
            key = %candidate.key,
            frequency_fit,
            dictionary_hits,
            parsimony,
            corroboration,
            score,
            "scored candidate"
        );

        Ok(ScoredCandidate {
            candidate: candidate.clone(),
            score,
            decrypted,
        })
    }

    /// Score every candidate and pick the winner: highest score, ties to
    /// the shorter key, then the lexicographically smallest.
    pub fn select_best(
        ciphertext: &str,
        candidates: &[KeyCandidate],
        alphabet: &Alphabet,
        language: Language,
        known_words: &[&str],
    ) -> Result<ScoredCandidate> {
        let mut scored: Vec<ScoredCandidate> = candidates
            .iter()
            .filter_map(|c| Self::score(ciphertext, c, alphabet, language, known_words).ok())
            .collect();

        if scored.is_empty() {
            return Err(Error::NoValidKey);
        }

        scored.sort_by(|a, b| Self::rank(a, b));
        Ok(scored.remove(0))
    }

    /// Deterministic candidate ordering, best first.
    pub fn rank(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.candidate.key.len().cmp(&b.candidate.key.len()))
            .then_with(|| a.candidate.key.cmp(&b.candidate.key))
    }

    /// Map a composite score into 0..=1. Monotone in the score; the scale
    /// constant keeps typical alphabet-sized fits near the middle.
    pub fn confidence(score: f64, alphabet: &Alphabet) -> f64 {
        if score <= 0.0 {
            return 0.0;
        }
        score / (score + alphabet.len() as f64)
    }
}
