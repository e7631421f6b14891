//! Vigil: Repeating-Key Cipher Toolkit
//!
//! Encryption, decryption, and automated cryptanalysis of repeating-key
//! substitution ciphers over configurable alphabets.
//!
//! # Modules
//! - `alphabet` - Validated symbol tables and modular shift arithmetic
//! - `transform` - Encrypt/decrypt and known-plaintext key derivation
//! - `analysis` - Frequency tables, index of coincidence, ASCII charts
//! - `language` - Reference letter frequencies and common-word lists
//! - `kasiski` - Key-length estimation (Kasiski + IC fallback)
//! - `columns` - Per-column shift recovery against a reference distribution
//! - `known_plaintext` - Candidate key generation from known words
//! - `scoring` - Composite candidate scoring and validation
//! - `config` - Analysis tunables with environment overrides
//! - `orchestrator` - Staged, cancellable analysis pipeline with progress events
//! - `evolve` - Heuristic alphabet search against a known fragment

pub mod alphabet;
pub mod analysis;
pub mod columns;
pub mod config;
pub mod evolve;
pub mod kasiski;
pub mod known_plaintext;
pub mod language;
pub mod orchestrator;
pub mod scoring;
pub mod transform;

pub use alphabet::Alphabet;
pub use analysis::FrequencyTable;
pub use columns::ColumnAnalyzer;
pub use config::AnalysisConfig;
pub use evolve::{AlphabetSearch, EvolveParams};
pub use kasiski::{KeyLengthCandidate, KeyLengthEstimator};
pub use known_plaintext::{CandidateKeyGenerator, KeyCandidate, Provenance};
pub use language::Language;
pub use orchestrator::{
    AnalysisEvent, AnalysisHandle, AnalysisOrchestrator, AnalysisOutcome, AnalysisRequest,
    AnalysisResult, AnalysisStage,
};
pub use scoring::{KeyScorer, ScoredCandidate};
pub use transform::{CipherTransform, Direction};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid alphabet: {0}")]
    InvalidAlphabet(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Insufficient ciphertext: {got} usable symbols, need at least {need}")]
    InsufficientCiphertext { got: usize, need: usize },

    #[error("No known word aligns with the ciphertext")]
    NoValidWords,

    #[error("No candidate key survived validation")]
    NoValidKey,

    #[error("An analysis is already in flight")]
    AnalysisInProgress,

    #[error("Analysis timed out after {0} ms")]
    AnalysisTimedOut(u64),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Flat mirror of [`Error`] carried by [`orchestrator::AnalysisEvent::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    InvalidAlphabet,
    EmptyInput,
    InsufficientCiphertext,
    NoValidWords,
    NoValidKey,
    AnalysisInProgress,
    AnalysisTimedOut,
    InvalidConfig,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidAlphabet(_) => ErrorKind::InvalidAlphabet,
            Error::EmptyInput(_) => ErrorKind::EmptyInput,
            Error::InsufficientCiphertext { .. } => ErrorKind::InsufficientCiphertext,
            Error::NoValidWords => ErrorKind::NoValidWords,
            Error::NoValidKey => ErrorKind::NoValidKey,
            Error::AnalysisInProgress => ErrorKind::AnalysisInProgress,
            Error::AnalysisTimedOut(_) => ErrorKind::AnalysisTimedOut,
            Error::InvalidConfig(_) => ErrorKind::InvalidConfig,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_match_variants() {
        assert_eq!(
            Error::InvalidAlphabet("x".into()).kind(),
            ErrorKind::InvalidAlphabet
        );
        assert_eq!(
            Error::InsufficientCiphertext { got: 3, need: 50 }.kind(),
            ErrorKind::InsufficientCiphertext
        );
        assert_eq!(Error::NoValidKey.kind(), ErrorKind::NoValidKey);
        assert_eq!(Error::AnalysisTimedOut(30_000).kind(), ErrorKind::AnalysisTimedOut);
    }

    #[test]
    fn error_messages_carry_detail() {
        let err = Error::InsufficientCiphertext { got: 12, need: 50 };
        let msg = err.to_string();
        assert!(msg.contains("12"));
        assert!(msg.contains("50"));
    }

    #[test]
    fn corpus_is_long_enough_for_analysis() {
        let letters = testdata::DICKENS
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .count();
        assert!(letters >= 1000, "corpus has only {} letters", letters);
    }
}
