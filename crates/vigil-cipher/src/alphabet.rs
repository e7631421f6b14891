//! Alphabets
//!
//! Validated symbol tables with modular shift arithmetic. Every other
//! module works in alphabet index space; this is the only place that
//! maps between symbols and indices.

use std::collections::HashMap;
use std::fmt;

use crate::{Error, Result};

/// Marker emitted for key positions that cannot be resolved, and accepted
/// in keys as "unknown position". Reserved; never a valid alphabet symbol.
pub const WILDCARD: char = '?';

const MIN_SYMBOLS: usize = 10;

/// An ordered set of cipher symbols. Case-insensitive: symbols are stored
/// upper-cased and lookups normalize the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
    index: HashMap<char, usize>,
}

impl Alphabet {
    /// Build an alphabet from its symbol string. Symbols are upper-cased;
    /// duplicates after normalization and sets smaller than 10 are rejected.
    pub fn new(symbols: &str) -> Result<Self> {
        let mut table = Vec::new();
        let mut index = HashMap::new();

        for raw in symbols.chars() {
            let c = raw.to_ascii_uppercase();
            if c == WILDCARD {
                return Err(Error::InvalidAlphabet(format!(
                    "'{}' is reserved as the wildcard marker",
                    WILDCARD
                )));
            }
            if index.contains_key(&c) {
                return Err(Error::InvalidAlphabet(format!(
                    "duplicate symbol '{}'",
                    c
                )));
            }
            index.insert(c, table.len());
            table.push(c);
        }

        if table.len() < MIN_SYMBOLS {
            return Err(Error::InvalidAlphabet(format!(
                "{} unique symbols, need at least {}",
                table.len(),
                MIN_SYMBOLS
            )));
        }

        Ok(Self { symbols: table, index })
    }

    /// The upper-case Latin alphabet, A through Z.
    pub fn latin() -> Self {
        Self::from_valid_symbols(('A'..='Z').collect())
    }

    /// Build directly from symbols already known to be valid, such as a
    /// permutation of an existing alphabet.
    pub(crate) fn from_valid_symbols(symbols: Vec<char>) -> Self {
        let index = symbols
            .iter()
            .enumerate()
            .map(|(i, &c)| (c, i))
            .collect();
        Self { symbols, index }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    pub fn contains(&self, c: char) -> bool {
        self.index.contains_key(&c.to_ascii_uppercase())
    }

    /// Index of a symbol, case-normalized. None for out-of-alphabet input.
    pub fn index_of(&self, c: char) -> Option<usize> {
        self.index.get(&c.to_ascii_uppercase()).copied()
    }

    /// Shift a symbol by `amount` positions, wrapping around the table.
    /// None when the symbol is not in the alphabet.
    pub fn shift(&self, c: char, amount: isize) -> Option<char> {
        let i = self.index_of(c)?;
        let m = self.symbols.len() as isize;
        let j = (i as isize + amount).rem_euclid(m) as usize;
        Some(self.symbols[j])
    }

    /// Map text to alphabet indices: upper-case, then drop every symbol
    /// the alphabet does not contain.
    pub fn indices(&self, text: &str) -> Vec<usize> {
        text.chars().filter_map(|c| self.index_of(c)).collect()
    }

    /// Normalized text form: upper-cased with out-of-alphabet symbols dropped.
    pub fn normalize(&self, text: &str) -> String {
        self.indices(text)
            .into_iter()
            .map(|i| self.symbols[i])
            .collect()
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.symbols {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}
