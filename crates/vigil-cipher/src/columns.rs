//! Column Frequency Analysis
//!
//! Every symbol encrypted under the same key position forms a column, and
//! each column is a plain Caesar shift of the language. Correlating the
//! observed column frequencies against the reference distribution at every
//! possible shift recovers the key symbol for that column.

use crate::alphabet::Alphabet;
use crate::analysis::FrequencyTable;

pub struct ColumnAnalyzer;

impl ColumnAnalyzer {
    /// Partition pre-mapped indices into `period` interleaved columns.
    /// Column j holds the symbols at positions congruent to j mod period.
    pub fn columns(indices: &[usize], period: usize) -> Vec<Vec<usize>> {
        let mut cols = vec![Vec::new(); period.max(1)];
        for (i, &idx) in indices.iter().enumerate() {
            cols[i % period.max(1)].push(idx);
        }
        cols
    }

    /// The shift maximizing the dot-product correlation between the
    /// column's observed frequencies and the reference distribution.
    pub fn best_shift(column: &[usize], m: usize, reference: &[f64]) -> usize {
        let table = FrequencyTable::from_indices(column, m);
        let mut best = 0;
        let mut best_score = f64::MIN;
        for s in 0..m {
            let score = table.correlation(reference, s);
            if score > best_score {
                best_score = score;
                best = s;
            }
        }
        best
    }

    /// Recover the full key for a candidate period: one best shift per
    /// column, concatenated in column order.
    pub fn recover_key(
        ciphertext: &str,
        period: usize,
        alphabet: &Alphabet,
        reference: &[f64],
    ) -> String {
        let indices = alphabet.indices(ciphertext);
        Self::recover_key_indices(&indices, period, alphabet, reference)
    }

    /// As [`recover_key`](Self::recover_key), over pre-mapped indices.
    pub fn recover_key_indices(
        indices: &[usize],
        period: usize,
        alphabet: &Alphabet,
        reference: &[f64],
    ) -> String {
        let symbols = alphabet.symbols();
        Self::columns(indices, period)
            .iter()
            .map(|col| symbols[Self::best_shift(col, alphabet.len(), reference)])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use crate::transform::CipherTransform;

    #[test]
    fn test_columns_interleave() {
        let cols = ColumnAnalyzer::columns(&[0, 1, 2, 3, 4, 5, 6], 3);
        assert_eq!(cols, vec![vec![0, 3, 6], vec![1, 4], vec![2, 5]]);
    }

    #[test]
    fn test_best_shift_on_shifted_plaintext() {
        let alphabet = Alphabet::latin();
        let reference = Language::English.reference_table(&alphabet);
        let shifted: Vec<usize> = alphabet
            .indices(crate::testdata::DICKENS)
            .into_iter()
            .map(|i| (i + 11) % alphabet.len())
            .collect();
        assert_eq!(ColumnAnalyzer::best_shift(&shifted, alphabet.len(), &reference), 11);
    }

    #[test]
    fn test_recovers_key_at_true_period() {
        let alphabet = Alphabet::latin();
        let reference = Language::English.reference_table(&alphabet);
        let ciphertext =
            CipherTransform::encrypt(crate::testdata::DICKENS, "LEMON", &alphabet).unwrap();

        let key = ColumnAnalyzer::recover_key(&ciphertext, 5, &alphabet, &reference);
        assert_eq!(key, "LEMON");
    }

    #[test]
    fn test_long_text_short_key_convergence() {
        let alphabet = Alphabet::latin();
        let reference = Language::English.reference_table(&alphabet);
        assert!(alphabet.indices(crate::testdata::DICKENS).len() >= 1000);

        for key in ["KEY", "CIPHER", "QA"] {
            let ciphertext =
                CipherTransform::encrypt(crate::testdata::DICKENS, key, &alphabet).unwrap();
            let recovered =
                ColumnAnalyzer::recover_key(&ciphertext, key.len(), &alphabet, &reference);
            assert_eq!(recovered, key);
        }
    }
}
