//! Frequency Statistics
//!
//! Symbol counts, index of coincidence, shift correlation, ASCII charts.

use crate::alphabet::Alphabet;

/// Symbol statistics for one text, aligned to alphabet index order.
#[derive(Debug, Clone)]
pub struct FrequencyTable {
    counts: Vec<usize>,
    total: usize,
}

impl FrequencyTable {
    /// Count alphabet symbols in `text`. Out-of-alphabet symbols are ignored.
    pub fn observe(text: &str, alphabet: &Alphabet) -> Self {
        Self::from_indices(&alphabet.indices(text), alphabet.len())
    }

    /// Count pre-mapped alphabet indices. `m` is the alphabet size; indices
    /// outside `0..m` are ignored.
    pub fn from_indices(indices: &[usize], m: usize) -> Self {
        let mut counts = vec![0usize; m];
        let mut total = 0;
        for &i in indices {
            if let Some(slot) = counts.get_mut(i) {
                *slot += 1;
                total += 1;
            }
        }
        Self { counts, total }
    }

    pub fn count(&self, index: usize) -> usize {
        self.counts.get(index).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Relative frequency of the symbol at `index`, 0.0 for empty tables.
    pub fn frequency(&self, index: usize) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(index) as f64 / self.total as f64
    }

    /// All relative frequencies in alphabet index order.
    pub fn frequencies(&self) -> Vec<f64> {
        (0..self.counts.len()).map(|i| self.frequency(i)).collect()
    }

    /// Index of Coincidence.
    /// English text ≈ 0.067, uniform random over 26 symbols ≈ 0.038.
    pub fn index_of_coincidence(&self) -> f64 {
        if self.total < 2 {
            return 0.0;
        }
        let sum: usize = self.counts.iter().map(|&n| n * (n.saturating_sub(1))).sum();
        sum as f64 / (self.total * (self.total - 1)) as f64
    }

    /// Correlation of this table against a reference distribution shifted
    /// by `shift` positions: sum over i of observed(i) * reference(i - shift).
    /// Maximal when `shift` matches the encryption shift of the sample.
    pub fn correlation(&self, reference: &[f64], shift: usize) -> f64 {
        let m = self.counts.len();
        if m == 0 || reference.len() != m {
            return 0.0;
        }
        let s = shift % m;
        (0..m)
            .map(|i| self.frequency(i) * reference[(i + m - s) % m])
            .sum()
    }

    /// Render as an ASCII frequency chart.
    pub fn render_ascii(&self, alphabet: &Alphabet) -> String {
        let mut lines = Vec::new();
        lines.push("FREQUENCY ANALYSIS".to_string());
        lines.push("═".repeat(40));

        let max_count = self.counts.iter().copied().max().unwrap_or(1).max(1);
        let scale = 30.0 / max_count as f64;

        for (i, &symbol) in alphabet.symbols().iter().enumerate() {
            let bar = "█".repeat((self.count(i) as f64 * scale) as usize);
            lines.push(format!("{}: {:5.2}% |{}", symbol, self.frequency(i) * 100.0, bar));
        }

        lines.push(String::new());
        lines.push(format!("Symbols counted: {}", self.total));
        lines.push(format!("Index of Coincidence: {:.4}", self.index_of_coincidence()));

        lines.join("\n")
    }
}
