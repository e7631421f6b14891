//! Reference Language Data
//!
//! Letter frequencies and common-word lists used for frequency fitting
//! and dictionary validation of candidate decryptions.

use std::collections::HashMap;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::alphabet::Alphabet;

lazy_static! {
    static ref ENGLISH_FREQUENCIES: HashMap<char, f64> = [
        ('A', 0.08167),
        ('B', 0.01492),
        ('C', 0.02782),
        ('D', 0.04253),
        ('E', 0.12702),
        ('F', 0.02228),
        ('G', 0.02015),
        ('H', 0.06094),
        ('I', 0.06966),
        ('J', 0.00153),
        ('K', 0.00772),
        ('L', 0.04025),
        ('M', 0.02406),
        ('N', 0.06749),
        ('O', 0.07507),
        ('P', 0.01929),
        ('Q', 0.00095),
        ('R', 0.05987),
        ('S', 0.06327),
        ('T', 0.09056),
        ('U', 0.02758),
        ('V', 0.00978),
        ('W', 0.02360),
        ('X', 0.00150),
        ('Y', 0.01974),
        ('Z', 0.00074),
    ]
    .iter()
    .copied()
    .collect();

    static ref ENGLISH_WORDS: Vec<&'static str> = vec![
        "THE", "AND", "THAT", "HAVE", "FOR", "NOT", "WITH", "YOU", "THIS",
        "BUT", "HIS", "FROM", "THEY", "WILL", "WOULD", "THERE", "THEIR",
        "WHAT", "ABOUT", "WHICH", "WHEN", "CAN", "YOUR", "SOME", "COULD",
        "THEM", "SEE", "LIKE", "THEN", "OTHER", "WERE", "TIME", "LOOK",
        "TWO", "MORE", "GO", "WAY", "CAME", "THAN", "ITS", "OVER", "ONLY",
        "AFTER", "MANY", "ANY", "MAKE", "BACK", "THROUGH", "YEARS", "WHERE",
        "MUCH", "BEFORE", "DOWN", "SHOULD", "BECAUSE", "EVEN", "THOSE",
        "PEOPLE", "WELL", "MIGHT", "STILL", "OWN", "JUST", "STATE", "HERE",
        "BOTH", "BETWEEN", "NEED", "EACH", "THESE", "MOST", "WHILE",
        "AGAIN", "SUCH", "FEW", "DURING", "UNDER", "PLACE", "WITHOUT",
        "NORTH", "EAST", "CLOCK", "UNTIL", "BERLIN",
    ];
}

/// Reference language for cryptanalysis heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Language {
    #[default]
    English,
}

impl Language {
    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
        }
    }

    /// Expected relative frequency of each alphabet symbol, in alphabet
    /// index order. Symbols the language has no data for get 0.0, so the
    /// table works for arbitrary custom alphabets.
    pub fn reference_table(&self, alphabet: &Alphabet) -> Vec<f64> {
        let table = match self {
            Language::English => &*ENGLISH_FREQUENCIES,
        };
        alphabet
            .symbols()
            .iter()
            .map(|c| table.get(c).copied().unwrap_or(0.0))
            .collect()
    }

    /// Frequent words of the language, used as dictionary evidence when
    /// scoring candidate decryptions.
    pub fn common_words(&self) -> &'static [&'static str] {
        match self {
            Language::English => &ENGLISH_WORDS,
        }
    }
}
