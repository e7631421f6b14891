//! Cipher Transforms
//!
//! Repeating-key substitution over an arbitrary alphabet, plus key-stream
//! derivation from aligned known plaintext.

use crate::alphabet::{Alphabet, WILDCARD};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

pub struct CipherTransform;

impl CipherTransform {
    // ═══════════════════════════════════════════════════════════
    // ENCRYPT / DECRYPT
    // ═══════════════════════════════════════════════════════════

    pub fn encrypt(text: &str, key: &str, alphabet: &Alphabet) -> Result<String> {
        Self::transform(text, key, Direction::Encrypt, alphabet)
    }

    pub fn decrypt(text: &str, key: &str, alphabet: &Alphabet) -> Result<String> {
        Self::transform(text, key, Direction::Decrypt, alphabet)
    }

    /// Apply the repeating key to `text`. Text is upper-cased and symbols
    /// outside the alphabet are dropped before the key is aligned, so
    /// output position i always uses key position i mod key length. Key
    /// symbols outside the alphabet keep their slot in the period and
    /// produce the wildcard marker in the output.
    pub fn transform(
        text: &str,
        key: &str,
        direction: Direction,
        alphabet: &Alphabet,
    ) -> Result<String> {
        let text_indices = alphabet.indices(text);
        if text_indices.is_empty() {
            return Err(Error::EmptyInput("no text symbol is in the alphabet".into()));
        }

        let key_slots: Vec<Option<usize>> = key.chars().map(|c| alphabet.index_of(c)).collect();
        if key_slots.is_empty() {
            return Err(Error::EmptyInput("key is empty".into()));
        }
        if key_slots.iter().all(Option::is_none) {
            return Err(Error::EmptyInput("no key symbol is in the alphabet".into()));
        }

        let m = alphabet.len();
        let symbols = alphabet.symbols();
        let mut out = String::with_capacity(text_indices.len());

        for (i, &t) in text_indices.iter().enumerate() {
            match key_slots[i % key_slots.len()] {
                Some(k) => {
                    let j = match direction {
                        Direction::Encrypt => (t + k) % m,
                        Direction::Decrypt => (t + m - k) % m,
                    };
                    out.push(symbols[j]);
                }
                None => out.push(WILDCARD),
            }
        }

        Ok(out)
    }

    // ═══════════════════════════════════════════════════════════
    // KNOWN-PLAINTEXT KEY DERIVATION
    // ═══════════════════════════════════════════════════════════

    /// Subtract known plaintext from the ciphertext position by position,
    /// starting at offset 0, yielding the raw key stream. Positions where
    /// either side is outside the alphabet come back as the wildcard
    /// marker. The stream is not reduced to its repeating period.
    pub fn derive_key_stream(ciphertext: &str, known: &str, alphabet: &Alphabet) -> Result<String> {
        let m = alphabet.len();
        let symbols = alphabet.symbols();
        let mut out = String::new();
        let mut resolved = 0usize;

        for (c, p) in ciphertext.chars().zip(known.chars()) {
            match (alphabet.index_of(c), alphabet.index_of(p)) {
                (Some(ci), Some(pi)) => {
                    out.push(symbols[(ci + m - pi) % m]);
                    resolved += 1;
                }
                _ => out.push(WILDCARD),
            }
        }

        if out.is_empty() {
            return Err(Error::EmptyInput("ciphertext or known plaintext is empty".into()));
        }
        if resolved == 0 {
            return Err(Error::EmptyInput("no aligned position is in the alphabet".into()));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_vigenere() {
        let alphabet = Alphabet::latin();
        let encrypted = CipherTransform::encrypt("ATTACKATDAWN", "LEMON", &alphabet).unwrap();
        assert_eq!(encrypted, "LXFOPVEFRNHR");

        let decrypted = CipherTransform::decrypt("LXFOPVEFRNHR", "LEMON", &alphabet).unwrap();
        assert_eq!(decrypted, "ATTACKATDAWN");
    }

    #[test]
    fn test_round_trip_with_punctuation() {
        let alphabet = Alphabet::latin();
        let plain = crate::testdata::DICKENS;
        let encrypted = CipherTransform::encrypt(plain, "LEMON", &alphabet).unwrap();
        let decrypted = CipherTransform::decrypt(&encrypted, "LEMON", &alphabet).unwrap();
        assert_eq!(decrypted, alphabet.normalize(plain));
    }

    #[test]
    fn test_single_symbol_key_is_caesar() {
        let alphabet = Alphabet::latin();
        // 'D' sits at index 3, so the whole text shifts by three.
        let encrypted = CipherTransform::encrypt("HELLO", "D", &alphabet).unwrap();
        assert_eq!(encrypted, "KHOOR");
    }

    #[test]
    fn test_out_of_alphabet_text_symbols_are_dropped() {
        let alphabet = Alphabet::latin();
        let spaced = CipherTransform::encrypt("AT TA-CK!", "LEMON", &alphabet).unwrap();
        let plain = CipherTransform::encrypt("ATTACK", "LEMON", &alphabet).unwrap();
        assert_eq!(spaced, plain);
    }

    #[test]
    fn test_wildcard_key_positions_mark_output() {
        let alphabet = Alphabet::latin();
        let decrypted = CipherTransform::decrypt("LXFOPVEFRNHR", "LE?ON", &alphabet).unwrap();
        assert_eq!(decrypted, "AT?ACKA?DAWN");
    }

    #[test]
    fn test_empty_inputs_are_rejected() {
        let alphabet = Alphabet::latin();
        assert!(matches!(
            CipherTransform::encrypt("", "KEY", &alphabet),
            Err(Error::EmptyInput(_))
        ));
        assert!(matches!(
            CipherTransform::encrypt("123 456", "KEY", &alphabet),
            Err(Error::EmptyInput(_))
        ));
        assert!(matches!(
            CipherTransform::encrypt("HELLO", "", &alphabet),
            Err(Error::EmptyInput(_))
        ));
        assert!(matches!(
            CipherTransform::encrypt("HELLO", "? ?", &alphabet),
            Err(Error::EmptyInput(_))
        ));
    }

    #[test]
    fn test_custom_alphabet_round_trip() {
        let alphabet = Alphabet::new("0123456789ABCDEF").unwrap();
        let encrypted = CipherTransform::encrypt("DEADBEEF42", "CAFE", &alphabet).unwrap();
        let decrypted = CipherTransform::decrypt(&encrypted, "CAFE", &alphabet).unwrap();
        assert_eq!(decrypted, "DEADBEEF42");
    }

    #[test]
    fn test_derive_key_stream_recovers_repeating_key() {
        let alphabet = Alphabet::latin();
        let stream =
            CipherTransform::derive_key_stream("LXFOPVEFRNHR", "ATTACKATDAWN", &alphabet).unwrap();
        assert_eq!(stream, "LEMONLEMONLE");
    }

    #[test]
    fn test_derive_key_stream_marks_unresolved_positions() {
        let alphabet = Alphabet::latin();
        let stream = CipherTransform::derive_key_stream("LXF OPV", "ATT ACK", &alphabet).unwrap();
        assert_eq!(stream, "LEM?ONL");
    }

    #[test]
    fn test_derive_key_stream_needs_one_resolved_position() {
        let alphabet = Alphabet::latin();
        assert!(CipherTransform::derive_key_stream("...", "...", &alphabet).is_err());
        assert!(CipherTransform::derive_key_stream("", "ABC", &alphabet).is_err());
    }
}
