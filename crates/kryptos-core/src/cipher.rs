//! Reversible cipher transforms over the canonical A–Z alphabet.
//!
//! Every cipher family exposes a finite, ordered [`KeySpace`] and a total
//! decrypt function, which is all the search driver needs. The Caesar shift
//! is the reference family.

use std::fmt;

use crate::canonical::ALPHABET_LEN;

/// A finite, ordered, duplicate-free set of keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpace<K> {
    keys: Vec<K>,
}

impl<K: Ord> KeySpace<K> {
    /// Collect keys into ascending order, dropping duplicates.
    pub fn new(keys: impl IntoIterator<Item = K>) -> Self {
        let mut keys: Vec<K> = keys.into_iter().collect();
        keys.sort();
        keys.dedup();
        Self { keys }
    }
}

impl<K> KeySpace<K> {
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, K> {
        self.keys.iter()
    }
}

impl<K: Ord> FromIterator<K> for KeySpace<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<'a, K> IntoIterator for &'a KeySpace<K> {
    type Item = &'a K;
    type IntoIter = std::slice::Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

/// A cipher family with an enumerable key space.
///
/// `decrypt` must be total and deterministic over every letter A–Z.
pub trait Cipher: Send + Sync {
    type Key: Ord + Clone + Send + Sync + fmt::Display;

    /// Method identifier recorded in run reports.
    fn name(&self) -> &'static str;

    fn key_space(&self) -> KeySpace<Self::Key>;

    fn encrypt(&self, plaintext: &str, key: &Self::Key) -> String;

    fn decrypt(&self, ciphertext: &str, key: &Self::Key) -> String;
}

/// Monoalphabetic Caesar shift. Key `k` in `0..=25` adds `k` (mod 26) on
/// encryption and subtracts it on decryption. Input is reduced to its
/// uppercase A–Z letters first.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShiftCipher;

impl ShiftCipher {
    fn shift(text: &str, amount: u8) -> String {
        text.bytes()
            .map(|b| b.to_ascii_uppercase())
            .filter(u8::is_ascii_uppercase)
            .map(|b| (b'A' + (b - b'A' + amount) % ALPHABET_LEN as u8) as char)
            .collect()
    }
}

impl Cipher for ShiftCipher {
    type Key = u8;

    fn name(&self) -> &'static str {
        "MTH-caesar-scan-v1.0"
    }

    fn key_space(&self) -> KeySpace<u8> {
        KeySpace::new(0..ALPHABET_LEN as u8)
    }

    fn encrypt(&self, plaintext: &str, key: &u8) -> String {
        Self::shift(plaintext, key % ALPHABET_LEN as u8)
    }

    fn decrypt(&self, ciphertext: &str, key: &u8) -> String {
        let k = key % ALPHABET_LEN as u8;
        Self::shift(ciphertext, (ALPHABET_LEN as u8 - k) % ALPHABET_LEN as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caesar_three() {
        assert_eq!(ShiftCipher.encrypt("hello", &3), "KHOOR");
        assert_eq!(ShiftCipher.decrypt("KHOOR", &3), "HELLO");
    }

    #[test]
    fn test_wraps_around_alphabet() {
        assert_eq!(ShiftCipher.decrypt("ABC", &1), "ZAB");
        assert_eq!(ShiftCipher.encrypt("XYZ", &2), "ZAB");
    }

    #[test]
    fn test_key_zero_is_identity() {
        assert_eq!(ShiftCipher.decrypt("KRYPTOS", &0), "KRYPTOS");
    }

    #[test]
    fn test_drops_non_letters() {
        assert_eq!(ShiftCipher.decrypt("K H-O.O R?", &3), "HELLO");
    }

    #[test]
    fn test_oversized_key_reduces_mod_26() {
        assert_eq!(ShiftCipher.decrypt("KHOOR", &29), "HELLO");
    }

    #[test]
    fn test_shift_key_space() {
        let ks = ShiftCipher.key_space();
        assert_eq!(ks.len(), 26);
        assert_eq!(ks.keys().first(), Some(&0));
        assert_eq!(ks.keys().last(), Some(&25));
    }

    #[test]
    fn test_key_space_sorts_and_dedups() {
        let ks: KeySpace<i32> = [5, 1, 3, 1, 5].into_iter().collect();
        assert_eq!(ks.keys(), [1, 3, 5]);
        assert!(KeySpace::<u8>::new([]).is_empty());
    }
}
