//! Exhaustive key-space search.
//!
//! For every key, in ascending key-space order:
//!
//! ```text
//! canonical ciphertext → decrypt(key) → candidate → score → Trial
//! ```
//!
//! Every trial is kept, not just the best, so callers see the full score
//! landscape. Keys are independent, so [`search_parallel`] splits the key
//! space across scoped threads once the models are loaded; its output is
//! identical to [`search`].

use std::time::Instant;

use serde::Serialize;

use crate::canonical::CanonicalText;
use crate::cipher::{Cipher, KeySpace};
use crate::scoring::{Score, Scorer};

/// One scored decryption hypothesis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trial<K> {
    pub key: K,
    pub section: String,
    pub candidate: String,
    pub chi2: f64,
    pub quadgram: f64,
    pub composite: f64,
}

impl<K> Trial<K> {
    fn new(key: K, section: &str, candidate: String, score: Score) -> Self {
        Self {
            key,
            section: section.to_string(),
            candidate,
            chi2: score.chi2,
            quadgram: score.quadgram,
            composite: score.composite,
        }
    }
}

/// Result of a search that may stop before exhausting the key space.
#[derive(Debug, Clone)]
pub struct SearchOutcome<K> {
    pub trials: Vec<Trial<K>>,
    /// `true` when every key was evaluated.
    pub exhausted: bool,
}

/// Evaluate every key in `key_space` against `ciphertext`.
pub fn search<K, D, S>(
    ciphertext: &CanonicalText,
    section: &str,
    key_space: &KeySpace<K>,
    decrypt: D,
    score: S,
) -> Vec<Trial<K>>
where
    K: Clone,
    D: Fn(&str, &K) -> String,
    S: Fn(&str) -> Score,
{
    evaluate(ciphertext.letters(), section, key_space.keys(), &decrypt, &score)
}

/// Same output as [`search`], with keys split across `threads` scoped workers.
pub fn search_parallel<K, D, S>(
    ciphertext: &CanonicalText,
    section: &str,
    key_space: &KeySpace<K>,
    decrypt: D,
    score: S,
    threads: usize,
) -> Vec<Trial<K>>
where
    K: Clone + Send + Sync,
    D: Fn(&str, &K) -> String + Sync,
    S: Fn(&str) -> Score + Sync,
{
    let keys = key_space.keys();
    let threads = threads.clamp(1, keys.len().max(1));
    if threads == 1 {
        return evaluate(ciphertext.letters(), section, keys, &decrypt, &score);
    }

    let chunk = keys.len().div_ceil(threads);
    let letters = ciphertext.letters();
    let (decrypt, score) = (&decrypt, &score);

    std::thread::scope(|s| {
        let handles: Vec<_> = keys
            .chunks(chunk)
            .map(|part| s.spawn(move || evaluate(letters, section, part, decrypt, score)))
            .collect();

        // Joining in spawn order keeps the key-space order.
        let mut trials = Vec::with_capacity(keys.len());
        for handle in handles {
            match handle.join() {
                Ok(part) => trials.extend(part),
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
        trials
    })
}

/// Sequential search that stops between keys once `deadline` has passed.
pub fn search_with_deadline<K, D, S>(
    ciphertext: &CanonicalText,
    section: &str,
    key_space: &KeySpace<K>,
    decrypt: D,
    score: S,
    deadline: Instant,
) -> SearchOutcome<K>
where
    K: Clone,
    D: Fn(&str, &K) -> String,
    S: Fn(&str) -> Score,
{
    let mut trials = Vec::with_capacity(key_space.len());
    for key in key_space {
        if Instant::now() >= deadline {
            return SearchOutcome {
                trials,
                exhausted: false,
            };
        }
        let candidate = decrypt(ciphertext.letters(), key);
        let s = score(&candidate);
        trials.push(Trial::new(key.clone(), section, candidate, s));
    }
    SearchOutcome {
        trials,
        exhausted: true,
    }
}

/// Search the full key space of `cipher`, scoring with `scorer`.
pub fn search_cipher<C: Cipher>(
    cipher: &C,
    ciphertext: &CanonicalText,
    section: &str,
    scorer: &Scorer,
    threads: usize,
) -> Vec<Trial<C::Key>> {
    search_parallel(
        ciphertext,
        section,
        &cipher.key_space(),
        |text, key| cipher.decrypt(text, key),
        |candidate| scorer.score(candidate),
        threads,
    )
}

fn evaluate<K, D, S>(
    letters: &str,
    section: &str,
    keys: &[K],
    decrypt: &D,
    score: &S,
) -> Vec<Trial<K>>
where
    K: Clone,
    D: Fn(&str, &K) -> String,
    S: Fn(&str) -> Score,
{
    keys.iter()
        .map(|key| {
            let candidate = decrypt(letters, key);
            let s = score(&candidate);
            Trial::new(key.clone(), section, candidate, s)
        })
        .collect()
}
