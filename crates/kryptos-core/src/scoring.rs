//! Candidate plaintext scoring against the reference language models.
//!
//! Two statistics, both "lower is more English-like":
//!
//! - **chi2**: Pearson chi-square of observed letter counts against the
//!   unigram model's expected counts.
//! - **quadgram**: negated sum of quadgram log-weights over every 4-letter
//!   window of the candidate.
//!
//! The composite is their weighted sum. The components are always returned
//! with the composite so callers can see why a candidate ranked where it did.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::canonical::ALPHABET_LEN;
use crate::config::{ScoreConfig, ScoreWeights};
use crate::error::Result;
use crate::model::{LanguageModels, QuadgramModel, UnigramModel};

/// Lower bound for an expected letter count in the chi-square denominator.
pub const EXPECTED_FLOOR: f64 = 1e-9;

/// Composite score with its components and the weights that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub composite: f64,
    pub chi2: f64,
    pub quadgram: f64,
    pub weights: ScoreWeights,
}

fn candidate_letters(candidate: &str) -> impl Iterator<Item = u8> + '_ {
    candidate
        .bytes()
        .map(|b| b.to_ascii_uppercase())
        .filter(u8::is_ascii_uppercase)
}

/// Chi-square distance between the candidate's letter counts and the unigram
/// model. An empty candidate is scored as if it had one letter.
pub fn chi_square(candidate: &str, model: &UnigramModel) -> f64 {
    let mut counts = [0usize; ALPHABET_LEN];
    let mut total = 0usize;
    for b in candidate_letters(candidate) {
        counts[(b - b'A') as usize] += 1;
        total += 1;
    }
    let n = total.max(1) as f64;

    counts
        .iter()
        .zip(model.probabilities())
        .map(|(&observed, &p)| {
            let expected = (p * n).max(EXPECTED_FLOOR);
            let diff = observed as f64 - expected;
            diff * diff / expected
        })
        .sum()
}

/// Sum of negated quadgram log-weights over a sliding 4-letter window.
///
/// Unseen grams contribute `-floor`. Candidates shorter than four letters
/// return `-floor` as a fixed penalty.
pub fn quadgram_neg_log_likelihood(candidate: &str, model: &QuadgramModel, floor: f64) -> f64 {
    let letters: Vec<u8> = candidate_letters(candidate).collect();
    if letters.len() < 4 {
        return -floor;
    }
    letters
        .windows(4)
        .map(|gram| -model.weight_or(gram, floor))
        .sum()
}

/// Weighted composite of [`chi_square`] and [`quadgram_neg_log_likelihood`].
pub fn composite(candidate: &str, models: &LanguageModels, config: &ScoreConfig) -> Score {
    let chi2 = chi_square(candidate, &models.unigram);
    let quadgram = quadgram_neg_log_likelihood(candidate, &models.quadgram, config.quadgram_floor);
    let weights = config.weights;
    Score {
        composite: weights.unigram * chi2 + weights.quadgram * quadgram,
        chi2,
        quadgram,
        weights,
    }
}

/// Upper-tail probability of a chi-square statistic over `categories` letter
/// bins (`categories - 1` degrees of freedom). Diagnostic only; ranking uses
/// the raw statistic.
pub fn goodness_of_fit_p_value(chi2: f64, categories: usize) -> Option<f64> {
    if categories < 2 || !chi2.is_finite() || chi2 < 0.0 {
        return None;
    }
    let dist = ChiSquared::new((categories - 1) as f64).ok()?;
    Some(dist.sf(chi2))
}

/// Models plus scoring parameters, shared read-only by search workers.
#[derive(Debug, Clone)]
pub struct Scorer {
    models: LanguageModels,
    config: ScoreConfig,
}

impl Scorer {
    /// Build a scorer. Fails with `Error::Config` on invalid weights or floor.
    pub fn new(models: LanguageModels, config: ScoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { models, config })
    }

    pub fn score(&self, candidate: &str) -> Score {
        composite(candidate, &self.models, &self.config)
    }

    pub fn config(&self) -> &ScoreConfig {
        &self.config
    }

    pub fn models(&self) -> &LanguageModels {
        &self.models
    }
}
