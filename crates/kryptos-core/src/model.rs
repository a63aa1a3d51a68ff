//! Reference language models: letter unigram probabilities and quadgram log-weights.
//!
//! Both models are parsed from CSV with a header row and are immutable once
//! built. They are shared across scoring workers through [`LanguageModels`],
//! which the caller constructs once before fanning out.
//!
//! | model    | columns                              | post-processing                 |
//! |----------|--------------------------------------|---------------------------------|
//! | unigram  | `gram`, `prob` (or `probability`)    | floor absent letters, renormalize |
//! | quadgram | `gram`, `log10_weight` (or `log_weight`) | none (log scale, summed)      |

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::canonical::ALPHABET_LEN;
use crate::error::ModelLoadError;
use crate::table::{Table, TableError};

/// Probability assigned to a letter missing from the unigram source before
/// renormalization.
pub const UNIGRAM_FLOOR: f64 = 1e-9;

/// Label used in errors for models read from an in-memory source.
const READER_SOURCE: &str = "<reader>";

/// One `(gram, weight)` row of a model source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub gram: String,
    pub weight: f64,
}

// ---------------------------------------------------------------------------
// Unigram
// ---------------------------------------------------------------------------

/// Letter probability distribution over A–Z.
///
/// Every letter has a strictly positive probability and the 26 values sum to
/// 1.0 (within floating-point tolerance).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnigramModel {
    probabilities: [f64; ALPHABET_LEN],
}

impl UnigramModel {
    /// Build from collected weights. Letters absent from `weights` (or with a
    /// non-positive or non-finite weight) receive [`UNIGRAM_FLOOR`]; the
    /// result is then renormalized.
    ///
    /// Weights are scaled by their maximum before summing, so values near
    /// `f64::MAX` still normalize.
    pub fn from_weights(weights: impl IntoIterator<Item = (char, f64)>) -> Self {
        let mut raw = [None; ALPHABET_LEN];
        for (letter, weight) in weights {
            if let Some(idx) = letter_index(letter) {
                if weight > 0.0 && weight.is_finite() {
                    raw[idx] = Some(weight);
                }
            }
        }
        let mut probabilities = [0.0; ALPHABET_LEN];
        for (p, w) in probabilities.iter_mut().zip(raw) {
            *p = w.unwrap_or(UNIGRAM_FLOOR);
        }
        let max = probabilities.iter().copied().fold(UNIGRAM_FLOOR, f64::max);
        for p in &mut probabilities {
            *p /= max;
        }
        let total: f64 = probabilities.iter().sum();
        for p in &mut probabilities {
            // A floored letter next to a huge weight can underflow to zero.
            *p = (*p / total).max(f64::MIN_POSITIVE);
        }
        debug_assert!(
            (probabilities.iter().sum::<f64>() - 1.0).abs() < 1e-9,
            "unigram probabilities must sum to 1"
        );
        Self { probabilities }
    }

    /// Probability of `letter` (uppercase A–Z), or `None` for anything else.
    pub fn probability(&self, letter: char) -> Option<f64> {
        letter_index(letter).map(|i| self.probabilities[i])
    }

    /// Probabilities indexed A=0 … Z=25.
    pub fn probabilities(&self) -> &[f64; ALPHABET_LEN] {
        &self.probabilities
    }
}

/// Load a unigram model from a CSV file.
pub fn load_unigram_model(path: &Path) -> Result<UnigramModel, ModelLoadError> {
    let text = read_source("unigram", path)?;
    let model = parse_unigram(&text, &path.display().to_string())?;
    info!("loaded unigram model from {}", path.display());
    Ok(model)
}

/// Load a unigram model from any reader (e.g. an embedded corpus).
pub fn load_unigram_model_from_reader<R: Read>(reader: R) -> Result<UnigramModel, ModelLoadError> {
    let text = read_all("unigram", READER_SOURCE, reader)?;
    parse_unigram(&text, READER_SOURCE)
}

fn parse_unigram(text: &str, source: &str) -> Result<UnigramModel, ModelLoadError> {
    let entries = parse_entries("unigram", source, text, &["prob", "probability"])?;
    let mut weights: HashMap<char, f64> = HashMap::new();
    for entry in entries {
        let mut chars = entry.gram.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) if letter.is_ascii_uppercase() && entry.weight > 0.0 => {
                weights.insert(letter, entry.weight);
            }
            _ => debug!("unigram {source}: skipping gram {:?}", entry.gram),
        }
    }
    let missing = ALPHABET_LEN - weights.len();
    if missing > 0 {
        debug!("unigram {source}: {missing} letter(s) absent, flooring at {UNIGRAM_FLOOR}");
    }
    Ok(UnigramModel::from_weights(weights))
}

// ---------------------------------------------------------------------------
// Quadgram
// ---------------------------------------------------------------------------

/// Quadgram log-weight table. Weights are stored as-is (typically negative
/// log10 values); lookups for unseen grams fall back to a caller floor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuadgramModel {
    weights: HashMap<[u8; 4], f64>,
}

impl QuadgramModel {
    pub fn from_entries(entries: impl IntoIterator<Item = ([u8; 4], f64)>) -> Self {
        Self {
            weights: entries.into_iter().collect(),
        }
    }

    /// Stored weight for `gram`, if present.
    pub fn weight(&self, gram: &[u8]) -> Option<f64> {
        let key: [u8; 4] = gram.try_into().ok()?;
        self.weights.get(&key).copied()
    }

    /// Stored weight for `gram`, or `floor` when unseen.
    pub fn weight_or(&self, gram: &[u8], floor: f64) -> f64 {
        self.weight(gram).unwrap_or(floor)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// Load a quadgram model from a CSV file.
pub fn load_quadgram_model(path: &Path) -> Result<QuadgramModel, ModelLoadError> {
    let text = read_source("quadgram", path)?;
    let model = parse_quadgram(&text, &path.display().to_string())?;
    info!(
        "loaded quadgram model from {} ({} grams)",
        path.display(),
        model.len()
    );
    Ok(model)
}

/// Load a quadgram model from any reader.
pub fn load_quadgram_model_from_reader<R: Read>(
    reader: R,
) -> Result<QuadgramModel, ModelLoadError> {
    let text = read_all("quadgram", READER_SOURCE, reader)?;
    parse_quadgram(&text, READER_SOURCE)
}

fn parse_quadgram(text: &str, source: &str) -> Result<QuadgramModel, ModelLoadError> {
    let entries = parse_entries("quadgram", source, text, &["log10_weight", "log_weight"])?;
    let mut weights = HashMap::with_capacity(entries.len());
    for entry in entries {
        let gram: Option<[u8; 4]> = entry.gram.as_bytes().try_into().ok();
        match gram {
            Some(g) if g.iter().all(u8::is_ascii_uppercase) => {
                weights.insert(g, entry.weight);
            }
            _ => debug!("quadgram {source}: skipping gram {:?}", entry.gram),
        }
    }
    Ok(QuadgramModel { weights })
}

// ---------------------------------------------------------------------------
// Shared model bundle
// ---------------------------------------------------------------------------

/// Both reference models, loaded once and shared read-only.
#[derive(Debug, Clone)]
pub struct LanguageModels {
    pub unigram: Arc<UnigramModel>,
    pub quadgram: Arc<QuadgramModel>,
}

impl LanguageModels {
    pub fn new(unigram: UnigramModel, quadgram: QuadgramModel) -> Self {
        Self {
            unigram: Arc::new(unigram),
            quadgram: Arc::new(quadgram),
        }
    }

    /// Load both models from disk. Either failure is fatal for scoring.
    pub fn load(unigram_path: &Path, quadgram_path: &Path) -> Result<Self, ModelLoadError> {
        Ok(Self::new(
            load_unigram_model(unigram_path)?,
            load_quadgram_model(quadgram_path)?,
        ))
    }
}

/// Default corpus locations relative to a data directory.
pub fn default_model_paths(data_dir: &Path) -> (PathBuf, PathBuf) {
    let corpora = data_dir.join("corpora");
    (
        corpora.join("en_unigram_v2.1.csv"),
        corpora.join("en_quadgram_v2.1.csv"),
    )
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn letter_index(letter: char) -> Option<usize> {
    letter
        .is_ascii_uppercase()
        .then(|| (letter as u8 - b'A') as usize)
}

fn read_source(model: &'static str, path: &Path) -> Result<String, ModelLoadError> {
    std::fs::read_to_string(path).map_err(|e| ModelLoadError {
        model,
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn read_all<R: Read>(
    model: &'static str,
    source: &str,
    mut reader: R,
) -> Result<String, ModelLoadError> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|e| ModelLoadError {
            model,
            path: source.to_string(),
            reason: e.to_string(),
        })?;
    Ok(text)
}

/// Parse `(gram, weight)` rows. Grams are trimmed and uppercased; an empty
/// weight counts as zero; a non-numeric or non-finite weight is fatal.
fn parse_entries(
    model: &'static str,
    source: &str,
    text: &str,
    weight_columns: &[&str],
) -> Result<Vec<ModelEntry>, ModelLoadError> {
    let to_error = |e: TableError| ModelLoadError {
        model,
        path: source.to_string(),
        reason: format!("line {}: {}", e.line, e.reason),
    };
    let table = Table::parse(text).map_err(to_error)?;
    let gram_col = table.require_column(&["gram"]).map_err(to_error)?;
    let weight_col = table.require_column(weight_columns).map_err(to_error)?;

    table
        .records()
        .iter()
        .map(|record| {
            let gram = record.get(gram_col).trim().to_ascii_uppercase();
            let raw = record.get(weight_col).trim();
            let weight = if raw.is_empty() {
                0.0
            } else {
                raw.parse::<f64>().map_err(|_| {
                    to_error(TableError {
                        line: record.line,
                        reason: format!("non-numeric weight {raw:?} for gram {gram:?}"),
                    })
                })?
            };
            // `f64::from_str` accepts "inf" and "NaN".
            if !weight.is_finite() {
                return Err(to_error(TableError {
                    line: record.line,
                    reason: format!("non-finite weight {raw:?} for gram {gram:?}"),
                }));
            }
            Ok(ModelEntry { gram, weight })
        })
        .collect()
}
