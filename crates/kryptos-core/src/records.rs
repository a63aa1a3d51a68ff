//! Typed row records: published sections and scored trial rows.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::canonical::{CanonicalText, Checksum, NORMALIZATION_VERSION, canonicalize};
use crate::search::Trial;

/// Maximum number of candidate characters carried in a trial row.
pub const PREVIEW_LEN: usize = 120;

/// Whether a section holds ciphertext or its known baseline plaintext.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Ciphertext,
    Baseline,
}

impl SectionKind {
    /// Name of the letters column in this kind's CSV.
    pub fn letters_column(self) -> &'static str {
        match self {
            Self::Ciphertext => "letters",
            Self::Baseline => "plaintext",
        }
    }

    /// Table name used in file names and diagnostics.
    pub fn table(self) -> &'static str {
        match self {
            Self::Ciphertext => "ciphertexts",
            Self::Baseline => "baselines",
        }
    }

    /// Raw source file suffix, e.g. `k1_cipher.txt`.
    pub fn raw_suffix(self) -> &'static str {
        match self {
            Self::Ciphertext => "cipher",
            Self::Baseline => "plain",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ciphertext => write!(f, "ciphertext"),
            Self::Baseline => write!(f, "baseline"),
        }
    }
}

/// A published, named section bound to its canonical letters and checksum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRecord {
    pub ctx_id: String,
    pub section: String,
    pub kind: SectionKind,
    pub letters: String,
    pub length: usize,
    pub checksum: Checksum,
    pub normalization_version: String,
}

impl SectionRecord {
    /// Record for freshly canonicalized text under the current scheme.
    pub fn from_canonical(section: &str, kind: SectionKind, text: &CanonicalText) -> Self {
        Self {
            ctx_id: default_ctx_id(section),
            section: section.to_string(),
            kind,
            letters: text.letters().to_string(),
            length: text.len(),
            checksum: text.checksum(),
            normalization_version: NORMALIZATION_VERSION.to_string(),
        }
    }

    /// Canonicalize `raw` and wrap it as a record.
    pub fn from_raw(section: &str, kind: SectionKind, raw: &str) -> Self {
        Self::from_canonical(section, kind, &canonicalize(raw))
    }

    /// Re-canonicalize the stored letters.
    pub fn canonical(&self) -> CanonicalText {
        canonicalize(&self.letters)
    }
}

/// Context identifier for the base transcription of a section.
pub fn default_ctx_id(section: &str) -> String {
    format!("CTX-{section}-base-v1.0")
}

/// One trial as handed to reporting/export: fixed-precision floats and a
/// truncated plaintext preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRow {
    pub run_id: String,
    pub section: String,
    pub key: String,
    pub composite: f64,
    pub chi2: f64,
    pub quadgram_stat: f64,
    pub plaintext: String,
}

impl TrialRow {
    pub const HEADER: [&'static str; 7] = [
        "run_id",
        "section",
        "key",
        "composite",
        "chi2",
        "quadgram_stat",
        "plaintext",
    ];

    pub fn from_trial<K: fmt::Display>(run_id: &str, trial: &Trial<K>) -> Self {
        Self {
            run_id: run_id.to_string(),
            section: trial.section.clone(),
            key: trial.key.to_string(),
            composite: trial.composite,
            chi2: trial.chi2,
            quadgram_stat: trial.quadgram,
            plaintext: trial.candidate.chars().take(PREVIEW_LEN).collect(),
        }
    }

    /// CSV fields in [`TrialRow::HEADER`] order, floats at 6 decimals.
    pub fn fields(&self) -> [String; 7] {
        [
            self.run_id.clone(),
            self.section.clone(),
            self.key.clone(),
            format!("{:.6}", self.composite),
            format!("{:.6}", self.chi2),
            format!("{:.6}", self.quadgram_stat),
            self.plaintext.clone(),
        ]
    }
}
