//! Error taxonomy.
//!
//! Four data-defect errors are terminal for the operation that raises them
//! and are never retried: [`DecodeError`], [`ModelLoadError`],
//! [`MismatchError`] and [`LengthParityError`]. The umbrella [`Error`] wraps
//! them together with dataset and configuration failures and maps each kind
//! to a distinct process exit status.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Raw source bytes could not be decoded under the declared encoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot decode {source_name} as {encoding}: invalid byte at offset {offset}")]
pub struct DecodeError {
    pub source_name: String,
    pub encoding: &'static str,
    pub offset: usize,
}

/// A language model source is missing or malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to load {model} model from {path}: {reason}")]
pub struct ModelLoadError {
    /// `"unigram"` or `"quadgram"`.
    pub model: &'static str,
    /// Source path, or `<reader>` for in-memory sources.
    pub path: String,
    pub reason: String,
}

/// Field of a published section record that disagreed with the recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchField {
    NormalizationVersion,
    Length,
    Checksum,
    /// The published letters do not hash to the published checksum.
    StoredLetters,
}

impl fmt::Display for MismatchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NormalizationVersion => write!(f, "normalization_version"),
            Self::Length => write!(f, "length"),
            Self::Checksum => write!(f, "checksum"),
            Self::StoredLetters => write!(f, "stored_letters"),
        }
    }
}

/// Recomputed canonical data disagrees with a published record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{section}: {field} mismatch (expected {expected}, actual {actual})")]
pub struct MismatchError {
    pub section: String,
    pub field: MismatchField,
    pub expected: String,
    pub actual: String,
}

/// Ciphertext and baseline plaintext canonical lengths differ.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("length mismatch {section}: ciphertext={cipher_length} vs baseline={baseline_length}")]
pub struct LengthParityError {
    pub section: String,
    pub cipher_length: usize,
    pub baseline_length: usize,
}

/// Umbrella error for every fallible operation in the crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    ModelLoad(#[from] ModelLoadError),

    #[error(transparent)]
    Mismatch(#[from] MismatchError),

    #[error(transparent)]
    LengthParity(#[from] LengthParityError),

    #[error("{table} missing section {section}")]
    MissingSection { table: String, section: String },

    #[error("malformed {table} at line {line}: {reason}")]
    MalformedRow {
        table: String,
        line: usize,
        reason: String,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Attach a path to an I/O failure.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit status for this failure. Every kind is non-zero and
    /// distinct so orchestration can tell them apart.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io { .. } => 1,
            Self::MalformedRow { .. } => 2,
            Self::Decode(_) => 3,
            Self::ModelLoad(_) => 4,
            Self::Mismatch(_) => 5,
            Self::LengthParity(_) => 6,
            Self::MissingSection { .. } => 7,
            Self::Config(_) => 8,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_reports_expected_and_actual() {
        let err = MismatchError {
            section: "K4".into(),
            field: MismatchField::Checksum,
            expected: "abc123".into(),
            actual: "def456".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("K4"));
        assert!(msg.contains("checksum"));
        assert!(msg.contains("abc123"));
        assert!(msg.contains("def456"));
    }

    #[test]
    fn test_exit_codes_are_distinct_and_nonzero() {
        let errors = [
            Error::io("x", std::io::Error::other("boom")),
            Error::MalformedRow {
                table: "t".into(),
                line: 1,
                reason: "r".into(),
            },
            Error::from(DecodeError {
                source_name: "s".into(),
                encoding: "utf-8",
                offset: 0,
            }),
            Error::from(ModelLoadError {
                model: "unigram",
                path: "p".into(),
                reason: "r".into(),
            }),
            Error::from(MismatchError {
                section: "K1".into(),
                field: MismatchField::Length,
                expected: "1".into(),
                actual: "2".into(),
            }),
            Error::from(LengthParityError {
                section: "K2".into(),
                cipher_length: 63,
                baseline_length: 62,
            }),
            Error::MissingSection {
                table: "ciphertexts".into(),
                section: "K3".into(),
            },
            Error::Config("bad".into()),
        ];
        let mut codes: Vec<i32> = errors.iter().map(Error::exit_code).collect();
        assert!(codes.iter().all(|&c| c != 0));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_model_load_error_names_path() {
        let err = ModelLoadError {
            model: "quadgram",
            path: "data/corpora/missing.csv".into(),
            reason: "not found".into(),
        };
        assert!(err.to_string().contains("data/corpora/missing.csv"));
    }
}
