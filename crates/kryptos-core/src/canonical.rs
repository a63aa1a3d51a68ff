//! Canonical text: the single gateway from raw source text to checksummed letters.
//!
//! ```text
//! Raw Source → Decode (UTF-8 / ASCII) → Uppercase → Keep A–Z → SHA-256 → CanonicalText
//! ```
//!
//! The canonical form drops whitespace, punctuation, digits and every non-ASCII
//! character, so it is a pure, idempotent projection of the input. The checksum
//! is taken over the canonical letters (never the raw bytes), which makes it
//! independent of line endings, spacing and case in the original transcription.
//!
//! The digest algorithm is part of the compatibility contract: every published
//! checksum was produced under [`NORMALIZATION_VERSION`]. Changing the digest or
//! the letter filter requires bumping that tag.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::{DecodeError, Error};

/// Identifier of the canonicalization scheme (letter filter + digest).
pub const NORMALIZATION_VERSION: &str = "letters-az/sha256/v1";

/// Size of the checksum digest in bytes.
pub const CHECKSUM_LEN: usize = 32;

/// Number of letters in the canonical alphabet.
pub const ALPHABET_LEN: usize = 26;

/// Declared text encoding of a raw source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceEncoding {
    /// Strict UTF-8 (default). Invalid sequences are a [`DecodeError`].
    #[default]
    Utf8,
    /// 7-bit ASCII. Any byte above 0x7F is a [`DecodeError`].
    Ascii,
}

impl fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utf8 => write!(f, "utf-8"),
            Self::Ascii => write!(f, "ascii"),
        }
    }
}

impl SourceEncoding {
    fn label(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Ascii => "ascii",
        }
    }
}

// ---------------------------------------------------------------------------
// Checksum
// ---------------------------------------------------------------------------

/// SHA-256 digest of canonical letters. Rendered as 64 lowercase hex digits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Checksum([u8; CHECKSUM_LEN]);

impl Checksum {
    /// Digest of the given canonical letters.
    pub fn of_letters(letters: &str) -> Self {
        let digest: [u8; CHECKSUM_LEN] = Sha256::digest(letters.as_bytes()).into();
        Self(digest)
    }

    pub fn as_bytes(&self) -> &[u8; CHECKSUM_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Checksum({})", self.to_hex())
    }
}

impl FromStr for Checksum {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim()).map_err(|e| format!("invalid checksum hex: {e}"))?;
        let digest: [u8; CHECKSUM_LEN] = bytes.try_into().map_err(|b: Vec<u8>| {
            format!("checksum must be {CHECKSUM_LEN} bytes, got {}", b.len())
        })?;
        Ok(Self(digest))
    }
}

impl Serialize for Checksum {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Checksum {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Canonical text
// ---------------------------------------------------------------------------

/// Uppercase, letters-only projection of a raw source, bound to its checksum.
///
/// Equality and hashing go through the checksum alone.
#[derive(Clone, Serialize, Deserialize)]
pub struct CanonicalText {
    letters: String,
    checksum: Checksum,
}

impl CanonicalText {
    /// Canonical letters (A–Z only).
    pub fn letters(&self) -> &str {
        &self.letters
    }

    /// Number of canonical letters.
    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    pub fn checksum(&self) -> Checksum {
        self.checksum
    }

    pub fn into_letters(self) -> String {
        self.letters
    }
}

impl PartialEq for CanonicalText {
    fn eq(&self, other: &Self) -> bool {
        self.checksum == other.checksum
    }
}

impl Eq for CanonicalText {}

impl Hash for CanonicalText {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.checksum.hash(state);
    }
}

impl fmt::Debug for CanonicalText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanonicalText")
            .field("letters", &self.letters)
            .field("length", &self.len())
            .field("checksum", &self.checksum)
            .finish()
    }
}

impl fmt::Display for CanonicalText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.letters)
    }
}

/// Keep only the characters that are ASCII `A`–`Z` after uppercasing.
pub fn letters_only(raw: &str) -> String {
    raw.chars()
        .map(|c| c.to_ascii_uppercase())
        .filter(char::is_ascii_uppercase)
        .collect()
}

/// Canonicalize already-decoded text.
pub fn canonicalize(raw: &str) -> CanonicalText {
    let letters = letters_only(raw);
    let checksum = Checksum::of_letters(&letters);
    CanonicalText { letters, checksum }
}

/// Decode raw bytes under `encoding`, then canonicalize.
///
/// `source_name` only labels the error.
pub fn canonicalize_bytes(
    raw: &[u8],
    encoding: SourceEncoding,
    source_name: &str,
) -> Result<CanonicalText, DecodeError> {
    let decode_error = |offset| DecodeError {
        source_name: source_name.to_string(),
        encoding: encoding.label(),
        offset,
    };
    let text = match encoding {
        SourceEncoding::Utf8 => {
            std::str::from_utf8(raw).map_err(|e| decode_error(e.valid_up_to()))?
        }
        SourceEncoding::Ascii => {
            if let Some(offset) = raw.iter().position(|b| !b.is_ascii()) {
                return Err(decode_error(offset));
            }
            // All bytes are ASCII, so this cannot fail.
            std::str::from_utf8(raw).map_err(|e| decode_error(e.valid_up_to()))?
        }
    };
    Ok(canonicalize(text))
}

/// Read and canonicalize a raw source file.
pub fn canonicalize_file(path: &Path, encoding: SourceEncoding) -> crate::Result<CanonicalText> {
    let raw = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    let text = canonicalize_bytes(&raw, encoding, &path.display().to_string())?;
    Ok(text)
}
