//! Integrity verification of published section records.
//!
//! Two independent checks, both read-only:
//!
//! ```text
//! raw source ──canonicalize──► recomputed ──compare──► published row
//!                                            version, length, checksum,
//!                                            stored letters ↔ stored checksum
//!
//! ciphertext row ◄──length parity──► baseline row   (K1–K3; K4 exempt)
//! ```
//!
//! Nothing here patches data. The first disagreement is returned as an error
//! and the caller decides whether to stop.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use log::{debug, info, warn};
use serde::Serialize;

use crate::canonical::{Checksum, NORMALIZATION_VERSION, SourceEncoding, canonicalize, canonicalize_file};
use crate::dataset::raw_source_path;
use crate::error::{Error, LengthParityError, MismatchError, MismatchField, Result};
use crate::records::{SectionKind, SectionRecord};

// ---------------------------------------------------------------------------
// Row verification
// ---------------------------------------------------------------------------

/// Recompute `raw_source` and compare it against `published`.
///
/// Fields are compared in a fixed order: normalization version, length,
/// checksum, then the published letters against the published checksum.
/// `expected` in the error is the published value and `actual` the
/// recomputed one.
pub fn verify(raw_source: &str, published: &SectionRecord) -> std::result::Result<(), MismatchError> {
    let recomputed = canonicalize(raw_source);
    let mismatch = |field, expected: String, actual: String| MismatchError {
        section: published.section.clone(),
        field,
        expected,
        actual,
    };

    if published.normalization_version != NORMALIZATION_VERSION {
        return Err(mismatch(
            MismatchField::NormalizationVersion,
            published.normalization_version.clone(),
            NORMALIZATION_VERSION.to_string(),
        ));
    }
    if published.length != recomputed.len() {
        return Err(mismatch(
            MismatchField::Length,
            published.length.to_string(),
            recomputed.len().to_string(),
        ));
    }
    if published.checksum != recomputed.checksum() {
        return Err(mismatch(
            MismatchField::Checksum,
            published.checksum.to_hex(),
            recomputed.checksum().to_hex(),
        ));
    }
    let stored = Checksum::of_letters(&published.letters);
    if stored != published.checksum {
        return Err(mismatch(
            MismatchField::StoredLetters,
            published.checksum.to_hex(),
            stored.to_hex(),
        ));
    }
    Ok(())
}

/// Assert that a ciphertext and its baseline plaintext have equal length.
pub fn verify_pairing(
    cipher: &SectionRecord,
    baseline: &SectionRecord,
) -> std::result::Result<(), LengthParityError> {
    if cipher.length == baseline.length {
        Ok(())
    } else {
        Err(LengthParityError {
            section: cipher.section.clone(),
            cipher_length: cipher.length,
            baseline_length: baseline.length,
        })
    }
}

/// Verify every record against its raw source under `raw_dir`, stopping at
/// the first failure.
pub fn verify_against_sources(
    raw_dir: &Path,
    records: &[SectionRecord],
    encoding: SourceEncoding,
) -> Result<()> {
    for record in records {
        let path = raw_source_path(raw_dir, &record.section, record.kind);
        let recomputed = canonicalize_file(&path, encoding)?;
        verify(recomputed.letters(), record)?;
        debug!("{} {} matches {}", record.kind, record.section, path.display());
    }
    info!("verified {} record(s) against {}", records.len(), raw_dir.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Pairing policy
// ---------------------------------------------------------------------------

/// Which sections must exist and which must pair with a baseline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingPolicy {
    pub required_ciphertexts: Vec<String>,
    pub known_plaintext: Vec<String>,
    /// Sections that intentionally have no baseline.
    pub exempt: Vec<String>,
}

impl PairingPolicy {
    /// K1–K4 ciphertexts required, K1–K3 paired, K4 exempt.
    pub fn kryptos() -> Self {
        Self {
            required_ciphertexts: ["K1", "K2", "K3", "K4"].map(String::from).to_vec(),
            known_plaintext: ["K1", "K2", "K3"].map(String::from).to_vec(),
            exempt: vec!["K4".to_string()],
        }
    }

    pub fn validate(&self) -> Result<()> {
        let exempt: HashSet<&str> = self.exempt.iter().map(String::as_str).collect();
        if let Some(both) = self.known_plaintext.iter().find(|s| exempt.contains(s.as_str())) {
            return Err(Error::Config(format!(
                "section {both} is both known-plaintext and exempt"
            )));
        }
        Ok(())
    }

    pub fn is_exempt(&self, section: &str) -> bool {
        self.exempt.iter().any(|s| s == section)
    }
}

impl Default for PairingPolicy {
    fn default() -> Self {
        Self::kryptos()
    }
}

/// Baseline situation of one section under a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselineStatus<'a> {
    Known(&'a SectionRecord),
    /// No baseline by policy.
    Exempt,
    /// No baseline, and none is declared exempt.
    Absent,
}

/// Classify `section` against the available baselines.
///
/// An exempt section stays exempt even if a baseline row happens to exist.
pub fn baseline_status<'a>(
    section: &str,
    baselines: &'a [SectionRecord],
    policy: &PairingPolicy,
) -> BaselineStatus<'a> {
    if policy.is_exempt(section) {
        return BaselineStatus::Exempt;
    }
    match baselines.iter().rev().find(|b| b.section == section) {
        Some(b) => BaselineStatus::Known(b),
        None => BaselineStatus::Absent,
    }
}

/// Outcome of a successful consistency pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsistencyReport {
    /// `(section, length)` for each ciphertext/baseline pair that matched.
    pub paired: Vec<(String, usize)>,
    pub exempt: Vec<String>,
}

/// Check table presence and length parity across both tables.
///
/// Fail-fast: the first missing section or parity violation is returned.
/// Every required or known-plaintext section needs a ciphertext row, and
/// every known-plaintext section needs a baseline row. When a table lists a
/// section more than once, the last row wins.
pub fn check_consistency(
    ciphertexts: &[SectionRecord],
    baselines: &[SectionRecord],
    policy: &PairingPolicy,
) -> Result<ConsistencyReport> {
    policy.validate()?;

    let cipher_by_section = index_by_section(ciphertexts);
    let missing = |kind: SectionKind, section: &str| Error::MissingSection {
        table: kind.table().to_string(),
        section: section.to_string(),
    };

    for section in policy.required_ciphertexts.iter().chain(&policy.known_plaintext) {
        if !cipher_by_section.contains_key(section.as_str()) {
            return Err(missing(SectionKind::Ciphertext, section.as_str()));
        }
    }
    let mut pairs = Vec::with_capacity(policy.known_plaintext.len());
    for section in &policy.known_plaintext {
        match baseline_status(section, baselines, policy) {
            BaselineStatus::Known(baseline) => pairs.push((section, baseline)),
            // `validate` keeps known-plaintext sections out of the exempt list.
            BaselineStatus::Absent | BaselineStatus::Exempt => {
                return Err(missing(SectionKind::Baseline, section.as_str()));
            }
        }
    }

    let mut report = ConsistencyReport::default();
    for (section, baseline) in pairs {
        let cipher = cipher_by_section
            .get(section.as_str())
            .ok_or_else(|| missing(SectionKind::Ciphertext, section.as_str()))?;
        verify_pairing(cipher, baseline)?;
        report.paired.push((section.clone(), cipher.length));
    }
    for section in &policy.exempt {
        if baselines.iter().any(|b| &b.section == section) {
            warn!("{section}: baseline present but section is exempt from pairing");
        }
        report.exempt.push(section.clone());
    }

    info!(
        "consistency ok: {} paired, {} exempt",
        report.paired.len(),
        report.exempt.len()
    );
    Ok(report)
}

fn index_by_section(records: &[SectionRecord]) -> HashMap<&str, &SectionRecord> {
    records.iter().map(|r| (r.section.as_str(), r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher(section: &str, raw: &str) -> SectionRecord {
        SectionRecord::from_raw(section, SectionKind::Ciphertext, raw)
    }

    fn baseline(section: &str, raw: &str) -> SectionRecord {
        SectionRecord::from_raw(section, SectionKind::Baseline, raw)
    }

    fn kryptos_tables() -> (Vec<SectionRecord>, Vec<SectionRecord>) {
        let ciphers = vec![
            cipher("K1", "EMUFPHZLRFAXYUSDJKZLDKRNSHGNFIVJ"),
            cipher("K2", "VFPJUDEEHZWETZYVGWHKKQETGFQJNCE"),
            cipher("K3", "ENDYAHROHNLSRHEOCPTEOIBIDYSHNAIA"),
            cipher("K4", "OBKRUOXOGHULBSOLIFBBWFLRVQQPRNGKSSOTWTQSJQSSEKZZWATJKLUDIAWINFBNYPVTTMZFPKWGDKZXTJCDIGKUHUAUEKCAR"),
        ];
        let baselines = vec![
            baseline("K1", "BETWEENSUBTLESHADINGANDTHEABSENC"),
            baseline("K2", "ITWASTOTALLYINVISIBLEHOWSTHATPO"),
            baseline("K3", "SLOWLYDESPARATLYSLOWLYTHEREMAIN"),
        ];
        (ciphers, baselines)
    }

    #[test]
    fn test_verify_accepts_matching_source() {
        let published = cipher("K1", "EMUFP HZLRF");
        assert_eq!(verify("emufp\nhzlrf", &published), Ok(()));
    }

    #[test]
    fn test_verify_reports_checksum_mismatch() {
        let published = cipher("K4", "OBKRUOXOGH");
        let err = verify("OBKRUOXOGX", &published).unwrap_err();
        assert_eq!(err.section, "K4");
        assert_eq!(err.field, MismatchField::Checksum);
        assert_eq!(err.expected, published.checksum.to_hex());
        assert_eq!(err.actual, canonicalize("OBKRUOXOGX").checksum().to_hex());
    }

    #[test]
    fn test_verify_length_checked_before_checksum() {
        let published = cipher("K2", "ABCDE");
        let err = verify("ABCD", &published).unwrap_err();
        assert_eq!(err.field, MismatchField::Length);
        assert_eq!(err.expected, "5");
        assert_eq!(err.actual, "4");
    }

    #[test]
    fn test_verify_version_checked_first() {
        let mut published = cipher("K1", "ABC");
        published.normalization_version = "legacy".to_string();
        published.length = 99;
        let err = verify("ABC", &published).unwrap_err();
        assert_eq!(err.field, MismatchField::NormalizationVersion);
    }

    #[test]
    fn test_verify_detects_tampered_stored_letters() {
        let mut published = cipher("K3", "ABC");
        published.letters = "ABD".to_string();
        let err = verify("ABC", &published).unwrap_err();
        assert_eq!(err.field, MismatchField::StoredLetters);
    }

    #[test]
    fn test_verify_pairing() {
        let c = cipher("K2", &"A".repeat(63));
        let b = baseline("K2", &"B".repeat(62));
        let err = verify_pairing(&c, &b).unwrap_err();
        assert_eq!(err.section, "K2");
        assert_eq!(err.cipher_length, 63);
        assert_eq!(err.baseline_length, 62);
        assert!(verify_pairing(&c, &baseline("K2", &"B".repeat(63))).is_ok());
    }

    #[test]
    fn test_check_consistency_ok() {
        let (ciphers, mut baselines) = kryptos_tables();
        // Align lengths for the fixture.
        for (b, c) in baselines.iter_mut().zip(&ciphers) {
            *b = baseline(&b.section, &"E".repeat(c.length));
        }
        let report = check_consistency(&ciphers, &baselines, &PairingPolicy::kryptos()).unwrap();
        let sections: Vec<&str> = report.paired.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(sections, ["K1", "K2", "K3"]);
        assert_eq!(report.exempt, ["K4"]);
    }

    #[test]
    fn test_check_consistency_missing_ciphertext() {
        let (mut ciphers, baselines) = kryptos_tables();
        ciphers.retain(|c| c.section != "K4");
        let err = check_consistency(&ciphers, &baselines, &PairingPolicy::kryptos()).unwrap_err();
        match err {
            Error::MissingSection { table, section } => {
                assert_eq!(table, "ciphertexts");
                assert_eq!(section, "K4");
            }
            other => panic!("expected MissingSection, got {other:?}"),
        }
    }

    #[test]
    fn test_check_consistency_missing_baseline() {
        let (ciphers, mut baselines) = kryptos_tables();
        baselines.retain(|b| b.section != "K2");
        let err = check_consistency(&ciphers, &baselines, &PairingPolicy::kryptos()).unwrap_err();
        assert_eq!(err.exit_code(), 7);
        assert!(err.to_string().contains("baselines missing section K2"));
    }

    #[test]
    fn test_check_consistency_first_parity_violation() {
        let ciphers = vec![
            cipher("K1", "ABC"),
            cipher("K2", &"A".repeat(63)),
            cipher("K3", "ABCD"),
            cipher("K4", "Z"),
        ];
        let baselines = vec![
            baseline("K1", "XYZ"),
            baseline("K2", &"B".repeat(62)),
            baseline("K3", "X"),
        ];
        let err = check_consistency(&ciphers, &baselines, &PairingPolicy::kryptos()).unwrap_err();
        match err {
            Error::LengthParity(e) => {
                assert_eq!(e.section, "K2");
                assert_eq!((e.cipher_length, e.baseline_length), (63, 62));
            }
            other => panic!("expected LengthParity, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_rows_last_wins() {
        let ciphers = vec![
            cipher("K1", "AB"),
            cipher("K1", "ABC"),
            cipher("K2", "A"),
            cipher("K3", "A"),
            cipher("K4", "A"),
        ];
        let baselines = vec![baseline("K1", "XYZ"), baseline("K2", "X"), baseline("K3", "X")];
        let report = check_consistency(&ciphers, &baselines, &PairingPolicy::kryptos()).unwrap();
        assert_eq!(report.paired[0], ("K1".to_string(), 3));
    }

    #[test]
    fn test_overlapping_policy_is_config_error() {
        let mut policy = PairingPolicy::kryptos();
        policy.exempt.push("K2".to_string());
        assert!(matches!(policy.validate(), Err(Error::Config(_))));
        let (c, b) = kryptos_tables();
        assert!(matches!(check_consistency(&c, &b, &policy), Err(Error::Config(_))));
    }

    #[test]
    fn test_known_plaintext_without_ciphertext_is_missing() {
        let policy = PairingPolicy {
            required_ciphertexts: vec!["K1".to_string()],
            known_plaintext: vec!["K1".to_string(), "K5".to_string()],
            exempt: Vec::new(),
        };
        let ciphers = vec![cipher("K1", "ABC")];
        let baselines = vec![baseline("K1", "XYZ"), baseline("K5", "XYZ")];
        match check_consistency(&ciphers, &baselines, &policy).unwrap_err() {
            Error::MissingSection { table, section } => {
                assert_eq!(table, "ciphertexts");
                assert_eq!(section, "K5");
            }
            other => panic!("expected MissingSection, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_baseline_rows_last_wins() {
        let ciphers = vec![cipher("K1", "ABC"), cipher("K2", "A"), cipher("K3", "A"), cipher("K4", "A")];
        let baselines = vec![
            baseline("K1", "XY"),
            baseline("K1", "XYZ"),
            baseline("K2", "X"),
            baseline("K3", "X"),
        ];
        let report = check_consistency(&ciphers, &baselines, &PairingPolicy::kryptos()).unwrap();
        assert_eq!(report.paired[0], ("K1".to_string(), 3));
    }

    #[test]
    fn test_baseline_status() {
        let (_, baselines) = kryptos_tables();
        let policy = PairingPolicy::kryptos();
        assert!(matches!(
            baseline_status("K1", &baselines, &policy),
            BaselineStatus::Known(b) if b.section == "K1"
        ));
        assert_eq!(baseline_status("K4", &baselines, &policy), BaselineStatus::Exempt);
        assert_eq!(baseline_status("K5", &baselines, &policy), BaselineStatus::Absent);
    }

    #[test]
    fn test_verify_against_sources() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("k1_cipher.txt"), "EMUFP HZLRF").unwrap();
        std::fs::write(tmp.path().join("k4_cipher.txt"), "OBKRUOXOGH").unwrap();
        let good = cipher("K1", "EMUFPHZLRF");
        let mut bad = cipher("K4", "OBKRUOXOGH");
        assert!(verify_against_sources(tmp.path(), &[good.clone(), bad.clone()], SourceEncoding::Utf8).is_ok());

        bad.checksum = canonicalize("OBKRUOXOGX").checksum();
        bad.letters = "OBKRUOXOGX".to_string();
        let err = verify_against_sources(tmp.path(), &[good, bad], SourceEncoding::Utf8).unwrap_err();
        assert_eq!(err.exit_code(), 5);
    }
}
