//! On-disk dataset: raw section sources and the derived section/trial CSVs.
//!
//! # Layout
//!
//! ```text
//! data/
//! ├── raw/k1_cipher.txt … k4_cipher.txt   raw ciphertext transcriptions
//! ├── raw/k1_plain.txt  … k3_plain.txt    raw known plaintexts
//! ├── ciphertexts.csv                     ctx_id,section,letters,length,checksum,normalization_version
//! └── baselines.csv                       ctx_id,section,plaintext,length,checksum,normalization_version
//! ```
//!
//! CSV files are written to a temporary file in the target directory and
//! then renamed over the destination, so readers never observe a partial file.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::canonical::{Checksum, NORMALIZATION_VERSION, SourceEncoding, canonicalize_file};
use crate::error::{Error, Result};
use crate::records::{SectionKind, SectionRecord, TrialRow, default_ctx_id};
use crate::table::{Table, write_row};

pub const CIPHERTEXTS_CSV: &str = "ciphertexts.csv";
pub const BASELINES_CSV: &str = "baselines.csv";

/// Which sections have raw ciphertext and raw baseline sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionLayout {
    pub ciphertexts: Vec<String>,
    pub baselines: Vec<String>,
}

impl SectionLayout {
    /// K1–K4 ciphertexts; K1–K3 baselines (K4 is unsolved).
    pub fn kryptos() -> Self {
        Self {
            ciphertexts: ["K1", "K2", "K3", "K4"].map(String::from).to_vec(),
            baselines: ["K1", "K2", "K3"].map(String::from).to_vec(),
        }
    }

    pub fn sections(&self, kind: SectionKind) -> &[String] {
        match kind {
            SectionKind::Ciphertext => &self.ciphertexts,
            SectionKind::Baseline => &self.baselines,
        }
    }
}

impl Default for SectionLayout {
    fn default() -> Self {
        Self::kryptos()
    }
}

/// Path of the raw source for `section`, e.g. `raw/k2_plain.txt`.
pub fn raw_source_path(raw_dir: &Path, section: &str, kind: SectionKind) -> PathBuf {
    raw_dir.join(format!(
        "{}_{}.txt",
        section.to_lowercase(),
        kind.raw_suffix()
    ))
}

/// Path of the derived CSV for `kind` inside `data_dir`.
pub fn sections_csv_path(data_dir: &Path, kind: SectionKind) -> PathBuf {
    match kind {
        SectionKind::Ciphertext => data_dir.join(CIPHERTEXTS_CSV),
        SectionKind::Baseline => data_dir.join(BASELINES_CSV),
    }
}

/// Canonicalize every raw source named by `layout` for one kind.
pub fn build_section_records(
    raw_dir: &Path,
    layout: &SectionLayout,
    kind: SectionKind,
    encoding: SourceEncoding,
) -> Result<Vec<SectionRecord>> {
    layout
        .sections(kind)
        .iter()
        .map(|section| {
            let path = raw_source_path(raw_dir, section, kind);
            let text = canonicalize_file(&path, encoding)?;
            Ok(SectionRecord::from_canonical(section, kind, &text))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Section CSV
// ---------------------------------------------------------------------------

/// Write section records for one kind as CSV.
pub fn write_sections_csv(path: &Path, kind: SectionKind, records: &[SectionRecord]) -> Result<()> {
    write_atomically(path, |w| {
        write_row(
            w,
            &[
                "ctx_id",
                "section",
                kind.letters_column(),
                "length",
                "checksum",
                "normalization_version",
            ],
        )?;
        for r in records {
            let length = r.length.to_string();
            let checksum = r.checksum.to_hex();
            write_row(
                w,
                &[
                    r.ctx_id.as_str(),
                    r.section.as_str(),
                    r.letters.as_str(),
                    length.as_str(),
                    checksum.as_str(),
                    r.normalization_version.as_str(),
                ],
            )?;
        }
        Ok(())
    })?;
    info!("wrote {} {} row(s) to {}", records.len(), kind, path.display());
    Ok(())
}

/// Read section records of one kind.
///
/// The `normalization_version` and `ctx_id` columns are optional; missing
/// values default to the current scheme and the base context id.
pub fn read_sections_csv(path: &Path, kind: SectionKind) -> Result<Vec<SectionRecord>> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let table_name = path.display().to_string();
    let malformed = |line: usize, reason: String| Error::MalformedRow {
        table: table_name.clone(),
        line,
        reason,
    };
    let table = Table::parse(&text).map_err(|e| malformed(e.line, e.reason))?;
    let require = |names: &[&str]| {
        table
            .require_column(names)
            .map_err(|e| malformed(e.line, e.reason))
    };
    let section_col = require(&["section", "section_id"])?;
    let letters_col = require(&[kind.letters_column(), "letters", "canonical_letters"])?;
    let length_col = require(&["length"])?;
    let checksum_col = require(&["checksum"])?;
    let ctx_col = table.column(&["ctx_id"]);
    let version_col = table.column(&["normalization_version"]);

    table
        .records()
        .iter()
        .map(|row| {
            let section = row.get(section_col).trim().to_string();
            if section.is_empty() {
                return Err(malformed(row.line, "empty section".to_string()));
            }
            let length_raw = row.get(length_col).trim();
            let length = length_raw
                .parse::<usize>()
                .map_err(|_| malformed(row.line, format!("invalid length {length_raw:?}")))?;
            let checksum = row
                .get(checksum_col)
                .parse::<Checksum>()
                .map_err(|e| malformed(row.line, e))?;
            let ctx_id = ctx_col
                .map(|c| row.get(c).trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| default_ctx_id(&section));
            let normalization_version = version_col
                .map(|c| row.get(c).trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| NORMALIZATION_VERSION.to_string());
            Ok(SectionRecord {
                ctx_id,
                section,
                kind,
                letters: row.get(letters_col).trim().to_string(),
                length,
                checksum,
                normalization_version,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Trial CSV
// ---------------------------------------------------------------------------

/// Write trial rows as CSV in the given order.
pub fn write_trials_csv(path: &Path, rows: &[TrialRow]) -> Result<()> {
    write_atomically(path, |w| {
        write_row(w, &TrialRow::HEADER)?;
        for row in rows {
            write_row(w, &row.fields())?;
        }
        Ok(())
    })?;
    info!("wrote {} trial row(s) to {}", rows.len(), path.display());
    Ok(())
}

/// Write `value` as pretty JSON, atomically.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    write_atomically(path, |w| {
        serde_json::to_writer_pretty(&mut *w, value)?;
        w.write_all(b"\n")
    })?;
    info!("wrote {}", path.display());
    Ok(())
}

fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&NamedTempFile>) -> std::io::Result<()>,
{
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    let tmp = NamedTempFile::new_in(parent).map_err(|e| Error::io(parent, e))?;
    {
        let mut w = BufWriter::new(&tmp);
        write(&mut w)
            .and_then(|()| w.flush())
            .map_err(|e| Error::io(path, e))?;
    }
    tmp.persist(path).map_err(|e| Error::io(path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_json_replaces_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out").join("run.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "stale").unwrap();

        write_json(&path, &serde_json::json!({"run_id": "RUN-EXP-1", "n_trials": 26})).unwrap();
        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["n_trials"], 26);
        let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    fn write_raw(dir: &Path, name: &str, body: &str) {
        std::fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn test_raw_source_paths() {
        let p = raw_source_path(Path::new("data/raw"), "K2", SectionKind::Baseline);
        assert_eq!(p, Path::new("data/raw/k2_plain.txt"));
        let c = sections_csv_path(Path::new("data"), SectionKind::Ciphertext);
        assert_eq!(c, Path::new("data/ciphertexts.csv"));
    }

    #[test]
    fn test_build_and_roundtrip_sections_csv() {
        let tmp = tempfile::tempdir().unwrap();
        write_raw(tmp.path(), "k1_cipher.txt", "EMUFP HZLRF\nAXYUS");
        write_raw(tmp.path(), "k2_cipher.txt", "vfpjudeeh");
        let layout = SectionLayout {
            ciphertexts: vec!["K1".into(), "K2".into()],
            baselines: vec![],
        };
        let records = build_section_records(
            tmp.path(),
            &layout,
            SectionKind::Ciphertext,
            SourceEncoding::Utf8,
        )
        .unwrap();
        assert_eq!(records[0].letters, "EMUFPHZLRFAXYUS");
        assert_eq!(records[1].length, 9);

        let csv = tmp.path().join("out").join(CIPHERTEXTS_CSV);
        write_sections_csv(&csv, SectionKind::Ciphertext, &records).unwrap();
        let back = read_sections_csv(&csv, SectionKind::Ciphertext).unwrap();
        assert_eq!(back, records);

        let text = std::fs::read_to_string(&csv).unwrap();
        assert!(text.starts_with("ctx_id,section,letters,length,checksum,normalization_version\n"));
    }

    #[test]
    fn test_missing_raw_source_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = build_section_records(
            tmp.path(),
            &SectionLayout::kryptos(),
            SectionKind::Baseline,
            SourceEncoding::Utf8,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(err.to_string().contains("k1_plain.txt"));
    }

    #[test]
    fn test_undecodable_raw_source_is_decode_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("k1_cipher.txt"), b"AB\xfe").unwrap();
        let layout = SectionLayout {
            ciphertexts: vec!["K1".into()],
            baselines: vec![],
        };
        let err = build_section_records(
            tmp.path(),
            &layout,
            SectionKind::Ciphertext,
            SourceEncoding::Utf8,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_reads_legacy_csv_without_version_column() {
        let tmp = tempfile::tempdir().unwrap();
        let csv = tmp.path().join(BASELINES_CSV);
        let checksum = crate::canonical::canonicalize("BETWEEN").checksum();
        std::fs::write(
            &csv,
            format!("ctx_id,section,plaintext,length,checksum\nCTX-K1-base-v1.0,K1,BETWEEN,7,{checksum}\n"),
        )
        .unwrap();
        let rows = read_sections_csv(&csv, SectionKind::Baseline).unwrap();
        assert_eq!(rows[0].normalization_version, NORMALIZATION_VERSION);
        assert_eq!(rows[0].kind, SectionKind::Baseline);
        assert_eq!(rows[0].checksum, checksum);
    }

    #[test]
    fn test_malformed_length_reports_line() {
        let tmp = tempfile::tempdir().unwrap();
        let csv = tmp.path().join(CIPHERTEXTS_CSV);
        std::fs::write(
            &csv,
            format!("section,letters,length,checksum\nK1,ABC,three,{}\n", "0".repeat(64)),
        )
        .unwrap();
        match read_sections_csv(&csv, SectionKind::Ciphertext) {
            Err(Error::MalformedRow { line, reason, .. }) => {
                assert_eq!(line, 2);
                assert!(reason.contains("three"));
            }
            other => panic!("expected MalformedRow, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_checksum_is_malformed() {
        let tmp = tempfile::tempdir().unwrap();
        let csv = tmp.path().join(CIPHERTEXTS_CSV);
        std::fs::write(&csv, "section,letters,length,checksum\nK4,ABC,3,abc123\n").unwrap();
        assert!(matches!(
            read_sections_csv(&csv, SectionKind::Ciphertext),
            Err(Error::MalformedRow { .. })
        ));
    }

    #[test]
    fn test_write_trials_csv() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("results.csv");
        let rows = vec![TrialRow {
            run_id: "RUN-EXP-X".into(),
            section: "K1".into(),
            key: "3".into(),
            composite: 1.25,
            chi2: 2.0,
            quadgram_stat: 0.5,
            plaintext: "HELLO".into(),
        }];
        write_trials_csv(&path, &rows).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "run_id,section,key,composite,chi2,quadgram_stat,plaintext\n\
             RUN-EXP-X,K1,3,1.250000,2.000000,0.500000,HELLO\n"
        );
    }
}
