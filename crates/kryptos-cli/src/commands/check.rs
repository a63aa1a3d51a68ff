//! `kryptos check` — presence and length-parity pass over the section CSVs.

use std::path::Path;

use kryptos_core::{
    PairingPolicy, Result, SectionKind, check_consistency, read_sections_csv, sections_csv_path,
};

pub fn run(data_dir: &str) -> Result<()> {
    let data_dir = Path::new(data_dir);
    let ciphertexts = read_sections_csv(
        &sections_csv_path(data_dir, SectionKind::Ciphertext),
        SectionKind::Ciphertext,
    )?;
    let baselines = read_sections_csv(
        &sections_csv_path(data_dir, SectionKind::Baseline),
        SectionKind::Baseline,
    )?;

    let report = check_consistency(&ciphertexts, &baselines, &PairingPolicy::kryptos())?;
    for (section, length) in &report.paired {
        println!("  [ok] {section:<3} {length:>4} letters, ciphertext and baseline agree");
    }
    for section in &report.exempt {
        println!("  [--] {section:<3} no baseline (unsolved)");
    }
    println!("Kryptos consistency OK: baselines present, lengths match.");
    Ok(())
}
