//! `kryptos normalize` — canonicalize raw sources into the section CSVs.

use std::path::Path;

use kryptos_core::{
    Result, SectionKind, SectionLayout, build_section_records, sections_csv_path,
    write_sections_csv,
};

use super::parse_encoding;

pub fn run(raw_dir: &str, out_dir: &str, encoding: &str) -> Result<()> {
    let encoding = parse_encoding(encoding)?;
    let raw_dir = Path::new(raw_dir);
    let out_dir = Path::new(out_dir);
    let layout = SectionLayout::kryptos();

    // Build both tables before writing either.
    let ciphertexts =
        build_section_records(raw_dir, &layout, SectionKind::Ciphertext, encoding)?;
    let baselines = build_section_records(raw_dir, &layout, SectionKind::Baseline, encoding)?;

    for (kind, records) in [
        (SectionKind::Ciphertext, &ciphertexts),
        (SectionKind::Baseline, &baselines),
    ] {
        let path = sections_csv_path(out_dir, kind);
        write_sections_csv(&path, kind, records)?;
        println!("WROTE {}", path.display());
        for r in records {
            println!("  {:<3} {:>4} letters  {}", r.section, r.length, r.checksum);
        }
    }
    Ok(())
}
