//! `kryptos search` — exhaustive shift sweep, ranked by composite score.

use std::path::{Path, PathBuf};

use kryptos_core::{
    PilotConfig, Result, RunReport, SectionKind, load_config_from_path, read_sections_csv,
    run_pilot, sections_csv_path, write_json, write_trials_csv,
};

use super::{load_scorer, parse_sections};

pub struct SearchCommandConfig<'a> {
    pub data_dir: &'a str,
    pub sections: Option<&'a str>,
    pub top: Option<usize>,
    pub w_uni: Option<f64>,
    pub w_quad: Option<f64>,
    pub floor: Option<f64>,
    pub threads: Option<usize>,
    pub config_path: Option<&'a str>,
    pub unigram_path: Option<&'a str>,
    pub quadgram_path: Option<&'a str>,
    pub output_path: Option<&'a str>,
    pub results_path: Option<&'a str>,
}

/// Merge the optional config file with flag overrides. Flags win.
pub fn resolve_config(cfg: &SearchCommandConfig<'_>) -> Result<PilotConfig> {
    let mut pilot = match cfg.config_path {
        Some(path) => load_config_from_path(Path::new(path))?,
        None => PilotConfig::default(),
    };
    if let Some(list) = cfg.sections {
        pilot.sections = parse_sections(list);
    }
    if let Some(top) = cfg.top {
        pilot.top = top;
    }
    if let Some(w) = cfg.w_uni {
        pilot.score.weights.unigram = w;
    }
    if let Some(w) = cfg.w_quad {
        pilot.score.weights.quadgram = w;
    }
    if let Some(floor) = cfg.floor {
        pilot.score.quadgram_floor = floor;
    }
    if let Some(threads) = cfg.threads {
        pilot.threads = threads;
    }
    if let Some(path) = cfg.unigram_path {
        pilot.unigram_path = Some(PathBuf::from(path));
    }
    if let Some(path) = cfg.quadgram_path {
        pilot.quadgram_path = Some(PathBuf::from(path));
    }
    pilot.validate()?;
    Ok(pilot)
}

pub fn run(cfg: SearchCommandConfig<'_>) -> Result<()> {
    let pilot = resolve_config(&cfg)?;
    let data_dir = Path::new(cfg.data_dir);

    let scorer = load_scorer(
        data_dir,
        pilot.unigram_path.clone(),
        pilot.quadgram_path.clone(),
        pilot.score,
    )?;
    let ciphertexts = read_sections_csv(
        &sections_csv_path(data_dir, SectionKind::Ciphertext),
        SectionKind::Ciphertext,
    )?;

    let report = run_pilot(&ciphertexts, &scorer, &pilot)?;
    print_report(&report, pilot.top);

    if let Some(path) = cfg.results_path {
        write_trials_csv(Path::new(path), &report.trial_rows())?;
        println!("\nTrials written to {path}");
    }
    if let Some(path) = cfg.output_path {
        write_json(Path::new(path), &report)?;
        println!("Report written to {path}");
    }
    Ok(())
}

fn print_report(report: &RunReport, top: usize) {
    println!("{} ({} trials over {})", report.run_id, report.n_trials, report.sections.join(","));
    println!(
        "  weights: unigram={} quadgram={}  floor={}",
        report.weights.unigram, report.weights.quadgram, report.floor
    );
    println!();
    println!("Top {top} (lower is better):");
    for t in report.top(top) {
        println!(
            "  [{}] shift={:<2} composite={:.6}  chi2={:.3} quad={:.3}  {}",
            t.section,
            t.key,
            t.composite,
            t.chi2,
            t.quadgram,
            preview(&t.candidate, 60)
        );
    }

    println!();
    println!("Best per section:");
    for section in &report.sections {
        if let Some(t) = report.section_top(section, 1).first() {
            println!(
                "  [{}] shift={:<2} composite={:.6}  {}",
                t.section,
                t.key,
                t.composite,
                preview(&t.candidate, 60)
            );
        }
    }
}

fn preview(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{head}…")
    }
}
