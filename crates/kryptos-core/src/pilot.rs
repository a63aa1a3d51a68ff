//! Pilot sweep: exhaustive Caesar search over selected sections, ranked
//! globally and packaged as a run report.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::info;
use serde::Serialize;

use crate::cipher::{Cipher, ShiftCipher};
use crate::config::{PilotConfig, ScoreWeights};
use crate::error::{Error, Result};
use crate::rank::Ranking;
use crate::records::{SectionKind, SectionRecord, TrialRow};
use crate::scoring::Scorer;
use crate::search::{Trial, search_cipher};

/// Identifier of the composite scoring function recorded with each run.
pub const SCORING_ID: &str = "SFX-chi2-quadgram-v2.1";

/// Everything a pilot run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub method: String,
    pub scoring_id: String,
    pub sections: Vec<String>,
    pub n_trials: usize,
    pub created_utc: String,
    pub weights: ScoreWeights,
    pub floor: f64,
    pub ranking: Ranking<u8>,
}

impl RunReport {
    /// Best `n` trials across all sections.
    pub fn top(&self, n: usize) -> &[Trial<u8>] {
        self.ranking.top_n(n)
    }

    /// Best `n` trials of one section.
    pub fn section_top(&self, section: &str, n: usize) -> Vec<Trial<u8>> {
        let mut per_section = self.ranking.for_section(section).into_vec();
        per_section.truncate(n);
        per_section
    }

    /// Every trial as an export row, in ranked order.
    pub fn trial_rows(&self) -> Vec<TrialRow> {
        self.ranking
            .iter()
            .map(|t| TrialRow::from_trial(&self.run_id, t))
            .collect()
    }
}

/// Run the pilot with the current wall-clock time.
pub fn run_pilot(
    ciphertexts: &[SectionRecord],
    scorer: &Scorer,
    config: &PilotConfig,
) -> Result<RunReport> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    run_pilot_at(ciphertexts, scorer, config, now)
}

/// Run the pilot, stamping the report with `since_epoch`.
pub fn run_pilot_at(
    ciphertexts: &[SectionRecord],
    scorer: &Scorer,
    config: &PilotConfig,
    since_epoch: Duration,
) -> Result<RunReport> {
    config.validate()?;
    let cipher = ShiftCipher;
    let sections = config.selected_sections();

    let mut trials = Vec::with_capacity(sections.len() * 26);
    for section in &sections {
        let record = ciphertexts
            .iter()
            .rev()
            .find(|r| &r.section == section)
            .ok_or_else(|| Error::MissingSection {
                table: SectionKind::Ciphertext.table().to_string(),
                section: section.clone(),
            })?;
        trials.extend(search_cipher(
            &cipher,
            &record.canonical(),
            section,
            scorer,
            config.threads,
        ));
    }

    let ranking = Ranking::from_trials(trials);
    let report = RunReport {
        run_id: format!("RUN-EXP-{}-CAESAR", format_run_stamp(since_epoch)),
        method: cipher.name().to_string(),
        scoring_id: SCORING_ID.to_string(),
        n_trials: ranking.len(),
        sections,
        created_utc: format_iso8601(since_epoch),
        weights: scorer.config().weights,
        floor: scorer.config().quadgram_floor,
        ranking,
    };
    info!(
        "{}: {} trial(s) over {}",
        report.run_id,
        report.n_trials,
        report.sections.join(",")
    );
    Ok(report)
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// `20260215-013000`
fn format_run_stamp(since_epoch: Duration) -> String {
    let (year, month, day, hour, min, sec) = secs_to_utc(since_epoch.as_secs());
    format!("{year:04}{month:02}{day:02}-{hour:02}{min:02}{sec:02}")
}

/// `2026-02-15T01:30:00Z`
fn format_iso8601(since_epoch: Duration) -> String {
    let (year, month, day, hour, min, sec) = secs_to_utc(since_epoch.as_secs());
    format!("{year:04}-{month:02}-{day:02}T{hour:02}:{min:02}:{sec:02}Z")
}

/// Seconds since the Unix epoch to UTC calendar fields. No leap seconds.
fn secs_to_utc(secs: u64) -> (u64, u64, u64, u64, u64, u64) {
    let sec = secs % 60;
    let min = (secs / 60) % 60;
    let hour = (secs / 3600) % 24;

    let mut days = secs / 86400;
    let mut year = 1970u64;
    loop {
        let len = if is_leap(year) { 366 } else { 365 };
        if days < len {
            break;
        }
        days -= len;
        year += 1;
    }

    let feb = if is_leap(year) { 29 } else { 28 };
    let month_lengths = [31, feb, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    let mut month = 1u64;
    for len in month_lengths {
        if days < len {
            break;
        }
        days -= len;
        month += 1;
    }
    (year, month, days + 1, hour, min, sec)
}

fn is_leap(year: u64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
