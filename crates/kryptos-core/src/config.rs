//! Scoring and run configuration.
//!
//! All values have defaults matching the reference pilot sweep; a JSON file
//! can override any subset of them and CLI flags override the file.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default floor log-weight for quadgrams absent from the model.
pub const DEFAULT_QUADGRAM_FLOOR: f64 = -5.0;

/// Relative weights of the two statistics in the composite score.
///
/// The 0.5/0.5 default is a tuning choice, not a derived constant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub unigram: f64,
    pub quadgram: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            unigram: 0.5,
            quadgram: 0.5,
        }
    }
}

/// Parameters of the composite scorer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    pub weights: ScoreWeights,
    /// Log-weight used for unseen quadgrams. Must be finite and `<= 0`.
    pub quadgram_floor: f64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            quadgram_floor: DEFAULT_QUADGRAM_FLOOR,
        }
    }
}

impl ScoreConfig {
    pub fn validate(&self) -> Result<()> {
        let ScoreWeights { unigram, quadgram } = self.weights;
        for (name, w) in [("unigram", unigram), ("quadgram", quadgram)] {
            if !w.is_finite() || w < 0.0 {
                return Err(Error::Config(format!(
                    "{name} weight must be finite and non-negative, got {w}"
                )));
            }
        }
        if !self.quadgram_floor.is_finite() || self.quadgram_floor > 0.0 {
            return Err(Error::Config(format!(
                "quadgram floor must be finite and <= 0, got {}",
                self.quadgram_floor
            )));
        }
        Ok(())
    }
}

/// Configuration for a multi-section shift-cipher sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PilotConfig {
    pub score: ScoreConfig,
    /// Unigram CSV; `None` uses `<data>/corpora/en_unigram_v2.1.csv`.
    pub unigram_path: Option<PathBuf>,
    /// Quadgram CSV; `None` uses `<data>/corpora/en_quadgram_v2.1.csv`.
    pub quadgram_path: Option<PathBuf>,
    /// Sections to search, e.g. `["K1", "K2"]`.
    pub sections: Vec<String>,
    /// Number of top trials to report.
    pub top: usize,
    /// Worker threads for the key search (1 = sequential).
    pub threads: usize,
}

impl Default for PilotConfig {
    fn default() -> Self {
        Self {
            score: ScoreConfig::default(),
            unigram_path: None,
            quadgram_path: None,
            sections: ["K1", "K2", "K3", "K4"].map(String::from).to_vec(),
            top: 5,
            threads: 1,
        }
    }
}

impl PilotConfig {
    pub fn validate(&self) -> Result<()> {
        self.score.validate()?;
        if self.threads == 0 {
            return Err(Error::Config("threads must be at least 1".to_string()));
        }
        if self.selected_sections().is_empty() {
            return Err(Error::Config("no sections selected".to_string()));
        }
        Ok(())
    }

    /// Sections trimmed, uppercased, deduplicated and sorted. Blank entries
    /// are dropped.
    pub fn selected_sections(&self) -> Vec<String> {
        self.sections
            .iter()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Load a [`PilotConfig`] from JSON. Missing fields keep their defaults.
pub fn load_config_from_path(path: &Path) -> Result<PilotConfig> {
    let raw = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let config: PilotConfig = serde_json::from_str(&raw).map_err(|e| {
        Error::Config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let c = PilotConfig::default();
        assert_eq!(c.score.weights.unigram, 0.5);
        assert_eq!(c.score.weights.quadgram, 0.5);
        assert_eq!(c.score.quadgram_floor, -5.0);
        assert_eq!(c.sections, ["K1", "K2", "K3", "K4"]);
        assert_eq!(c.top, 5);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_rejects_negative_weight() {
        let mut c = ScoreConfig::default();
        c.weights.quadgram = -0.1;
        assert!(matches!(c.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_positive_or_nan_floor() {
        let mut c = ScoreConfig::default();
        c.quadgram_floor = 1.0;
        assert!(c.validate().is_err());
        c.quadgram_floor = f64::NAN;
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(
            f,
            r#"{{"score": {{"weights": {{"unigram": 0.2}}}}, "sections": ["K1"]}}"#
        )
        .unwrap();
        let c = load_config_from_path(f.path()).unwrap();
        assert_eq!(c.score.weights.unigram, 0.2);
        assert_eq!(c.score.weights.quadgram, 0.5);
        assert_eq!(c.score.quadgram_floor, -5.0);
        assert_eq!(c.sections, ["K1"]);
        assert_eq!(c.threads, 1);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "{{ not json").unwrap();
        assert!(matches!(
            load_config_from_path(f.path()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_blank_sections_are_dropped() {
        let c = PilotConfig {
            sections: vec![" k2 ".into(), "".into(), "K1".into(), "K2".into()],
            ..PilotConfig::default()
        };
        assert_eq!(c.selected_sections(), ["K1", "K2"]);

        let blank = PilotConfig {
            sections: vec![" ".into(), "".into()],
            ..PilotConfig::default()
        };
        assert!(matches!(blank.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_threads_rejected() {
        let c = PilotConfig {
            threads: 0,
            ..PilotConfig::default()
        };
        assert!(c.validate().is_err());
    }
}
