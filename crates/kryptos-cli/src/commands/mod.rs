pub mod check;
pub mod normalize;
pub mod score;
pub mod search;
pub mod verify;

use std::path::{Path, PathBuf};

use kryptos_core::{Error, LanguageModels, Result, ScoreConfig, Scorer, SourceEncoding};

/// Parse a comma-separated section list, uppercased, blanks dropped.
pub fn parse_sections(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Map the `--encoding` flag to a source encoding.
pub fn parse_encoding(name: &str) -> Result<SourceEncoding> {
    match name {
        "utf8" | "utf-8" => Ok(SourceEncoding::Utf8),
        "ascii" => Ok(SourceEncoding::Ascii),
        other => Err(Error::Config(format!("unknown encoding {other:?}"))),
    }
}

/// Resolve model paths (explicit path, else `<data>/corpora/…`) and build a scorer.
pub fn load_scorer(
    data_dir: &Path,
    unigram: Option<PathBuf>,
    quadgram: Option<PathBuf>,
    config: ScoreConfig,
) -> Result<Scorer> {
    let (default_unigram, default_quadgram) = kryptos_core::default_model_paths(data_dir);
    let unigram = unigram.unwrap_or(default_unigram);
    let quadgram = quadgram.unwrap_or(default_quadgram);
    let models = LanguageModels::load(&unigram, &quadgram)?;
    Scorer::new(models, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sections() {
        assert_eq!(parse_sections("k1, K2,,k4 "), ["K1", "K2", "K4"]);
        assert!(parse_sections(" , ").is_empty());
    }

    #[test]
    fn test_parse_encoding() {
        assert_eq!(parse_encoding("utf8").unwrap(), SourceEncoding::Utf8);
        assert_eq!(parse_encoding("ascii").unwrap(), SourceEncoding::Ascii);
        assert!(matches!(parse_encoding("latin1"), Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_models_is_model_load_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = load_scorer(tmp.path(), None, None, ScoreConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("en_unigram_v2.1.csv"));
    }
}
