//! `kryptos score` — score one candidate plaintext against the language models.

use std::path::{Path, PathBuf};

use kryptos_core::{
    Result, ScoreConfig, ScoreWeights, canonicalize, goodness_of_fit_p_value,
};

use super::load_scorer;

pub struct ScoreCommandConfig<'a> {
    pub text: &'a str,
    pub data_dir: &'a str,
    pub unigram_path: Option<&'a str>,
    pub quadgram_path: Option<&'a str>,
    pub w_uni: f64,
    pub w_quad: f64,
    pub floor: f64,
}

pub fn run(cfg: ScoreCommandConfig<'_>) -> Result<()> {
    let config = ScoreConfig {
        weights: ScoreWeights {
            unigram: cfg.w_uni,
            quadgram: cfg.w_quad,
        },
        quadgram_floor: cfg.floor,
    };
    let scorer = load_scorer(
        Path::new(cfg.data_dir),
        cfg.unigram_path.map(PathBuf::from),
        cfg.quadgram_path.map(PathBuf::from),
        config,
    )?;

    let text = canonicalize(cfg.text);
    let score = scorer.score(text.letters());

    println!("letters:    {} ({})", text.len(), text.checksum());
    println!("composite:  {:.6}", score.composite);
    println!("chi2:       {:.6}", score.chi2);
    match goodness_of_fit_p_value(score.chi2, 26) {
        Some(p) => println!("  p-value:  {p:.4e} (df=25)"),
        None => println!("  p-value:  n/a"),
    }
    println!("quadgram:   {:.6}", score.quadgram);
    println!(
        "weights:    unigram={} quadgram={} floor={}",
        score.weights.unigram, score.weights.quadgram, cfg.floor
    );
    Ok(())
}
