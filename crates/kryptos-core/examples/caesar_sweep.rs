//! Caesar sweep example.
//!
//! Encrypts a sentence with a secret shift, scores all 26 decryptions against
//! the bundled English corpora and prints the five best.
//!
//! Run: `cargo run --example caesar_sweep`

use std::path::Path;

use kryptos_core::{
    Cipher, LanguageModels, ScoreConfig, Scorer, ShiftCipher, canonicalize, default_model_paths,
    rank, search_cipher,
};

fn main() -> kryptos_core::Result<()> {
    let data = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data");
    let (unigram, quadgram) = default_model_paths(&data);
    let scorer = Scorer::new(
        LanguageModels::load(&unigram, &quadgram)?,
        ScoreConfig::default(),
    )?;

    let secret = ShiftCipher.encrypt("it was totally invisible, hows that possible", &11);
    let ciphertext = canonicalize(&secret);
    println!("Ciphertext: {ciphertext}");

    let trials = search_cipher(&ShiftCipher, &ciphertext, "demo", &scorer, 4);
    for t in rank(&trials).top_n(5) {
        println!(
            "shift={:<2} composite={:>10.3} chi2={:>10.3}  {}",
            t.key, t.composite, t.chi2, t.candidate
        );
    }
    Ok(())
}
