//! # kryptos-core
//!
//! **Reproducible cryptanalysis of classical ciphers, starting with Kryptos.**
//!
//! `kryptos-core` turns raw section transcriptions into checksummed canonical
//! letter streams, proves published datasets still match their sources, and
//! scores every key of a cipher family against English language models.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use kryptos_core::{
//!     LanguageModels, PilotConfig, ScoreConfig, Scorer, SectionKind, default_model_paths,
//!     read_sections_csv, run_pilot,
//! };
//!
//! let data = Path::new("data");
//! let (unigram, quadgram) = default_model_paths(data);
//! let models = LanguageModels::load(&unigram, &quadgram)?;
//! let scorer = Scorer::new(models, ScoreConfig::default())?;
//!
//! let ciphertexts = read_sections_csv(&data.join("ciphertexts.csv"), SectionKind::Ciphertext)?;
//! let report = run_pilot(&ciphertexts, &scorer, &PilotConfig::default())?;
//! for trial in report.top(5) {
//!     println!("{} key={} {:.3} {}", trial.section, trial.key, trial.composite, trial.candidate);
//! }
//! # Ok::<(), kryptos_core::Error>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! raw text ─► canonical ─► SectionRecord ─► ciphertexts.csv / baselines.csv
//!                 │                │
//!                 │                └─► verify (checksum, parity)
//!                 ▼
//!         search(key space) ─► Trial per key ─► rank ─► top N
//!                 ▲
//!         Scorer = w_u · chi² (unigram) + w_q · quadgram NLL
//! ```
//!
//! Lower scores are better everywhere. Models are loaded once and shared
//! read-only across search workers.

pub mod canonical;
pub mod cipher;
pub mod config;
pub mod dataset;
pub mod error;
pub mod model;
pub mod pilot;
pub mod rank;
pub mod records;
pub mod scoring;
pub mod search;
pub mod table;
pub mod verify;

pub use canonical::{
    CanonicalText, Checksum, NORMALIZATION_VERSION, SourceEncoding, canonicalize,
    canonicalize_bytes, canonicalize_file, letters_only,
};
pub use cipher::{Cipher, KeySpace, ShiftCipher};
pub use config::{
    DEFAULT_QUADGRAM_FLOOR, PilotConfig, ScoreConfig, ScoreWeights, load_config_from_path,
};
pub use dataset::{
    BASELINES_CSV, CIPHERTEXTS_CSV, SectionLayout, build_section_records, raw_source_path,
    read_sections_csv, sections_csv_path, write_json, write_sections_csv, write_trials_csv,
};
pub use error::{
    DecodeError, Error, LengthParityError, MismatchError, MismatchField, ModelLoadError, Result,
};
pub use model::{
    LanguageModels, QuadgramModel, UnigramModel, default_model_paths, load_quadgram_model,
    load_unigram_model,
};
pub use pilot::{RunReport, SCORING_ID, run_pilot, run_pilot_at};
pub use rank::{Ranking, rank, top_n};
pub use records::{SectionKind, SectionRecord, TrialRow};
pub use scoring::{
    Score, Scorer, chi_square, composite, goodness_of_fit_p_value, quadgram_neg_log_likelihood,
};
pub use search::{SearchOutcome, Trial, search, search_cipher, search_parallel, search_with_deadline};
pub use verify::{
    BaselineStatus, ConsistencyReport, PairingPolicy, baseline_status, check_consistency, verify,
    verify_against_sources, verify_pairing,
};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
