//! CLI for kryptos — canonicalize, verify and search the Kryptos sections.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "kryptos")]
#[command(about = "kryptos — reproducible cryptanalysis of the Kryptos sculpture")]
#[command(version = kryptos_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Canonicalize raw section sources into ciphertexts.csv and baselines.csv
    Normalize {
        /// Directory holding k1_cipher.txt … k4_cipher.txt and k1_plain.txt … k3_plain.txt
        #[arg(long, default_value = "data/raw")]
        raw: String,

        /// Directory to write the section CSVs into
        #[arg(long, default_value = "data")]
        out: String,

        /// Declared encoding of the raw sources
        #[arg(long, default_value = "utf8", value_parser = ["utf8", "ascii"])]
        encoding: String,
    },

    /// Fail-fast consistency pass: required sections present, K1–K3 lengths match
    Check {
        /// Directory holding ciphertexts.csv and baselines.csv
        #[arg(long, default_value = "data")]
        data: String,
    },

    /// Recompute every published row from its raw source and compare
    Verify {
        /// Directory holding ciphertexts.csv and baselines.csv
        #[arg(long, default_value = "data")]
        data: String,

        /// Directory holding the raw section sources
        #[arg(long, default_value = "data/raw")]
        raw: String,

        /// Declared encoding of the raw sources
        #[arg(long, default_value = "utf8", value_parser = ["utf8", "ascii"])]
        encoding: String,
    },

    /// Exhaustive Caesar shift sweep over the selected sections, ranked by composite score
    Search {
        /// Directory holding ciphertexts.csv and corpora/
        #[arg(long, default_value = "data")]
        data: String,

        /// Comma-separated sections, e.g. K1,K2 (default: K1,K2,K3,K4)
        #[arg(long)]
        sections: Option<String>,

        /// Number of ranked trials to print (default: 5)
        #[arg(long)]
        top: Option<usize>,

        /// Weight of the unigram chi-square statistic (default: 0.5)
        #[arg(long)]
        w_uni: Option<f64>,

        /// Weight of the quadgram negative log-likelihood (default: 0.5)
        #[arg(long)]
        w_quad: Option<f64>,

        /// Log10 weight for unseen quadgrams (default: -5.0)
        #[arg(long, allow_hyphen_values = true)]
        floor: Option<f64>,

        /// Worker threads for the key-space sweep (default: 1)
        #[arg(long)]
        threads: Option<usize>,

        /// JSON run configuration; flags override its values
        #[arg(long)]
        config: Option<String>,

        /// Unigram model CSV (gram,prob)
        #[arg(long)]
        unigram: Option<String>,

        /// Quadgram model CSV (gram,log10_weight)
        #[arg(long)]
        quadgram: Option<String>,

        /// Write the full run report as JSON
        #[arg(long)]
        output: Option<String>,

        /// Write every ranked trial as CSV
        #[arg(long)]
        results: Option<String>,
    },

    /// Score a single candidate plaintext
    Score {
        /// Candidate text; non-letters are ignored
        text: String,

        /// Directory holding corpora/
        #[arg(long, default_value = "data")]
        data: String,

        /// Unigram model CSV (gram,prob)
        #[arg(long)]
        unigram: Option<String>,

        /// Quadgram model CSV (gram,log10_weight)
        #[arg(long)]
        quadgram: Option<String>,

        /// Weight of the unigram chi-square statistic
        #[arg(long, default_value = "0.5")]
        w_uni: f64,

        /// Weight of the quadgram negative log-likelihood
        #[arg(long, default_value = "0.5")]
        w_quad: f64,

        /// Log10 weight for unseen quadgrams
        #[arg(long, default_value = "-5.0", allow_hyphen_values = true)]
        floor: f64,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Normalize { raw, out, encoding } => {
            commands::normalize::run(&raw, &out, &encoding)
        }
        Commands::Check { data } => commands::check::run(&data),
        Commands::Verify {
            data,
            raw,
            encoding,
        } => commands::verify::run(&data, &raw, &encoding),
        Commands::Search {
            data,
            sections,
            top,
            w_uni,
            w_quad,
            floor,
            threads,
            config,
            unigram,
            quadgram,
            output,
            results,
        } => commands::search::run(commands::search::SearchCommandConfig {
            data_dir: &data,
            sections: sections.as_deref(),
            top,
            w_uni,
            w_quad,
            floor,
            threads,
            config_path: config.as_deref(),
            unigram_path: unigram.as_deref(),
            quadgram_path: quadgram.as_deref(),
            output_path: output.as_deref(),
            results_path: results.as_deref(),
        }),
        Commands::Score {
            text,
            data,
            unigram,
            quadgram,
            w_uni,
            w_quad,
            floor,
        } => commands::score::run(commands::score::ScoreCommandConfig {
            text: &text,
            data_dir: &data,
            unigram_path: unigram.as_deref(),
            quadgram_path: quadgram.as_deref(),
            w_uni,
            w_quad,
            floor,
        }),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}
