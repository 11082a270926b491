use std::path::PathBuf;

use clustervocab::{ClusterSweepOptions, DirVocabLoader, build_vectors, sweep_clusterings};

use crate::LogArgs;

/// Args for the cluster command.
#[derive(clap::Args, Debug)]
pub struct ClusterArgs {
    #[clap(flatten)]
    pub logging: LogArgs,

    /// Directory of per-language vocab files.
    #[arg(long)]
    vocab_dir: PathBuf,

    /// Output directory for cluster-definition files.
    #[arg(long)]
    out_dir: PathBuf,

    /// Vocab filename prefix before the language identifier.
    #[arg(long, default_value = "")]
    vocab_prefix: String,

    /// Vocab filename extension.
    #[arg(long, default_value = ".vocab")]
    vocab_ext: String,

    /// Minimum number of clusters (inclusive).
    #[arg(long, default_value = "2")]
    min_k: usize,

    /// Maximum number of clusters (inclusive).
    #[arg(long, default_value = "9")]
    max_k: usize,

    /// Random seed for clustering initialization.
    #[arg(long, default_value = "42")]
    seed: u64,
}

impl ClusterArgs {
    /// Run the cluster command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(3)?;

        let loader =
            DirVocabLoader::with_naming(&self.vocab_dir, &self.vocab_prefix, &self.vocab_ext);
        let languages = loader.discover_languages()?;
        log::info!("discovered {} languages", languages.len());

        let (union_vocab, vectors) = build_vectors(&languages, &loader)?;
        log::info!("union vocab size: {}", union_vocab.len());

        let options = ClusterSweepOptions {
            min_k: self.min_k,
            max_k: self.max_k,
            seed: self.seed,
        };
        let written = sweep_clusterings(&languages, &vectors, &options, &self.out_dir)?;

        for path in &written {
            println!("{}", path.display());
        }
        Ok(())
    }
}
