use std::path::PathBuf;

use clustervocab::{SubwordModel, normalize::probability_mass, normalize_from_dirs};

use crate::LogArgs;

/// Args for the normalize command.
#[derive(clap::Args, Debug)]
pub struct NormalizeArgs {
    #[clap(flatten)]
    pub logging: LogArgs,

    /// The merged model to renormalize.
    #[arg(long)]
    merged: PathBuf,

    /// Directory of `cluster_<id>.model` artifacts.
    #[arg(long)]
    model_dir: PathBuf,

    /// Directory of `cluster_<id>.txt` corpora.
    #[arg(long)]
    corpus_dir: PathBuf,

    /// The number of clusters.
    #[arg(long)]
    cluster_count: usize,

    /// Path for the normalized model.
    #[arg(long)]
    output: PathBuf,
}

impl NormalizeArgs {
    /// Run the normalize command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(3)?;

        let merged = SubwordModel::load_path(&self.merged)?;
        log::info!(
            "loaded merged model with {} pieces ({} special)",
            merged.len(),
            merged.specials().len()
        );

        let normalized = normalize_from_dirs(
            merged,
            &self.model_dir,
            &self.corpus_dir,
            self.cluster_count,
        )?;
        normalized.save_path(&self.output)?;

        println!(
            "normalized model saved: {} (probability mass {:.6})",
            self.output.display(),
            probability_mass(&normalized)
        );
        Ok(())
    }
}
