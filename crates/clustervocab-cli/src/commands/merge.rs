use std::path::PathBuf;

use clustervocab::merge_cluster_models;

use crate::LogArgs;

/// Args for the merge command.
#[derive(clap::Args, Debug)]
pub struct MergeArgs {
    #[clap(flatten)]
    pub logging: LogArgs,

    /// Directory of `cluster_<id>.model` artifacts.
    #[arg(long)]
    model_dir: PathBuf,

    /// The number of clusters.
    #[arg(long)]
    cluster_count: usize,

    /// Path for the merged model.
    #[arg(long)]
    output: PathBuf,
}

impl MergeArgs {
    /// Run the merge command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(3)?;

        let merged = merge_cluster_models(&self.model_dir, self.cluster_count)?;
        merged.save_path(&self.output)?;

        println!(
            "merged model saved as {} with {} tokens",
            self.output.display(),
            merged.len()
        );
        Ok(())
    }
}
