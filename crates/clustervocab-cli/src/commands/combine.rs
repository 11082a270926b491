use std::path::PathBuf;

use clustervocab::{ClusterDefinition, combine_corpora};

use crate::LogArgs;

/// Args for the combine command.
#[derive(clap::Args, Debug)]
pub struct CombineArgs {
    #[clap(flatten)]
    pub logging: LogArgs,

    /// The cluster-definition file.
    #[arg(long)]
    clusters: PathBuf,

    /// Directory of `<lang>.txt` corpora.
    #[arg(long)]
    source_dir: PathBuf,

    /// Output directory for `cluster_<id>.txt` corpora.
    #[arg(long)]
    dest_dir: PathBuf,
}

impl CombineArgs {
    /// Run the combine command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(3)?;

        let def = ClusterDefinition::load_path(&self.clusters)?;
        let written = combine_corpora(&def, &self.source_dir, &self.dest_dir)?;

        for path in &written {
            println!("{}", path.display());
        }
        Ok(())
    }
}
