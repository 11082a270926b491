use std::path::PathBuf;

use clustervocab::{
    ClusterDefinition, DEFAULT_VOCAB_FLOOR, DirVocabLoader, VocabConfigSummary,
    allocate_budgets,
};

use crate::LogArgs;

/// Args for the allocate command.
#[derive(clap::Args, Debug)]
pub struct AllocateArgs {
    #[clap(flatten)]
    pub logging: LogArgs,

    /// The cluster-definition file.
    #[arg(long)]
    clusters: PathBuf,

    /// Directory of per-language vocab files.
    #[arg(long)]
    vocab_dir: PathBuf,

    /// The total vocabulary budget to split across clusters.
    #[arg(long, default_value = "256000")]
    total_budget: usize,

    /// The per-cluster vocabulary-size floor.
    #[arg(long, default_value_t = DEFAULT_VOCAB_FLOOR)]
    floor: usize,

    /// Optional path for the JSON configuration summary.
    #[arg(long)]
    summary: Option<PathBuf>,
}

impl AllocateArgs {
    /// Run the allocate command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(3)?;

        let def = ClusterDefinition::load_path(&self.clusters)?;
        let loader = DirVocabLoader::new(&self.vocab_dir);

        let allocation = allocate_budgets(&def, &loader, self.total_budget, self.floor)?;

        for (cid, size) in &allocation.budgets {
            println!("Cluster {cid}: {size}");
        }
        println!("Total: {}", allocation.allocated_total());

        if let Some(path) = &self.summary {
            VocabConfigSummary::new(&def, &allocation).save_path(path)?;
            log::info!("wrote summary: {}", path.display());
        }
        Ok(())
    }
}
