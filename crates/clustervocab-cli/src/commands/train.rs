use std::{path::PathBuf, time::Duration};

use clustervocab::{
    ClusterDefinition, ClusterTrainOutcome, DEFAULT_VOCAB_FLOOR, DirVocabLoader,
    TrainAllOptions, allocate_budgets, train_all,
};

use crate::{LogArgs, command_trainer::CommandTrainer};

/// Args for the train command.
#[derive(clap::Args, Debug)]
pub struct TrainArgs {
    #[clap(flatten)]
    pub logging: LogArgs,

    /// The cluster-definition file.
    #[arg(long)]
    clusters: PathBuf,

    /// Directory of per-language vocab files (for budget allocation).
    #[arg(long)]
    vocab_dir: PathBuf,

    /// Directory of `cluster_<id>.txt` corpora.
    #[arg(long)]
    corpus_dir: PathBuf,

    /// Output directory for model artifacts.
    #[arg(long)]
    model_dir: PathBuf,

    /// The external trainer executable.
    #[arg(long)]
    trainer: PathBuf,

    /// The total vocabulary budget to split across clusters.
    #[arg(long, default_value = "256000")]
    total_budget: usize,

    /// The per-cluster vocabulary-size floor.
    #[arg(long, default_value_t = DEFAULT_VOCAB_FLOOR)]
    floor: usize,

    /// Wall-clock timeout per trainer invocation, in seconds.
    #[arg(long, default_value = "10000")]
    timeout_secs: u64,

    /// Maximum training attempts per cluster.
    #[arg(long, default_value = "5")]
    max_attempts: usize,
}

impl TrainArgs {
    /// Run the train command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(3)?;

        let def = ClusterDefinition::load_path(&self.clusters)?;
        let loader = DirVocabLoader::new(&self.vocab_dir);
        let allocation = allocate_budgets(&def, &loader, self.total_budget, self.floor)?;

        let trainer =
            CommandTrainer::new(&self.trainer, Duration::from_secs(self.timeout_secs));
        let options = TrainAllOptions {
            floor: self.floor,
            max_attempts: self.max_attempts,
        };

        let report = train_all(
            &trainer,
            &self.corpus_dir,
            &allocation.budgets,
            &self.model_dir,
            &options,
        )?;

        for (cid, outcome) in &report.outcomes {
            match outcome {
                ClusterTrainOutcome::Trained {
                    vocab_size,
                    attempts,
                } => {
                    println!("cluster {cid}: trained (vocab {vocab_size}, attempts {attempts})");
                }
                ClusterTrainOutcome::Skipped => {
                    println!("cluster {cid}: skipped (model exists)");
                }
                ClusterTrainOutcome::Failed { reason } => {
                    println!("cluster {cid}: FAILED ({reason})");
                }
            }
        }

        if !report.all_ok() {
            return Err(format!("training failed for clusters {:?}", report.failures()).into());
        }
        Ok(())
    }
}
