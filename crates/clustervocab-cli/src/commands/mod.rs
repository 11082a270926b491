use crate::commands::{
    allocate::AllocateArgs, cluster::ClusterArgs, combine::CombineArgs, merge::MergeArgs,
    normalize::NormalizeArgs, run::RunArgs, train::TrainArgs,
};

pub mod allocate;
pub mod cluster;
pub mod combine;
pub mod merge;
pub mod normalize;
pub mod run;
pub mod train;

/// Subcommands for clustervocab-cli
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Cluster languages by vocabulary overlap, over a k range.
    Cluster(ClusterArgs),

    /// Allocate per-cluster vocabulary budgets.
    Allocate(AllocateArgs),

    /// Concatenate per-language corpora into per-cluster corpora.
    Combine(CombineArgs),

    /// Train one subword model per cluster corpus.
    Train(TrainArgs),

    /// Merge per-cluster models into one model.
    Merge(MergeArgs),

    /// Renormalize a merged model from corpus statistics.
    Normalize(NormalizeArgs),

    /// Run the full pipeline end to end.
    Run(RunArgs),
}

impl Commands {
    /// Run the subcommand.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            Commands::Cluster(cmd) => cmd.run(),
            Commands::Allocate(cmd) => cmd.run(),
            Commands::Combine(cmd) => cmd.run(),
            Commands::Train(cmd) => cmd.run(),
            Commands::Merge(cmd) => cmd.run(),
            Commands::Normalize(cmd) => cmd.run(),
            Commands::Run(cmd) => cmd.run(),
        }
    }
}
