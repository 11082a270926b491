use std::{path::PathBuf, time::Duration};

use clustervocab::{
    ClusterDefinition, CosineKMedoids, DEFAULT_VOCAB_FLOOR, DirVocabLoader, EuclideanKMeans,
    MembershipVector, TrainAllOptions, VectorClustering, VocabConfigSummary,
    allocate_budgets, build_vectors, combine_corpora, merge_cluster_models,
    normalize_from_dirs, train_all,
};

use crate::{LogArgs, command_trainer::CommandTrainer};

/// Clustering metric for the run command.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum Metric {
    /// K-medoids under cosine distance.
    Cosine,
    /// K-means under Euclidean distance.
    L2,
}

/// Args for the end-to-end run command.
#[derive(clap::Args, Debug)]
pub struct RunArgs {
    #[clap(flatten)]
    pub logging: LogArgs,

    /// Directory of per-language vocab files.
    #[arg(long)]
    vocab_dir: PathBuf,

    /// Directory of per-language `<lang>.txt` corpora.
    #[arg(long)]
    corpus_dir: PathBuf,

    /// Working directory for all pipeline outputs.
    #[arg(long)]
    work_dir: PathBuf,

    /// The external trainer executable.
    #[arg(long)]
    trainer: PathBuf,

    /// The number of clusters.
    #[arg(long, default_value = "5")]
    k: usize,

    /// The clustering metric.
    #[arg(long, value_enum, default_value = "l2")]
    metric: Metric,

    /// The total vocabulary budget.
    #[arg(long, default_value = "256000")]
    total_budget: usize,

    /// The per-cluster vocabulary-size floor.
    #[arg(long, default_value_t = DEFAULT_VOCAB_FLOOR)]
    floor: usize,

    /// Random seed for clustering initialization.
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Wall-clock timeout per trainer invocation, in seconds.
    #[arg(long, default_value = "10000")]
    timeout_secs: u64,

    /// Maximum training attempts per cluster.
    #[arg(long, default_value = "5")]
    max_attempts: usize,
}

impl RunArgs {
    /// Run the full pipeline.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(3)?;
        std::fs::create_dir_all(&self.work_dir)?;

        // Vectorize and cluster.
        let loader = DirVocabLoader::new(&self.vocab_dir);
        let languages = loader.discover_languages()?;
        let (union_vocab, vectors) = build_vectors(&languages, &loader)?;
        log::info!(
            "{} languages, union vocab size {}",
            languages.len(),
            union_vocab.len()
        );

        let matrix: Vec<MembershipVector> = languages
            .iter()
            .map(|lang| vectors[lang].clone())
            .collect();
        let backend: Box<dyn VectorClustering> = match self.metric {
            Metric::Cosine => Box::new(CosineKMedoids {
                seed: self.seed,
                ..Default::default()
            }),
            Metric::L2 => Box::new(EuclideanKMeans {
                seed: self.seed,
                ..Default::default()
            }),
        };
        let assignment = backend.cluster(&matrix, self.k)?;
        let def = ClusterDefinition::from_assignment(&languages, &assignment);

        let def_path = self.work_dir.join(format!(
            "language_clusters_{}_{}.txt",
            backend.metric_label(),
            self.k
        ));
        def.save_path(&def_path)?;
        log::info!("wrote {}", def_path.display());

        // Combine corpora.
        let clustered_dir = self.work_dir.join("cluster_corpora");
        combine_corpora(&def, &self.corpus_dir, &clustered_dir)?;

        // Allocate budgets and emit the advisory summary.
        let allocation = allocate_budgets(&def, &loader, self.total_budget, self.floor)?;
        let summary_path = self.work_dir.join("vocab_config.json");
        VocabConfigSummary::new(&def, &allocation).save_path(&summary_path)?;
        log::info!("wrote {}", summary_path.display());

        // Train per cluster.
        let model_dir = self.work_dir.join("models");
        let trainer =
            CommandTrainer::new(&self.trainer, Duration::from_secs(self.timeout_secs));
        let report = train_all(
            &trainer,
            &clustered_dir,
            &allocation.budgets,
            &model_dir,
            &TrainAllOptions {
                floor: self.floor,
                max_attempts: self.max_attempts,
            },
        )?;
        if !report.all_ok() {
            return Err(
                format!("training failed for clusters {:?}", report.failures()).into()
            );
        }

        // Merge and normalize.
        let merged = merge_cluster_models(&model_dir, def.len())?;
        let merged_path = self.work_dir.join("merged.model");
        merged.save_path(&merged_path)?;
        log::info!("wrote {} ({} pieces)", merged_path.display(), merged.len());

        let normalized = normalize_from_dirs(merged, &model_dir, &clustered_dir, def.len())?;
        let final_path = self.work_dir.join("final_normalized.model");
        normalized.save_path(&final_path)?;
        normalized.save_vocab_path(final_path.with_extension("vocab"))?;

        println!("final normalized model: {}", final_path.display());
        Ok(())
    }
}
