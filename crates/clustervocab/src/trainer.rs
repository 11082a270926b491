//! # Per-Cluster Trainer Invocation
//!
//! Drives an external subword trainer once per cluster corpus, with an
//! explicit shrink-and-retry state machine for resource failures:
//! `Pending -> Training -> {Trained, Timeout/OOM -> Pending(smaller),
//! Fatal}`, bounded by an attempt cap and the vocab-size floor.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::Regex;

use crate::{
    allocate::DEFAULT_VOCAB_FLOOR,
    errors::{CVResult, ClusterVocabError},
    model::SubwordModel,
    types::ClusterId,
};

static CLUSTER_CORPUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^cluster_(\d+)\.txt$").unwrap());

/// Shrink factor applied to the vocab size after a trainer timeout.
pub const TIMEOUT_SHRINK: f64 = 0.7;

/// Shrink factor applied to the vocab size after a trainer OOM kill.
pub const OOM_SHRINK: f64 = 0.6;

/// A recoverable or fatal failure from one trainer invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrainerFailure {
    /// The invocation exceeded its wall-clock timeout.
    Timeout,

    /// The invocation was killed for memory exhaustion.
    OutOfMemory,

    /// Any other trainer failure; not retried.
    Fatal(String),
}

/// Capability for training a subword model on a corpus.
///
/// The training algorithm itself is opaque; implementations may wrap a
/// subprocess, an FFI library, or an in-process trainer.
pub trait SubwordTrainer {
    /// Train a model on a corpus.
    ///
    /// ## Arguments
    /// * `corpus` - the corpus file path.
    /// * `vocab_size` - the target vocabulary size.
    ///
    /// ## Returns
    /// The trained model, or a [`TrainerFailure`].
    fn train(
        &self,
        corpus: &Path,
        vocab_size: usize,
    ) -> Result<SubwordModel, TrainerFailure>;
}

/// Options for [`train_all`].
#[derive(Debug, Clone)]
pub struct TrainAllOptions {
    /// The vocab-size floor shrinking never goes below.
    pub floor: usize,

    /// The maximum training attempts per cluster.
    pub max_attempts: usize,
}

impl Default for TrainAllOptions {
    fn default() -> Self {
        Self {
            floor: DEFAULT_VOCAB_FLOOR,
            max_attempts: 5,
        }
    }
}

/// The terminal state of one cluster's training.
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterTrainOutcome {
    /// A model was trained and written.
    Trained {
        /// The vocab size actually used (post-shrink).
        vocab_size: usize,
        /// The number of attempts consumed.
        attempts: usize,
    },

    /// A model artifact already existed; nothing was done.
    Skipped,

    /// Training failed terminally for this cluster.
    Failed {
        /// The terminal failure description.
        reason: String,
    },
}

/// Per-cluster training outcomes for one batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainReport {
    /// The outcome per cluster, keyed by ascending cluster id.
    pub outcomes: BTreeMap<ClusterId, ClusterTrainOutcome>,
}

impl TrainReport {
    /// The clusters that failed terminally.
    pub fn failures(&self) -> Vec<ClusterId> {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, ClusterTrainOutcome::Failed { .. }))
            .map(|(&cid, _)| cid)
            .collect()
    }

    /// True if every cluster trained or was already trained.
    pub fn all_ok(&self) -> bool {
        self.failures().is_empty()
    }
}

/// Discover `cluster_<id>.txt` corpus files in a directory.
///
/// ## Arguments
/// * `corpus_dir` - the directory to scan.
///
/// ## Returns
/// The `cluster id -> corpus path` map (ordered by id, which matches
/// filename-sorted discovery).
pub fn discover_cluster_corpora<P: AsRef<Path>>(
    corpus_dir: P,
) -> CVResult<BTreeMap<ClusterId, PathBuf>> {
    let mut corpora = BTreeMap::new();
    for entry in std::fs::read_dir(corpus_dir.as_ref())? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if let Some(caps) = CLUSTER_CORPUS.captures(name)
            && let Ok(cid) = caps[1].parse::<ClusterId>()
        {
            corpora.insert(cid, entry.path());
        }
    }
    Ok(corpora)
}

/// The expected model artifact path for a cluster.
pub fn cluster_model_path<P: AsRef<Path>>(
    model_dir: P,
    cluster: ClusterId,
) -> PathBuf {
    model_dir.as_ref().join(format!("cluster_{cluster}.model"))
}

/// Train one model per discovered cluster corpus.
///
/// Preconditions: the number of corpus files must equal the number of
/// budgets, and every discovered cluster id must have a budget;
/// otherwise the whole batch fails with
/// [`ClusterVocabError::CountMismatch`] before any trainer call.
///
/// Clusters whose model artifact already exists are skipped. Timeouts
/// and OOM kills shrink the vocab size ([`TIMEOUT_SHRINK`],
/// [`OOM_SHRINK`], floor-clamped) and retry up to the attempt cap; any
/// other failure is terminal for that cluster but does not abort
/// siblings.
///
/// ## Arguments
/// * `trainer` - the subword trainer.
/// * `corpus_dir` - the directory of `cluster_<id>.txt` corpora.
/// * `budgets` - the allocated vocab size per cluster.
/// * `model_dir` - the output directory for `.model` / `.vocab` files.
/// * `options` - floor and attempt cap.
///
/// ## Returns
/// The per-cluster outcome report.
pub fn train_all<T: SubwordTrainer, P: AsRef<Path>, Q: AsRef<Path>>(
    trainer: &T,
    corpus_dir: P,
    budgets: &BTreeMap<ClusterId, usize>,
    model_dir: Q,
    options: &TrainAllOptions,
) -> CVResult<TrainReport> {
    let model_dir = model_dir.as_ref();
    std::fs::create_dir_all(model_dir)?;

    let corpora = discover_cluster_corpora(corpus_dir)?;
    if corpora.len() != budgets.len() || !corpora.keys().all(|cid| budgets.contains_key(cid)) {
        return Err(ClusterVocabError::CountMismatch {
            budgets: budgets.len(),
            corpora: corpora.len(),
        });
    }

    let mut report = TrainReport::default();
    for (&cid, corpus) in &corpora {
        let outcome = train_cluster(trainer, cid, corpus, budgets[&cid], model_dir, options)?;
        report.outcomes.insert(cid, outcome);
    }
    Ok(report)
}

fn train_cluster<T: SubwordTrainer>(
    trainer: &T,
    cid: ClusterId,
    corpus: &Path,
    budget: usize,
    model_dir: &Path,
    options: &TrainAllOptions,
) -> CVResult<ClusterTrainOutcome> {
    let model_path = cluster_model_path(model_dir, cid);
    if model_path.exists() {
        log::info!("cluster {cid}: model exists, skipping");
        return Ok(ClusterTrainOutcome::Skipped);
    }

    let mut vocab_size = budget;
    for attempt in 1..=options.max_attempts {
        log::info!(
            "cluster {cid}: attempt {attempt}, training {} with vocab size {vocab_size}",
            corpus.display()
        );

        match trainer.train(corpus, vocab_size) {
            Ok(model) => {
                model.save_path(&model_path)?;
                model.save_vocab_path(model_path.with_extension("vocab"))?;
                log::info!("cluster {cid}: trained with vocab size {vocab_size}");
                return Ok(ClusterTrainOutcome::Trained {
                    vocab_size,
                    attempts: attempt,
                });
            }
            Err(TrainerFailure::Timeout) => {
                vocab_size = shrink(vocab_size, TIMEOUT_SHRINK, options.floor);
                log::warn!(
                    "cluster {cid}: training timed out; retrying with vocab size {vocab_size}"
                );
            }
            Err(TrainerFailure::OutOfMemory) => {
                vocab_size = shrink(vocab_size, OOM_SHRINK, options.floor);
                log::warn!(
                    "cluster {cid}: trainer out of memory; retrying with vocab size {vocab_size}"
                );
            }
            Err(TrainerFailure::Fatal(reason)) => {
                log::error!("cluster {cid}: trainer failed: {reason}");
                return Ok(ClusterTrainOutcome::Failed { reason });
            }
        }
    }

    let err = ClusterVocabError::TrainerExhausted {
        cluster: cid,
        reason: format!(
            "no success after {} attempts (final vocab size {vocab_size})",
            options.max_attempts
        ),
    };
    log::error!("{err}");
    Ok(ClusterTrainOutcome::Failed {
        reason: err.to_string(),
    })
}

fn shrink(
    vocab_size: usize,
    factor: f64,
    floor: usize,
) -> usize {
    floor.max((vocab_size as f64 * factor) as usize)
}
