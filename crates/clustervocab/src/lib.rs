//! # `clustervocab` Cluster-Based Multilingual Vocabulary Builder
//!
//! Builds a shared subword vocabulary for a multilingual corpus by
//! clustering languages with overlapping subword inventories, training
//! one tokenizer per cluster, and merging the cluster tokenizers into a
//! single renormalized unigram vocabulary.
//!
//! Pipeline stages:
//! * [`vectorize`] builds binary vocabulary-membership vectors.
//! * [`cluster`] partitions languages over those vectors.
//! * [`combine`] concatenates per-language corpora per cluster.
//! * [`allocate`] splits a total vocab budget across clusters.
//! * [`trainer`] drives an external subword trainer per cluster, with
//!   shrink-and-retry on resource exhaustion.
//! * [`merge`] unions the per-cluster models, dropping duplicates.
//! * [`normalize`] rescores the merged model from corpus statistics
//!   into a valid unigram distribution.
//!
//! The subword training algorithm and any alternative clustering engine
//! are capability traits ([`trainer::SubwordTrainer`],
//! [`cluster::VectorClustering`]); the crate ships seeded k-medoids and
//! k-means backends and a Viterbi segmenter over trained models.

pub mod allocate;
pub mod cluster;
pub mod clusterdef;
pub mod combine;
pub mod errors;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod summary;
pub mod trainer;
pub mod types;
pub mod vectorize;

#[doc(inline)]
pub use crate::{
    allocate::{BudgetAllocation, DEFAULT_VOCAB_FLOOR, allocate_budgets},
    cluster::{
        ClusterSweepOptions, CosineKMedoids, EuclideanKMeans, VectorClustering,
        sweep_clusterings,
    },
    clusterdef::ClusterDefinition,
    combine::combine_corpora,
    errors::{CVResult, ClusterVocabError},
    merge::{merge_cluster_models, merge_models},
    model::{ModelPiece, Segmenter, SubwordModel},
    normalize::{
        FrequencyAccumulator, SCORE_EPSILON, normalize_from_dirs, normalize_scores,
    },
    summary::VocabConfigSummary,
    trainer::{
        ClusterTrainOutcome, SubwordTrainer, TrainAllOptions, TrainReport,
        TrainerFailure, train_all,
    },
    types::{CVHashMap, CVHashSet, ClusterId, LanguageId, MembershipVector},
    vectorize::{DirVocabLoader, VocabLoader, build_vectors},
};
