//! # Error Types

use std::path::PathBuf;

/// Errors from clustervocab operations.
#[derive(Debug, thiserror::Error)]
pub enum ClusterVocabError {
    /// A per-language vocabulary file is missing.
    ///
    /// Callers that can degrade to an empty vocabulary should do so
    /// (with a warning) instead of propagating this.
    #[error("vocabulary not found for \"{language}\": {path}")]
    VocabNotFound {
        /// The language whose vocabulary was requested.
        language: String,
        /// The missing file.
        path: PathBuf,
    },

    /// The summed union-vocabulary size over all clusters is zero;
    /// no scaling factor can be computed.
    #[error("total union vocabulary size is 0 across {clusters} clusters")]
    ZeroVocabulary {
        /// The number of clusters in the definition.
        clusters: usize,
    },

    /// Budget count does not match the number of cluster corpus files.
    #[error("budget count ({budgets}) does not match cluster corpus file count ({corpora})")]
    CountMismatch {
        /// The number of budgets supplied.
        budgets: usize,
        /// The number of cluster corpus files found.
        corpora: usize,
    },

    /// The designated base cluster model is missing; merge cannot proceed.
    #[error("base model not found: {path}")]
    BaseModelMissing {
        /// The expected base model path.
        path: PathBuf,
    },

    /// The trainer failed for a cluster after exhausting shrink-and-retry.
    #[error("trainer failed for cluster {cluster}: {reason}")]
    TrainerExhausted {
        /// The cluster that could not be trained.
        cluster: usize,
        /// The terminal failure description.
        reason: String,
    },

    /// A single (k, metric) clustering combination failed.
    #[error("clustering failed for k={k} ({metric}): {reason}")]
    Clustering {
        /// The requested cluster count.
        k: usize,
        /// The distance metric name.
        metric: String,
        /// The failure description.
        reason: String,
    },

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Parse error (cluster definitions, vocab files, model files).
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ClusterVocabError {
    fn from(err: serde_json::Error) -> Self {
        ClusterVocabError::Parse(err.to_string())
    }
}

/// Result type for clustervocab operations.
pub type CVResult<T> = core::result::Result<T, ClusterVocabError>;
