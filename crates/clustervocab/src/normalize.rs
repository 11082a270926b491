//! # Score Normalizer
//!
//! Rescores a merged model from empirical corpus statistics: each
//! cluster's corpus is re-segmented with that cluster's own pre-merge
//! model, per-token occurrence probabilities are averaged across the
//! clusters that observed them, and the merged model's non-special
//! scores are replaced with renormalized log-probabilities summing to 1
//! in probability space.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::{
    errors::CVResult,
    model::SubwordModel,
    trainer::cluster_model_path,
    types::CVHashMap,
};

/// Probability floor preventing `log(0)` for unobserved tokens.
pub const SCORE_EPSILON: f64 = 1e-10;

/// Per-token probability observations accumulated over clusters.
///
/// A token gains at most one observation per cluster in which it was
/// produced by that cluster's own tokenizer on that cluster's own
/// corpus. Owned by the normalization pass; not shared state.
#[derive(Debug, Clone, Default)]
pub struct FrequencyAccumulator {
    observations: CVHashMap<String, Vec<f64>>,
}

impl FrequencyAccumulator {
    /// The number of distinct tokens with observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// True if no token has been observed.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Record one cluster-level probability observation for a token.
    pub fn record<S: Into<String>>(
        &mut self,
        token: S,
        probability: f64,
    ) {
        self.observations.entry(token.into()).or_default().push(probability);
    }

    /// The mean observed probability for a token, if any.
    pub fn mean(
        &self,
        token: &str,
    ) -> Option<f64> {
        let obs = self.observations.get(token)?;
        if obs.is_empty() {
            return None;
        }
        Some(obs.iter().sum::<f64>() / obs.len() as f64)
    }

    /// Segment one cluster's corpus with that cluster's own model and
    /// record each produced token's occurrence probability.
    ///
    /// ## Arguments
    /// * `model` - the cluster's trained model.
    /// * `corpus` - the cluster's corpus file, one example per line.
    pub fn add_cluster_pass<P: AsRef<Path>>(
        &mut self,
        model: &SubwordModel,
        corpus: P,
    ) -> CVResult<()> {
        let segmenter = model.segmenter();
        let mut counts: CVHashMap<String, u64> = CVHashMap::default();
        let mut total: u64 = 0;

        let reader = BufReader::new(File::open(corpus.as_ref())?);
        for line in reader.lines() {
            let line = line?;
            for token in segmenter.segment(&line) {
                *counts.entry(token.to_string()).or_default() += 1;
                total += 1;
            }
        }

        if total == 0 {
            log::warn!(
                "no tokens segmented from {}; skipping its statistics",
                corpus.as_ref().display()
            );
            return Ok(());
        }

        for (token, count) in counts {
            self.record(token, count as f64 / total as f64);
        }
        Ok(())
    }
}

/// Replace a merged model's non-special scores with renormalized
/// log-probabilities from the accumulated observations.
///
/// Observed tokens score `log(mean(observations))`; tokens never
/// produced by any cluster's tokenizer fall back to
/// `log(`[`SCORE_EPSILON`]`)`. Scores are then renormalized so
/// `sum(exp(score))` over non-special pieces is 1; a model with no
/// probability mass is left with the fallback scores and a warning.
///
/// ## Arguments
/// * `merged` - the merged model.
/// * `accumulator` - the per-token probability observations.
///
/// ## Returns
/// The final normalized model: unmodified special prefix followed by
/// the rescored pieces in merged order.
pub fn normalize_scores(
    merged: SubwordModel,
    accumulator: &FrequencyAccumulator,
) -> SubwordModel {
    let special_count = merged.special_count.min(merged.pieces.len());
    let mut pieces = merged.pieces;
    let regular = &mut pieces[special_count..];

    let mut observed = 0usize;
    for piece in regular.iter_mut() {
        piece.score = match accumulator.mean(&piece.piece) {
            Some(mean) => {
                observed += 1;
                mean.max(SCORE_EPSILON).ln()
            }
            None => SCORE_EPSILON.ln(),
        };
    }
    log::info!(
        "frequency data for {observed} of {} regular pieces",
        regular.len()
    );

    let z: f64 = regular.iter().map(|p| p.score.exp()).sum();
    if z > 0.0 {
        for piece in regular.iter_mut() {
            piece.score = (piece.score.exp() / z).max(SCORE_EPSILON).ln();
        }
        log::info!("renormalization complete (mass before scaling {z:.6e})");
    } else {
        log::warn!("unnormalized probability mass is 0; keeping fallback scores");
    }

    SubwordModel::new(pieces, special_count)
}

/// Normalize a merged model from per-cluster model and corpus
/// directories.
///
/// Clusters missing either their model or their corpus are skipped with
/// a warning; their statistics simply do not contribute.
///
/// ## Arguments
/// * `merged` - the merged model.
/// * `model_dir` - the directory of `cluster_<id>.model` artifacts.
/// * `corpus_dir` - the directory of `cluster_<id>.txt` corpora.
/// * `cluster_count` - the number of clusters.
///
/// ## Returns
/// The final normalized model.
pub fn normalize_from_dirs<P: AsRef<Path>, Q: AsRef<Path>>(
    merged: SubwordModel,
    model_dir: P,
    corpus_dir: Q,
    cluster_count: usize,
) -> CVResult<SubwordModel> {
    let mut accumulator = FrequencyAccumulator::default();

    for cid in 1..=cluster_count {
        let model_path = cluster_model_path(model_dir.as_ref(), cid);
        let corpus_path = corpus_dir.as_ref().join(format!("cluster_{cid}.txt"));

        if !model_path.exists() {
            log::warn!("cluster {cid}: model not found: {}", model_path.display());
            continue;
        }
        if !corpus_path.exists() {
            log::warn!("cluster {cid}: corpus not found: {}", corpus_path.display());
            continue;
        }

        log::info!("cluster {cid}: tokenizing {}", corpus_path.display());
        let model = SubwordModel::load_path(&model_path)?;
        accumulator.add_cluster_pass(&model, &corpus_path)?;
    }

    log::info!("found frequencies for {} unique tokens", accumulator.len());
    Ok(normalize_scores(merged, &accumulator))
}

/// The total probability mass of a model's non-special pieces.
pub fn probability_mass(model: &SubwordModel) -> f64 {
    model.regular_pieces().iter().map(|p| p.score.exp()).sum()
}
