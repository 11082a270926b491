//! # Tokenizer Merger
//!
//! Unions per-cluster trained models into one model. The lowest-index
//! cluster's model is the base; duplicate token strings from later
//! models are dropped (first occurrence wins), so the base's metadata
//! for a shared token is authoritative.

use std::path::Path;

use crate::{
    errors::{CVResult, ClusterVocabError},
    model::SubwordModel,
    trainer::cluster_model_path,
    types::CVHashSet,
};

/// Merge models into the base, dropping duplicate token strings.
///
/// The base's full piece list (special prefix included) seeds the
/// output; each other model's novel pieces are appended in file order
/// with their scores copied unmodified. Scores are overwritten later by
/// normalization.
///
/// ## Arguments
/// * `base` - the designated base model.
/// * `others` - the remaining models, ascending cluster order.
///
/// ## Returns
/// The merged model.
pub fn merge_models(
    base: SubwordModel,
    others: &[SubwordModel],
) -> SubwordModel {
    let mut merged = base;
    let mut seen: CVHashSet<String> =
        merged.pieces.iter().map(|p| p.piece.clone()).collect();

    for model in others {
        for piece in &model.pieces {
            if seen.contains(&piece.piece) {
                continue;
            }
            seen.insert(piece.piece.clone());
            merged.pieces.push(piece.clone());
        }
    }
    merged
}

/// Merge `cluster_1.model ..= cluster_<count>.model` from a directory.
///
/// The base (cluster 1) model must exist; missing later models are
/// skipped with a warning.
///
/// ## Arguments
/// * `model_dir` - the directory of per-cluster model artifacts.
/// * `cluster_count` - the number of clusters.
///
/// ## Returns
/// The merged model, or [`ClusterVocabError::BaseModelMissing`].
pub fn merge_cluster_models<P: AsRef<Path>>(
    model_dir: P,
    cluster_count: usize,
) -> CVResult<SubwordModel> {
    let model_dir = model_dir.as_ref();

    let base_path = cluster_model_path(model_dir, 1);
    if !base_path.exists() {
        return Err(ClusterVocabError::BaseModelMissing { path: base_path });
    }
    let base = SubwordModel::load_path(&base_path)?;

    let mut others = Vec::new();
    for cid in 2..=cluster_count {
        let path = cluster_model_path(model_dir, cid);
        if !path.exists() {
            log::warn!("skipping missing model: {}", path.display());
            continue;
        }
        log::info!("adding pieces from {}", path.display());
        others.push(SubwordModel::load_path(&path)?);
    }

    let merged = merge_models(base, &others);
    log::info!("merged model has {} pieces", merged.len());
    Ok(merged)
}
