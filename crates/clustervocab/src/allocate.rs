//! # Vocab Budget Allocator
//!
//! Splits a total vocabulary budget across clusters proportionally to
//! each cluster's union-vocabulary size, with a per-cluster floor.

use std::collections::BTreeMap;

use crate::{
    clusterdef::ClusterDefinition,
    errors::{CVResult, ClusterVocabError},
    types::{CVHashSet, ClusterId},
    vectorize::VocabLoader,
};

/// The minimum vocabulary size guaranteed to any cluster, regardless of
/// its proportional share.
pub const DEFAULT_VOCAB_FLOOR: usize = 1000;

/// The result of a budget allocation over one cluster definition.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetAllocation {
    /// Allocated vocab size per cluster, keyed by ascending cluster id.
    pub budgets: BTreeMap<ClusterId, usize>,

    /// Union-vocabulary size per cluster, before scaling.
    pub raw_sizes: BTreeMap<ClusterId, usize>,

    /// The applied scaling factor (`total_budget / sum(raw_sizes)`).
    pub scale: f64,

    /// The requested total budget.
    pub total_budget: usize,
}

impl BudgetAllocation {
    /// The sum of allocated sizes.
    ///
    /// The floor means this may exceed or fall short of the requested
    /// total; it is reported, not corrected.
    pub fn allocated_total(&self) -> usize {
        self.budgets.values().sum()
    }

    /// The allocated sizes in ascending cluster-id order.
    pub fn sizes(&self) -> Vec<usize> {
        self.budgets.values().copied().collect()
    }
}

/// Allocate per-cluster vocabulary budgets.
///
/// For each cluster, the union (not sum) of its member languages'
/// vocabularies determines its raw size; raw sizes are scaled to the
/// total budget and clamped below by `floor`.
///
/// ## Arguments
/// * `def` - the cluster definition.
/// * `loader` - the per-language vocabulary loader; missing
///   vocabularies degrade to empty with a warning.
/// * `total_budget` - the requested total vocabulary size.
/// * `floor` - the per-cluster minimum ([`DEFAULT_VOCAB_FLOOR`]).
///
/// ## Returns
/// The allocation, or [`ClusterVocabError::ZeroVocabulary`] when no
/// cluster contributes any vocabulary to scale from.
pub fn allocate_budgets<L: VocabLoader>(
    def: &ClusterDefinition,
    loader: &L,
    total_budget: usize,
    floor: usize,
) -> CVResult<BudgetAllocation> {
    let mut raw_sizes: BTreeMap<ClusterId, usize> = BTreeMap::new();

    for (cid, langs) in def.iter() {
        let mut union_vocab: CVHashSet<String> = CVHashSet::default();
        for lang in langs {
            union_vocab.extend(loader.load_vocab_or_empty(lang)?);
        }
        log::info!(
            "cluster {cid}: {} languages, union vocab size {}",
            langs.len(),
            union_vocab.len()
        );
        raw_sizes.insert(cid, union_vocab.len());
    }

    let raw_total: usize = raw_sizes.values().sum();
    if raw_total == 0 {
        return Err(ClusterVocabError::ZeroVocabulary {
            clusters: def.len(),
        });
    }

    let scale = total_budget as f64 / raw_total as f64;
    let budgets: BTreeMap<ClusterId, usize> = raw_sizes
        .iter()
        .map(|(&cid, &raw)| (cid, floor.max((raw as f64 * scale).round() as usize)))
        .collect();

    let allocation = BudgetAllocation {
        budgets,
        raw_sizes,
        scale,
        total_budget,
    };

    log::info!(
        "scaling factor {:.3}; allocated sizes {:?} (total {}, requested {})",
        allocation.scale,
        allocation.sizes(),
        allocation.allocated_total(),
        total_budget
    );

    Ok(allocation)
}
