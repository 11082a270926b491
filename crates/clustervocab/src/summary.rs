//! # Vocab Configuration Summary
//!
//! The advisory record emitted by an end-to-end run: resolved cluster
//! membership, allocated per-cluster sizes, the requested budget, and
//! the cluster count. Not consumed downstream.

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
    allocate::BudgetAllocation,
    clusterdef::ClusterDefinition,
    errors::CVResult,
    types::{ClusterId, LanguageId},
};

/// The structured summary of one end-to-end run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabConfigSummary {
    /// Resolved cluster membership.
    pub clusters: BTreeMap<ClusterId, Vec<LanguageId>>,

    /// Allocated vocab size per cluster.
    pub allocated_sizes: BTreeMap<ClusterId, usize>,

    /// The requested total budget.
    pub total_budget: usize,

    /// The number of clusters.
    pub cluster_count: usize,
}

impl VocabConfigSummary {
    /// Build a summary from a definition and its allocation.
    pub fn new(
        def: &ClusterDefinition,
        allocation: &BudgetAllocation,
    ) -> Self {
        Self {
            clusters: def
                .iter()
                .map(|(cid, langs)| (cid, langs.to_vec()))
                .collect(),
            allocated_sizes: allocation.budgets.clone(),
            total_budget: allocation.total_budget,
            cluster_count: def.len(),
        }
    }

    /// Write the summary as pretty JSON.
    ///
    /// ## Arguments
    /// * `path` - the output file path.
    pub fn save_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> CVResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}
