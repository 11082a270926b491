//! # Corpus Combiner
//!
//! Concatenates per-language corpus files into one `cluster_<id>.txt`
//! per cluster. Pure file plumbing, but a required precondition for
//! per-cluster training.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::{clusterdef::ClusterDefinition, errors::CVResult};

/// Concatenate member-language corpora into per-cluster corpus files.
///
/// Each cluster produces `dest_dir/cluster_<id>.txt` holding the
/// byte-for-byte concatenation of its members' `<lang>.txt` files, in
/// member order. A missing language corpus is skipped with a warning.
///
/// ## Arguments
/// * `def` - the cluster definition.
/// * `source_dir` - the directory of `<lang>.txt` corpora.
/// * `dest_dir` - the output directory (created if absent).
///
/// ## Returns
/// The paths of the cluster corpus files written.
pub fn combine_corpora<P: AsRef<Path>, Q: AsRef<Path>>(
    def: &ClusterDefinition,
    source_dir: P,
    dest_dir: Q,
) -> CVResult<Vec<PathBuf>> {
    let source_dir = source_dir.as_ref();
    let dest_dir = dest_dir.as_ref();
    std::fs::create_dir_all(dest_dir)?;

    let mut written = Vec::new();
    for (cid, langs) in def.iter() {
        let out_path = dest_dir.join(format!("cluster_{cid}.txt"));
        let mut writer = BufWriter::new(File::create(&out_path)?);

        for lang in langs {
            let in_path = source_dir.join(format!("{lang}.txt"));
            if !in_path.exists() {
                log::warn!("corpus missing, skipped: {}", in_path.display());
                continue;
            }
            let mut reader = File::open(&in_path)?;
            std::io::copy(&mut reader, &mut writer)?;
        }
        writer.flush()?;

        log::info!(
            "wrote {} (cluster {cid}: {})",
            out_path.display(),
            langs.join(", ")
        );
        written.push(out_path);
    }
    Ok(written)
}
