//! # Cluster-Definition Text Format
//!
//! One line per cluster: `Cluster <id>: lang1, lang2, ...`. The leading
//! label is case-insensitive; whitespace around the colon and commas is
//! tolerated; blank or non-matching lines are skipped silently.

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
    sync::LazyLock,
};

use regex::Regex;

use crate::{
    errors::CVResult,
    types::{ClusterId, LanguageId},
};

static CLUSTER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Cluster\s+(\d+)\s*:\s*(.+)$").unwrap());

/// A partition of languages into clusters.
///
/// Cluster ids are small positive integers, 1-indexed; language order
/// within a cluster is preserved from the source for reproducible
/// output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterDefinition {
    clusters: BTreeMap<ClusterId, Vec<LanguageId>>,
}

impl ClusterDefinition {
    /// Build a definition from a 0-based clustering assignment.
    ///
    /// Output ids are 1-indexed and contiguous; member order follows
    /// `languages` order.
    ///
    /// ## Arguments
    /// * `languages` - the language identifiers, in vector order.
    /// * `assignment` - for each language, its 0-based cluster index.
    pub fn from_assignment(
        languages: &[LanguageId],
        assignment: &[usize],
    ) -> Self {
        let mut clusters: BTreeMap<ClusterId, Vec<LanguageId>> = BTreeMap::new();
        let k = assignment.iter().copied().max().map_or(0, |m| m + 1);
        for group in 0..k {
            let members: Vec<LanguageId> = languages
                .iter()
                .zip(assignment)
                .filter(|&(_, &c)| c == group)
                .map(|(lang, _)| lang.clone())
                .collect();
            clusters.insert(group + 1, members);
        }
        Self { clusters }
    }

    /// Parse a definition from text.
    pub fn parse_str(text: &str) -> Self {
        let mut clusters = BTreeMap::new();
        for line in text.lines() {
            let Some(caps) = CLUSTER_LINE.captures(line.trim()) else {
                continue;
            };
            let Ok(cid) = caps[1].parse::<ClusterId>() else {
                continue;
            };
            let langs: Vec<LanguageId> = caps[2]
                .split(',')
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect();
            clusters.insert(cid, langs);
        }
        Self { clusters }
    }

    /// Load a definition from a file.
    ///
    /// ## Arguments
    /// * `path` - the cluster-definition file path.
    pub fn load_path<P: AsRef<Path>>(path: P) -> CVResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        let mut text = String::new();
        for line in reader.lines() {
            text.push_str(&line?);
            text.push('\n');
        }
        Ok(Self::parse_str(&text))
    }

    /// Write the canonical text form to a writer.
    ///
    /// ## Arguments
    /// * `writer` - the output sink.
    pub fn write<W: Write>(
        &self,
        writer: &mut W,
    ) -> CVResult<()> {
        for (cid, langs) in &self.clusters {
            writeln!(writer, "Cluster {}: {}", cid, langs.join(", "))?;
        }
        Ok(())
    }

    /// Save the canonical text form to a file.
    ///
    /// ## Arguments
    /// * `path` - the output file path.
    pub fn save_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> CVResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// The number of clusters.
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// True if the definition has no clusters.
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// The cluster ids, ascending.
    pub fn cluster_ids(&self) -> impl Iterator<Item = ClusterId> + '_ {
        self.clusters.keys().copied()
    }

    /// The member languages of a cluster.
    pub fn languages(
        &self,
        cluster: ClusterId,
    ) -> Option<&[LanguageId]> {
        self.clusters.get(&cluster).map(Vec::as_slice)
    }

    /// Iterate `(cluster id, members)` in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (ClusterId, &[LanguageId])> {
        self.clusters.iter().map(|(&cid, langs)| (cid, langs.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical() {
        let def = ClusterDefinition::parse_str("Cluster 1: hin, urd\nCluster 2: tam\n");
        assert_eq!(def.len(), 2);
        assert_eq!(
            def.languages(1).unwrap(),
            &["hin".to_string(), "urd".to_string()]
        );
        assert_eq!(def.languages(2).unwrap(), &["tam".to_string()]);
    }

    #[test]
    fn test_parse_tolerates_case_and_whitespace() {
        let def = ClusterDefinition::parse_str("  cluster 3 :  hin ,  urd  \n");
        assert_eq!(def.languages(3).unwrap(), &["hin".to_string(), "urd".to_string()]);
    }

    #[test]
    fn test_parse_skips_nonmatching_lines() {
        let def = ClusterDefinition::parse_str("# comment\n\nCluster 1: hin\nnot a cluster\n");
        assert_eq!(def.len(), 1);
    }

    #[test]
    fn test_write_roundtrip() {
        let def = ClusterDefinition::parse_str("Cluster 1: hin, urd\nCluster 2: tam\n");
        let mut buf = Vec::new();
        def.write(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "Cluster 1: hin, urd\nCluster 2: tam\n");
        assert_eq!(ClusterDefinition::parse_str(&text), def);
    }

    #[test]
    fn test_from_assignment_is_one_indexed() {
        let languages = vec!["hin".to_string(), "tam".to_string(), "mal".to_string()];
        let def = ClusterDefinition::from_assignment(&languages, &[1, 0, 1]);
        assert_eq!(def.cluster_ids().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(def.languages(1).unwrap(), &["tam".to_string()]);
        assert_eq!(
            def.languages(2).unwrap(),
            &["hin".to_string(), "mal".to_string()]
        );
    }
}
