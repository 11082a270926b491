//! # Language Clusterer
//!
//! Partitions languages into k groups over their binary
//! vocabulary-membership vectors. The clustering backend is a
//! capability trait; built-in k-medoids (cosine) and k-means
//! (Euclidean) backends are provided, both deterministically seeded.

use std::path::{Path, PathBuf};

use rand::{SeedableRng, rngs::StdRng, seq::index::sample};

use crate::{
    clusterdef::ClusterDefinition,
    errors::{CVResult, ClusterVocabError},
    types::{CVHashMap, LanguageId, MembershipVector},
};

/// Capability for partitioning fixed-dimension binary vectors into k
/// groups.
pub trait VectorClustering {
    /// A short metric label used in output filenames (`cosine`, `l2`).
    fn metric_label(&self) -> &'static str;

    /// Partition `vectors` into `k` groups.
    ///
    /// ## Arguments
    /// * `vectors` - one membership vector per language, equal lengths.
    /// * `k` - the number of groups.
    ///
    /// ## Returns
    /// A 0-based group index per vector, or a descriptive
    /// [`ClusterVocabError::Clustering`] (e.g. `k` exceeds the number
    /// of vectors).
    fn cluster(
        &self,
        vectors: &[MembershipVector],
        k: usize,
    ) -> CVResult<Vec<usize>>;
}

fn check_k(
    vectors: &[MembershipVector],
    k: usize,
    metric: &str,
) -> CVResult<()> {
    if k == 0 || k > vectors.len() {
        return Err(ClusterVocabError::Clustering {
            k,
            metric: metric.to_string(),
            reason: format!("k must be in 1..={} (got {k})", vectors.len()),
        });
    }
    Ok(())
}

/// Cosine distance between two binary vectors.
///
/// A zero vector is at distance 1 from everything except another zero
/// vector.
fn cosine_distance(
    a: &[u8],
    b: &[u8],
) -> f64 {
    let mut dot = 0u64;
    let mut na = 0u64;
    let mut nb = 0u64;
    for (&x, &y) in a.iter().zip(b) {
        dot += u64::from(x & y);
        na += u64::from(x);
        nb += u64::from(y);
    }
    if na == 0 && nb == 0 {
        return 0.0;
    }
    if na == 0 || nb == 0 {
        return 1.0;
    }
    1.0 - (dot as f64) / ((na * nb) as f64).sqrt()
}

/// Squared Euclidean distance from a binary vector to an f64 centroid.
fn sq_euclidean_distance(
    a: &[u8],
    centroid: &[f64],
) -> f64 {
    a.iter()
        .zip(centroid)
        .map(|(&x, &c)| {
            let d = f64::from(x) - c;
            d * d
        })
        .sum()
}

/// K-medoids clustering under cosine distance.
///
/// Alternates nearest-medoid assignment with per-group medoid update
/// (the member minimizing total intra-group distance) until stable.
#[derive(Debug, Clone)]
pub struct CosineKMedoids {
    /// Seed for medoid initialization.
    pub seed: u64,

    /// Iteration cap.
    pub max_iter: usize,
}

impl Default for CosineKMedoids {
    fn default() -> Self {
        Self {
            seed: 42,
            max_iter: 100,
        }
    }
}

impl VectorClustering for CosineKMedoids {
    fn metric_label(&self) -> &'static str {
        "cosine"
    }

    fn cluster(
        &self,
        vectors: &[MembershipVector],
        k: usize,
    ) -> CVResult<Vec<usize>> {
        check_k(vectors, k, self.metric_label())?;
        let n = vectors.len();

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut medoids: Vec<usize> = sample(&mut rng, n, k).into_vec();
        medoids.sort_unstable();

        let mut assignment = vec![0usize; n];
        for _ in 0..self.max_iter {
            // Assignment step.
            for (i, v) in vectors.iter().enumerate() {
                let (best, _) = medoids
                    .iter()
                    .enumerate()
                    .map(|(g, &m)| (g, cosine_distance(v, &vectors[m])))
                    .min_by(|a, b| a.1.total_cmp(&b.1))
                    .unwrap();
                assignment[i] = best;
            }

            // Medoid update step.
            let mut changed = false;
            for g in 0..k {
                let members: Vec<usize> =
                    (0..n).filter(|&i| assignment[i] == g).collect();
                let Some(&best) = members.iter().min_by(|&&a, &&b| {
                    let cost = |m: usize| -> f64 {
                        members
                            .iter()
                            .map(|&i| cosine_distance(&vectors[m], &vectors[i]))
                            .sum()
                    };
                    cost(a).total_cmp(&cost(b))
                }) else {
                    continue;
                };
                if medoids[g] != best {
                    medoids[g] = best;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        Ok(assignment)
    }
}

/// Lloyd's k-means clustering under squared Euclidean distance.
#[derive(Debug, Clone)]
pub struct EuclideanKMeans {
    /// Seed for centroid initialization.
    pub seed: u64,

    /// Iteration cap.
    pub max_iter: usize,
}

impl Default for EuclideanKMeans {
    fn default() -> Self {
        Self {
            seed: 42,
            max_iter: 100,
        }
    }
}

impl VectorClustering for EuclideanKMeans {
    fn metric_label(&self) -> &'static str {
        "l2"
    }

    fn cluster(
        &self,
        vectors: &[MembershipVector],
        k: usize,
    ) -> CVResult<Vec<usize>> {
        check_k(vectors, k, self.metric_label())?;
        let n = vectors.len();

        let mut rng = StdRng::seed_from_u64(self.seed);
        let seeds = sample(&mut rng, n, k).into_vec();
        let mut centroids: Vec<Vec<f64>> = seeds
            .iter()
            .map(|&i| vectors[i].iter().map(|&x| f64::from(x)).collect())
            .collect();

        let mut assignment = vec![0usize; n];
        for _ in 0..self.max_iter {
            // Assignment step.
            let mut changed = false;
            for (i, v) in vectors.iter().enumerate() {
                let (best, _) = centroids
                    .iter()
                    .enumerate()
                    .map(|(g, c)| (g, sq_euclidean_distance(v, c)))
                    .min_by(|a, b| a.1.total_cmp(&b.1))
                    .unwrap();
                if assignment[i] != best {
                    assignment[i] = best;
                    changed = true;
                }
            }

            // Re-seed any emptied group with its seed point so every
            // group index stays populated.
            for g in 0..k {
                if !assignment.contains(&g) {
                    assignment[seeds[g]] = g;
                    changed = true;
                }
            }

            if !changed {
                break;
            }

            // Update step.
            for (g, centroid) in centroids.iter_mut().enumerate() {
                let members: Vec<usize> =
                    (0..n).filter(|&i| assignment[i] == g).collect();
                if members.is_empty() {
                    continue;
                }
                for (d, slot) in centroid.iter_mut().enumerate() {
                    let sum: f64 = members
                        .iter()
                        .map(|&i| f64::from(vectors[i][d]))
                        .sum();
                    *slot = sum / members.len() as f64;
                }
            }
        }

        Ok(assignment)
    }
}

/// Options for a `(k, metric)` clustering sweep.
#[derive(Debug, Clone)]
pub struct ClusterSweepOptions {
    /// The inclusive minimum k.
    pub min_k: usize,

    /// The inclusive maximum k.
    pub max_k: usize,

    /// Seed for the clustering backends.
    pub seed: u64,
}

impl Default for ClusterSweepOptions {
    fn default() -> Self {
        Self {
            min_k: 2,
            max_k: 9,
            seed: 42,
        }
    }
}

/// Run a clustering sweep over the k range, for cosine k-medoids and
/// Euclidean k-means, persisting one cluster-definition file per
/// `(metric, k)` combination.
///
/// A failed combination (e.g. `k` > language count) is logged and
/// skipped; it does not abort the rest of the sweep.
///
/// ## Arguments
/// * `languages` - the language identifiers, defining vector order.
/// * `vectors` - the `language -> membership vector` map.
/// * `options` - the sweep range and seed.
/// * `out_dir` - the directory for `language_clusters_<metric>_<k>.txt`
///   files.
///
/// ## Returns
/// The paths of the definition files written.
pub fn sweep_clusterings<P: AsRef<Path>>(
    languages: &[LanguageId],
    vectors: &CVHashMap<LanguageId, MembershipVector>,
    options: &ClusterSweepOptions,
    out_dir: P,
) -> CVResult<Vec<PathBuf>> {
    let out_dir = out_dir.as_ref();
    std::fs::create_dir_all(out_dir)?;

    let matrix: Vec<MembershipVector> = languages
        .iter()
        .map(|lang| vectors.get(lang).cloned().unwrap_or_default())
        .collect();

    let backends: Vec<Box<dyn VectorClustering>> = vec![
        Box::new(CosineKMedoids {
            seed: options.seed,
            ..Default::default()
        }),
        Box::new(EuclideanKMeans {
            seed: options.seed,
            ..Default::default()
        }),
    ];

    let mut written = Vec::new();
    for k in options.min_k..=options.max_k {
        for backend in &backends {
            let label = backend.metric_label();
            let assignment = match backend.cluster(&matrix, k) {
                Ok(assignment) => assignment,
                Err(err) => {
                    log::error!("skipping clustering combination: {err}");
                    continue;
                }
            };

            let def = ClusterDefinition::from_assignment(languages, &assignment);
            let path = out_dir.join(format!("language_clusters_{label}_{k}.txt"));
            def.save_path(&path)?;
            log::info!("wrote {} ({} clusters)", path.display(), def.len());
            written.push(path);
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment_groups(assignment: &[usize]) -> Vec<Vec<usize>> {
        let k = assignment.iter().max().unwrap() + 1;
        (0..k)
            .map(|g| {
                (0..assignment.len())
                    .filter(|&i| assignment[i] == g)
                    .collect()
            })
            .collect()
    }

    fn overlap_vectors() -> Vec<MembershipVector> {
        // Two obvious groups: the first three share subwords, the last
        // two share subwords, no overlap across groups.
        vec![
            vec![1, 1, 1, 0, 0, 0],
            vec![1, 1, 0, 0, 0, 0],
            vec![0, 1, 1, 0, 0, 0],
            vec![0, 0, 0, 1, 1, 0],
            vec![0, 0, 0, 1, 1, 1],
        ]
    }

    #[test]
    fn test_cosine_distance() {
        assert_eq!(cosine_distance(&[1, 1], &[1, 1]), 0.0);
        assert_eq!(cosine_distance(&[1, 0], &[0, 1]), 1.0);
        assert_eq!(cosine_distance(&[0, 0], &[0, 0]), 0.0);
        assert_eq!(cosine_distance(&[0, 0], &[1, 0]), 1.0);
    }

    #[test]
    fn test_kmedoids_separates_groups() {
        let vectors = overlap_vectors();
        let assignment = CosineKMedoids::default().cluster(&vectors, 2).unwrap();

        assert_eq!(assignment[0], assignment[1]);
        assert_eq!(assignment[0], assignment[2]);
        assert_eq!(assignment[3], assignment[4]);
        assert_ne!(assignment[0], assignment[3]);
    }

    #[test]
    fn test_kmeans_separates_groups() {
        let vectors = overlap_vectors();
        let assignment = EuclideanKMeans::default().cluster(&vectors, 2).unwrap();

        assert_eq!(assignment[0], assignment[1]);
        assert_eq!(assignment[0], assignment[2]);
        assert_eq!(assignment[3], assignment[4]);
        assert_ne!(assignment[0], assignment[3]);
    }

    #[test]
    fn test_k_larger_than_inputs_fails_fast() {
        let vectors = overlap_vectors();
        let err = CosineKMedoids::default().cluster(&vectors, 9).unwrap_err();
        match err {
            ClusterVocabError::Clustering { k, .. } => assert_eq!(k, 9),
            other => panic!("expected Clustering error, got {other:?}"),
        }
    }

    #[test]
    fn test_every_group_is_populated() {
        let vectors = overlap_vectors();
        for k in 1..=vectors.len() {
            for backend in [
                &CosineKMedoids::default() as &dyn VectorClustering,
                &EuclideanKMeans::default(),
            ] {
                let assignment = backend.cluster(&vectors, k).unwrap();
                let groups = assignment_groups(&assignment);
                assert_eq!(groups.len(), k, "metric {}", backend.metric_label());
                assert!(groups.iter().all(|g| !g.is_empty()));
            }
        }
    }

    #[test]
    fn test_clustering_is_deterministic() {
        let vectors = overlap_vectors();
        let a = CosineKMedoids::default().cluster(&vectors, 3).unwrap();
        let b = CosineKMedoids::default().cluster(&vectors, 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sweep_writes_files_and_skips_bad_k() {
        let languages: Vec<String> = ["hin", "urd", "tam", "mal", "tel"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let matrix = overlap_vectors();
        let vectors: CVHashMap<String, MembershipVector> = languages
            .iter()
            .cloned()
            .zip(matrix.iter().cloned())
            .collect();

        tempdir::TempDir::new("sweep_test")
            .and_then(|dir| {
                let options = ClusterSweepOptions {
                    min_k: 2,
                    // Beyond the language count; those combinations are skipped.
                    max_k: 6,
                    seed: 7,
                };
                let written =
                    sweep_clusterings(&languages, &vectors, &options, dir.path()).unwrap();

                // k in 2..=5 succeed for both metrics; k=6 is skipped.
                assert_eq!(written.len(), 8);
                assert!(dir.path().join("language_clusters_cosine_2.txt").exists());
                assert!(dir.path().join("language_clusters_l2_5.txt").exists());
                assert!(!dir.path().join("language_clusters_l2_6.txt").exists());
                Ok(())
            })
            .unwrap();
    }
}
