//! End-to-end pipeline scenarios over a stub in-process trainer.

use std::{
    collections::BTreeMap,
    io::Write,
    path::Path,
};

use clustervocab::{
    ClusterDefinition, DirVocabLoader, ModelPiece, SubwordModel, SubwordTrainer,
    TrainAllOptions, TrainerFailure, allocate_budgets, build_vectors, combine_corpora,
    merge_cluster_models, normalize::probability_mass, normalize_from_dirs, train_all,
};

/// A deterministic trainer: one piece per distinct whitespace token in
/// the corpus, scored by log relative frequency.
struct WhitespaceTrainer;

impl SubwordTrainer for WhitespaceTrainer {
    fn train(
        &self,
        corpus: &Path,
        _vocab_size: usize,
    ) -> Result<SubwordModel, TrainerFailure> {
        let text = std::fs::read_to_string(corpus)
            .map_err(|e| TrainerFailure::Fatal(e.to_string()))?;

        let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
        let mut total = 0u64;
        for token in text.split_whitespace() {
            *counts.entry(token).or_default() += 1;
            total += 1;
        }

        let pieces: Vec<ModelPiece> = counts
            .into_iter()
            .map(|(token, count)| {
                ModelPiece::new(token, (count as f64 / total as f64).ln())
            })
            .collect();
        Ok(SubwordModel::with_default_specials(pieces))
    }
}

fn write_vocab(
    dir: &Path,
    lang: &str,
    tokens: &[&str],
) {
    let mut f = std::fs::File::create(dir.join(format!("{lang}.vocab"))).unwrap();
    for t in tokens {
        writeln!(f, "{t}\t-1.0").unwrap();
    }
}

#[test]
fn test_singleton_cluster_allocation_is_floor_dominated() {
    // Three languages with vocabularies {a,b,c}, {b,c,d}, {d,e}; the
    // union vocab is {a,b,c,d,e}. With a 500 budget the proportional
    // shares (188, 188, 125) all sit below the floor, so the floor
    // determines every allocation.
    let dir = tempdir::TempDir::new("pipeline_test").unwrap();
    write_vocab(dir.path(), "hin", &["a", "b", "c"]);
    write_vocab(dir.path(), "tam", &["b", "c", "d"]);
    write_vocab(dir.path(), "mal", &["d", "e"]);

    let loader = DirVocabLoader::new(dir.path());
    let languages = loader.discover_languages().unwrap();
    let (union_vocab, _vectors) = build_vectors(&languages, &loader).unwrap();
    assert_eq!(union_vocab.len(), 5);

    let def = ClusterDefinition::parse_str("Cluster 1: hin\nCluster 2: tam\nCluster 3: mal\n");
    let allocation = allocate_budgets(&def, &loader, 500, 1000).unwrap();

    assert_eq!(
        allocation.raw_sizes.values().copied().collect::<Vec<_>>(),
        vec![3, 3, 2]
    );
    assert_eq!(allocation.scale, 62.5);
    assert_eq!(allocation.sizes(), vec![1000, 1000, 1000]);
}

#[test]
fn test_combine_train_merge_normalize() {
    let dir = tempdir::TempDir::new("pipeline_test").unwrap();
    let source = dir.path().join("corpora");
    let clustered = dir.path().join("clustered");
    let models = dir.path().join("models");
    std::fs::create_dir_all(&source).unwrap();

    std::fs::write(source.join("hin.txt"), "ka kha ka\nga ka\n").unwrap();
    std::fs::write(source.join("urd.txt"), "kha ga\n").unwrap();
    std::fs::write(source.join("tam.txt"), "pa ta ra\n").unwrap();

    let def = ClusterDefinition::parse_str("Cluster 1: hin, urd\nCluster 2: tam\n");

    // Combine.
    let written = combine_corpora(&def, &source, &clustered).unwrap();
    assert_eq!(written.len(), 2);

    // Train.
    let budgets: BTreeMap<usize, usize> = [(1, 4000), (2, 4000)].into_iter().collect();
    let report = train_all(
        &WhitespaceTrainer,
        &clustered,
        &budgets,
        &models,
        &TrainAllOptions::default(),
    )
    .unwrap();
    assert!(report.all_ok());

    // Merge: cluster 1 has {ka, kha, ga}, cluster 2 has {pa, ra, ta}.
    let merged = merge_cluster_models(&models, 2).unwrap();
    assert_eq!(merged.specials().len(), 3);
    let regular: Vec<&str> = merged
        .regular_pieces()
        .iter()
        .map(|p| p.piece.as_str())
        .collect();
    assert_eq!(regular, vec!["ga", "ka", "kha", "pa", "ra", "ta"]);

    // Normalize: probability mass over regular pieces sums to 1.
    let normalized = normalize_from_dirs(merged, &models, &clustered, 2).unwrap();
    assert!((probability_mass(&normalized) - 1.0).abs() < 1e-3);

    // "ka" dominates cluster 1's corpus; it outranks everything else.
    let best = normalized
        .regular_pieces()
        .iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .unwrap();
    assert_eq!(best.piece, "ka");
}

#[test]
fn test_two_model_merge_scenario() {
    // Models ["x","y"] and ["y","z"] merge to special prefix + ["x","y","z"].
    let dir = tempdir::TempDir::new("pipeline_test").unwrap();

    SubwordModel::with_default_specials(vec![
        ModelPiece::new("x", -1.0),
        ModelPiece::new("y", -1.0),
    ])
    .save_path(dir.path().join("cluster_1.model"))
    .unwrap();

    SubwordModel::with_default_specials(vec![
        ModelPiece::new("y", -2.0),
        ModelPiece::new("z", -2.0),
    ])
    .save_path(dir.path().join("cluster_2.model"))
    .unwrap();

    let merged = merge_cluster_models(dir.path(), 2).unwrap();
    assert_eq!(merged.regular_pieces().len(), 3);
    let regular: Vec<&str> = merged
        .regular_pieces()
        .iter()
        .map(|p| p.piece.as_str())
        .collect();
    assert_eq!(regular, vec!["x", "y", "z"]);
}
