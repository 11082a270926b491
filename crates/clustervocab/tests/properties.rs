//! Property tests for union-vocabulary determinism and budget
//! allocation invariants.

use std::path::PathBuf;

use clustervocab::{
    CVHashMap, CVHashSet, ClusterDefinition, ClusterVocabError, VocabLoader,
    allocate_budgets, build_vectors,
};
use proptest::prelude::*;

/// An in-memory vocabulary loader.
#[derive(Debug, Clone)]
struct MapLoader(CVHashMap<String, Vec<String>>);

impl VocabLoader for MapLoader {
    fn load_vocab(
        &self,
        language: &str,
    ) -> clustervocab::CVResult<Vec<String>> {
        self.0
            .get(language)
            .cloned()
            .ok_or_else(|| ClusterVocabError::VocabNotFound {
                language: language.to_string(),
                path: PathBuf::from(language),
            })
    }
}

fn vocab_sets() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(
        prop::collection::vec("[a-f]{1,3}", 0..12),
        1..6,
    )
}

proptest! {
    #[test]
    fn union_vocab_matches_true_set_union(vocabs in vocab_sets()) {
        let languages: Vec<String> =
            (0..vocabs.len()).map(|i| format!("lang{i}")).collect();
        let loader = MapLoader(
            languages.iter().cloned().zip(vocabs.iter().cloned()).collect(),
        );

        let (union_vocab, vectors) = build_vectors(&languages, &loader).unwrap();

        let expected: CVHashSet<String> =
            vocabs.iter().flatten().cloned().collect();
        prop_assert_eq!(union_vocab.len(), expected.len());

        // Sorted, hence deterministic for any input iteration order.
        let mut sorted = union_vocab.clone();
        sorted.sort();
        prop_assert_eq!(&union_vocab, &sorted);

        // Every vector spans exactly the union dimensions.
        for lang in &languages {
            prop_assert_eq!(vectors[lang].len(), union_vocab.len());
        }

        // Reversed language order yields the identical union.
        let mut reversed = languages.clone();
        reversed.reverse();
        let (union_rev, _) = build_vectors(&reversed, &loader).unwrap();
        prop_assert_eq!(union_vocab, union_rev);
    }

    #[test]
    fn allocation_respects_floor_and_arity(
        vocabs in vocab_sets(),
        total_budget in 1usize..1_000_000,
        floor in 1usize..5_000,
    ) {
        let languages: Vec<String> =
            (0..vocabs.len()).map(|i| format!("lang{i}")).collect();
        let loader = MapLoader(
            languages.iter().cloned().zip(vocabs.iter().cloned()).collect(),
        );

        let def_text: String = languages
            .iter()
            .enumerate()
            .map(|(i, lang)| format!("Cluster {}: {}\n", i + 1, lang))
            .collect();
        let def = ClusterDefinition::parse_str(&def_text);

        match allocate_budgets(&def, &loader, total_budget, floor) {
            Ok(allocation) => {
                prop_assert_eq!(allocation.budgets.len(), def.len());
                prop_assert!(allocation.budgets.values().all(|&b| b >= floor));

                // Proportionality within rounding, wherever the floor
                // did not dominate.
                for (cid, &raw) in &allocation.raw_sizes {
                    let share = raw as f64 * allocation.scale;
                    if share.round() as usize >= floor {
                        prop_assert_eq!(
                            allocation.budgets[cid],
                            share.round() as usize
                        );
                    }
                }
            }
            Err(ClusterVocabError::ZeroVocabulary { .. }) => {
                // Only legal when every vocabulary was empty.
                prop_assert!(vocabs.iter().all(Vec::is_empty));
            }
            Err(err) => panic!("unexpected allocation error: {err}"),
        }
    }
}
