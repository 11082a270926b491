//! # Vocabulary Vectorizer
//!
//! Loads per-language subword vocabularies and builds the shared binary
//! membership matrix (language x union-of-all-subwords) used as
//! clustering input.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use crate::{
    errors::{CVResult, ClusterVocabError},
    types::{CVHashMap, CVHashSet, LanguageId, MembershipVector},
};

/// Capability for loading one language's trained subword vocabulary.
pub trait VocabLoader {
    /// Load the vocabulary for a language.
    ///
    /// ## Arguments
    /// * `language` - the language identifier.
    ///
    /// ## Returns
    /// The ordered subword list, or
    /// [`ClusterVocabError::VocabNotFound`] if the backing file is absent.
    fn load_vocab(
        &self,
        language: &str,
    ) -> CVResult<Vec<String>>;

    /// Load a vocabulary, degrading a missing file to an empty
    /// vocabulary with a warning.
    ///
    /// Keeps unrelated clusters computable when one language's
    /// vocabulary artifact is absent.
    fn load_vocab_or_empty(
        &self,
        language: &str,
    ) -> CVResult<Vec<String>> {
        match self.load_vocab(language) {
            Ok(vocab) => Ok(vocab),
            Err(ClusterVocabError::VocabNotFound { language, path }) => {
                log::warn!("vocab file not found for \"{language}\": {}", path.display());
                Ok(Vec::new())
            }
            Err(err) => Err(err),
        }
    }
}

/// A [`VocabLoader`] over a directory of `<prefix><lang><ext>` text
/// files, one `token<TAB>score` line per token.
#[derive(Debug, Clone)]
pub struct DirVocabLoader {
    /// The directory containing the vocab files.
    dir: PathBuf,

    /// Filename prefix before the language identifier.
    prefix: String,

    /// Filename extension after the language identifier.
    ext: String,
}

impl DirVocabLoader {
    /// Create a loader with the default naming (`<lang>.vocab`).
    ///
    /// ## Arguments
    /// * `dir` - the vocab directory.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self::with_naming(dir, "", ".vocab")
    }

    /// Create a loader with explicit filename naming.
    ///
    /// ## Arguments
    /// * `dir` - the vocab directory.
    /// * `prefix` - filename prefix before the language identifier.
    /// * `ext` - filename extension after the language identifier.
    pub fn with_naming<P: AsRef<Path>>(
        dir: P,
        prefix: &str,
        ext: &str,
    ) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            prefix: prefix.to_string(),
            ext: ext.to_string(),
        }
    }

    /// The vocab file path for a language.
    pub fn vocab_path(
        &self,
        language: &str,
    ) -> PathBuf {
        self.dir.join(format!("{}{}{}", self.prefix, language, self.ext))
    }

    /// Discover the languages present in the directory by filename.
    ///
    /// ## Returns
    /// The language identifiers, sorted for determinism.
    pub fn discover_languages(&self) -> CVResult<Vec<LanguageId>> {
        let mut languages = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if let Some(stem) = name.strip_prefix(self.prefix.as_str())
                && let Some(lang) = stem.strip_suffix(self.ext.as_str())
                && !lang.is_empty()
            {
                languages.push(lang.to_string());
            }
        }
        languages.sort();
        Ok(languages)
    }
}

impl VocabLoader for DirVocabLoader {
    fn load_vocab(
        &self,
        language: &str,
    ) -> CVResult<Vec<String>> {
        let path = self.vocab_path(language);
        if !path.exists() {
            return Err(ClusterVocabError::VocabNotFound {
                language: language.to_string(),
                path,
            });
        }

        let reader = BufReader::new(File::open(&path)?);
        let mut vocab = Vec::new();
        for line in reader.lines() {
            let line = line?;
            // The score column is ignored here; only membership matters.
            let token = line.split('\t').next().unwrap_or("");
            if !token.is_empty() {
                vocab.push(token.to_string());
            }
        }
        Ok(vocab)
    }
}

/// Build the union vocabulary and per-language membership vectors.
///
/// The union vocabulary is sorted lexicographically so index assignment
/// is deterministic across runs and input iteration orders. Every
/// vector has exactly one entry per union dimension.
///
/// ## Arguments
/// * `languages` - the language identifiers to vectorize.
/// * `loader` - the vocabulary loader.
///
/// ## Returns
/// The sorted union vocabulary and the `language -> vector` map.
pub fn build_vectors<L: VocabLoader>(
    languages: &[LanguageId],
    loader: &L,
) -> CVResult<(Vec<String>, CVHashMap<LanguageId, MembershipVector>)> {
    let mut all_vocabs: CVHashMap<LanguageId, CVHashSet<String>> = CVHashMap::default();
    let mut union_set: CVHashSet<String> = CVHashSet::default();

    for lang in languages {
        let vocab = loader.load_vocab_or_empty(lang)?;
        union_set.extend(vocab.iter().cloned());
        all_vocabs.insert(lang.clone(), vocab.into_iter().collect());
    }

    let mut union_vocab: Vec<String> = union_set.into_iter().collect();
    union_vocab.sort();

    let index: CVHashMap<&str, usize> = union_vocab
        .iter()
        .enumerate()
        .map(|(i, sw)| (sw.as_str(), i))
        .collect();

    let mut vectors: CVHashMap<LanguageId, MembershipVector> = CVHashMap::default();
    for (lang, vocab) in &all_vocabs {
        let mut vec = vec![0u8; union_vocab.len()];
        for sw in vocab {
            vec[index[sw.as_str()]] = 1;
        }
        vectors.insert(lang.clone(), vec);
    }

    log::info!(
        "built membership vectors: {} languages, union vocab size {}",
        languages.len(),
        union_vocab.len()
    );

    Ok((union_vocab, vectors))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_vocab(
        dir: &Path,
        lang: &str,
        tokens: &[&str],
    ) {
        let mut f = File::create(dir.join(format!("{lang}.vocab"))).unwrap();
        for (i, t) in tokens.iter().enumerate() {
            writeln!(f, "{t}\t-{i}.0").unwrap();
        }
    }

    #[test]
    fn test_union_and_vectors() {
        tempdir::TempDir::new("vectorize_test")
            .and_then(|dir| {
                write_vocab(dir.path(), "hin", &["a", "b", "c"]);
                write_vocab(dir.path(), "tam", &["b", "c", "d"]);
                write_vocab(dir.path(), "mal", &["d", "e"]);

                let loader = DirVocabLoader::new(dir.path());
                let languages = loader.discover_languages().unwrap();
                assert_eq!(languages, vec!["hin", "mal", "tam"]);

                let (union_vocab, vectors) = build_vectors(&languages, &loader).unwrap();
                assert_eq!(union_vocab, vec!["a", "b", "c", "d", "e"]);

                assert_eq!(vectors["hin"], vec![1, 1, 1, 0, 0]);
                assert_eq!(vectors["tam"], vec![0, 1, 1, 1, 0]);
                assert_eq!(vectors["mal"], vec![0, 0, 0, 1, 1]);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_missing_vocab_degrades_to_empty() {
        tempdir::TempDir::new("vectorize_test")
            .and_then(|dir| {
                write_vocab(dir.path(), "hin", &["a"]);

                let loader = DirVocabLoader::new(dir.path());
                let languages = vec!["hin".to_string(), "xxx".to_string()];

                let (union_vocab, vectors) = build_vectors(&languages, &loader).unwrap();
                assert_eq!(union_vocab, vec!["a"]);
                assert_eq!(vectors["xxx"], vec![0]);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_missing_vocab_is_reported() {
        tempdir::TempDir::new("vectorize_test")
            .and_then(|dir| {
                let loader = DirVocabLoader::new(dir.path());
                match loader.load_vocab("xxx") {
                    Err(ClusterVocabError::VocabNotFound { language, .. }) => {
                        assert_eq!(language, "xxx");
                    }
                    other => panic!("expected VocabNotFound, got {other:?}"),
                }
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_union_is_iteration_order_independent() {
        tempdir::TempDir::new("vectorize_test")
            .and_then(|dir| {
                write_vocab(dir.path(), "hin", &["b", "a"]);
                write_vocab(dir.path(), "tam", &["c"]);

                let loader = DirVocabLoader::new(dir.path());
                let forward = vec!["hin".to_string(), "tam".to_string()];
                let reverse = vec!["tam".to_string(), "hin".to_string()];

                let (union_a, _) = build_vectors(&forward, &loader).unwrap();
                let (union_b, _) = build_vectors(&reverse, &loader).unwrap();
                assert_eq!(union_a, union_b);
                assert_eq!(union_a, vec!["a", "b", "c"]);
                Ok(())
            })
            .unwrap();
    }
}
