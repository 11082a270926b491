//! # Subword Model Representation and IO
//!
//! A [`SubwordModel`] is the artifact produced by a subword trainer:
//! an ordered piece list with log-scores, prefixed by a fixed block of
//! special/reserved tokens that merge and normalization must never
//! re-score or remove.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
    errors::CVResult,
    types::CVHashMap,
};

/// The default number of reserved pieces at the head of a model
/// (unknown / begin / end markers).
pub const DEFAULT_SPECIAL_COUNT: usize = 3;

/// Log-score penalty applied to single-character fallback segments.
const UNKNOWN_CHAR_PENALTY: f64 = -100.0;

/// One vocabulary entry: a subword string and its log-score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPiece {
    /// The subword string.
    pub piece: String,

    /// The log-probability score of the piece.
    pub score: f64,
}

impl ModelPiece {
    /// Create a new piece.
    pub fn new<S: Into<String>>(
        piece: S,
        score: f64,
    ) -> Self {
        Self {
            piece: piece.into(),
            score,
        }
    }
}

/// An ordered subword vocabulary with unigram log-scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubwordModel {
    /// The ordered piece list, special prefix first.
    pub pieces: Vec<ModelPiece>,

    /// The number of reserved pieces at the head of `pieces`.
    pub special_count: usize,
}

impl SubwordModel {
    /// Create a model from a piece list.
    ///
    /// ## Arguments
    /// * `pieces` - the ordered piece list, special prefix first.
    /// * `special_count` - the size of the reserved prefix.
    pub fn new(
        pieces: Vec<ModelPiece>,
        special_count: usize,
    ) -> Self {
        Self {
            pieces,
            special_count,
        }
    }

    /// Build a model with the conventional `<unk>`, `<s>`, `</s>` prefix.
    ///
    /// ## Arguments
    /// * `regular` - the scored non-special pieces.
    pub fn with_default_specials(regular: Vec<ModelPiece>) -> Self {
        let mut pieces = vec![
            ModelPiece::new("<unk>", 0.0),
            ModelPiece::new("<s>", 0.0),
            ModelPiece::new("</s>", 0.0),
        ];
        pieces.extend(regular);
        Self::new(pieces, DEFAULT_SPECIAL_COUNT)
    }

    /// The total piece count.
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    /// True if the model has no pieces.
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// The reserved prefix pieces.
    pub fn specials(&self) -> &[ModelPiece] {
        &self.pieces[..self.special_count.min(self.pieces.len())]
    }

    /// The non-special pieces.
    pub fn regular_pieces(&self) -> &[ModelPiece] {
        &self.pieces[self.special_count.min(self.pieces.len())..]
    }

    /// Load a model from a serialized `.model` file.
    ///
    /// ## Arguments
    /// * `path` - the model file path.
    pub fn load_path<P: AsRef<Path>>(path: P) -> CVResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Save the model to a `.model` file.
    ///
    /// ## Arguments
    /// * `path` - the model file path.
    pub fn save_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> CVResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Write the parallel `.vocab` text file: one `token<TAB>score` line
    /// per piece, in model order.
    ///
    /// ## Arguments
    /// * `path` - the vocab file path.
    pub fn save_vocab_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> CVResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        for p in &self.pieces {
            writeln!(writer, "{}\t{}", p.piece, p.score)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Build a [`Segmenter`] over this model's scored pieces.
    pub fn segmenter(&self) -> Segmenter<'_> {
        Segmenter::new(self)
    }
}

/// Unigram Viterbi segmenter over a [`SubwordModel`].
///
/// Finds the maximum-log-score cover of each whitespace-delimited chunk
/// by vocabulary pieces. Positions no piece covers fall back to a single
/// penalized character, so segmentation always succeeds.
pub struct Segmenter<'m> {
    /// Piece string -> log-score.
    scores: CVHashMap<&'m str, f64>,

    /// The longest piece length, in chars.
    max_piece_chars: usize,
}

impl<'m> Segmenter<'m> {
    /// Build a segmenter from a model's non-special pieces.
    pub fn new(model: &'m SubwordModel) -> Self {
        let mut scores = CVHashMap::default();
        let mut max_piece_chars = 1;
        for p in model.regular_pieces() {
            let chars = p.piece.chars().count();
            if chars == 0 {
                continue;
            }
            max_piece_chars = max_piece_chars.max(chars);
            scores.insert(p.piece.as_str(), p.score);
        }
        Self {
            scores,
            max_piece_chars,
        }
    }

    /// Segment a line of text into subword tokens.
    ///
    /// Each whitespace-delimited chunk is segmented independently; the
    /// returned tokens are slices of the input line.
    ///
    /// ## Arguments
    /// * `line` - the input text.
    ///
    /// ## Returns
    /// The token sequence, in input order.
    pub fn segment<'t>(
        &self,
        line: &'t str,
    ) -> Vec<&'t str> {
        let mut tokens = Vec::new();
        for chunk in line.split_whitespace() {
            self.segment_chunk(chunk, &mut tokens);
        }
        tokens
    }

    /// Viterbi pass over one whitespace-free chunk.
    fn segment_chunk<'t>(
        &self,
        chunk: &'t str,
        out: &mut Vec<&'t str>,
    ) {
        // Char boundaries; boundaries[i] is the byte offset of char i.
        let mut boundaries: Vec<usize> = chunk.char_indices().map(|(i, _)| i).collect();
        boundaries.push(chunk.len());
        let n = boundaries.len() - 1;
        if n == 0 {
            return;
        }

        let mut best_score = vec![f64::NEG_INFINITY; n + 1];
        // best_from[end] is the char index the best token ending at `end` starts at.
        let mut best_from: Vec<Option<usize>> = vec![None; n + 1];
        best_score[0] = 0.0;

        for end in 1..=n {
            let min_start = end.saturating_sub(self.max_piece_chars);
            for start in min_start..end {
                if best_score[start] == f64::NEG_INFINITY {
                    continue;
                }
                let span = &chunk[boundaries[start]..boundaries[end]];
                if let Some(&score) = self.scores.get(span) {
                    let candidate = best_score[start] + score;
                    if candidate > best_score[end] {
                        best_score[end] = candidate;
                        best_from[end] = Some(start);
                    }
                }
            }

            // No piece ends here; emit the single char with a penalty.
            if best_from[end].is_none() && best_score[end - 1] > f64::NEG_INFINITY {
                best_score[end] = best_score[end - 1] + UNKNOWN_CHAR_PENALTY;
                best_from[end] = Some(end - 1);
            }
        }

        // Backtrack.
        let mut spans = Vec::new();
        let mut pos = n;
        while pos > 0 {
            let start = best_from[pos].unwrap_or(pos - 1);
            spans.push(&chunk[boundaries[start]..boundaries[pos]]);
            pos = start;
        }
        spans.reverse();
        out.extend(spans);
    }
}
