//! Fixed-size character window chunking.
//!
//! Text is cut into windows of `chunk_size` characters whose start advances by
//! `chunk_size - chunk_overlap`. Each window is trimmed and dropped if nothing
//! remains. Iteration stops after the first window that reaches the end of the
//! text, so a trailing fragment already contained in the previous window is
//! never emitted on its own.
//!
//! Sizes count Unicode scalar values, not bytes, so windows never split a
//! multi-byte character.

use crate::types::{AppError, Result};
use std::iter::FusedIterator;

/// Overlapping fixed-size text chunker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    /// Create a chunker.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidInput`] if `chunk_size` is zero or
    /// `chunk_overlap >= chunk_size` (the window would never advance).
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(AppError::InvalidInput(
                "chunk_size must be greater than 0".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(AppError::InvalidInput(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    /// Non-overlapping chunker.
    pub fn fixed(chunk_size: usize) -> Result<Self> {
        Self::new(chunk_size, 0)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Distance the window start advances per step.
    pub fn step(&self) -> usize {
        self.chunk_size - self.chunk_overlap
    }

    /// Lazily iterate over the chunks of `text`.
    pub fn chunks<'a>(&self, text: &'a str) -> Chunks<'a> {
        let boundaries = text
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(text.len()))
            .collect();

        Chunks {
            text,
            boundaries,
            cursor: 0,
            chunk_size: self.chunk_size,
            step: self.step(),
            finished: false,
        }
    }

    /// Split `text` into owned chunks.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        self.chunks(text).map(str::to_string).collect()
    }
}

/// Iterator over the trimmed, non-empty windows of a text.
///
/// Created by [`TextChunker::chunks`].
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    text: &'a str,
    /// Byte offset of every char, plus `text.len()` as the final entry.
    boundaries: Vec<usize>,
    /// Window start, in chars.
    cursor: usize,
    chunk_size: usize,
    step: usize,
    finished: bool,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let char_count = self.boundaries.len() - 1;

        while !self.finished && self.cursor < char_count {
            let start = self.cursor;
            let end = (start + self.chunk_size).min(char_count);

            if end >= char_count {
                self.finished = true;
            } else {
                self.cursor += self.step;
            }

            let window = &self.text[self.boundaries[start]..self.boundaries[end]];
            let trimmed = window.trim();
            if !trimmed.is_empty() {
                return Some(trimmed);
            }
        }

        None
    }
}

impl FusedIterator for Chunks<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_overlapping_windows() {
        let chunker = TextChunker::new(4, 1).unwrap();
        assert_eq!(chunker.chunk("abcdefghij"), vec!["abcd", "defg", "ghij"]);
    }

    #[test]
    fn test_fixed_windows() {
        let chunker = TextChunker::fixed(3).unwrap();
        assert_eq!(chunker.chunk("abcdefgh"), vec!["abc", "def", "gh"]);
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunker = TextChunker::new(500, 100).unwrap();
        assert_eq!(chunker.chunk("  Short text \n"), vec!["Short text"]);
    }

    #[test]
    fn test_empty_and_blank_text() {
        let chunker = TextChunker::new(4, 1).unwrap();
        assert!(chunker.chunk("").is_empty());
        assert!(chunker.chunk(" \n\t   \n ").is_empty());
    }

    #[test]
    fn test_whitespace_only_windows_are_dropped() {
        let chunker = TextChunker::fixed(3).unwrap();
        assert_eq!(chunker.chunk("ab    cd"), vec!["ab", "cd"]);
    }

    #[test]
    fn test_windows_count_chars_not_bytes() {
        let chunker = TextChunker::fixed(2).unwrap();
        assert_eq!(chunker.chunk("héllo wörld"), vec!["hé", "ll", "o", "wö", "rl", "d"]);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(4, 4)]
    #[case(4, 5)]
    fn test_invalid_parameters(#[case] size: usize, #[case] overlap: usize) {
        assert!(matches!(
            TextChunker::new(size, overlap),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[rstest]
    #[case(1, 0)]
    #[case(4, 1)]
    #[case(7, 3)]
    #[case(10, 9)]
    #[case(50, 10)]
    fn test_chunks_cover_text_and_respect_size(#[case] size: usize, #[case] overlap: usize) {
        let text: String = ('a'..='z').cycle().take(137).collect();
        let chunker = TextChunker::new(size, overlap).unwrap();

        let mut covered = vec![false; text.len()];
        let mut start = 0;
        for chunk in chunker.chunks(&text) {
            assert!(chunk.chars().count() <= size);
            // No whitespace in the input, so windows are untrimmed and
            // start exactly `step` characters apart.
            assert_eq!(&text[start..start + chunk.len()], chunk);
            for flag in &mut covered[start..start + chunk.len()] {
                *flag = true;
            }
            start += chunker.step();
        }

        assert!(covered.iter().all(|c| *c));
    }

    #[test]
    fn test_iterator_is_restartable() {
        let chunker = TextChunker::new(5, 2).unwrap();
        let text = "the quick brown fox jumps";
        let first: Vec<&str> = chunker.chunks(text).collect();
        let second: Vec<&str> = chunker.chunks(text).collect();
        assert_eq!(first, second);
    }
}
