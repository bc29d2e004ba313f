//! Scores a grille against the cipher text by applying it at all four
//! rotations and counting dictionary words in the resulting buffer (and its
//! reverse).

use std::collections::HashSet;

use parking_lot::Mutex;

use crate::constants::MIN_DETECTED_WORD_COUNT;
use crate::grille::Grille;

use super::trie::WordsTrie;

/// Holds the cipher text, the word trie, and the set of reported
/// candidates. Read-mostly: only `candidates` is ever mutated after
/// construction, and it is behind its own mutex.
pub struct CipherScorer {
    cipher_chars: Vec<u8>,
    side: usize,
    trie: WordsTrie,
    candidates: Mutex<HashSet<String>>,
}

impl CipherScorer {
    /// Build a scorer over `cipher_text` (must be the square of an even
    /// side length) and `trie`.
    pub fn new(cipher_text: &str, trie: WordsTrie) -> Self {
        let cipher_chars: Vec<u8> = cipher_text.bytes().collect();
        let side = (cipher_chars.len() as f64).sqrt().round() as usize;
        Self { cipher_chars, side, trie, candidates: Mutex::new(HashSet::new()) }
    }

    /// The square side length implied by the cipher text length.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Apply `grille` at all four rotations, building one reusable buffer
    /// in row-major (y outer, x inner) order, then score the buffer and its
    /// reversal. A candidate is added to the shared set whenever at least
    /// `MIN_DETECTED_WORD_COUNT` words are found; the candidate is printed
    /// to stdout only when `verbose` (candidates are still collected when
    /// not verbose, since the exit-code check needs the set regardless).
    pub fn apply_grille(&self, grille: &Grille, verbose: bool) {
        let mut buffer = String::with_capacity(self.cipher_chars.len());
        for rotation in 0..4 {
            for y in 0..self.side {
                for x in 0..self.side {
                    if grille.is_hole(x, y, rotation) {
                        buffer.push(self.cipher_chars[y * self.side + x] as char);
                    }
                }
            }
        }

        self.find_words_and_report(&buffer, verbose);
        let reversed: String = buffer.chars().rev().collect();
        self.find_words_and_report(&reversed, verbose);
    }

    fn find_words_and_report(&self, candidate: &str, verbose: bool) {
        let count = self.trie.count_words(candidate);
        if count >= MIN_DETECTED_WORD_COUNT {
            if verbose {
                println!("{count}: {candidate}");
            }
            self.candidates.lock().insert(candidate.to_string());
        }
    }

    /// A snapshot of the candidates reported so far.
    pub fn candidate_snapshot(&self) -> HashSet<String> {
        self.candidates.lock().clone()
    }

    /// Whether `text` has been reported as a candidate.
    pub fn contains_candidate(&self, text: &str) -> bool {
        self.candidates.lock().contains(text)
    }
}
