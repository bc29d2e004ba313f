//! A 26-ary trie over uppercase letters, used to count how many dictionary
//! words appear (as substrings, starting anywhere) in a decrypted
//! candidate buffer.

use std::fs;
use std::path::Path;

use crate::constants::MIN_WORD_LENGTH;
use crate::error::Result;

struct TrieNode {
    children: [Option<Box<TrieNode>>; 26],
    word_end: bool,
}

impl TrieNode {
    fn new() -> Self {
        Self { children: std::array::from_fn(|_| None), word_end: false }
    }
}

/// Read-only after construction: `count_words` takes `&self` and never
/// mutates the tree, so no locking is needed once loaded.
pub struct WordsTrie {
    root: TrieNode,
}

impl WordsTrie {
    /// An empty trie (matches no words).
    pub fn empty() -> Self {
        Self { root: TrieNode::new() }
    }

    /// Load a dictionary file: one word per line, upper-cased, non-letters
    /// stripped, words shorter than `MIN_WORD_LENGTH` skipped.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let mut trie = Self::empty();
        for line in contents.lines() {
            trie.add_word(line);
        }
        Ok(trie)
    }

    /// Build a trie directly from a list of words, applying the same
    /// normalisation as `load_from_file`. Used by tests and by the
    /// end-to-end scenarios that construct a small in-memory dictionary.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut trie = Self::empty();
        for word in words {
            trie.add_word(word.as_ref());
        }
        trie
    }

    fn add_word(&mut self, raw: &str) {
        let cleaned: String = raw.chars().filter(|c| c.is_ascii_alphabetic()).map(|c| c.to_ascii_uppercase()).collect();
        if cleaned.len() < MIN_WORD_LENGTH {
            return;
        }
        let mut node = &mut self.root;
        for byte in cleaned.bytes() {
            let index = (byte - b'A') as usize;
            node = node.children[index].get_or_insert_with(|| Box::new(TrieNode::new()));
        }
        node.word_end = true;
    }

    /// Count every substring starting at every position in `text` that
    /// matches a loaded word: a sliding window of active cursors, one per
    /// still-matching start position, advanced one character at a time and
    /// reseeded at the root on every position.
    pub fn count_words(&self, text: &str) -> usize {
        let mut active: Vec<&TrieNode> = Vec::new();
        let mut count = 0;

        for byte in text.bytes() {
            if !byte.is_ascii_uppercase() {
                active.clear();
                continue;
            }
            let index = (byte - b'A') as usize;

            active.push(&self.root);
            let mut next_active = Vec::with_capacity(active.len());
            for node in active.drain(..) {
                if let Some(child) = &node.children[index] {
                    if child.word_end {
                        count += 1;
                    }
                    next_active.push(child.as_ref());
                }
            }
            active = next_active;
        }

        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_overlapping_and_adjacent_matches() {
        let trie = WordsTrie::from_words(["CAT", "ATTACK", "ATTACKATDAWN"]);
        // "CAT" at offset 0, "ATTACK" at offset 2, "ATTACKATDAWN" at offset 2.
        let count = trie.count_words("CATTACKATDAWN");
        assert_eq!(count, 3);
    }

    #[test]
    fn skips_words_shorter_than_minimum_length() {
        let trie = WordsTrie::from_words(["AT", "AN", "CAT"]);
        assert_eq!(trie.count_words("ATANCAT"), 1);
    }

    #[test]
    fn empty_trie_matches_nothing() {
        let trie = WordsTrie::empty();
        assert_eq!(trie.count_words("ANYTHINGATALL"), 0);
    }
}
