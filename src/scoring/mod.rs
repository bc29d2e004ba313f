//! Scores decrypted candidate buffers against a dictionary of known words.

pub mod scorer;
pub mod trie;

pub use scorer::CipherScorer;
pub use trie::WordsTrie;
