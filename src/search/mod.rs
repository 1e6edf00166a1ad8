pub mod results;
pub mod snippet;
pub mod trie;
