use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct TrieNode {
    children: BTreeMap<char, TrieNode>,
    is_end_of_word: bool,
}

// Iterative teardown; the derived drop would recurse once per character.
impl Drop for TrieNode {
    fn drop(&mut self) {
        let mut pending: Vec<TrieNode> = std::mem::take(&mut self.children).into_values().collect();
        while let Some(mut node) = pending.pop() {
            pending.extend(std::mem::take(&mut node.children).into_values());
        }
    }
}

/// Character-level prefix tree over a document's vocabulary.
///
/// Children are kept in a `BTreeMap`, so prefix results come back in
/// ascending character order.
#[derive(Debug, Clone, Default)]
pub struct Trie {
    root: TrieNode,
    word_count: usize,
}

impl Trie {
    pub fn new() -> Self {
        Trie::default()
    }

    /// Builds a trie from any word source; duplicates are inserted once.
    pub fn build<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut trie = Trie::new();
        for word in words {
            trie.insert(word.as_ref());
        }
        trie
    }

    pub fn insert(&mut self, word: &str) {
        let mut node = &mut self.root;
        for c in word.chars() {
            node = node.children.entry(c).or_default();
        }
        if !node.is_end_of_word {
            node.is_end_of_word = true;
            self.word_count += 1;
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.find(word).is_some_and(|node| node.is_end_of_word)
    }

    pub fn len(&self) -> usize {
        self.word_count
    }

    pub fn is_empty(&self) -> bool {
        self.word_count == 0
    }

    /// Every stored word starting with `prefix`, lexicographic by character.
    ///
    /// Depth-first with an explicit stack, so very long words cannot exhaust
    /// the call stack.
    pub fn get_words_with_prefix(&self, prefix: &str) -> Vec<String> {
        let Some(start) = self.find(prefix) else {
            return Vec::new();
        };

        let mut words = Vec::new();
        let mut path = prefix.to_string();
        if start.is_end_of_word {
            words.push(path.clone());
        }

        // (path length before the edge, edge character, child)
        let mut stack: Vec<(usize, char, &TrieNode)> = Vec::new();
        push_children(&mut stack, path.len(), start);

        while let Some((len, c, node)) = stack.pop() {
            path.truncate(len);
            path.push(c);
            if node.is_end_of_word {
                words.push(path.clone());
            }
            push_children(&mut stack, path.len(), node);
        }

        words
    }

    fn find(&self, prefix: &str) -> Option<&TrieNode> {
        let mut node = &self.root;
        for c in prefix.chars() {
            node = node.children.get(&c)?;
        }
        Some(node)
    }
}

// Reverse order so the smallest character is popped first.
fn push_children<'a>(stack: &mut Vec<(usize, char, &'a TrieNode)>, len: usize, node: &'a TrieNode) {
    for (c, child) in node.children.iter().rev() {
        stack.push((len, *c, child));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_lookup_returns_matching_words_in_order() {
        let trie = Trie::build(["cat", "car", "dog", "cart"]);
        assert_eq!(trie.get_words_with_prefix("ca"), vec!["car", "cart", "cat"]);
        assert_eq!(trie.get_words_with_prefix("dog"), vec!["dog"]);
        assert!(trie.get_words_with_prefix("z").is_empty());
        assert!(trie.get_words_with_prefix("dogs").is_empty());
    }

    #[test]
    fn empty_prefix_lists_whole_vocabulary() {
        let trie = Trie::build(["b", "a", "ab"]);
        assert_eq!(trie.get_words_with_prefix(""), vec!["a", "ab", "b"]);
    }

    #[test]
    fn duplicate_inserts_are_idempotent() {
        let mut trie = Trie::build(["cat", "car"]);
        let before = trie.get_words_with_prefix("c");
        trie.insert("cat");
        assert_eq!(trie.get_words_with_prefix("c"), before);
        assert_eq!(trie.len(), 2);
    }

    #[test]
    fn prefix_itself_can_be_a_word() {
        let trie = Trie::build(["in", "index", "inside"]);
        assert!(trie.contains("in"));
        assert!(!trie.contains("ind"));
        assert_eq!(trie.get_words_with_prefix("in"), vec!["in", "index", "inside"]);
    }

    #[test]
    fn handles_multibyte_characters() {
        let trie = Trie::build(["über", "übung", "uber"]);
        assert_eq!(trie.get_words_with_prefix("üb"), vec!["über", "übung"]);
    }

    #[test]
    fn very_long_words_do_not_overflow() {
        let long = "a".repeat(50_000);
        let trie = Trie::build([long.as_str(), "ab"]);
        let words = trie.get_words_with_prefix("a");
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].len(), 50_000);
        assert_eq!(words[1], "ab");
    }

    #[test]
    fn empty_trie_answers_nothing() {
        let trie = Trie::new();
        assert!(trie.is_empty());
        assert!(trie.get_words_with_prefix("a").is_empty());
        assert!(trie.get_words_with_prefix("").is_empty());
    }
}
