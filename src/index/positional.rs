use std::collections::{BTreeMap, HashMap};
use tracing::warn;
use crate::analysis::analyzer::query_words;
use crate::analysis::filters::punctuation::is_word_char;
use crate::core::error::{Error, Result};
use crate::core::types::{Position, Token};
use crate::index::blob::IndexBlob;

/// Token → ascending positions, plus the token sequence the positions point into.
///
/// Every position of the document belongs to exactly one token's list and each
/// list is strictly increasing. Both hold by construction in [`PositionalIndex::build`]
/// and are checked in [`PositionalIndex::from_blob`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionalIndex {
    postings: HashMap<Token, Vec<Position>>,
    document: Vec<Token>,
}

impl PositionalIndex {
    pub fn new() -> Self {
        PositionalIndex::default()
    }

    /// Single left-to-right pass. Positions are appended in increasing order,
    /// so no list ever needs sorting.
    pub fn build(tokens: Vec<Token>) -> Self {
        let mut postings: HashMap<Token, Vec<Position>> = HashMap::new();

        for (i, token) in tokens.iter().enumerate() {
            postings.entry(token.clone())
                .or_insert_with(Vec::new)
                .push(i as Position);
        }

        PositionalIndex {
            postings,
            document: tokens,
        }
    }

    /// Starting positions of every exact occurrence of `phrase`, in document order.
    ///
    /// Query words are lowercased and split on whitespace only; they are not
    /// stripped of punctuation.
    pub fn search_phrase(&self, phrase: &str) -> Vec<Position> {
        self.search_words(&query_words(phrase))
    }

    pub fn search_words(&self, words: &[Token]) -> Vec<Position> {
        let Some((first, rest)) = words.split_first() else {
            return Vec::new();
        };
        let Some(starts) = self.postings.get(first) else {
            return Vec::new();
        };

        let mut followers = Vec::with_capacity(rest.len());
        for word in rest {
            match self.postings.get(word) {
                Some(positions) => followers.push(positions),
                None => return Vec::new(),
            }
        }

        starts.iter()
            .copied()
            .filter(|&pos| {
                followers.iter().enumerate().all(|(i, positions)| {
                    pos.checked_add(i as Position + 1)
                        .is_some_and(|next| positions.binary_search(&next).is_ok())
                })
            })
            .collect()
    }

    pub fn positions(&self, token: &str) -> &[Position] {
        self.postings.get(token).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn document(&self) -> &[Token] {
        &self.document
    }

    pub fn len(&self) -> usize {
        self.document.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document.is_empty()
    }

    /// Distinct tokens, in no particular order.
    pub fn vocabulary(&self) -> impl Iterator<Item = &Token> {
        self.postings.keys()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.postings.len()
    }

    pub fn to_blob(&self) -> IndexBlob {
        let index: BTreeMap<Token, Vec<Position>> = self.postings
            .iter()
            .map(|(token, positions)| (token.clone(), positions.clone()))
            .collect();
        IndexBlob::new(index, self.document.clone())
    }

    /// Rebuilds an index from its persisted form.
    ///
    /// Absent fields fall back to what can be derived from the other one (or to
    /// an empty index). Position lists that are unsorted, duplicated, out of
    /// range, disagree with the document, or leave positions uncovered reject
    /// the whole blob.
    pub fn from_blob(blob: IndexBlob) -> Result<Self> {
        match (blob.index, blob.document) {
            (None, None) => {
                warn!("index blob has neither index nor document, using an empty index");
                Ok(PositionalIndex::new())
            }
            (None, Some(document)) => {
                warn!(tokens = document.len(), "index blob has no index, rebuilding from document");
                check_tokens(&document)?;
                Ok(PositionalIndex::build(document))
            }
            (Some(index), None) => {
                warn!(terms = index.len(), "index blob has no document, reconstructing from positions");
                let document = reconstruct_document(&index)?;
                Self::from_parts(index, document)
            }
            (Some(index), Some(document)) => Self::from_parts(index, document),
        }
    }

    fn from_parts(index: BTreeMap<Token, Vec<Position>>, document: Vec<Token>) -> Result<Self> {
        check_tokens(&document)?;
        let mut covered = 0usize;

        for (token, positions) in &index {
            if positions.is_empty() {
                return Err(Error::malformed_index(format!("token '{}' has no positions", token)));
            }
            if positions.windows(2).any(|w| w[0] >= w[1]) {
                return Err(Error::malformed_index(format!(
                    "positions for '{}' are not strictly increasing",
                    token
                )));
            }
            for &pos in positions {
                match document.get(pos as usize) {
                    Some(at) if at == token => {}
                    Some(at) => {
                        return Err(Error::malformed_index(format!(
                            "position {} is listed for '{}' but the document has '{}'",
                            pos, token, at
                        )));
                    }
                    None => {
                        return Err(Error::malformed_index(format!(
                            "position {} for '{}' is past the end of a {}-token document",
                            pos, token, document.len()
                        )));
                    }
                }
            }
            covered += positions.len();
        }

        if covered != document.len() {
            return Err(Error::malformed_index(format!(
                "index covers {} of {} document positions",
                covered,
                document.len()
            )));
        }

        Ok(PositionalIndex {
            postings: index.into_iter().collect(),
            document,
        })
    }
}

/// Stored tokens must look like normalized ones: non-empty, word characters only.
/// Snippets are built from them verbatim.
fn check_tokens(document: &[Token]) -> Result<()> {
    match document.iter().position(|t| t.is_empty() || !t.chars().all(is_word_char)) {
        Some(pos) => Err(Error::malformed_index(format!(
            "token {:?} at position {} is not a normalized word",
            document[pos], pos
        ))),
        None => Ok(()),
    }
}

fn reconstruct_document(index: &BTreeMap<Token, Vec<Position>>) -> Result<Vec<Token>> {
    let len: usize = index.values().map(Vec::len).sum();
    let mut slots: Vec<Option<&Token>> = vec![None; len];

    for (token, positions) in index {
        for &pos in positions {
            match slots.get_mut(pos as usize) {
                Some(slot @ None) => *slot = Some(token),
                Some(Some(_)) => {
                    return Err(Error::malformed_index(format!("position {} is claimed twice", pos)));
                }
                None => {
                    return Err(Error::malformed_index(format!(
                        "position {} for '{}' leaves a gap in the document",
                        pos, token
                    )));
                }
            }
        }
    }

    slots.into_iter()
        .map(|slot| slot.cloned().ok_or_else(|| Error::malformed_index("document has unassigned positions")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;

    fn tokens(text: &str) -> Vec<Token> {
        text.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn build_records_every_position() {
        let index = PositionalIndex::build(tokens("a b a c a"));
        assert_eq!(index.positions("a"), &[0, 2, 4]);
        assert_eq!(index.positions("b"), &[1]);
        assert_eq!(index.positions("missing"), &[] as &[Position]);
        assert_eq!(index.len(), 5);
        assert_eq!(index.vocabulary_size(), 3);
    }

    #[test]
    fn phrase_match_drops_candidates_at_document_end() {
        let index = PositionalIndex::build(tokens("a b a b a"));
        assert_eq!(index.search_phrase("a b"), vec![0, 2]);
    }

    #[test]
    fn phrase_query_is_case_insensitive() {
        let index = PositionalIndex::build(tokens("the quick brown fox"));
        assert_eq!(index.search_phrase("  QUICK   Brown "), vec![1]);
    }

    #[test]
    fn query_punctuation_is_not_stripped() {
        let index = PositionalIndex::build(tokens("the quick brown fox"));
        assert!(index.search_phrase("fox.").is_empty());
    }

    #[test]
    fn empty_or_unknown_phrases_find_nothing() {
        let index = PositionalIndex::build(tokens("a b c"));
        assert!(index.search_phrase("").is_empty());
        assert!(index.search_phrase("   ").is_empty());
        assert!(index.search_phrase("z a").is_empty());
        assert!(index.search_phrase("a z").is_empty());
        assert!(PositionalIndex::new().search_phrase("a").is_empty());
    }

    #[test]
    fn repeated_word_phrases() {
        let index = PositionalIndex::build(tokens("x x x y x x"));
        assert_eq!(index.search_phrase("x x"), vec![0, 1, 4]);
        assert_eq!(index.search_phrase("x x x"), vec![0]);
    }

    #[test]
    fn blob_round_trip_preserves_index() {
        let index = PositionalIndex::build(tokens("one two three two one"));
        let restored = PositionalIndex::from_blob(index.to_blob()).unwrap();
        assert_eq!(restored, index);
    }

    #[test]
    fn empty_blob_yields_empty_index() {
        let index = PositionalIndex::from_blob(IndexBlob::default()).unwrap();
        assert!(index.is_empty());
        assert!(index.search_phrase("anything").is_empty());
    }

    #[test]
    fn missing_index_is_rebuilt_from_document() {
        let blob = IndexBlob { index: None, document: Some(tokens("a b a")) };
        let index = PositionalIndex::from_blob(blob).unwrap();
        assert_eq!(index.positions("a"), &[0, 2]);
    }

    #[test]
    fn missing_document_is_reconstructed_from_positions() {
        let full = PositionalIndex::build(tokens("red green red blue"));
        let blob = IndexBlob { index: full.to_blob().index, document: None };
        let index = PositionalIndex::from_blob(blob).unwrap();
        assert_eq!(index.document(), full.document());
    }

    #[test]
    fn unsorted_positions_are_rejected() {
        let mut blob = PositionalIndex::build(tokens("a b a")).to_blob();
        blob.index.as_mut().unwrap().insert("a".into(), vec![2, 0]);
        let err = PositionalIndex::from_blob(blob).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedIndex);
    }

    #[test]
    fn positions_disagreeing_with_document_are_rejected() {
        let mut blob = PositionalIndex::build(tokens("a b a")).to_blob();
        blob.index.as_mut().unwrap().insert("b".into(), vec![2]);
        blob.index.as_mut().unwrap().insert("a".into(), vec![0, 1]);
        assert!(PositionalIndex::from_blob(blob).is_err());
    }

    #[test]
    fn out_of_range_and_uncovered_positions_are_rejected() {
        let mut blob = PositionalIndex::build(tokens("a b")).to_blob();
        blob.index.as_mut().unwrap().insert("b".into(), vec![7]);
        assert!(PositionalIndex::from_blob(blob).is_err());

        let mut blob = PositionalIndex::build(tokens("a b")).to_blob();
        blob.index.as_mut().unwrap().remove("b");
        assert!(PositionalIndex::from_blob(blob).is_err());
    }

    #[test]
    fn reconstruction_rejects_gaps() {
        let mut index = BTreeMap::new();
        index.insert("a".to_string(), vec![0, 3]);
        let blob = IndexBlob { index: Some(index), document: None };
        assert!(PositionalIndex::from_blob(blob).is_err());
    }

    #[test]
    fn tokens_with_markup_are_rejected() {
        let blob = PositionalIndex::build(tokens("safe <script>alert(1)</script>")).to_blob();
        let err = PositionalIndex::from_blob(blob).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedIndex);

        let blob = IndexBlob { index: None, document: Some(vec!["ok".into(), "".into()]) };
        assert_eq!(PositionalIndex::from_blob(blob).unwrap_err().kind, ErrorKind::MalformedIndex);

        let blob = PositionalIndex::build(tokens("naïve café_2024 東京")).to_blob();
        assert!(PositionalIndex::from_blob(blob).is_ok());
    }
}
