use serde::{Serialize, Deserialize};

/// Phrase search outcome as handed to the request layer.
///
/// `count` is the total number of matches; `snippets` holds at most the
/// configured number of rendered windows, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(rename = "count")]
    pub match_count: usize,
    pub snippets: Vec<String>,
}

impl SearchResults {
    pub fn empty() -> Self {
        SearchResults::default()
    }

    pub fn is_empty(&self) -> bool {
        self.match_count == 0
    }
}
