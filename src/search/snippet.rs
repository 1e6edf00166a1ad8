use regex::{Regex, RegexBuilder};
use tracing::warn;
use crate::core::config::Config;
use crate::core::types::{Position, Token};
use crate::search::results::SearchResults;

const ELLIPSIS: &str = "...";

/// Renders bounded, highlighted context windows around phrase matches.
#[derive(Debug, Clone)]
pub struct SnippetRenderer {
    pub max_snippets: usize,
    pub context_window: usize,
}

impl Default for SnippetRenderer {
    fn default() -> Self {
        SnippetRenderer {
            max_snippets: 5,
            context_window: 15,
        }
    }
}

impl SnippetRenderer {
    pub fn new(max_snippets: usize, context_window: usize) -> Self {
        SnippetRenderer {
            max_snippets,
            context_window,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        SnippetRenderer::new(config.max_snippets, config.context_window)
    }

    /// `positions` must be ascending match starts; `query_words` are the
    /// lowercased words the positions were found for.
    pub fn render(&self, document: &[Token], positions: &[Position], query_words: &[Token]) -> SearchResults {
        if positions.is_empty() {
            return SearchResults::empty();
        }

        let highlighter = build_highlighter(query_words);

        let snippets = positions.iter()
            .take(self.max_snippets)
            .map(|&pos| {
                let window = self.window(document, pos as usize, query_words.len());
                let body = match &highlighter {
                    Some(re) => re.replace_all(&window, "<strong>$0</strong>").into_owned(),
                    None => window,
                };
                format!("{ELLIPSIS}{body}{ELLIPSIS}")
            })
            .collect();

        SearchResults {
            match_count: positions.len(),
            snippets,
        }
    }

    /// Tokens in `[pos - context, pos + query_len + context)`, clamped to the document.
    fn window(&self, document: &[Token], pos: usize, query_len: usize) -> String {
        let start = pos.saturating_sub(self.context_window);
        let end = pos
            .saturating_add(query_len)
            .saturating_add(self.context_window)
            .min(document.len());
        if start >= end {
            return String::new();
        }
        document[start..end].join(" ")
    }
}

/// One case-insensitive, word-bounded alternation over every escaped query word.
///
/// A single pass keeps later words from matching inside markup inserted for
/// earlier ones.
fn build_highlighter(query_words: &[Token]) -> Option<Regex> {
    let mut words: Vec<String> = query_words.iter()
        .filter(|w| !w.is_empty())
        .map(|w| escape_html(w))
        .collect();
    if words.is_empty() {
        return None;
    }
    words.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    words.dedup();

    let alternation = words.iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(r"\b(?:{})\b", alternation);

    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(error = %e, "highlight pattern rejected, rendering snippets without emphasis");
            None
        }
    }
}

/// Escapes the characters that could open markup or break out of an attribute.
pub fn escape_html(text: &str) -> String {
    html_escape::encode_safe(text).into_owned()
}
