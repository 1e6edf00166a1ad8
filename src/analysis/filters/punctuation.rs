use crate::analysis::filter::TokenFilter;
use crate::core::types::Token;

/// Removes every non-word character from each token and drops tokens left empty.
///
/// A word character is alphanumeric (any script) or `_`.
pub struct PunctuationFilter;

pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl TokenFilter for PunctuationFilter {
    fn filter(&self, tokens: Vec<Token>) -> Vec<Token> {
        tokens.into_iter()
            .filter_map(|token| {
                let stripped: String = if token.chars().all(is_word_char) {
                    token
                } else {
                    token.chars().filter(|c| is_word_char(*c)).collect()
                };
                (!stripped.is_empty()).then_some(stripped)
            })
            .collect()
    }

    fn name(&self) -> &str {
        "punctuation"
    }

    fn clone_box(&self) -> Box<dyn TokenFilter> {
        Box::new(PunctuationFilter)
    }
}
