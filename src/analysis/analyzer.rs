use crate::analysis::filter::TokenFilter;
use crate::analysis::filters::lowercase::LowercaseFilter;
use crate::analysis::filters::punctuation::PunctuationFilter;
use crate::analysis::tokenizer::{Tokenizer, WhitespaceTokenizer};
use crate::core::types::Token;

/// Text analysis pipeline
pub struct Analyzer {
    pub tokenizer: Box<dyn Tokenizer>,
    pub filters: Vec<Box<dyn TokenFilter>>,
    pub name: String,
}

impl Analyzer {
    pub fn new(name: String, tokenizer: Box<dyn Tokenizer>) -> Self {
        Analyzer {
            tokenizer,
            filters: Vec::new(),
            name,
        }
    }

    pub fn add_filter(mut self, filter: Box<dyn TokenFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn analyze(&self, text: &str) -> Vec<Token> {
        let mut tokens = self.tokenizer.tokenize(text);

        for filter in &self.filters {
            tokens = filter.filter(tokens);
        }

        tokens
    }

    /// `name: tokenizer > filter > ...`, for log events.
    pub fn pipeline(&self) -> String {
        let mut stages = vec![self.tokenizer.name()];
        stages.extend(self.filters.iter().map(|f| f.name()));
        format!("{}: {}", self.name, stages.join(" > "))
    }

    /// Normalization applied to extracted document text:
    /// whitespace split, lowercase, punctuation stripped.
    pub fn document() -> Self {
        Analyzer::new("document".to_string(), Box::new(WhitespaceTokenizer))
            .add_filter(Box::new(LowercaseFilter))
            .add_filter(Box::new(PunctuationFilter))
    }

    /// Normalization applied to phrase queries: whitespace split and lowercase only.
    /// Punctuation is left in place, so a query word like `end.` never matches a
    /// document token.
    pub fn query() -> Self {
        Analyzer::new("query".to_string(), Box::new(WhitespaceTokenizer))
            .add_filter(Box::new(LowercaseFilter))
    }
}

impl Clone for Analyzer {
    fn clone(&self) -> Self {
        Analyzer {
            tokenizer: self.tokenizer.clone_box(),
            filters: self.filters.iter().map(|f| f.clone_box()).collect(),
            name: self.name.clone(),
        }
    }
}

/// Document normalization in one call.
pub fn normalize(text: &str) -> Vec<Token> {
    Analyzer::document().analyze(text)
}

/// Query word splitting in one call.
pub fn query_words(phrase: &str) -> Vec<Token> {
    Analyzer::query().analyze(phrase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_analyzer_normalizes_text() {
        let tokens = normalize("The Quick, brown FOX -- jumps!\nOver the lazy dog.");
        assert_eq!(tokens, vec!["the", "quick", "brown", "fox", "jumps", "over", "the", "lazy", "dog"]);
    }

    #[test]
    fn pipeline_names_every_stage() {
        assert_eq!(Analyzer::document().pipeline(), "document: whitespace > lowercase > punctuation");
        assert_eq!(Analyzer::query().pipeline(), "query: whitespace > lowercase");
    }

    #[test]
    fn query_analyzer_keeps_punctuation() {
        assert_eq!(query_words("  Lazy DOG. "), vec!["lazy", "dog."]);
    }

    #[test]
    fn cloned_analyzer_behaves_the_same() {
        let analyzer = Analyzer::document();
        let copy = analyzer.clone();
        assert_eq!(copy.name, "document");
        assert_eq!(copy.analyze("A-B c"), analyzer.analyze("A-B c"));
    }
}
