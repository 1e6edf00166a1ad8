pub mod analyzer;
pub mod filter;
pub mod filters;
pub mod tokenizer;
