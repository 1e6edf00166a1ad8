pub mod lowercase;
pub mod punctuation;
