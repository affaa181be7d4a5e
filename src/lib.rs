pub mod clause;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod expand;
pub mod language_model;
pub mod postprocess;
pub mod preprocess;
pub mod tagger;
pub mod tokenize;
pub mod translator;
pub mod types;

// Re-export commonly used types
pub use clause::ClauseSplitter;
pub use config::RulesConfig;
pub use dictionary::Dictionary;
pub use error::{Result, TranslateError};
pub use language_model::LanguageModel;
pub use tagger::{HeuristicTagger, LexiconTagger, Tagger};
pub use tokenize::{Tokenizer, WordTokenizer};
pub use translator::{ClauseTranslator, DirectTranslator, Pipeline, Translator};
pub use types::{Annotation, Candidate, Tagged};
