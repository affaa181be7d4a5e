use regex::Regex;

use crate::error::{Result, TranslateError};

/// Splits a raw line of source text into tokens.
pub trait Tokenizer {
    fn tokenize(&self, line: &str) -> Vec<String>;
}

/// Regex word tokenizer for Spanish text.
///
/// Words keep inner apostrophes and hyphens; `...` and `--` stay whole; any
/// other punctuation character becomes its own token.
pub struct WordTokenizer {
    pattern: Regex,
}

const WORD_PATTERN: &str = r"\w+(?:['\-]\w+)*|\.\.\.|--|[^\w\s]";

impl WordTokenizer {
    pub fn new() -> Result<Self> {
        let pattern =
            Regex::new(WORD_PATTERN).map_err(|e| TranslateError::invalid_pattern(WORD_PATTERN, e))?;
        Ok(Self { pattern })
    }
}

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, line: &str) -> Vec<String> {
        let normalized = line
            .replace('—', "--")
            .replace('…', "...")
            .replace('¿', "¿ ")
            .replace('¡', "¡ ");

        self.pattern
            .find_iter(&normalized)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}
