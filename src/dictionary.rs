use log::{debug, info, warn};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{Result, TranslateError};

/// Spanish→English dictionary: lowercase source word to ordered English
/// candidates, most preferred first.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    entries: HashMap<String, Vec<String>>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dictionary from in-memory entries. Keys are lowercased.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<V>)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut dictionary = Self::new();
        for (word, candidates) in entries {
            dictionary.insert(word.as_ref(), candidates.into_iter().map(Into::into).collect());
        }
        dictionary
    }

    /// Load a comma-delimited dictionary file: `word,candidate1,candidate2,...`
    ///
    /// Blank lines and `#` comments are skipped. Every other line needs a
    /// source word and at least one non-empty candidate.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| TranslateError::io(path, e))?;
        let dictionary = Self::parse(&content)?;
        info!("Loaded {} dictionary entries from {:?}", dictionary.len(), path);
        Ok(dictionary)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut dictionary = Self::new();

        for (index, line) in content.lines().enumerate() {
            let line_no = index + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = line.split(',').map(str::trim);
            let word = fields.next().unwrap_or("");
            if word.is_empty() {
                return Err(TranslateError::DictionaryFormat {
                    line: line_no,
                    reason: "missing source word".to_string(),
                });
            }

            let candidates: Vec<String> = fields
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect();
            if candidates.is_empty() {
                return Err(TranslateError::DictionaryFormat {
                    line: line_no,
                    reason: format!("no translations for {:?}", word),
                });
            }

            if dictionary.lookup(word).is_some() {
                warn!("Dictionary line {}: duplicate entry for {:?} replaces the earlier one", line_no, word);
            }
            dictionary.insert(word, candidates);
        }

        Ok(dictionary)
    }

    pub fn insert(&mut self, word: &str, candidates: Vec<String>) {
        self.entries.insert(word.to_lowercase(), candidates);
    }

    /// Candidates for a token, looked up by its lowercased form.
    pub fn lookup(&self, token: &str) -> Option<&[String]> {
        self.entries.get(&token.to_lowercase()).map(Vec::as_slice)
    }

    /// One candidate list per token. Unknown tokens pass through verbatim,
    /// original case preserved.
    pub fn candidates(&self, sentence: &[String]) -> Vec<Vec<String>> {
        sentence
            .iter()
            .map(|token| match self.lookup(token) {
                Some(candidates) => candidates.to_vec(),
                None => vec![token.clone()],
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Every combination taking one element from each list, in order, with the
/// last position varying fastest. The first combination is therefore made of
/// each list's first element.
///
/// The result has `product(len(list))` entries; nothing is truncated.
pub fn cartesian_product(lists: &[Vec<String>]) -> Vec<Vec<String>> {
    let mut combinations: Vec<Vec<String>> = vec![Vec::with_capacity(lists.len())];

    for list in lists {
        let mut next = Vec::with_capacity(combinations.len() * list.len());
        for prefix in &combinations {
            for item in list {
                let mut combined = prefix.clone();
                combined.push(item.clone());
                next.push(combined);
            }
        }
        combinations = next;
    }

    debug!("Expanded {} slots into {} candidate sentences", lists.len(), combinations.len());
    combinations
}
