//! Trigram language model with stupid backoff, used to rerank English
//! candidate sentences.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::error::{Result, TranslateError};

/// Reserved out-of-vocabulary symbol, seeded with a count of zero.
pub const UNKNOWN: &str = "<UNK>";

/// Log-probabilities over the unigrams, bigrams and trigrams of a training
/// corpus. N-gram keys are the words joined by single spaces.
#[derive(Debug, Clone)]
pub struct LanguageModel {
    unigrams: HashMap<String, f64>,
    bigrams: HashMap<String, f64>,
    trigrams: HashMap<String, f64>,
}

fn count_ngrams<S: AsRef<str>>(corpus: &[Vec<S>], n: usize) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for sentence in corpus {
        if sentence.len() < n {
            continue;
        }
        for window in sentence.windows(n) {
            let words: Vec<&str> = window.iter().map(|w| w.as_ref()).collect();
            *counts.entry(words.join(" ")).or_insert(0) += 1;
        }
    }
    counts
}

impl LanguageModel {
    /// Train on a corpus of sentences. N-grams never cross sentence
    /// boundaries.
    pub fn train<S: AsRef<str>>(corpus: &[Vec<S>]) -> Self {
        let mut unigram_counts = count_ngrams(corpus, 1);
        let total_words: usize = unigram_counts.values().sum();
        unigram_counts.entry(UNKNOWN.to_string()).or_insert(0);
        let bigram_counts = count_ngrams(corpus, 2);
        let trigram_counts = count_ngrams(corpus, 3);

        let ln = |count: usize| (count as f64).ln();

        // Unsmoothed: log c(w1 w2 w3) - log c(w1 w2)
        let trigrams = trigram_counts
            .iter()
            .map(|(trigram, &count)| {
                let leading = trigram.rsplitn(2, ' ').nth(1).unwrap_or_default();
                let denominator = bigram_counts.get(leading).copied().unwrap_or(count);
                (trigram.clone(), ln(count) - ln(denominator))
            })
            .collect();

        // Unsmoothed: log c(w1 w2) - log c(w1)
        let bigrams = bigram_counts
            .iter()
            .map(|(bigram, &count)| {
                let first = bigram.split(' ').next().unwrap_or_default();
                let denominator = unigram_counts.get(first).copied().unwrap_or(count);
                (bigram.clone(), ln(count) - ln(denominator))
            })
            .collect();

        // Laplace: log (c(w) + 1) - log (N + |V|), <UNK> counted in |V|
        let vocab_size = unigram_counts.len();
        let unigrams = unigram_counts
            .iter()
            .map(|(word, &count)| (word.clone(), ln(count + 1) - ln(total_words + vocab_size)))
            .collect();

        debug!(
            "Trained language model: {} words, {} unigrams, {} bigrams, {} trigrams",
            total_words,
            vocab_size,
            bigram_counts.len(),
            trigram_counts.len()
        );

        Self {
            unigrams,
            bigrams,
            trigrams,
        }
    }

    /// Train on every `*.txt` file in `dir`, read in name order and
    /// flattened into a single whitespace-split word stream.
    pub fn from_corpus_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut files: Vec<_> = fs::read_dir(dir)
            .map_err(|e| TranslateError::io(dir, e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && path.extension().map_or(false, |ext| ext == "txt"))
            .collect();
        files.sort();

        let mut words = Vec::new();
        for file in &files {
            let text = fs::read_to_string(file).map_err(|e| TranslateError::io(file, e))?;
            words.extend(text.split_whitespace().map(str::to_string));
        }
        if words.is_empty() {
            return Err(TranslateError::EmptyCorpus {
                path: dir.to_path_buf(),
            });
        }

        info!(
            "Loaded {} corpus words from {} files in {}",
            words.len(),
            files.len(),
            dir.display()
        );
        Ok(Self::train(&[words]))
    }

    fn unigram(&self, word: &str) -> f64 {
        self.unigrams
            .get(word)
            .or_else(|| self.unigrams.get(UNKNOWN))
            .copied()
            .unwrap_or(f64::NEG_INFINITY)
    }

    /// Log-probability of a sentence. Not normalized: trigram, bigram and
    /// unigram estimates are summed as they back off.
    pub fn score<S: AsRef<str>>(&self, sentence: &[S]) -> f64 {
        let words: Vec<&str> = sentence.iter().map(|w| w.as_ref()).collect();
        match words.len() {
            0 => return f64::NEG_INFINITY,
            1 => return self.unigram(words[0]),
            _ => {}
        }

        let mut log_prob = match self.bigrams.get(&words[..2].join(" ")) {
            Some(&lp) => lp,
            None => self.unigram(words[1]),
        };

        for window in words.windows(3) {
            let trigram = window.join(" ");
            log_prob += if let Some(&lp) = self.trigrams.get(&trigram) {
                lp
            } else if let Some(&lp) = self.bigrams.get(&window[1..].join(" ")) {
                lp
            } else {
                self.unigram(window[2])
            };
        }
        log_prob
    }

    /// Index of the highest-scoring sentence; the first one wins ties.
    /// Returns `None` only for an empty list.
    pub fn best<S: AsRef<str>>(&self, sentences: &[Vec<S>]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, sentence) in sentences.iter().enumerate() {
            let score = self.score(sentence);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((i, score)),
            }
        }
        best.map(|(i, _)| i)
    }
}
