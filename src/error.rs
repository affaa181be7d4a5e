//! Error types for translation.
//!
//! Dictionary misses and untagged tokens are not errors: they degrade to the
//! verbatim token and an absent tag. A sentence whose candidates are all
//! filtered away is reported as `Ok(None)` by the translator.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for translation operations.
pub type Result<T> = std::result::Result<T, TranslateError>;

#[derive(Debug, Error)]
pub enum TranslateError {
    /// A transform that reads POS tags ran before the POS annotator.
    #[error(
        "{stage} requires POS annotations; insert the POS annotator into the pipeline before it"
    )]
    MissingAnnotation { stage: &'static str },

    /// A preprocessing step left the tag sequence out of step with the tokens.
    #[error("after {stage}: {annotated} tags for {tokens} tokens")]
    AnnotationMismatch {
        stage: &'static str,
        annotated: usize,
        tokens: usize,
    },

    #[error("dictionary line {line}: {reason}")]
    DictionaryFormat { line: usize, reason: String },

    #[error("tagged corpus line {line}: {reason}")]
    TaggedCorpusFormat { line: usize, reason: String },

    #[error("invalid tag pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("corpus at {path} contains no words")]
    EmptyCorpus { path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rules file error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl TranslateError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }
}
