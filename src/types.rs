use serde::{Deserialize, Serialize};

use crate::error::{Result, TranslateError};

/// A token paired with its EAGLES part-of-speech tag, if one is known.
///
/// EAGLES tags encode the category in the first character (`v` verb, `n`
/// noun, `a` adjective, `p` pronoun, `r` adverb, `d` determiner, ...) and
/// morphological features in fixed positions after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tagged {
    pub token: String,
    pub tag: Option<String>,
}

impl Tagged {
    pub fn new(token: impl Into<String>, tag: Option<&str>) -> Self {
        Self {
            token: token.into(),
            tag: tag.map(str::to_string),
        }
    }

    /// The tag, or the empty string when the tag is unknown.
    pub fn tag_str(&self) -> &str {
        self.tag.as_deref().unwrap_or("")
    }

    /// Character at a fixed EAGLES position, e.g. `feature(4)` is the person
    /// of a verb tag.
    pub fn feature(&self, position: usize) -> Option<char> {
        self.tag.as_deref().and_then(|t| t.chars().nth(position))
    }

    /// Part-of-speech category (first tag character).
    pub fn category(&self) -> Option<char> {
        self.feature(0)
    }

    pub fn is(&self, category: char) -> bool {
        self.category() == Some(category)
    }
}

/// Side-channel data carried alongside a sentence through the pipeline.
///
/// `pos`, once present, holds exactly one entry per sentence token.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotation {
    pub pos: Option<Vec<Tagged>>,
}

impl Annotation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pos(pos: Vec<Tagged>) -> Self {
        Self { pos: Some(pos) }
    }

    /// POS tags required by `stage`; their absence means the pipeline was
    /// assembled in the wrong order.
    pub fn require_pos(&self, stage: &'static str) -> Result<&[Tagged]> {
        self.pos
            .as_deref()
            .ok_or(TranslateError::MissingAnnotation { stage })
    }

    /// Check the length invariant against the sentence the annotation belongs to.
    pub fn check_aligned(&self, stage: &'static str, sentence: &[String]) -> Result<()> {
        match &self.pos {
            Some(pos) if pos.len() != sentence.len() => Err(TranslateError::AnnotationMismatch {
                stage,
                annotated: pos.len(),
                tokens: sentence.len(),
            }),
            _ => Ok(()),
        }
    }
}

/// One fully instantiated English sentence.
///
/// `slots[i]` is the translation chosen for source token `i`. A slot may hold
/// several words ("look for") or be empty once a postprocessor has folded it
/// into a neighbour.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub slots: Vec<String>,
    pub annotation: Annotation,
}

impl Candidate {
    pub fn new(slots: Vec<String>) -> Self {
        Self {
            slots,
            annotation: Annotation::new(),
        }
    }

    /// The candidate as a flat word stream, skipping blank slots.
    pub fn words(&self) -> Vec<&str> {
        self.slots
            .iter()
            .flat_map(|slot| slot.split_whitespace())
            .collect()
    }
}
