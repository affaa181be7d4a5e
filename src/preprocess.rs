//! Preprocessing transforms: functions over the source sentence and its
//! annotation, run in order before dictionary lookup.

use log::debug;
use regex::Regex;

use crate::error::{Result, TranslateError};
use crate::tagger::Tagger;
use crate::types::{Annotation, Tagged};

/// One step of the preprocessing pipeline. Consumes the sentence and its
/// annotation and returns the transformed pair.
pub trait Preprocessor: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, sentence: Vec<String>, annotation: Annotation)
        -> Result<(Vec<String>, Annotation)>;
}

/// Compile a tag pattern so it must match from the first tag character.
pub fn compile_tag_pattern(pattern: &str) -> Result<Regex> {
    let anchored = format!("^(?:{})", pattern);
    Regex::new(&anchored).map_err(|e| TranslateError::invalid_pattern(pattern, e))
}

/// Yields the `(start, end)` span of every occurrence of `needle` in
/// `haystack`, overlapping occurrences included. Comparison ignores case.
pub fn find_sublist<'a>(
    haystack: &'a [String],
    needle: &'a [String],
) -> impl Iterator<Item = (usize, usize)> + 'a {
    let windows = if needle.is_empty() {
        // `windows(0)` panics; an empty needle matches nowhere.
        haystack.windows(haystack.len() + 1)
    } else {
        haystack.windows(needle.len())
    };
    windows.enumerate().filter_map(move |(start, window)| {
        window
            .iter()
            .zip(needle)
            .all(|(token, expected)| token.to_lowercase() == *expected)
            .then_some((start, start + needle.len()))
    })
}

/// A phrase table entry: a literal token sequence, optional tag context on
/// either side, and the single token (and tag) that replaces it.
///
/// Tokens are stored lowercased and matched ignoring case, so "Lo que" at
/// the start of a sentence matches the rule for "lo que". Tag context is
/// matched as written.
#[derive(Debug, Clone)]
pub struct PhraseRule {
    tokens: Vec<String>,
    before: Option<Regex>,
    after: Option<Regex>,
    replacement: String,
    tag: Option<String>,
}

impl PhraseRule {
    pub fn new(
        tokens: &[&str],
        before: Option<&str>,
        after: Option<&str>,
        replacement: &str,
        tag: Option<&str>,
    ) -> Result<Self> {
        Ok(Self {
            tokens: tokens.iter().map(|t| t.to_lowercase()).collect(),
            before: before.map(compile_tag_pattern).transpose()?,
            after: after.map(compile_tag_pattern).transpose()?,
            replacement: replacement.to_string(),
            tag: tag.map(str::to_string),
        })
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Whether the span `start..end` of a sentence tagged with `context`
    /// satisfies this rule's surrounding-tag constraints. Absent tags match
    /// as the empty string.
    fn context_matches(&self, context: &[Tagged], start: usize, end: usize) -> bool {
        let tag_at = |i: usize| context.get(i).map(Tagged::tag_str).unwrap_or("");

        if let Some(before) = &self.before {
            if start == 0 || !before.is_match(tag_at(start - 1)) {
                return false;
            }
        }
        if let Some(after) = &self.after {
            if end >= context.len() || !after.is_match(tag_at(end)) {
                return false;
            }
        }
        true
    }
}

/// Spans to replace, as `(start, end, rule)`, sorted and non-overlapping.
///
/// Every qualifying occurrence of every rule is collected; where two rules
/// qualify at the same start the earlier rule wins. Spans are then taken left
/// to right, skipping any that start inside an already consumed span.
pub fn match_phrases<'r>(
    sentence: &[String],
    context: &[Tagged],
    rules: &'r [PhraseRule],
) -> Vec<(usize, usize, &'r PhraseRule)> {
    let mut by_start: Vec<Option<(usize, &PhraseRule)>> = vec![None; sentence.len()];
    for rule in rules {
        for (start, end) in find_sublist(sentence, &rule.tokens) {
            if by_start[start].is_none() && rule.context_matches(context, start, end) {
                by_start[start] = Some((end, rule));
            }
        }
    }

    let mut spans = Vec::new();
    let mut position = 0;
    while position < sentence.len() {
        match by_start[position] {
            Some((end, rule)) => {
                spans.push((position, end, rule));
                position = end;
            }
            None => position += 1,
        }
    }
    spans
}

/// Tags the sentence with a [`Tagger`], creating the `pos` annotation.
pub struct AnnotatePos<'a> {
    tagger: &'a dyn Tagger,
}

impl<'a> AnnotatePos<'a> {
    pub fn new(tagger: &'a dyn Tagger) -> Self {
        Self { tagger }
    }
}

impl Preprocessor for AnnotatePos<'_> {
    fn name(&self) -> &'static str {
        "POS annotator"
    }

    fn apply(
        &self,
        sentence: Vec<String>,
        _annotation: Annotation,
    ) -> Result<(Vec<String>, Annotation)> {
        let pos = self.tagger.tag(&sentence);
        Ok((sentence, Annotation::with_pos(pos)))
    }
}

/// Collapses multi-token phrases into a single token when their tag context
/// matches, e.g. "lo que" before a verb becomes "qué".
pub struct PhraseJoiner {
    rules: Vec<PhraseRule>,
}

impl PhraseJoiner {
    pub fn new(rules: Vec<PhraseRule>) -> Self {
        Self { rules }
    }
}

impl Preprocessor for PhraseJoiner {
    fn name(&self) -> &'static str {
        "phrase joiner"
    }

    fn apply(
        &self,
        sentence: Vec<String>,
        annotation: Annotation,
    ) -> Result<(Vec<String>, Annotation)> {
        let pos = annotation.require_pos(self.name())?;
        let spans = match_phrases(&sentence, pos, &self.rules);
        if spans.is_empty() {
            return Ok((sentence, annotation));
        }

        let mut joined = Vec::with_capacity(sentence.len());
        let mut joined_pos = Vec::with_capacity(sentence.len());
        let mut spans = spans.into_iter().peekable();
        let mut i = 0;
        while i < sentence.len() {
            if let Some(&(start, end, rule)) = spans.peek() {
                if start == i {
                    debug!("Joined {:?} into {:?}", &sentence[start..end], rule.replacement);
                    joined.push(rule.replacement.clone());
                    joined_pos.push(Tagged::new(rule.replacement.clone(), rule.tag()));
                    spans.next();
                    i = end;
                    continue;
                }
            }
            joined.push(sentence[i].clone());
            joined_pos.push(pos[i].clone());
            i += 1;
        }

        Ok((joined, Annotation::with_pos(joined_pos)))
    }
}

/// One side of a reorder rule.
#[derive(Debug, Clone)]
pub enum TagPattern {
    /// Matches only an unknown tag.
    Absent,
    /// Matches a known tag against an anchored regex.
    Matches(Regex),
}

impl TagPattern {
    /// `None` means "the tag must be unknown".
    pub fn from_pattern(pattern: Option<&str>) -> Result<Self> {
        match pattern {
            None => Ok(TagPattern::Absent),
            Some(pattern) => Ok(TagPattern::Matches(compile_tag_pattern(pattern)?)),
        }
    }

    pub fn matches(&self, tag: Option<&str>) -> bool {
        match (self, tag) {
            (TagPattern::Absent, None) => true,
            (TagPattern::Matches(regex), Some(tag)) => regex.is_match(tag),
            _ => false,
        }
    }
}

/// Swaps adjacent tokens whose tags match `(before, after)`, e.g. noun +
/// adjective into adjective + noun. A swapped pair is not reconsidered.
pub struct Reorder {
    before: TagPattern,
    after: TagPattern,
}

impl Reorder {
    pub fn new(before: Option<&str>, after: Option<&str>) -> Result<Self> {
        Ok(Self {
            before: TagPattern::from_pattern(before)?,
            after: TagPattern::from_pattern(after)?,
        })
    }
}

impl Preprocessor for Reorder {
    fn name(&self) -> &'static str {
        "reorder"
    }

    fn apply(
        &self,
        mut sentence: Vec<String>,
        annotation: Annotation,
    ) -> Result<(Vec<String>, Annotation)> {
        let mut pos = annotation.require_pos(self.name())?.to_vec();

        let mut i = 0;
        while i + 1 < sentence.len() && i + 1 < pos.len() {
            if self.before.matches(pos[i].tag.as_deref())
                && self.after.matches(pos[i + 1].tag.as_deref())
            {
                sentence.swap(i, i + 1);
                pos.swap(i, i + 1);
                i += 2;
            } else {
                i += 1;
            }
        }

        Ok((sentence, Annotation::with_pos(pos)))
    }
}
