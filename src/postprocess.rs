//! Postprocessing transforms over candidate English sentences.
//!
//! Every postprocessor receives the source sentence's annotation as fixed
//! context plus the current candidate list, and returns a new list that may
//! be longer, shorter, or rewritten. Candidate slots stay aligned with the
//! source annotation: slot `i` translates source token `i`.

use log::debug;

use crate::error::Result;
use crate::language_model::LanguageModel;
use crate::preprocess::{match_phrases, PhraseRule};
use crate::types::{Annotation, Candidate};

pub trait Postprocessor: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, source: &Annotation, candidates: Vec<Candidate>) -> Result<Vec<Candidate>>;
}

/// Phrase rewrites on the English side, using the Spanish tags as context:
/// "the our" becomes "ours", "no" before a determiner becomes "not".
///
/// The replacement goes in the first slot of the matched span and the rest
/// of the span is blanked, so slot positions keep matching the source.
pub struct DemonstrativeFix {
    rules: Vec<PhraseRule>,
}

impl DemonstrativeFix {
    pub fn new(rules: Vec<PhraseRule>) -> Self {
        Self { rules }
    }
}

impl Postprocessor for DemonstrativeFix {
    fn name(&self) -> &'static str {
        "demonstrative fix"
    }

    fn apply(&self, source: &Annotation, candidates: Vec<Candidate>) -> Result<Vec<Candidate>> {
        let pos = source.require_pos(self.name())?;

        Ok(candidates
            .into_iter()
            .map(|mut candidate| {
                let spans: Vec<(usize, usize, String)> =
                    match_phrases(&candidate.slots, pos, &self.rules)
                        .into_iter()
                        .map(|(start, end, rule)| (start, end, rule.replacement().to_string()))
                        .collect();
                for (start, end, replacement) in spans {
                    candidate.slots[start] = replacement;
                    for slot in &mut candidate.slots[start + 1..end] {
                        slot.clear();
                    }
                }
                candidate
            })
            .collect())
    }
}

const VOWELS: [char; 5] = ['a', 'e', 'i', 'o', 'u'];

/// Check if a word starts with a vowel letter (needed for a/an agreement).
/// Letter-based: "an hour" and "a university" are both judged wrong.
fn starts_with_vowel(word: &str) -> bool {
    word.chars()
        .next()
        .and_then(|c| c.to_lowercase().next())
        .map_or(false, |c| VOWELS.contains(&c))
}

/// Whether "a"/"an" agrees with the following word everywhere in `words`.
pub fn articles_agree(words: &[&str]) -> bool {
    words.windows(2).all(|pair| {
        let (article, next) = (pair[0], pair[1]);
        if article.eq_ignore_ascii_case("a") {
            !starts_with_vowel(next)
        } else if article.eq_ignore_ascii_case("an") {
            starts_with_vowel(next)
        } else {
            true
        }
    })
}

/// Drops candidates that misuse "a"/"an".
#[derive(Debug, Default)]
pub struct ArticleFilter;

impl Postprocessor for ArticleFilter {
    fn name(&self) -> &'static str {
        "a/an filter"
    }

    fn apply(&self, _source: &Annotation, candidates: Vec<Candidate>) -> Result<Vec<Candidate>> {
        let before = candidates.len();
        let kept: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| articles_agree(&candidate.words()))
            .collect();
        debug!("a/an filter kept {} of {} candidates", kept.len(), before);
        Ok(kept)
    }
}

/// English negation: "no" before a verb becomes "don't", and an adverb in
/// front of a verb moves inside a multi-word verb slot ("don't I write" ->
/// "I don't write").
#[derive(Debug, Default)]
pub struct NegationFix;

impl Postprocessor for NegationFix {
    fn name(&self) -> &'static str {
        "negation fix"
    }

    fn apply(&self, source: &Annotation, candidates: Vec<Candidate>) -> Result<Vec<Candidate>> {
        let pos = source.require_pos(self.name())?;

        let negated: Vec<usize> = pos
            .windows(2)
            .enumerate()
            .filter(|(_, pair)| pair[0].token.to_lowercase() == "no" && pair[1].is('v'))
            .map(|(i, _)| i)
            .collect();
        let adverbs_before_verbs: Vec<usize> = pos
            .windows(2)
            .enumerate()
            .filter(|(_, pair)| pair[0].is('r') && pair[1].is('v'))
            .map(|(i, _)| i)
            .collect();

        Ok(candidates
            .into_iter()
            .map(|mut candidate| {
                let slots = &mut candidate.slots;
                for &i in &negated {
                    if let Some(slot) = slots.get_mut(i) {
                        *slot = "don't".to_string();
                    }
                }
                for &i in &adverbs_before_verbs {
                    if i + 1 >= slots.len() || slots[i].is_empty() {
                        continue;
                    }
                    let parts: Vec<&str> = slots[i + 1].split_whitespace().collect();
                    if parts.len() > 1 {
                        let moved = format!("{} {} {}", parts[0], slots[i], parts[1..].join(" "));
                        slots[i + 1] = moved;
                        slots[i].clear();
                    }
                }
                candidate
            })
            .collect())
    }
}

/// Keeps only the candidate the language model scores highest.
pub struct LanguageModelSelection<'a> {
    model: &'a LanguageModel,
}

impl<'a> LanguageModelSelection<'a> {
    pub fn new(model: &'a LanguageModel) -> Self {
        Self { model }
    }
}

impl Postprocessor for LanguageModelSelection<'_> {
    fn name(&self) -> &'static str {
        "language model selection"
    }

    fn apply(&self, _source: &Annotation, candidates: Vec<Candidate>) -> Result<Vec<Candidate>> {
        let scored: Vec<Vec<&str>> = candidates.iter().map(Candidate::words).collect();
        let Some(best) = self.model.best(&scored) else {
            return Ok(Vec::new());
        };
        debug!("Selected {:?} from {} candidates", scored[best], candidates.len());
        Ok(candidates.into_iter().nth(best).into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Tagged;

    fn strings(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn source(pairs: &[(&str, Option<&str>)]) -> Annotation {
        Annotation::with_pos(pairs.iter().map(|(w, t)| Tagged::new(*w, *t)).collect())
    }

    fn candidates(sentences: &[&[&str]]) -> Vec<Candidate> {
        sentences.iter().map(|s| Candidate::new(strings(s))).collect()
    }

    #[test]
    fn test_article_filter() {
        let kept = ArticleFilter
            .apply(
                &Annotation::new(),
                candidates(&[&["a", "apple", "falls"], &["a", "dog", "runs"], &["an", "dog"], &["an", "apple"]]),
            )
            .unwrap();
        let kept: Vec<Vec<String>> = kept.into_iter().map(|c| c.slots).collect();
        assert_eq!(kept, vec![strings(&["a", "dog", "runs"]), strings(&["an", "apple"])]);
    }

    #[test]
    fn test_article_filter_sees_words_inside_slots() {
        assert!(!articles_agree(&["I", "have", "a", "orange"]));
        let candidate = Candidate::new(strings(&["I have a", "orange"]));
        assert!(!articles_agree(&candidate.words()));
        // Letter-based, not sound-based.
        assert!(!articles_agree(&["an", "hour"]));
        assert!(articles_agree(&["A", "cat"]));
    }

    #[test]
    fn test_demonstrative_fix_blanks_consumed_slots() {
        let source = source(&[("el", Some("da0ms0")), ("nuestro", Some("px1msp0")), ("gana", Some("vmip3s0"))]);
        let fix = DemonstrativeFix::new(vec![
            PhraseRule::new(&["the", "our"], None, None, "ours", None).unwrap(),
        ]);
        let fixed = fix.apply(&source, candidates(&[&["the", "our", "wins"]])).unwrap();
        assert_eq!(fixed[0].slots, strings(&["ours", "", "wins"]));
    }

    #[test]
    fn test_demonstrative_fix_uses_source_tags() {
        let fix = DemonstrativeFix::new(vec![
            PhraseRule::new(&["no"], None, Some("d|pp3fsa00"), "not", None).unwrap(),
        ]);
        let before_determiner = source(&[("no", Some("rn")), ("la", Some("da0fs0"))]);
        let fixed = fix.apply(&before_determiner, candidates(&[&["no", "the"]])).unwrap();
        assert_eq!(fixed[0].slots, strings(&["not", "the"]));

        let before_verb = source(&[("no", Some("rn")), ("come", Some("vmip3s0"))]);
        let fixed = fix.apply(&before_verb, candidates(&[&["no", "eats"]])).unwrap();
        assert_eq!(fixed[0].slots, strings(&["no", "eats"]));
    }

    #[test]
    fn test_negation_before_verb() {
        let source = source(&[("no", Some("rn")), ("escribo", Some("vmip1s0"))]);
        let fixed = NegationFix.apply(&source, candidates(&[&["no", "I write"]])).unwrap();
        assert_eq!(fixed[0].slots, strings(&["", "I don't write"]));
        assert_eq!(fixed[0].words(), vec!["I", "don't", "write"]);
    }

    #[test]
    fn test_adverb_moves_inside_verb_slot() {
        let source = source(&[("siempre", Some("rg")), ("escribo", Some("vmip1s0"))]);
        let fixed = NegationFix.apply(&source, candidates(&[&["always", "I write"]])).unwrap();
        assert_eq!(fixed[0].slots, strings(&["", "I always write"]));

        // Single-word verb slot: nothing to split around.
        let fixed = NegationFix.apply(&source, candidates(&[&["always", "writes"]])).unwrap();
        assert_eq!(fixed[0].slots, strings(&["always", "writes"]));
    }

    #[test]
    fn test_negation_requires_pos() {
        assert!(NegationFix.apply(&Annotation::new(), Vec::new()).is_err());
    }

    #[test]
    fn test_language_model_selection() {
        let corpus = strings(&["i", "like", "cats", "i", "like", "dogs"]);
        let model = LanguageModel::train(&[corpus]);
        let selection = LanguageModelSelection::new(&model);

        let picked = selection
            .apply(&Annotation::new(), candidates(&[&["i", "hate", "cats"], &["i", "like", "cats"]]))
            .unwrap();
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].slots, strings(&["i", "like", "cats"]));

        assert!(selection.apply(&Annotation::new(), Vec::new()).unwrap().is_empty());
    }
}
