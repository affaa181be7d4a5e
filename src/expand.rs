//! Grammatical expansion of translated verbs.
//!
//! Spanish drops subject pronouns and marks person on the verb; English needs
//! both an explicit subject and a third-person-singular "-s". The source tag
//! of each finite verb decides which pronoun and suffix its English slot gets.

use log::debug;

use crate::dictionary::cartesian_product;
use crate::error::Result;
use crate::postprocess::Postprocessor;
use crate::types::{Annotation, Candidate, Tagged};

/// How many slots before a verb are searched for a demonstrative subject.
const DEMONSTRATIVE_LOOKBACK: usize = 2;

/// English verbs that never take "-s".
const IRREGULAR_VERBS: &[&str] = &[
    "is", "are", "was", "were", "has", "can", "could", "may", "might", "must", "shall", "should",
    "will", "would",
];

// EAGLES verb tag positions
const MOOD: usize = 2;
const TENSE: usize = 3;
const PERSON: usize = 4;
const NUMBER: usize = 5;

/// Finite verbs: tagged `v` and not infinitive, gerund or participle.
fn is_finite_verb(tagged: &Tagged) -> bool {
    tagged.is('v') && !matches!(tagged.feature(MOOD), Some('n' | 'g' | 'p'))
}

/// Subject pronouns for a person/number pair. Third person singular offers
/// every gender and leaves the choice to the language model.
pub fn subject_pronouns(person: Option<char>, number: Option<char>) -> &'static [&'static str] {
    match (person, number) {
        (Some('1'), Some('s')) => &["I"],
        (Some('1'), _) => &["we"],
        (Some('2'), _) => &["you"],
        (Some('3'), Some('s')) => &["he", "she", "it"],
        (Some('3'), _) => &["they"],
        _ => &[],
    }
}

/// English third-person-singular present suffix for a verb.
pub fn third_person_suffix(verb: &str) -> &'static str {
    let lower = verb.to_lowercase();
    if lower.is_empty() || lower.ends_with('s') || IRREGULAR_VERBS.contains(&lower.as_str()) {
        ""
    } else if lower.ends_with(['o', 'x', 'z']) || lower.ends_with("ch") || lower.ends_with("sh") {
        "es"
    } else {
        "s"
    }
}

/// Expand each English translation of a verb slot into pronoun + verb
/// (+ suffix) variants. Non-verbs come back unchanged.
pub fn expand_verb(tagged: &Tagged, translations: &[String], use_pronoun: bool) -> Vec<String> {
    if !tagged.is('v') {
        return translations.to_vec();
    }

    let person = tagged.feature(PERSON);
    let number = tagged.feature(NUMBER);
    let third_singular_present =
        person == Some('3') && number == Some('s') && tagged.feature(TENSE) == Some('p');

    let pronouns: &[&str] = if use_pronoun {
        subject_pronouns(person, number)
    } else {
        &[]
    };

    let mut expanded = Vec::new();
    for translation in translations {
        let verb = if third_singular_present {
            inflect_first_word(translation)
        } else {
            translation.clone()
        };
        if pronouns.is_empty() {
            expanded.push(verb);
        } else {
            expanded.extend(pronouns.iter().map(|pronoun| format!("{} {}", pronoun, verb)));
        }
    }
    expanded
}

/// "look for" -> "looks for"
///
/// A leading infinitive marker is dropped: "to eat" -> "eats".
fn inflect_first_word(translation: &str) -> String {
    let translation = translation.strip_prefix("to ").unwrap_or(translation);
    let (first, rest) = match translation.split_once(' ') {
        Some((first, rest)) => (first, Some(rest)),
        None => (translation, None),
    };
    let inflected = format!("{}{}", first, third_person_suffix(first));
    match rest {
        Some(rest) => format!("{} {}", inflected, rest),
        None => inflected,
    }
}

/// Whether one of the `DEMONSTRATIVE_LOOKBACK` slots before `index` already
/// says "this".
fn demonstrative_before(slots: &[String], index: usize) -> bool {
    slots[index.saturating_sub(DEMONSTRATIVE_LOOKBACK)..index]
        .iter()
        .flat_map(|slot| slot.split_whitespace())
        .any(|word| word.eq_ignore_ascii_case("this"))
}

/// Adds subject pronouns and "-s" to finite verb slots, multiplying a
/// candidate out over the pronoun variants.
#[derive(Debug, Default)]
pub struct GrammaticalExpansion;

impl GrammaticalExpansion {
    pub fn new() -> Self {
        Self
    }

    fn expand_candidate(&self, pos: &[Tagged], candidate: &Candidate) -> Vec<Candidate> {
        let slots = &candidate.slots;
        let lists: Vec<Vec<String>> = slots
            .iter()
            .enumerate()
            .map(|(i, slot)| match pos.get(i) {
                Some(tagged) if is_finite_verb(tagged) && !slot.is_empty() => {
                    let subject_present = pos[..i].iter().any(|t| t.is('n') || t.is('p'))
                        || demonstrative_before(slots, i);
                    expand_verb(tagged, std::slice::from_ref(slot), !subject_present)
                }
                _ => vec![slot.clone()],
            })
            .collect();

        cartesian_product(&lists)
            .into_iter()
            .map(|slots| Candidate {
                slots,
                annotation: candidate.annotation.clone(),
            })
            .collect()
    }
}

impl Postprocessor for GrammaticalExpansion {
    fn name(&self) -> &'static str {
        "grammatical expansion"
    }

    fn apply(&self, source: &Annotation, candidates: Vec<Candidate>) -> Result<Vec<Candidate>> {
        let pos = source.require_pos(self.name())?;
        let expanded: Vec<Candidate> = candidates
            .iter()
            .flat_map(|candidate| self.expand_candidate(pos, candidate))
            .collect();
        debug!("Grammatical expansion: {} -> {} candidates", candidates.len(), expanded.len());
        Ok(expanded)
    }
}
