//! Part-of-speech tagging.
//!
//! [`LexiconTagger`] is a trainable bigram tagger with unigram backoff.
//! [`HeuristicTagger`] wraps any [`Tagger`] and recovers tags the base tagger
//! missed: conjugated verbs and inflected adjectives are reduced to a root
//! form, and the root is re-tagged to confirm the guess.

use log::{debug, info};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{Result, TranslateError};
use crate::types::Tagged;

/// Assigns EAGLES tags to a token sequence. Tokens the tagger knows nothing
/// about come back with `tag: None`. Taggers are shared read-only between
/// threads.
pub trait Tagger: Send + Sync {
    fn tag(&self, tokens: &[String]) -> Vec<Tagged>;
}

impl<T: Tagger + ?Sized> Tagger for &T {
    fn tag(&self, tokens: &[String]) -> Vec<Tagged> {
        (**self).tag(tokens)
    }
}

/// Context key used for the first token of a sentence and after an untagged token.
const NO_TAG: &str = "";

/// Bigram tagger with unigram backoff.
///
/// Tags each token with the most frequent training tag seen after the
/// previously predicted tag; falls back to the token's overall most frequent
/// tag (exact form, then lowercase), and finally to no tag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LexiconTagger {
    unigram: HashMap<String, String>,
    /// previous tag -> word -> tag
    bigram: HashMap<String, HashMap<String, String>>,
}

impl LexiconTagger {
    /// A unigram-only tagger from a fixed word→tag table.
    pub fn from_lexicon<I, W, T>(entries: I) -> Self
    where
        I: IntoIterator<Item = (W, T)>,
        W: Into<String>,
        T: Into<String>,
    {
        Self {
            unigram: entries
                .into_iter()
                .map(|(word, tag)| (word.into(), tag.into()))
                .collect(),
            bigram: HashMap::new(),
        }
    }

    /// Train from tagged sentences. Untagged training tokens are ignored.
    pub fn train(sentences: &[Vec<Tagged>]) -> Self {
        let mut unigram_counts: HashMap<String, HashMap<String, usize>> = HashMap::new();
        let mut bigram_counts: HashMap<String, HashMap<String, HashMap<String, usize>>> =
            HashMap::new();

        for sentence in sentences {
            let mut previous = NO_TAG;
            for tagged in sentence {
                let tag = match tagged.tag.as_deref() {
                    Some(tag) => tag,
                    None => {
                        previous = NO_TAG;
                        continue;
                    }
                };
                *unigram_counts
                    .entry(tagged.token.clone())
                    .or_default()
                    .entry(tag.to_string())
                    .or_insert(0) += 1;
                *bigram_counts
                    .entry(previous.to_string())
                    .or_default()
                    .entry(tagged.token.clone())
                    .or_default()
                    .entry(tag.to_string())
                    .or_insert(0) += 1;
                previous = tag;
            }
        }

        let unigram = unigram_counts
            .into_iter()
            .filter_map(|(word, counts)| most_frequent(&counts).map(|tag| (word, tag)))
            .collect();
        let bigram = bigram_counts
            .into_iter()
            .map(|(context, words)| {
                let words = words
                    .into_iter()
                    .filter_map(|(word, counts)| most_frequent(&counts).map(|tag| (word, tag)))
                    .collect();
                (context, words)
            })
            .collect();

        Self { unigram, bigram }
    }

    /// Train from a tagged corpus file (`word/TAG` pairs, one sentence per line).
    pub fn from_tagged_corpus(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| TranslateError::io(path, e))?;
        let sentences = parse_tagged_corpus(&content)?;
        info!("Training part-of-speech tagger on {} sentences from {:?}", sentences.len(), path);
        Ok(Self::train(&sentences))
    }

    /// Load a previously saved model.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| TranslateError::io(path, e))?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json).map_err(|e| TranslateError::io(path, e))
    }

    /// Load the model from `cache` if it exists; otherwise train it from
    /// `corpus` and write the cache for the next run.
    pub fn cached(cache: impl AsRef<Path>, corpus: impl AsRef<Path>) -> Result<Self> {
        let cache = cache.as_ref();
        if cache.is_file() {
            info!("Loading part-of-speech tagger from {:?}", cache);
            return Self::load(cache);
        }
        let tagger = Self::from_tagged_corpus(corpus)?;
        tagger.save(cache)?;
        info!("Saved part-of-speech tagger to {:?}", cache);
        Ok(tagger)
    }

    fn lookup(&self, previous: &str, token: &str) -> Option<&str> {
        self.bigram
            .get(previous)
            .and_then(|words| words.get(token))
            .or_else(|| self.unigram.get(token))
            .or_else(|| self.unigram.get(&token.to_lowercase()))
            .map(String::as_str)
    }
}

impl Tagger for LexiconTagger {
    fn tag(&self, tokens: &[String]) -> Vec<Tagged> {
        let mut previous = NO_TAG;
        let mut tagged = Vec::with_capacity(tokens.len());
        for token in tokens {
            let tag = self.lookup(previous, token);
            previous = tag.unwrap_or(NO_TAG);
            tagged.push(Tagged::new(token.clone(), tag));
        }
        tagged
    }
}

/// Highest count wins; ties go to the lexicographically smallest tag.
fn most_frequent(counts: &HashMap<String, usize>) -> Option<String> {
    counts
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(tag, _)| tag.clone())
}

/// Parse `word/TAG word/TAG ...` lines. The split is at the last `/`, so
/// tokens such as `1/2/Zd` keep their inner slashes.
pub fn parse_tagged_corpus(content: &str) -> Result<Vec<Vec<Tagged>>> {
    let mut sentences = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let mut sentence = Vec::new();
        for item in line.split_whitespace() {
            let split = item.rfind('/').filter(|&i| i > 0 && i + 1 < item.len());
            let Some(split) = split else {
                return Err(TranslateError::TaggedCorpusFormat {
                    line: index + 1,
                    reason: format!("expected word/TAG, found {:?}", item),
                });
            };
            sentence.push(Tagged::new(&item[..split], Some(&item[split + 1..])));
        }
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
    }
    Ok(sentences)
}

/// Suffix rewrites from a conjugated verb to its infinitive, with the tag the
/// original token gets if the infinitive is confirmed. Order matters: the
/// first confirming rule wins.
const VERB_RULES: &[(&str, &str, &str)] = &[
    // presente de indicativo
    ("o$", "ar", "vmip1s0"),
    ("as$", "ar", "vmip2s0"),
    ("a$", "ar", "vmip3s0"),
    ("amos$", "ar", "vmip1p0"),
    ("áis$", "ar", "vmip2p0"),
    ("an$", "ar", "vmip3p0"),
    ("o$", "er", "vmip1s0"),
    ("es$", "er", "vmip2s0"),
    ("e$", "er", "vmip3s0"),
    ("emos$", "er", "vmip1p0"),
    ("éis$", "er", "vmip2p0"),
    ("en$", "er", "vmip3p0"),
    ("o$", "ir", "vmip1s0"),
    ("es$", "ir", "vmip2s0"),
    ("e$", "ir", "vmip3s0"),
    ("imos$", "ir", "vmip1p0"),
    ("ís$", "ir", "vmip2p0"),
    ("en$", "ir", "vmip3p0"),
    // pretérito imperfecto
    ("aba$", "ar", "vmii1s0"),
    ("abas$", "ar", "vmii2s0"),
    ("ábamos$", "ar", "vmii1p0"),
    ("abais$", "ar", "vmii2p0"),
    ("aban$", "ar", "vmii3p0"),
    ("ía$", "er", "vmii1s0"),
    ("ías$", "er", "vmii2s0"),
    ("íamos$", "er", "vmii1p0"),
    ("íais$", "er", "vmii2p0"),
    ("ían$", "er", "vmii3p0"),
    ("ía$", "ir", "vmii1s0"),
    ("ías$", "ir", "vmii2s0"),
    ("íamos$", "ir", "vmii1p0"),
    ("íais$", "ir", "vmii2p0"),
    ("ían$", "ir", "vmii3p0"),
    ("ía$", "ír", "vmii1s0"),
    ("ías$", "ír", "vmii2s0"),
    ("íamos$", "ír", "vmii1p0"),
    ("íais$", "ír", "vmii2p0"),
    ("ían$", "ír", "vmii3p0"),
    // pretérito perfecto simple; the 1p forms are ambiguous with the present
    ("é$", "ar", "vmis1s0"),
    ("aste$", "ar", "vmis2s0"),
    ("ó$", "ar", "vmis3s0"),
    ("asteis$", "ar", "vmis2p0"),
    ("aron$", "ar", "vmis3p0"),
    ("í$", "er", "vmis1s0"),
    ("iste$", "er", "vmis2s0"),
    ("ió$", "er", "vmis3s0"),
    ("isteis$", "er", "vmis2p0"),
    ("ieron$", "er", "vmis3p0"),
    ("í$", "ir", "vmis1s0"),
    ("iste$", "ir", "vmis2s0"),
    ("ió$", "ir", "vmis3s0"),
    ("isteis$", "ir", "vmis2p0"),
    ("ieron$", "ir", "vmis3p0"),
    // futuro
    ("aré$", "ar", "vmif1s0"),
    ("arás$", "ar", "vmif2s0"),
    ("ará$", "ar", "vmif3s0"),
    ("aremos$", "ar", "vmif1p0"),
    ("aréis$", "ar", "vmif2p0"),
    ("arán$", "ar", "vmif3p0"),
    ("eré$", "er", "vmif1s0"),
    ("erás$", "er", "vmif2s0"),
    ("erá$", "er", "vmif3s0"),
    ("eremos$", "er", "vmif1p0"),
    ("eréis$", "er", "vmif2p0"),
    ("erán$", "er", "vmif3p0"),
    ("iré$", "ir", "vmif1s0"),
    ("irás$", "ir", "vmif2s0"),
    ("irá$", "ir", "vmif3s0"),
    ("iremos$", "ir", "vmif1p0"),
    ("iréis$", "ir", "vmif2p0"),
    ("irán$", "ir", "vmif3p0"),
    // condicional
    ("aría$", "ar", "vmic1s0"),
    ("arías$", "ar", "vmic2s0"),
    ("aríamos$", "ar", "vmic1p0"),
    ("aríais$", "ar", "vmic2p0"),
    ("arían$", "ar", "vmic3p0"),
    ("ería$", "er", "vmic1s0"),
    ("erías$", "er", "vmic2s0"),
    ("eríamos$", "er", "vmic1p0"),
    ("eríais$", "er", "vmic2p0"),
    ("erían$", "er", "vmic3p0"),
    ("iría$", "ir", "vmic1s0"),
    ("irías$", "ir", "vmic2s0"),
    ("iríamos$", "ir", "vmic1p0"),
    ("iríais$", "ir", "vmic2p0"),
    ("irían$", "ir", "vmic3p0"),
    // presente de subjuntivo
    ("e$", "ar", "vmsp1s0"),
    ("es$", "ar", "vmsp2s0"),
    ("emos$", "ar", "vmsp1p0"),
    ("éis$", "ar", "vmsp2p0"),
    ("en$", "ar", "vmsp3p0"),
    ("a$", "er", "vmsp1s0"),
    ("as$", "er", "vmsp2s0"),
    ("amos$", "er", "vmsp1p0"),
    ("áis$", "er", "vmsp2p0"),
    ("an$", "er", "vmsp3p0"),
    ("a$", "ir", "vmsp1s0"),
    ("as$", "ir", "vmsp2s0"),
    ("amos$", "ir", "vmsp1p0"),
    ("áis$", "ir", "vmsp2p0"),
    ("an$", "ir", "vmsp3p0"),
    // pretérito imperfecto de subjuntivo (-ra)
    ("ara$", "ar", "vmsi1s0"),
    ("aras$", "ar", "vmsi2s0"),
    ("áramos$", "ar", "vmsi1p0"),
    ("arais$", "ar", "vmsi2p0"),
    ("aran$", "ar", "vmsi3p0"),
    ("iera$", "er", "vmsi1s0"),
    ("ieras$", "er", "vmsi2s0"),
    ("iéramos$", "er", "vmsi1p0"),
    ("ierais$", "er", "vmsi2p0"),
    ("ieran$", "er", "vmsi3p0"),
    ("iera$", "ir", "vmsi1s0"),
    ("ieras$", "ir", "vmsi2s0"),
    ("iéramos$", "ir", "vmsi1p0"),
    ("ierais$", "ir", "vmsi2p0"),
    ("ieran$", "ir", "vmsi3p0"),
    // pretérito imperfecto de subjuntivo (-se)
    ("ase$", "ar", "vmsi1s0"),
    ("ases$", "ar", "vmsi2s0"),
    ("ásemos$", "ar", "vmsi1p0"),
    ("aseis$", "ar", "vmsi2p0"),
    ("asen$", "ar", "vmsi3p0"),
    ("iese$", "er", "vmsi1s0"),
    ("ieses$", "er", "vmsi2s0"),
    ("iésemos$", "er", "vmsi1p0"),
    ("ieseis$", "er", "vmsi2p0"),
    ("iesen$", "er", "vmsi3p0"),
    ("iese$", "ir", "vmsi1s0"),
    ("ieses$", "ir", "vmsi2s0"),
    ("iésemos$", "ir", "vmsi1p0"),
    ("ieseis$", "ir", "vmsi2p0"),
    ("iesen$", "ir", "vmsi3p0"),
    // gerundio
    ("ando$", "ar", "vmg0000"),
    ("iendo$", "er", "vmg0000"),
    ("iendo$", "ir", "vmg0000"),
    // participio pasado
    ("ado$", "ar", "vmp00sm"),
    ("ada$", "ar", "vmp00sf"),
    ("ados$", "ar", "vmp00pm"),
    ("adas$", "ar", "vmp00pf"),
    ("ido$", "er", "vmp00sm"),
    ("ida$", "er", "vmp00sf"),
    ("idos$", "er", "vmp00pm"),
    ("idas$", "er", "vmp00pf"),
    ("ido$", "ir", "vmp00sm"),
    ("ida$", "ir", "vmp00sf"),
    ("idos$", "ir", "vmp00pm"),
    ("idas$", "ir", "vmp00pf"),
    // infinitivo con pronombre(s) enclítico(s)
    ("([aei])r(?:[mtl]es?|n?os)", "${1}r", "vmn0000"),
    ("([aei])r(?:[mt]e|l[oa]s?|n?os)", "${1}r", "vmn0000"),
    // gerundio con pronombre(s) enclítico(s)
    ("ándo(?:[mtl]es?|n?os)", "ar", "vmg0000"),
    ("iéndo(?:[mtl]es?|n?os)", "er", "vmg0000"),
    ("iéndo(?:[mtl]es?|n?os)", "ir", "vmg0000"),
];

/// Suffix rewrites from an inflected adjective to its masculine singular root,
/// with the gender/number pair the observed form carries.
const ADJECTIVE_RULES: &[(&str, &str, &str)] = &[
    ("a$", "o", "fs"),
    ("os$", "o", "mp"),
    ("as$", "o", "fp"),
    ("es$", "e", "cp"),
];

/// Roots the base tagger cannot confirm, already joined with the ending the
/// verb rules would produce.
const IRREGULAR_STEMS: &[&str] = &[
    // subjunctive stems
    "hager", "vengir",
    // conditional / future stems
    "cabrer", "pondrer", "dirir", "habrer", "saldrir", "harer", "podrer", "tendrer", "querrer",
    "valdrer", "sabrer", "vendrir",
    // preterite stems
    "anduvar", "estuvar", "tuver", "cuper", "huber", "puder", "puser", "super", "hicer",
    "quiser", "vinir",
    // regular verbs commonly missing from tagged corpora
    "doler", "gastar", "reír", "rogar", "sujetar",
    // saber ("sé")
    "sar",
];

/// Tags accepted as proof that a rewritten root is an infinitive.
const INFINITIVE_TAGS: &[&str] = &["vmn0000", "van0000"];

/// Object pronoun person/gender/number codes.
const DIRECT_OBJECT_PRONOUNS: &[(&str, &str)] = &[
    ("me", "1cs"),
    ("te", "2cs"),
    ("lo", "3ms"),
    ("la", "3fs"),
    ("nos", "1cp"),
    ("os", "2cp"),
    ("los", "3mp"),
    ("las", "3fp"),
];

const INDIRECT_OBJECT_PRONOUNS: &[(&str, &str)] = &[
    ("me", "1cs"),
    ("te", "2cs"),
    ("le", "3cs"),
    ("nos", "1cp"),
    ("os", "2cp"),
    ("les", "3cp"),
];

#[derive(Debug)]
struct SuffixRule {
    pattern: Regex,
    replacement: &'static str,
    tag: &'static str,
}

impl SuffixRule {
    fn compile(table: &[(&'static str, &'static str, &'static str)]) -> Result<Vec<Self>> {
        table
            .iter()
            .map(|&(pattern, replacement, tag)| {
                Ok(SuffixRule {
                    pattern: Regex::new(pattern)
                        .map_err(|e| TranslateError::invalid_pattern(pattern, e))?,
                    replacement,
                    tag,
                })
            })
            .collect()
    }

    /// The rewritten root, or `None` when the rule does not apply.
    fn rewrite(&self, token: &str) -> Option<String> {
        let rewritten = self.pattern.replace_all(token, self.replacement);
        if rewritten == token {
            None
        } else {
            Some(rewritten.into_owned())
        }
    }
}

/// Heuristic layer over a base tagger.
pub struct HeuristicTagger<T> {
    base: T,
    verb_rules: Vec<SuffixRule>,
    adjective_rules: Vec<SuffixRule>,
    irregular_stems: Regex,
}

impl<T: Tagger> HeuristicTagger<T> {
    pub fn new(base: T) -> Result<Self> {
        let stems = format!("(?:{})$", IRREGULAR_STEMS.join("|"));
        let irregular_stems =
            Regex::new(&stems).map_err(|e| TranslateError::invalid_pattern(stems.as_str(), e))?;

        Ok(Self {
            base,
            verb_rules: SuffixRule::compile(VERB_RULES)?,
            adjective_rules: SuffixRule::compile(ADJECTIVE_RULES)?,
            irregular_stems,
        })
    }

    /// Tag of `word` when tagged on its own by the base tagger.
    fn tag_alone(&self, word: &str) -> Option<String> {
        self.base
            .tag(&[word.to_string()])
            .into_iter()
            .next()
            .and_then(|tagged| tagged.tag)
    }

    /// Verb tag for an untagged token, from the first rule whose root is
    /// confirmed as an infinitive.
    fn verb_tag(&self, token: &str) -> Option<&'static str> {
        for rule in &self.verb_rules {
            let Some(root) = rule.rewrite(token) else {
                continue;
            };
            let root_tag = self.tag_alone(&root);
            let confirmed = root_tag
                .as_deref()
                .map_or(false, |tag| INFINITIVE_TAGS.contains(&tag))
                || self.irregular_stems.is_match(&root);
            if confirmed {
                debug!("Tagged {:?} as {} via infinitive {:?}", token, rule.tag, root);
                return Some(rule.tag);
            }
        }
        None
    }

    /// Adjective tag for an untagged token: the root's tag with the observed
    /// gender and number spliced into positions 3 and 4.
    fn adjective_tag(&self, token: &str) -> Option<String> {
        for rule in &self.adjective_rules {
            let Some(root) = rule.rewrite(token) else {
                continue;
            };
            let Some(root_tag) = self.tag_alone(&root) else {
                continue;
            };
            if root_tag.starts_with('a') {
                let tag: String = root_tag
                    .chars()
                    .take(3)
                    .chain(rule.tag.chars())
                    .chain(root_tag.chars().skip(5))
                    .collect();
                debug!("Tagged {:?} as {} via adjective root {:?}", token, tag, root);
                return Some(tag);
            }
        }
        None
    }
}

/// Object pronouns are unambiguous out of context; direct object readings
/// take precedence for forms that are both direct and indirect.
fn object_pronoun_tag(token: &str) -> Option<String> {
    let lower = token.to_lowercase();
    if let Some((_, form)) = DIRECT_OBJECT_PRONOUNS.iter().find(|(p, _)| *p == lower) {
        return Some(format!("pp{}a00", form));
    }
    INDIRECT_OBJECT_PRONOUNS
        .iter()
        .find(|(p, _)| *p == lower)
        .map(|(_, form)| format!("pp{}d00", form))
}

impl<T: Tagger> Tagger for HeuristicTagger<T> {
    fn tag(&self, tokens: &[String]) -> Vec<Tagged> {
        let mut tagged = self.base.tag(tokens);

        for entry in tagged.iter_mut().filter(|t| t.tag.is_none()) {
            entry.tag = self.verb_tag(&entry.token).map(str::to_string);
        }
        for entry in tagged.iter_mut().filter(|t| t.tag.is_none()) {
            entry.tag = self.adjective_tag(&entry.token);
        }
        for entry in tagged.iter_mut() {
            if let Some(tag) = object_pronoun_tag(&entry.token) {
                entry.tag = Some(tag);
            }
        }

        let untagged: Vec<&str> = tagged
            .iter()
            .filter(|t| t.tag.is_none())
            .map(|t| t.token.as_str())
            .collect();
        if !untagged.is_empty() {
            debug!("Untagged: {:?}", untagged);
        }

        tagged
    }
}
