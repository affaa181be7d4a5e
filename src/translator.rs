//! Translators: the word-for-word baseline, the full candidate pipeline, and
//! the clause-splitting wrapper around it.

use log::debug;

use crate::clause::ClauseSplitter;
use crate::config::RulesConfig;
use crate::dictionary::{cartesian_product, Dictionary};
use crate::error::Result;
use crate::expand::GrammaticalExpansion;
use crate::language_model::LanguageModel;
use crate::postprocess::{
    ArticleFilter, DemonstrativeFix, LanguageModelSelection, NegationFix, Postprocessor,
};
use crate::preprocess::{AnnotatePos, PhraseJoiner, Preprocessor};
use crate::tagger::Tagger;
use crate::types::{Annotation, Candidate};

/// Punctuation written directly after the preceding word.
const CLOSING_PUNCTUATION: [&str; 4] = [",", ".", "!", "?"];

/// Translates one tokenized Spanish sentence. `Ok(None)` means every
/// candidate translation was filtered out.
pub trait Translator {
    fn translate(&self, sentence: &[String]) -> Result<Option<String>>;
}

/// Join words with single spaces, attach closing punctuation to the word
/// before it, and capitalize the first letter.
pub fn format_sentence<S: AsRef<str>>(words: &[S]) -> String {
    let mut joined = String::new();
    for word in words {
        let word = word.as_ref();
        if !joined.is_empty() && !CLOSING_PUNCTUATION.contains(&word) {
            joined.push(' ');
        }
        joined.push_str(word);
    }

    let mut chars = joined.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Baseline: every token becomes its first dictionary candidate.
pub struct DirectTranslator<'a> {
    dictionary: &'a Dictionary,
}

impl<'a> DirectTranslator<'a> {
    pub fn new(dictionary: &'a Dictionary) -> Self {
        Self { dictionary }
    }
}

impl Translator for DirectTranslator<'_> {
    fn translate(&self, sentence: &[String]) -> Result<Option<String>> {
        let words: Vec<String> = self
            .dictionary
            .candidates(sentence)
            .into_iter()
            .filter_map(|candidates| candidates.into_iter().next())
            .collect();
        Ok(Some(format_sentence(&words)))
    }
}

/// Preprocessing, candidate generation and postprocessing over one sentence.
///
/// Models and the dictionary are borrowed; the pipeline owns only its
/// ordered transform lists. Every transform is `Send + Sync`, so one pipeline
/// can translate sentences from several threads at once.
pub struct Pipeline<'a> {
    dictionary: &'a Dictionary,
    preprocessors: Vec<Box<dyn Preprocessor + 'a>>,
    postprocessors: Vec<Box<dyn Postprocessor + 'a>>,
}

impl<'a> Pipeline<'a> {
    /// An empty pipeline: plain dictionary lookup and Cartesian expansion.
    pub fn new(dictionary: &'a Dictionary) -> Self {
        Self {
            dictionary,
            preprocessors: Vec::new(),
            postprocessors: Vec::new(),
        }
    }

    pub fn with_preprocessor(mut self, step: impl Preprocessor + 'a) -> Self {
        self.preprocessors.push(Box::new(step));
        self
    }

    pub fn with_postprocessor(mut self, step: impl Postprocessor + 'a) -> Self {
        self.postprocessors.push(Box::new(step));
        self
    }

    /// The default pipeline: annotate POS, join phrases, reorder; then
    /// demonstrative fix, grammatical expansion, a/an filter, negation fix
    /// and language model selection.
    pub fn standard(
        dictionary: &'a Dictionary,
        tagger: &'a dyn Tagger,
        model: &'a LanguageModel,
        rules: &RulesConfig,
    ) -> Result<Self> {
        let mut pipeline = Self::new(dictionary)
            .with_preprocessor(AnnotatePos::new(tagger))
            .with_preprocessor(PhraseJoiner::new(rules.phrase_rules()?));
        for reorder in rules.reorder_rules()? {
            pipeline = pipeline.with_preprocessor(reorder);
        }

        Ok(pipeline
            .with_postprocessor(DemonstrativeFix::new(rules.demonstrative_rules()?))
            .with_postprocessor(GrammaticalExpansion::new())
            .with_postprocessor(ArticleFilter)
            .with_postprocessor(NegationFix)
            .with_postprocessor(LanguageModelSelection::new(model)))
    }

    /// Run the preprocessors in order, checking after each one that the
    /// annotation still lines up with the sentence.
    pub fn preprocess(&self, sentence: Vec<String>) -> Result<(Vec<String>, Annotation)> {
        let mut state = (sentence, Annotation::new());
        for step in &self.preprocessors {
            let (sentence, annotation) = step.apply(state.0, state.1)?;
            annotation.check_aligned(step.name(), &sentence)?;
            state = (sentence, annotation);
        }
        Ok(state)
    }

    /// Every combination of dictionary candidates, all-defaults first.
    pub fn generate(&self, sentence: &[String]) -> Vec<Candidate> {
        let candidates: Vec<Candidate> =
            cartesian_product(&self.dictionary.candidates(sentence))
                .into_iter()
                .map(Candidate::new)
                .collect();
        debug!("Generated {} candidates for {:?}", candidates.len(), sentence);
        candidates
    }

    pub fn postprocess(
        &self,
        source: &Annotation,
        mut candidates: Vec<Candidate>,
    ) -> Result<Vec<Candidate>> {
        for step in &self.postprocessors {
            candidates = step.apply(source, candidates)?;
            debug!("After {}: {} candidates", step.name(), candidates.len());
        }
        Ok(candidates)
    }

    /// The words of the winning candidate, or `None` when nothing survives.
    pub fn translate_words(&self, sentence: &[String]) -> Result<Option<Vec<String>>> {
        let (sentence, source) = self.preprocess(sentence.to_vec())?;
        let candidates = self.generate(&sentence);
        let survivors = self.postprocess(&source, candidates)?;

        Ok(survivors
            .first()
            .map(|winner| winner.words().into_iter().map(str::to_string).collect()))
    }
}

impl Translator for Pipeline<'_> {
    fn translate(&self, sentence: &[String]) -> Result<Option<String>> {
        Ok(self
            .translate_words(sentence)?
            .map(|words| format_sentence(&words)))
    }
}

/// Runs the pipeline once per clause and once per boundary token, then joins
/// the pieces. Any piece without a translation leaves the whole sentence
/// without one.
pub struct ClauseTranslator<'a> {
    pipeline: Pipeline<'a>,
    splitter: ClauseSplitter,
}

impl<'a> ClauseTranslator<'a> {
    pub fn new(pipeline: Pipeline<'a>, splitter: ClauseSplitter) -> Self {
        Self { pipeline, splitter }
    }
}

impl Translator for ClauseTranslator<'_> {
    fn translate(&self, sentence: &[String]) -> Result<Option<String>> {
        let mut words = Vec::new();

        for (clause, boundary) in self.splitter.split(sentence) {
            let mut pieces = vec![clause];
            pieces.extend(boundary.map(|b| vec![b]));

            for piece in pieces.iter().filter(|piece| !piece.is_empty()) {
                match self.pipeline.translate_words(piece)? {
                    Some(translated) => words.extend(translated),
                    None => {
                        debug!("No translation survived for clause {:?}", piece);
                        return Ok(None);
                    }
                }
            }
        }

        Ok(Some(format_sentence(&words)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::{HeuristicTagger, LexiconTagger};

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn dictionary() -> Dictionary {
        Dictionary::from_entries([
            ("el", vec!["the"]),
            ("gato", vec!["cat"]),
            ("perro", vec!["dog"]),
            ("corre", vec!["run"]),
            ("y", vec!["and"]),
        ])
    }

    fn tagger() -> HeuristicTagger<LexiconTagger> {
        HeuristicTagger::new(LexiconTagger::from_lexicon([
            ("el", "da0ms0"),
            ("gato", "ncms000"),
            ("perro", "ncms000"),
            ("correr", "vmn0000"),
            ("y", "cc"),
        ]))
        .unwrap()
    }

    fn model() -> LanguageModel {
        LanguageModel::train(&[vec!["the", "cat", "runs", "and", "the", "dog", "runs"]])
    }

    #[test]
    fn test_format_sentence() {
        assert_eq!(format_sentence(&["the", "cat", ",", "the", "dog", "."]), "The cat, the dog.");
        assert_eq!(format_sentence(&["¿", "where", "?"]), "¿ where?");
        assert_eq!(format_sentence::<&str>(&[]), "");
    }

    #[test]
    fn test_direct_translation_keeps_unknown_tokens() {
        let dictionary = dictionary();
        let translator = DirectTranslator::new(&dictionary);
        let translated = translator.translate(&tokens(&["el", "xyz123", "Gato"])).unwrap();
        assert_eq!(translated.as_deref(), Some("The xyz123 cat"));
    }

    #[test]
    fn test_empty_pipeline_picks_all_defaults() {
        let dictionary = Dictionary::from_entries([("gato", vec!["cat", "tomcat"])]);
        let pipeline = Pipeline::new(&dictionary);
        assert_eq!(pipeline.generate(&tokens(&["gato"])).len(), 2);
        let translated = pipeline.translate(&tokens(&["gato"])).unwrap();
        assert_eq!(translated.as_deref(), Some("Cat"));
    }

    #[test]
    fn test_standard_pipeline_end_to_end() {
        let (dictionary, tagger, model) = (dictionary(), tagger(), model());
        let pipeline =
            Pipeline::standard(&dictionary, &tagger, &model, &RulesConfig::default()).unwrap();

        let translated = pipeline.translate(&tokens(&["el", "gato"])).unwrap();
        assert_eq!(translated.as_deref(), Some("The cat"));

        // Heuristic tag on "corre", noun subject so no pronoun, and "-s".
        let translated = pipeline.translate(&tokens(&["el", "gato", "corre"])).unwrap();
        assert_eq!(translated.as_deref(), Some("The cat runs"));
    }

    #[test]
    fn test_pipeline_is_shared_across_threads() {
        fn assert_sync<T: Sync>(_: &T) {}

        let (dictionary, tagger, model) = (dictionary(), tagger(), model());
        let pipeline =
            Pipeline::standard(&dictionary, &tagger, &model, &RulesConfig::default()).unwrap();
        assert_sync(&pipeline);

        std::thread::scope(|scope| {
            let cat = scope.spawn(|| pipeline.translate(&tokens(&["el", "gato", "corre"])));
            let dog = scope.spawn(|| pipeline.translate(&tokens(&["el", "perro"])));
            assert_eq!(cat.join().unwrap().unwrap().as_deref(), Some("The cat runs"));
            assert_eq!(dog.join().unwrap().unwrap().as_deref(), Some("The dog"));
        });
    }

    #[test]
    fn test_preprocess_checks_alignment() {
        struct DropLast;
        impl Preprocessor for DropLast {
            fn name(&self) -> &'static str {
                "drop last"
            }
            fn apply(
                &self,
                mut sentence: Vec<String>,
                annotation: Annotation,
            ) -> Result<(Vec<String>, Annotation)> {
                sentence.pop();
                Ok((sentence, annotation))
            }
        }

        let dictionary = dictionary();
        let tagger = tagger();
        let pipeline = Pipeline::new(&dictionary)
            .with_preprocessor(AnnotatePos::new(&tagger))
            .with_preprocessor(DropLast);
        let err = pipeline.preprocess(tokens(&["el", "gato"])).unwrap_err();
        assert!(matches!(
            err,
            crate::error::TranslateError::AnnotationMismatch { stage: "drop last", annotated: 2, tokens: 1 }
        ));
    }

    #[test]
    fn test_pipeline_returns_none_when_everything_is_filtered() {
        let dictionary = Dictionary::from_entries([("una", vec!["a"]), ("manzana", vec!["apple"])]);
        let pipeline = Pipeline::new(&dictionary).with_postprocessor(ArticleFilter);
        assert_eq!(pipeline.translate(&tokens(&["una", "manzana"])).unwrap(), None);
    }

    #[test]
    fn test_clause_translator_joins_pieces() {
        let (dictionary, tagger, model) = (dictionary(), tagger(), model());
        let pipeline =
            Pipeline::standard(&dictionary, &tagger, &model, &RulesConfig::default()).unwrap();
        let translator = ClauseTranslator::new(pipeline, ClauseSplitter::default());

        let translated = translator
            .translate(&tokens(&["el", "gato", ",", "el", "perro"]))
            .unwrap();
        assert_eq!(translated.as_deref(), Some("The cat, the dog"));

        let translated = translator
            .translate(&tokens(&["el", "gato", "y", "el", "perro"]))
            .unwrap();
        assert_eq!(translated.as_deref(), Some("The cat and the dog"));
    }

    #[test]
    fn test_clause_translator_fails_whole_sentence() {
        let dictionary = Dictionary::from_entries([
            ("una", vec!["a"]),
            ("manzana", vec!["apple"]),
            ("gato", vec!["cat"]),
        ]);
        let pipeline = Pipeline::new(&dictionary).with_postprocessor(ArticleFilter);
        let translator = ClauseTranslator::new(pipeline, ClauseSplitter::default());
        let translated = translator
            .translate(&tokens(&["gato", ",", "una", "manzana"]))
            .unwrap();
        assert_eq!(translated, None);
    }
}
