use dict_translate::{
    ClauseSplitter, ClauseTranslator, DirectTranslator, Dictionary, HeuristicTagger,
    LanguageModel, LexiconTagger, Pipeline, RulesConfig, Tokenizer, TranslateError, Translator,
    WordTokenizer,
};
use std::fs;
use tempfile::TempDir;

const DICTIONARY: &str = "\
# spanish,english...
el,the
la,the
gato,cat
negro,black
come,eat
pescado,fish
escribo,write
cartas,letters
no,no
lo,it
quiero,want
una,a,an,one
manzana,apple
y,and
";

const TAGGED_CORPUS: &str = "\
el/da0ms0 gato/ncms000 negro/aq0ms0 come/vmip3s0 pescado/ncms000 ./Fp
yo/pp1csn00 quiero/vmip1s0 comer/vmn0000 ./Fp
la/da0fs0 casa/ncfs000 blanca/aq0fs0 ./Fp
no/rn escribir/vmn0000 cartas/ncfp000 ./Fp
";

const ENGLISH: &str = "the black cat eats fish . i ate an apple . i want it .";

/// Models trained from files, the way the binary loads them.
struct Fixture {
    _dir: TempDir,
    dictionary: Dictionary,
    tagger: HeuristicTagger<LexiconTagger>,
    model: LanguageModel,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let dictionary_path = dir.path().join("dict.txt");
        fs::write(&dictionary_path, DICTIONARY).unwrap();
        let tagged_path = dir.path().join("tagged.txt");
        fs::write(&tagged_path, TAGGED_CORPUS).unwrap();
        let corpus_dir = dir.path().join("corpus");
        fs::create_dir(&corpus_dir).unwrap();
        fs::write(corpus_dir.join("english.txt"), ENGLISH).unwrap();

        let dictionary = Dictionary::from_file(&dictionary_path).unwrap();
        let tagger =
            HeuristicTagger::new(LexiconTagger::from_tagged_corpus(&tagged_path).unwrap()).unwrap();
        let model = LanguageModel::from_corpus_dir(&corpus_dir).unwrap();

        Self {
            _dir: dir,
            dictionary,
            tagger,
            model,
        }
    }

    fn pipeline(&self) -> Pipeline<'_> {
        Pipeline::standard(&self.dictionary, &self.tagger, &self.model, &RulesConfig::default())
            .unwrap()
    }

    fn translate(&self, line: &str) -> Option<String> {
        let tokens = WordTokenizer::new().unwrap().tokenize(line);
        let translator = ClauseTranslator::new(self.pipeline(), ClauseSplitter::default());
        translator.translate(&tokens).unwrap()
    }
}

#[test]
fn test_adjective_moves_before_noun() {
    let fixture = Fixture::new();
    assert_eq!(fixture.translate("El gato negro come.").as_deref(), Some("The black cat eats."));
}

#[test]
fn test_dropped_subject_gets_pronoun() {
    let fixture = Fixture::new();
    assert_eq!(fixture.translate("Escribo cartas").as_deref(), Some("I write letters"));
}

#[test]
fn test_negation_moves_inside_verb() {
    let fixture = Fixture::new();
    assert_eq!(fixture.translate("No escribo cartas").as_deref(), Some("I don't write letters"));
}

#[test]
fn test_object_pronoun_follows_verb() {
    let fixture = Fixture::new();
    assert_eq!(fixture.translate("Lo quiero").as_deref(), Some("I want it"));
}

#[test]
fn test_language_model_picks_article() {
    let fixture = Fixture::new();
    assert_eq!(fixture.translate("Una manzana").as_deref(), Some("An apple"));
}

#[test]
fn test_clauses_are_translated_separately() {
    let fixture = Fixture::new();
    assert_eq!(
        fixture.translate("El gato come pescado y escribo cartas").as_deref(),
        Some("The cat eats fish and I write letters")
    );
}

#[test]
fn test_unknown_words_pass_through() {
    let fixture = Fixture::new();
    assert_eq!(fixture.translate("el xyz123").as_deref(), Some("The xyz123"));

    let direct = DirectTranslator::new(&fixture.dictionary);
    let tokens = vec!["xyz123".to_string()];
    assert_eq!(direct.translate(&tokens).unwrap().as_deref(), Some("Xyz123"));
}

#[test]
fn test_annotation_stays_aligned_through_preprocessing() {
    let fixture = Fixture::new();
    let pipeline = fixture.pipeline();
    let tokens = WordTokenizer::new().unwrap().tokenize("de que el gato negro lo quiero");
    let (sentence, annotation) = pipeline.preprocess(tokens).unwrap();
    assert_eq!(annotation.pos.unwrap().len(), sentence.len());
    assert_eq!(sentence[0], "que");
}

#[test]
fn test_malformed_dictionary_reports_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dict.txt");
    fs::write(&path, "gato,cat\nperro\n").unwrap();
    match Dictionary::from_file(&path) {
        Err(TranslateError::DictionaryFormat { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected a format error, got {:?}", other),
    }
}
