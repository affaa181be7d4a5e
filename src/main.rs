use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};

use dict_translate::config::Config;
use dict_translate::{
    ClauseTranslator, DirectTranslator, Dictionary, HeuristicTagger, LanguageModel,
    LexiconTagger, Pipeline, RulesConfig, Tokenizer, Translator, WordTokenizer,
};

/// Printed in place of a sentence whose candidates were all filtered out.
const NO_TRANSLATION: &str = "<no translation>";

fn load_base_tagger(config: &Config) -> Result<LexiconTagger> {
    let tagger = match (&config.tagger_cache, &config.tagged_corpus) {
        (Some(cache), Some(corpus)) => LexiconTagger::cached(cache, corpus)
            .with_context(|| format!("Failed to load or train tagger cache {:?}", cache))?,
        (None, Some(corpus)) => LexiconTagger::from_tagged_corpus(corpus)
            .with_context(|| format!("Failed to train tagger on {:?}", corpus))?,
        (Some(cache), None) => LexiconTagger::load(cache)
            .with_context(|| format!("Failed to load tagger cache {:?}", cache))?,
        (None, None) => {
            warn!("No tagged corpus or tagger cache given; only closed-class pronouns will be tagged");
            LexiconTagger::default()
        }
    };
    Ok(tagger)
}

fn main() -> Result<()> {
    let config = Config::parse();

    // Initialize logger
    let mut logger_builder = env_logger::Builder::from_default_env();
    logger_builder.filter_level(config.log_level.parse().unwrap_or(log::LevelFilter::Info));
    logger_builder.init();

    info!("Configuration: {:?}", config);

    let dictionary = Dictionary::from_file(&config.dictionary)
        .with_context(|| format!("Failed to load dictionary {:?}", config.dictionary))?;
    let rules = match &config.rules {
        Some(path) => RulesConfig::from_file(path)
            .with_context(|| format!("Failed to load rules {:?}", path))?,
        None => RulesConfig::default(),
    };

    let tokenizer = WordTokenizer::new()?;
    let text = std::fs::read_to_string(&config.sentences)
        .with_context(|| format!("Failed to read sentences {:?}", config.sentences))?;
    let sentences: Vec<Vec<String>> = text.lines().map(|line| tokenizer.tokenize(line)).collect();
    info!("Translating {} sentences", sentences.len());

    // Models live for the whole run; translators borrow them.
    let tagger;
    let model;
    let translator: Box<dyn Translator + '_> = if config.direct {
        Box::new(DirectTranslator::new(&dictionary))
    } else {
        let Some(corpus) = &config.corpus else {
            bail!("--corpus is required unless --direct is given");
        };
        model = LanguageModel::from_corpus_dir(corpus)
            .with_context(|| format!("Failed to train language model on {:?}", corpus))?;
        tagger = HeuristicTagger::new(load_base_tagger(&config)?)?;

        let pipeline = Pipeline::standard(&dictionary, &tagger, &model, &rules)?;
        if config.no_clauses {
            Box::new(pipeline)
        } else {
            Box::new(ClauseTranslator::new(pipeline, rules.clause_splitter()))
        }
    };

    for sentence in &sentences {
        match translator
            .translate(sentence)
            .with_context(|| format!("Failed to translate {:?}", sentence))?
        {
            Some(english) => println!("{}", english),
            None => println!("{}", NO_TRANSLATION),
        }
    }

    Ok(())
}
