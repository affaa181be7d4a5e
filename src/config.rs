use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::clause::{ClauseSplitter, DEFAULT_BOUNDARIES, DEFAULT_PREFIXES};
use crate::error::{Result, TranslateError};
use crate::preprocess::{PhraseRule, Reorder};

/// Command line configuration for the translator
#[derive(Debug, Clone, Parser)]
#[command(name = "dict-translate")]
#[command(about = "Dictionary-driven Spanish to English translator")]
pub struct Config {
    /// Spanish text to translate, one sentence per line
    #[arg(short, long)]
    pub sentences: PathBuf,

    /// Dictionary file (word,translation,translation,...)
    #[arg(short, long)]
    pub dictionary: PathBuf,

    /// Directory of English *.txt files for the language model
    #[arg(short, long)]
    pub corpus: Option<PathBuf>,

    /// Tagged Spanish corpus (word/TAG pairs) to train the base tagger on
    #[arg(long)]
    pub tagged_corpus: Option<PathBuf>,

    /// JSON cache of the trained base tagger
    #[arg(long)]
    pub tagger_cache: Option<PathBuf>,

    /// YAML file overriding the built-in rule tables
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Use the word-for-word baseline instead of the full pipeline
    #[arg(long)]
    pub direct: bool,

    /// Translate whole sentences without clause splitting
    #[arg(long)]
    pub no_clauses: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// A phrase table entry as written in the rules file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseEntry {
    pub tokens: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    pub replacement: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl PhraseEntry {
    fn new(tokens: &[&str], after: Option<&str>, replacement: &str, tag: Option<&str>) -> Self {
        Self {
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
            before: None,
            after: after.map(str::to_string),
            replacement: replacement.to_string(),
            tag: tag.map(str::to_string),
        }
    }

    pub fn to_rule(&self) -> Result<PhraseRule> {
        let tokens: Vec<&str> = self.tokens.iter().map(String::as_str).collect();
        PhraseRule::new(
            &tokens,
            self.before.as_deref(),
            self.after.as_deref(),
            &self.replacement,
            self.tag.as_deref(),
        )
    }
}

/// A word-order rule. A missing side matches only untagged tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderEntry {
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub after: Option<String>,
}

impl ReorderEntry {
    pub fn to_reorder(&self) -> Result<Reorder> {
        Reorder::new(self.before.as_deref(), self.after.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClauseConfig {
    pub boundaries: Vec<String>,
    pub prefixes: Vec<String>,
}

impl Default for ClauseConfig {
    fn default() -> Self {
        Self {
            boundaries: DEFAULT_BOUNDARIES.iter().map(|b| b.to_string()).collect(),
            prefixes: DEFAULT_PREFIXES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Rule tables for the pipeline. Table order is significant: earlier
/// entries win.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub phrases: Vec<PhraseEntry>,
    pub reorder: Vec<ReorderEntry>,
    pub demonstratives: Vec<PhraseEntry>,
    pub clauses: ClauseConfig,
}

impl Default for RulesConfig {
    fn default() -> Self {
        let possessive = |word: &str, pronoun: &str| {
            [
                PhraseEntry::new(&["the", word], None, pronoun, None),
                PhraseEntry::new(&["the", pronoun], None, pronoun, None),
            ]
        };

        let mut demonstratives = vec![PhraseEntry::new(&["no"], Some("d|pp3fsa00"), "not", None)];
        for (word, pronoun) in [("our", "ours"), ("your", "yours"), ("my", "mine"), ("their", "theirs")] {
            demonstratives.extend(possessive(word, pronoun));
        }

        Self {
            phrases: vec![
                // "lo que" before a verb is "what"
                PhraseEntry::new(&["lo", "que"], Some("v"), "qué", Some("pt000000")),
                PhraseEntry::new(&["de", "que"], Some("n|d"), "que", Some("cs")),
            ],
            reorder: vec![
                // noun adjective -> adjective noun
                ReorderEntry {
                    before: Some("n".to_string()),
                    after: Some("a".to_string()),
                },
                // object pronoun verb -> verb object pronoun
                ReorderEntry {
                    before: Some("pp...[ad]".to_string()),
                    after: Some("v".to_string()),
                },
            ],
            demonstratives,
            clauses: ClauseConfig::default(),
        }
    }
}

impl RulesConfig {
    /// Load rules from a YAML file. Sections left out keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| TranslateError::io(path, e))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn phrase_rules(&self) -> Result<Vec<PhraseRule>> {
        self.phrases.iter().map(PhraseEntry::to_rule).collect()
    }

    pub fn reorder_rules(&self) -> Result<Vec<Reorder>> {
        self.reorder.iter().map(ReorderEntry::to_reorder).collect()
    }

    pub fn demonstrative_rules(&self) -> Result<Vec<PhraseRule>> {
        self.demonstratives.iter().map(PhraseEntry::to_rule).collect()
    }

    pub fn clause_splitter(&self) -> ClauseSplitter {
        ClauseSplitter::new(&self.clauses.boundaries, &self.clauses.prefixes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parses_flags() {
        let config = Config::parse_from([
            "dict-translate",
            "--sentences",
            "in.txt",
            "--dictionary",
            "dict.txt",
            "--corpus",
            "corpus",
            "--no-clauses",
        ]);
        assert_eq!(config.sentences, PathBuf::from("in.txt"));
        assert_eq!(config.corpus, Some(PathBuf::from("corpus")));
        assert!(config.no_clauses);
        assert!(!config.direct);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_default_tables_keep_order() {
        let rules = RulesConfig::default();
        let phrases: Vec<&str> = rules.phrases.iter().map(|p| p.replacement.as_str()).collect();
        assert_eq!(phrases, vec!["qué", "que"]);

        let reorder: Vec<Option<&str>> = rules.reorder.iter().map(|r| r.before.as_deref()).collect();
        assert_eq!(reorder, vec![Some("n"), Some("pp...[ad]")]);

        let demonstratives: Vec<String> = rules
            .demonstratives
            .iter()
            .map(|d| format!("{} -> {}", d.tokens.join(" "), d.replacement))
            .collect();
        assert_eq!(
            demonstratives,
            vec![
                "no -> not",
                "the our -> ours",
                "the ours -> ours",
                "the your -> yours",
                "the yours -> yours",
                "the my -> mine",
                "the mine -> mine",
                "the their -> theirs",
                "the theirs -> theirs",
            ]
        );
    }

    #[test]
    fn test_default_rules_compile() {
        let rules = RulesConfig::default();
        assert_eq!(rules.phrase_rules().unwrap().len(), 2);
        assert_eq!(rules.reorder_rules().unwrap().len(), 2);
        assert_eq!(rules.demonstrative_rules().unwrap().len(), 9);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
phrases:
  - tokens: [sin, embargo]
    replacement: however
    tag: rg
clauses:
  boundaries: [",", "pero"]
"#;
        let rules = RulesConfig::from_yaml(yaml).unwrap();
        assert_eq!(rules.phrases.len(), 1);
        assert_eq!(rules.phrases[0].before, None);
        assert_eq!(rules.reorder, RulesConfig::default().reorder);
        assert_eq!(rules.clauses.boundaries, vec![",", "pero"]);
        assert_eq!(rules.clauses.prefixes, ClauseConfig::default().prefixes);
    }

    #[test]
    fn test_invalid_rule_pattern() {
        let yaml = "reorder:\n  - before: \"(n\"\n    after: a\n";
        let rules = RulesConfig::from_yaml(yaml).unwrap();
        assert!(matches!(
            rules.reorder_rules().err(),
            Some(TranslateError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_rules_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.yaml");
        std::fs::write(&path, "reorder: []\n").unwrap();
        let rules = RulesConfig::from_file(&path).unwrap();
        assert!(rules.reorder.is_empty());
        assert_eq!(rules.phrases, RulesConfig::default().phrases);

        let missing = RulesConfig::from_file(dir.path().join("missing.yaml"));
        assert!(matches!(missing, Err(TranslateError::Io { .. })));
    }
}
