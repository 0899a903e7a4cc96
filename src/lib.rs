mod analysis;
mod controller;
mod corpus;
mod language;
mod lexicon;
mod render;
mod tokenize;
mod view;
#[cfg(feature = "web")]
pub mod web;

pub use analysis::{AnalysisPanel, MISSING_TRANSLATION, show_analysis};
pub use controller::{ActiveToken, Event, Outcome, Reader, ReaderState, handle_event};
pub use corpus::{Corpus, Introduction, Localized, Sentence, Textus, Verse, Word};
pub use language::{Labels, Language, UnknownLanguage};
pub use lexicon::{STRIPPED_PUNCTUATION, WordRef, find_word, strip_punctuation};
pub use render::{LanguageButton, PageView, current_year, render_content};
pub use tokenize::{
    Token, VerseLine, build_verse_body, split_preserving_whitespace, tokenize_sentence, verse_line,
};
pub use view::{TextView, View, panel_text};

use once_cell::sync::Lazy;
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use zstd::stream::decode_all;

static CORPUS_BYTES: &[u8] = include_bytes!(env!("LECTIO_BUNDLED_CORPUS"));

static BUNDLED: Lazy<Result<Arc<Corpus>, String>> = Lazy::new(|| {
    let raw = decode_all(Cursor::new(CORPUS_BYTES)).map_err(|err| err.to_string())?;
    serde_json::from_slice::<Corpus>(&raw)
        .map(Arc::new)
        .map_err(|err| err.to_string())
});

/// Environment variable consulted when no corpus path is given explicitly.
pub const CORPUS_ENV: &str = "LECTIO_CORPUS";

#[derive(Debug)]
pub enum CorpusError {
    Missing(PathBuf),
    Io(std::io::Error),
    Parse(serde_json::Error),
    Bundled(String),
}

impl fmt::Display for CorpusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorpusError::Missing(path) => write!(
                f,
                "corpus file {} does not exist; it must be available before the reader starts",
                path.display()
            ),
            CorpusError::Io(err) => write!(f, "io error: {err}"),
            CorpusError::Parse(err) => write!(f, "invalid corpus: {err}"),
            CorpusError::Bundled(err) => write!(f, "bundled corpus is unreadable: {err}"),
        }
    }
}

impl std::error::Error for CorpusError {}

impl From<std::io::Error> for CorpusError {
    fn from(value: std::io::Error) -> Self {
        CorpusError::Io(value)
    }
}

impl From<serde_json::Error> for CorpusError {
    fn from(value: serde_json::Error) -> Self {
        CorpusError::Parse(value)
    }
}

impl Corpus {
    pub fn from_json(raw: &str) -> Result<Self, CorpusError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CorpusError::Missing(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// The sample corpus compiled into the binary.
    pub fn bundled() -> Result<Arc<Corpus>, CorpusError> {
        (*BUNDLED).clone().map_err(CorpusError::Bundled)
    }

    /// Loads `path` if given, else the file named by [`CORPUS_ENV`], else the
    /// bundled corpus.
    pub fn locate(path: Option<&Path>) -> Result<Arc<Corpus>, CorpusError> {
        let from_env = std::env::var_os(CORPUS_ENV).map(PathBuf::from);
        match path.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::from_path(path).map(Arc::new),
            None => Self::bundled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_corpus_parses() {
        let corpus = Corpus::bundled().expect("bundled corpus");
        assert_eq!(corpus.titulus_principalis, "Aeneis");
        assert!(!corpus.verses().is_empty());
        assert!(corpus.word_count() > 0);
        for lang in Language::ALL {
            assert!(corpus.titulus_secundarius.contains_key(lang.code()));
            assert!(corpus.introductio.contains_key(lang.code()));
        }
    }

    #[test]
    fn bundled_corpus_round_trips_every_sentence() {
        let corpus = Corpus::bundled().expect("bundled corpus");
        for (v, verse) in corpus.verses().iter().enumerate() {
            for (s, sentence) in verse.orationes.iter().enumerate() {
                let rebuilt: String = tokenize_sentence(sentence, v, s)
                    .iter()
                    .map(Token::text)
                    .collect();
                assert_eq!(rebuilt, sentence.original_lat);
            }
        }
    }

    #[test]
    fn bundled_opening_line() {
        let corpus = Corpus::bundled().expect("bundled corpus");
        let page = render_content(&corpus, Language::Es, 2024);
        assert_eq!(page.verses[0].text(), "Arma virumque cano, Troiae qui primus ab oris");
        let panel = show_analysis(&corpus, &WordRef::new(0, 0, "cano,"), Language::En)
            .expect("cano resolves");
        assert_eq!(panel.translation, "I sing");
    }

    #[test]
    fn missing_corpus_file_is_reported() {
        let path = Path::new("/definitely/not/here/corpus.json");
        match Corpus::from_path(path) {
            Err(CorpusError::Missing(missing)) => assert_eq!(missing, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn numeric_verse_numbers_are_accepted() {
        let corpus = Corpus::from_json(
            r#"{
                "titulus_principalis": "T",
                "auctor": "A",
                "textus": { "capitula": [
                    { "numerus": 12, "orationes": [
                        { "original_lat": "arma", "verba": [] }
                    ] }
                ] }
            }"#,
        )
        .expect("parses");
        assert_eq!(corpus.verses()[0].numerus, "12");
        assert!(corpus.titulus_secundarius.is_empty());
    }

    #[test]
    fn malformed_corpus_is_a_parse_error() {
        assert!(matches!(
            Corpus::from_json("{\"titulus_principalis\": 3}"),
            Err(CorpusError::Parse(_))
        ));
    }
}
