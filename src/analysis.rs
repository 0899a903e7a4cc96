use crate::corpus::{Corpus, Localized};
use crate::language::Language;
use crate::lexicon::WordRef;
use serde::{Deserialize, Serialize};

/// Shown in place of a translation the corpus does not provide.
pub const MISSING_TRANSLATION: &str = "N/A";

/// Contents of the analysis side panel for one selected word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisPanel {
    pub word: WordRef,
    pub language: Language,
    pub surface: String,
    pub translation: String,
    pub lemma: String,
    pub morphology: String,
    pub syntax: String,
    pub sentence_translation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syntactic_order: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Builds the panel for `word`, or `None` when it no longer resolves. Callers
/// keep whatever panel they were showing in that case.
pub fn show_analysis(corpus: &Corpus, word: &WordRef, language: Language) -> Option<AnalysisPanel> {
    let (sentence, entry) = word.resolve(corpus)?;
    Some(AnalysisPanel {
        word: word.clone(),
        language,
        surface: entry.textus.clone(),
        translation: translated(entry.translatio.as_ref(), language),
        lemma: entry.lemma.clone(),
        morphology: entry.morphologia.clone(),
        syntax: entry.syntaxis.clone(),
        sentence_translation: translated(Some(&sentence.translationes), language),
        syntactic_order: non_empty(sentence.ordo_syntacticus.as_deref()),
        notes: non_empty(sentence.notae.as_deref()),
    })
}

fn translated(map: Option<&Localized<String>>, language: Language) -> String {
    map.and_then(|map| map.get(language.code()))
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
        .unwrap_or(MISSING_TRANSLATION)
        .to_string()
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}
