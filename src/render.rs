use crate::corpus::{Corpus, Localized};
use crate::language::Language;
use crate::tokenize::{VerseLine, build_verse_body};
use chrono::Datelike;
use serde::{Deserialize, Serialize};

/// Everything a view needs to draw the page for one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageView {
    pub language: Language,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub introduction_title: String,
    /// Markup straight from the corpus.
    pub introduction_body: String,
    pub section_label: String,
    pub verses: Vec<VerseLine>,
    pub footer: String,
    pub languages: Vec<LanguageButton>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageButton {
    pub language: Language,
    pub label: String,
    pub active: bool,
}

/// Builds the whole page for `language`. `year` goes into the footer.
pub fn render_content(corpus: &Corpus, language: Language, year: i32) -> PageView {
    let subtitle = localized(&corpus.titulus_secundarius, language)
        .cloned()
        .unwrap_or_default();
    let (introduction_title, introduction_body) = localized(&corpus.introductio, language)
        .map(|intro| (intro.titulus.clone(), intro.contentus.clone()))
        .unwrap_or_default();

    PageView {
        language,
        title: corpus.titulus_principalis.clone(),
        subtitle,
        author: corpus.auctor.clone(),
        introduction_title,
        introduction_body,
        section_label: language.section_label().to_string(),
        verses: build_verse_body(corpus),
        footer: format!("© {year} - {}", language.labels().footer_tagline),
        languages: Language::ALL
            .iter()
            .map(|&candidate| LanguageButton {
                language: candidate,
                label: candidate.button_label().to_string(),
                active: candidate == language,
            })
            .collect(),
    }
}

/// Calendar year on the local clock.
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Requested language, then the default language, then whatever comes first.
fn localized<T>(map: &Localized<T>, language: Language) -> Option<&T> {
    map.get(language.code())
        .or_else(|| map.get(Language::default().code()))
        .or_else(|| map.values().next())
}
