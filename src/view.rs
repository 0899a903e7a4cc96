use crate::analysis::AnalysisPanel;
use crate::controller::ReaderState;
use crate::render::PageView;
use crate::tokenize::Token;
use std::fmt::Write;

/// Turns render instructions into something a particular front end can show.
pub trait View {
    type Output;

    fn present(&self, page: &PageView, state: &ReaderState) -> Self::Output;
}

/// Plain-text rendition, one region per paragraph.
///
/// Interactive words are bracketed, the active one starred: `[*Arma*]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextView;

impl View for TextView {
    type Output = String;

    fn present(&self, page: &PageView, state: &ReaderState) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", page.title);
        if !page.subtitle.is_empty() {
            let _ = writeln!(out, "{}", page.subtitle);
        }
        let _ = writeln!(out, "{}", page.author);
        let _ = writeln!(out, "{}", language_bar(page));

        if !page.introduction_title.is_empty() || !page.introduction_body.is_empty() {
            let _ = writeln!(out, "\n## {}", page.introduction_title);
            let _ = writeln!(out, "{}", strip_tags(&page.introduction_body));
        }

        let _ = writeln!(out, "\n## {}", page.section_label);
        for line in &page.verses {
            out.push_str(&line.label);
            for token in &line.tokens {
                push_token(&mut out, token, line.index, state);
            }
            out.push('\n');
        }

        if let Some(panel) = &state.panel {
            out.push('\n');
            out.push_str(&panel_text(panel));
        }

        let _ = writeln!(out, "\n{}", page.footer);
        out
    }
}

fn push_token(out: &mut String, token: &Token, verse: usize, state: &ReaderState) {
    match token {
        Token::Word { text, position, .. } if state.is_active(verse, *position) => {
            let _ = write!(out, "[*{text}*]");
        }
        Token::Word { text, .. } => {
            let _ = write!(out, "[{text}]");
        }
        Token::Plain { text } | Token::Space { text } => out.push_str(text),
    }
}

fn language_bar(page: &PageView) -> String {
    page.languages
        .iter()
        .map(|button| {
            if button.active {
                format!("<{}>", button.label)
            } else {
                button.label.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Analysis panel as labelled lines, optional blocks omitted when absent.
pub fn panel_text(panel: &AnalysisPanel) -> String {
    let labels = panel.language.labels();
    let mut out = String::new();
    let _ = writeln!(out, "{}", panel.surface);
    let _ = writeln!(out, "{}", panel.translation);
    let _ = writeln!(out, "{}: {}", labels.lemma, panel.lemma);
    let _ = writeln!(out, "{}: {}", labels.morphology, panel.morphology);
    let _ = writeln!(out, "{}: {}", labels.syntax, panel.syntax);
    let _ = writeln!(out, "{}: {}", labels.sentence_translation, panel.sentence_translation);
    if let Some(order) = &panel.syntactic_order {
        let _ = writeln!(out, "{}: {}", labels.syntactic_order, order);
    }
    if let Some(notes) = &panel.notes {
        let _ = writeln!(out, "{}: {}", labels.notes, notes);
    }
    out
}

/// Entities decoded by [`strip_tags`]. `&amp;` goes last so `&amp;lt;` stays `&lt;`.
const ENTITIES: [(&str, &str); 7] = [
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&apos;", "'"),
    ("&amp;", "&"),
];

/// Drops tags and decodes the common named entities. Numeric entities other
/// than `&#39;` are left as written.
fn strip_tags(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut in_tag = false;
    for ch in markup.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    let decoded = ENTITIES
        .iter()
        .fold(out, |text, (entity, plain)| text.replace(entity, plain));
    decoded.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::MISSING_TRANSLATION;
    use crate::controller::{Event, Reader};
    use crate::corpus::{Corpus, Introduction, Sentence, Textus, Verse, Word};
    use crate::language::Language;
    use crate::lexicon::WordRef;

    fn corpus(notes: Option<&str>) -> Corpus {
        let mut intro = crate::corpus::Localized::new();
        intro.insert(
            "en".to_string(),
            Introduction {
                titulus: "Context".to_string(),
                contentus: "<p>The <em>opening</em> lines.</p>".to_string(),
            },
        );
        Corpus {
            titulus_principalis: "Aeneis".to_string(),
            titulus_secundarius: Default::default(),
            auctor: "Vergilius".to_string(),
            introductio: intro,
            textus: Textus {
                capitula: vec![Verse {
                    numerus: "1".to_string(),
                    orationes: vec![Sentence {
                        original_lat: "Arma virumque cano,".to_string(),
                        verba: vec![
                            Word {
                                textus: "Arma".to_string(),
                                lemma: "arma".to_string(),
                                morphologia: "acc. pl.".to_string(),
                                syntaxis: "object".to_string(),
                                translatio: None,
                            },
                            Word {
                                textus: "virumque".to_string(),
                                lemma: "vir".to_string(),
                                morphologia: "acc. sg.".to_string(),
                                syntaxis: "object".to_string(),
                                translatio: None,
                            },
                        ],
                        translationes: Default::default(),
                        ordo_syntacticus: None,
                        notae: notes.map(str::to_string),
                    }],
                }],
            },
        }
    }

    #[test]
    fn brackets_interactive_words_and_stars_the_active_one() {
        let c = corpus(None);
        let mut reader = Reader::new(&c, Language::En, 2024);
        reader.dispatch(Event::SelectWord(WordRef::new(0, 0, "virumque")));
        let text = TextView.present(reader.page(), reader.state());
        assert!(text.contains("1. [Arma] [*virumque*] cano,\n"));
        assert!(text.contains("Español | <English> | 中文"));
        assert!(text.contains("The opening lines."));
        assert!(text.contains("Lemma: vir"));
        assert!(text.contains(&format!("Verse Translation: {MISSING_TRANSLATION}")));
        assert!(text.ends_with("© 2024 - Interactive Analysis.\n"));
    }

    #[test]
    fn optional_blocks_are_omitted() {
        let c = corpus(None);
        let mut reader = Reader::new(&c, Language::En, 2024);
        reader.dispatch(Event::SelectWord(WordRef::new(0, 0, "Arma")));
        let panel = reader.state().panel.as_ref().expect("panel");
        let text = panel_text(panel);
        assert!(!text.contains("Syntactic Order"));
        assert!(!text.contains("Additional Notes"));

        let c = corpus(Some("Epic opening."));
        let mut reader = Reader::new(&c, Language::En, 2024);
        reader.dispatch(Event::SelectWord(WordRef::new(0, 0, "Arma")));
        let panel = reader.state().panel.as_ref().expect("panel");
        assert!(panel_text(panel).contains("Additional Notes: Epic opening."));
    }

    #[test]
    fn strip_tags_keeps_text() {
        assert_eq!(strip_tags("<p>a <b>b</b></p>"), "a b");
        assert_eq!(strip_tags("1 > 0"), "1 > 0");
    }

    #[test]
    fn strip_tags_decodes_common_entities() {
        assert_eq!(
            strip_tags("<p>Arma&nbsp;virumque &amp; &lt;cano&gt; &quot;Troiae&quot; &#39;x&apos;</p>"),
            "Arma virumque & <cano> \"Troiae\" 'x'"
        );
        assert_eq!(strip_tags("&amp;lt;"), "&lt;");
        assert_eq!(strip_tags("&#8212;"), "&#8212;");
    }

    #[test]
    fn only_the_clicked_repetition_is_starred() {
        let corpus = Corpus::bundled().expect("bundled corpus");
        let mut reader = Reader::new(&corpus, Language::Es, 2024);
        let et = WordRef::new(2, 0, "et");
        reader.dispatch(Event::SelectWord(et.clone()));
        let text = TextView.present(reader.page(), reader.state());
        assert_eq!(text.matches("[*et*]").count(), 1);
        assert!(text.contains("[ille] [*et*] [terris]"));

        let second = reader.page().verses[2]
            .tokens
            .iter()
            .filter(|token| token.text() == "et")
            .filter_map(Token::position)
            .nth(1)
            .expect("second et");
        reader.dispatch(Event::SelectToken {
            word: et,
            position: second,
        });
        let text = TextView.present(reader.page(), reader.state());
        assert_eq!(text.matches("[*et*]").count(), 1);
        assert!(text.contains("[ille] [et] [terris] [iactatus] [*et*] [alto]"));
    }
}
