//! Word resolution shared by the verse builder and the analysis panel.
//!
//! Both sides must agree on how a raw token maps to an annotated [`Word`], so
//! the punctuation rule and the lookup live here and nowhere else.

use crate::corpus::{Corpus, Sentence, Word};
use serde::{Deserialize, Serialize};

/// Characters ignored when comparing a token with an annotation.
pub const STRIPPED_PUNCTUATION: [char; 4] = [',', '.', ';', ':'];

/// Removes every `,.;:` from `text`, wherever it occurs.
pub fn strip_punctuation(text: &str) -> String {
    text.chars()
        .filter(|ch| !STRIPPED_PUNCTUATION.contains(ch))
        .collect()
}

/// Returns the first word of `sentence` whose stripped `textus` equals the
/// stripped `surface`.
///
/// A sentence that repeats a surface form binds every occurrence to the first
/// annotation in `verba` order. The second annotation is unreachable.
pub fn find_word<'a>(sentence: &'a Sentence, surface: &str) -> Option<&'a Word> {
    let key = strip_punctuation(surface);
    find_by_key(sentence, &key)
}

pub(crate) fn find_by_key<'a>(sentence: &'a Sentence, key: &str) -> Option<&'a Word> {
    sentence
        .verba
        .iter()
        .find(|word| strip_punctuation(&word.textus) == key)
}

/// Coordinates of an interactive token: verse index, sentence index and the
/// original `textus` of the annotation it was bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WordRef {
    pub verse: usize,
    pub sentence: usize,
    pub textus: String,
}

impl WordRef {
    pub fn new(verse: usize, sentence: usize, textus: impl Into<String>) -> Self {
        Self {
            verse,
            sentence,
            textus: textus.into(),
        }
    }

    /// Resolves the reference back to its sentence and word.
    pub fn resolve<'a>(&self, corpus: &'a Corpus) -> Option<(&'a Sentence, &'a Word)> {
        let sentence = corpus.sentence(self.verse, self.sentence)?;
        let word = find_word(sentence, &self.textus)?;
        Some((sentence, word))
    }

    /// True when both references name the same annotation, punctuation aside.
    pub fn same_word(&self, other: &WordRef) -> bool {
        self.verse == other.verse
            && self.sentence == other.sentence
            && strip_punctuation(&self.textus) == strip_punctuation(&other.textus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(textus: &str, lemma: &str) -> Word {
        Word {
            textus: textus.to_string(),
            lemma: lemma.to_string(),
            morphologia: String::new(),
            syntaxis: String::new(),
            translatio: None,
        }
    }

    fn sentence(verba: Vec<Word>) -> Sentence {
        Sentence {
            original_lat: String::new(),
            verba,
            translationes: Default::default(),
            ordo_syntacticus: None,
            notae: None,
        }
    }

    #[test]
    fn strips_only_the_fixed_set() {
        assert_eq!(strip_punctuation("cano,"), "cano");
        assert_eq!(strip_punctuation("a.b;c:d"), "abcd");
        assert_eq!(strip_punctuation("oris!"), "oris!");
        assert_eq!(strip_punctuation("(Troiae)"), "(Troiae)");
    }

    #[test]
    fn matches_ignoring_punctuation_on_both_sides() {
        let s = sentence(vec![word("Italiam,", "Italia"), word("venit", "venio")]);
        assert_eq!(find_word(&s, "Italiam").map(|w| w.lemma.as_str()), Some("Italia"));
        assert_eq!(find_word(&s, "venit.").map(|w| w.lemma.as_str()), Some("venio"));
        assert!(find_word(&s, "venitque").is_none());
    }

    #[test]
    fn first_match_wins_for_repeated_forms() {
        let s = sentence(vec![word("et", "first"), word("et,", "second")]);
        assert_eq!(find_word(&s, "et,").map(|w| w.lemma.as_str()), Some("first"));
    }

    #[test]
    fn references_compare_without_punctuation() {
        let cano = WordRef::new(0, 0, "cano,");
        assert!(cano.same_word(&WordRef::new(0, 0, "cano")));
        assert!(!cano.same_word(&WordRef::new(0, 1, "cano,")));
        assert!(!cano.same_word(&WordRef::new(0, 0, "Cano")));
    }

    #[test]
    fn matching_is_case_sensitive() {
        let s = sentence(vec![word("Arma", "arma")]);
        assert!(find_word(&s, "arma").is_none());
    }
}
