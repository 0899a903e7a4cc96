use crate::corpus::{Corpus, Sentence};
use crate::lexicon::{WordRef, find_by_key, strip_punctuation};
use serde::{Deserialize, Serialize};

/// One rendered piece of a verse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Token {
    /// Annotated word; `text` keeps the punctuation of the source.
    ///
    /// `position` is the index of the token within its verse line. Repeated
    /// forms share a `word` but never a position.
    Word {
        text: String,
        word: WordRef,
        position: usize,
    },
    /// Token with no annotation, shown as-is.
    Plain { text: String },
    /// Whitespace run copied verbatim from the source.
    Space { text: String },
}

impl Token {
    pub fn text(&self) -> &str {
        match self {
            Token::Word { text, .. } | Token::Plain { text } | Token::Space { text } => text,
        }
    }

    pub fn word_ref(&self) -> Option<&WordRef> {
        match self {
            Token::Word { word, .. } => Some(word),
            _ => None,
        }
    }

    pub fn position(&self) -> Option<usize> {
        match self {
            Token::Word { position, .. } => Some(*position),
            _ => None,
        }
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, Token::Word { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseLine {
    pub index: usize,
    /// `"{numerus}. "`
    pub label: String,
    pub tokens: Vec<Token>,
}

impl VerseLine {
    /// Source text of the verse, label excluded.
    pub fn text(&self) -> String {
        self.tokens.iter().map(Token::text).collect()
    }
}

/// Splits `text` into alternating whitespace and non-whitespace runs.
/// Concatenating the pieces yields `text` again.
pub fn split_preserving_whitespace(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;
    for (idx, ch) in text.char_indices() {
        let space = ch.is_whitespace();
        match in_space {
            Some(previous) if previous != space => {
                pieces.push(&text[start..idx]);
                start = idx;
            }
            _ => {}
        }
        in_space = Some(space);
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

/// Tokenizes one sentence, binding tokens to annotations of that sentence.
/// Positions count from the start of the sentence.
pub fn tokenize_sentence(
    sentence: &Sentence,
    verse_index: usize,
    sentence_index: usize,
) -> Vec<Token> {
    tokenize_from(sentence, verse_index, sentence_index, 0)
}

fn tokenize_from(
    sentence: &Sentence,
    verse_index: usize,
    sentence_index: usize,
    first_position: usize,
) -> Vec<Token> {
    split_preserving_whitespace(&sentence.original_lat)
        .into_iter()
        .enumerate()
        .map(|(offset, piece)| {
            if piece.trim().is_empty() {
                return Token::Space {
                    text: piece.to_string(),
                };
            }
            let key = strip_punctuation(piece);
            match find_by_key(sentence, &key) {
                Some(word) => Token::Word {
                    text: piece.to_string(),
                    word: WordRef::new(verse_index, sentence_index, word.textus.clone()),
                    position: first_position + offset,
                },
                None => Token::Plain {
                    text: piece.to_string(),
                },
            }
        })
        .collect()
}

/// Builds the verse body. Independent of the display language.
pub fn build_verse_body(corpus: &Corpus) -> Vec<VerseLine> {
    (0..corpus.verses().len())
        .filter_map(|verse_index| verse_line(corpus, verse_index))
        .collect()
}

/// Builds a single line of the verse body.
pub fn verse_line(corpus: &Corpus, verse_index: usize) -> Option<VerseLine> {
    let verse = corpus.verses().get(verse_index)?;
    let mut tokens = Vec::new();
    for (sentence_index, sentence) in verse.orationes.iter().enumerate() {
        let next = tokenize_from(sentence, verse_index, sentence_index, tokens.len());
        tokens.extend(next);
    }
    Some(VerseLine {
        index: verse_index,
        label: format!("{}. ", verse.numerus),
        tokens,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Textus, Verse, Word};
    use crate::lexicon::find_word;

    fn word(textus: &str, lemma: &str) -> Word {
        Word {
            textus: textus.to_string(),
            lemma: lemma.to_string(),
            morphologia: "m".to_string(),
            syntaxis: "s".to_string(),
            translatio: None,
        }
    }

    fn sentence(text: &str, verba: Vec<Word>) -> Sentence {
        Sentence {
            original_lat: text.to_string(),
            verba,
            translationes: Default::default(),
            ordo_syntacticus: None,
            notae: None,
        }
    }

    fn corpus(verses: Vec<Vec<Sentence>>) -> Corpus {
        Corpus {
            titulus_principalis: "T".to_string(),
            titulus_secundarius: Default::default(),
            auctor: "A".to_string(),
            introductio: Default::default(),
            textus: Textus {
                capitula: verses
                    .into_iter()
                    .enumerate()
                    .map(|(idx, orationes)| Verse {
                        numerus: (idx + 1).to_string(),
                        orationes,
                    })
                    .collect(),
            },
        }
    }

    #[test]
    fn split_keeps_whitespace_runs() {
        assert_eq!(
            split_preserving_whitespace("  Arma \tvirumque\n"),
            vec!["  ", "Arma", " \t", "virumque", "\n"]
        );
        assert!(split_preserving_whitespace("").is_empty());
    }

    #[test]
    fn arma_virumque_cano() {
        let s = sentence(
            "Arma virumque cano,",
            vec![word("Arma", "arma"), word("virumque", "vir")],
        );
        let tokens = tokenize_sentence(&s, 0, 0);
        assert_eq!(
            tokens,
            vec![
                Token::Word {
                    text: "Arma".to_string(),
                    word: WordRef::new(0, 0, "Arma"),
                    position: 0,
                },
                Token::Space {
                    text: " ".to_string()
                },
                Token::Word {
                    text: "virumque".to_string(),
                    word: WordRef::new(0, 0, "virumque"),
                    position: 2,
                },
                Token::Space {
                    text: " ".to_string()
                },
                Token::Plain {
                    text: "cano,".to_string()
                },
            ]
        );
    }

    #[test]
    fn coordinates_carry_the_annotation_text() {
        let s = sentence("Italiam fato", vec![word("Italiam,", "Italia")]);
        let tokens = tokenize_sentence(&s, 3, 2);
        assert_eq!(tokens[0].text(), "Italiam");
        assert_eq!(tokens[0].word_ref(), Some(&WordRef::new(3, 2, "Italiam,")));
        assert!(!tokens[2].is_interactive());
    }

    #[test]
    fn tokens_round_trip_to_source() {
        let texts = [
            "Arma virumque cano, ",
            "  litora,  multum\tille ",
            "",
            "   ",
            "Troiae qui primus ab oris",
        ];
        for text in texts {
            let s = sentence(text, vec![word("litora", "litus"), word("qui", "qui")]);
            let rebuilt: String = tokenize_sentence(&s, 0, 0)
                .iter()
                .map(Token::text)
                .collect();
            assert_eq!(rebuilt, text);
        }
    }

    #[test]
    fn interactive_tokens_strip_to_their_word() {
        let s = sentence(
            "et terris et alto.",
            vec![word("et", "et-1"), word("et", "et-2"), word("alto", "altum")],
        );
        for token in tokenize_sentence(&s, 0, 0) {
            if let Token::Word { text, word: r, .. } = &token {
                let bound = find_word(&s, &r.textus).expect("bound word");
                assert_eq!(strip_punctuation(text), strip_punctuation(&bound.textus));
            }
        }
        let first = tokenize_sentence(&s, 0, 0);
        let refs: Vec<_> = first.iter().filter_map(Token::word_ref).collect();
        assert_eq!(refs.len(), 3);
        assert_eq!(
            find_word(&s, &refs[1].textus).map(|w| w.lemma.as_str()),
            Some("et-1")
        );
    }

    #[test]
    fn verse_lines_concatenate_sentences() {
        let c = corpus(vec![
            vec![
                sentence("Arma virumque cano, ", vec![word("cano,", "cano")]),
                sentence("Troiae qui", vec![word("qui", "qui")]),
            ],
            vec![sentence("venit", vec![])],
        ]);
        let body = build_verse_body(&c);
        assert_eq!(body.len(), 2);
        assert_eq!(body[0].label, "1. ");
        assert_eq!(body[0].text(), "Arma virumque cano, Troiae qui");
        let refs: Vec<_> = body[0].tokens.iter().filter_map(Token::word_ref).collect();
        assert_eq!(refs, vec![&WordRef::new(0, 0, "cano,"), &WordRef::new(0, 1, "qui")]);
        assert_eq!(body[1].tokens, vec![Token::Plain { text: "venit".to_string() }]);
    }

    #[test]
    fn positions_index_the_verse_line() {
        let c = corpus(vec![vec![
            sentence("et terris ", vec![word("et", "et")]),
            sentence("et alto", vec![word("et", "et")]),
        ]]);
        let line = verse_line(&c, 0).expect("verse 0");
        for (index, token) in line.tokens.iter().enumerate() {
            if let Some(position) = token.position() {
                assert_eq!(position, index);
            }
        }
        let positions: Vec<_> = line.tokens.iter().filter_map(Token::position).collect();
        assert_eq!(positions, vec![0, 4]);
        assert!(verse_line(&c, 1).is_none());
    }
}
