use crate::analysis::{AnalysisPanel, show_analysis};
use crate::corpus::Corpus;
use crate::language::Language;
use crate::lexicon::WordRef;
use crate::render::{PageView, render_content};
use crate::tokenize::{Token, verse_line};
use serde::Serialize;
use tracing::debug;

/// The clicked token: the annotation it is bound to and its place in the verse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveToken {
    pub word: WordRef,
    pub position: usize,
}

/// The only mutable state of a reading session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReaderState {
    pub language: Language,
    pub active: Option<ActiveToken>,
    pub panel: Option<AnalysisPanel>,
}

impl ReaderState {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            ..Self::default()
        }
    }

    /// Whether the token at `position` of verse `verse` is the highlighted one.
    pub fn is_active(&self, verse: usize, position: usize) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.word.verse == verse && active.position == position)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Selects the first token of the verse bound to this word.
    SelectWord(WordRef),
    /// Selects the token at `position` of `word.verse`; it must be bound to `word`.
    SelectToken { word: WordRef, position: usize },
    SwitchLanguage(Language),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing changed; the page stays as drawn.
    Unchanged,
    /// Active word and panel changed.
    PanelUpdated,
    /// Language changed; the page must be rebuilt.
    Rerender,
}

pub fn handle_event(corpus: &Corpus, state: &mut ReaderState, event: Event) -> Outcome {
    match event {
        Event::SelectWord(word) => {
            let token = verse_line(corpus, word.verse).and_then(|line| {
                line.tokens.iter().find_map(|token| match token {
                    Token::Word {
                        word: bound,
                        position,
                        ..
                    } if bound.same_word(&word) => Some(ActiveToken {
                        word: bound.clone(),
                        position: *position,
                    }),
                    _ => None,
                })
            });
            select(corpus, state, token, &word)
        }
        Event::SelectToken { word, position } => {
            let token = verse_line(corpus, word.verse).and_then(|line| {
                line.tokens
                    .get(position)
                    .and_then(Token::word_ref)
                    .filter(|bound| bound.same_word(&word))
                    .map(|bound| ActiveToken {
                        word: bound.clone(),
                        position,
                    })
            });
            select(corpus, state, token, &word)
        }
        Event::SwitchLanguage(language) if language == state.language => Outcome::Unchanged,
        Event::SwitchLanguage(language) => {
            debug!(from = %state.language, to = %language, "switching language");
            state.language = language;
            state.active = None;
            state.panel = None;
            Outcome::Rerender
        }
    }
}

fn select(
    corpus: &Corpus,
    state: &mut ReaderState,
    token: Option<ActiveToken>,
    requested: &WordRef,
) -> Outcome {
    let Some(token) = token else {
        debug!(word = ?requested, "no interactive token carries this word; panel left as is");
        return Outcome::Unchanged;
    };
    match show_analysis(corpus, &token.word, state.language) {
        Some(panel) => {
            state.active = Some(token);
            state.panel = Some(panel);
            Outcome::PanelUpdated
        }
        None => {
            debug!(word = ?requested, "word reference did not resolve; panel left as is");
            Outcome::Unchanged
        }
    }
}

/// A corpus, its session state and the page currently drawn for it.
pub struct Reader<'a> {
    corpus: &'a Corpus,
    state: ReaderState,
    page: PageView,
    year: i32,
}

impl<'a> Reader<'a> {
    pub fn new(corpus: &'a Corpus, language: Language, year: i32) -> Self {
        Self {
            corpus,
            state: ReaderState::new(language),
            page: render_content(corpus, language, year),
            year,
        }
    }

    pub fn dispatch(&mut self, event: Event) -> Outcome {
        let outcome = handle_event(self.corpus, &mut self.state, event);
        if outcome == Outcome::Rerender {
            self.page = render_content(self.corpus, self.state.language, self.year);
        }
        outcome
    }

    pub fn state(&self) -> &ReaderState {
        &self.state
    }

    pub fn page(&self) -> &PageView {
        &self.page
    }
}
