use std::error::Error;
use std::path::PathBuf;

use atty::Stream;
use clap::{Args, Parser, Subcommand};
use lectio_rs::{
    Corpus, Event, Language, Outcome, Reader, TextView, View, WordRef, current_year, panel_text,
    show_analysis,
};
use serde_json::json;
use termimad::{FmtText, MadSkin, terminal_size};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "lectio-rs", about = "Read annotated classical texts", version)]
pub struct Cli {
    /// Corpus JSON file. Falls back to $LECTIO_CORPUS, then the bundled sample.
    #[arg(long, global = true)]
    corpus: Option<PathBuf>,

    /// Emit JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the whole page, optionally with a word selected.
    Render {
        /// Page language (es, en, zh).
        #[arg(short, long, default_value_t = Language::default())]
        lang: Language,
        #[command(flatten)]
        selection: Selection,
    },
    /// Show the analysis panel for one word.
    Analyze {
        #[arg(short, long, default_value_t = Language::default())]
        lang: Language,
        /// Zero-based verse index.
        #[arg(long)]
        verse: usize,
        /// Zero-based sentence index within the verse.
        #[arg(long)]
        sentence: usize,
        /// Surface form of the word; punctuation is ignored.
        #[arg(long)]
        word: String,
    },
    /// List the supported page languages.
    Languages,
    /// Serve the reader over HTTP.
    #[cfg(feature = "web")]
    Serve {
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: std::net::SocketAddr,
        /// Public URL used for canonical links.
        #[arg(long)]
        base_url: Option<String>,
        /// Language served when a request does not pick one.
        #[arg(short, long, default_value_t = Language::default())]
        lang: Language,
    },
}

#[derive(Args, Debug)]
struct Selection {
    /// Zero-based verse index of the selected word.
    #[arg(long, requires_all = ["sentence", "word"])]
    verse: Option<usize>,
    /// Zero-based sentence index of the selected word.
    #[arg(long, requires_all = ["verse", "word"])]
    sentence: Option<usize>,
    /// Surface form of the selected word.
    #[arg(long, requires_all = ["verse", "sentence"])]
    word: Option<String>,
}

impl Selection {
    fn word_ref(&self) -> Option<WordRef> {
        Some(WordRef::new(self.verse?, self.sentence?, self.word.clone()?))
    }
}

pub fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let corpus = Corpus::locate(cli.corpus.as_deref())?;
    debug!(verses = corpus.verses().len(), words = corpus.word_count(), "corpus loaded");

    match cli.command {
        Command::Render { lang, selection } => handle_render(&corpus, lang, &selection, cli.json),
        Command::Analyze {
            lang,
            verse,
            sentence,
            word,
        } => handle_analyze(&corpus, lang, WordRef::new(verse, sentence, word), cli.json),
        Command::Languages => handle_languages(cli.json),
        #[cfg(feature = "web")]
        Command::Serve {
            addr,
            base_url,
            lang,
        } => handle_serve(corpus, addr, base_url, lang),
    }
}

fn handle_render(
    corpus: &Corpus,
    language: Language,
    selection: &Selection,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let mut reader = Reader::new(corpus, Language::default(), current_year());
    reader.dispatch(Event::SwitchLanguage(language));
    if let Some(word) = selection.word_ref() {
        if reader.dispatch(Event::SelectWord(word.clone())) == Outcome::Unchanged {
            return Err(format!(
                "No annotated word {:?} at verse {} sentence {}",
                word.textus, word.verse, word.sentence
            )
            .into());
        }
    }

    if as_json {
        let payload = json!({
            "page": reader.page(),
            "active": reader.state().active,
            "panel": reader.state().panel,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        let text = TextView.present(reader.page(), reader.state());
        print_markdown(&text);
    }
    Ok(())
}

fn handle_analyze(
    corpus: &Corpus,
    language: Language,
    word: WordRef,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let panel = show_analysis(corpus, &word, language).ok_or_else(|| {
        format!(
            "No annotated word {:?} at verse {} sentence {}",
            word.textus, word.verse, word.sentence
        )
    })?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&panel)?);
    } else {
        print!("{}", panel_text(&panel));
    }
    Ok(())
}

fn handle_languages(as_json: bool) -> Result<(), Box<dyn Error>> {
    if as_json {
        let payload: Vec<_> = Language::ALL
            .iter()
            .map(|lang| {
                json!({
                    "code": lang.code(),
                    "label": lang.button_label(),
                    "section_label": lang.section_label(),
                    "default": *lang == Language::default(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    let width = Language::ALL
        .iter()
        .map(|lang| lang.button_label().chars().count())
        .max()
        .unwrap_or(5)
        .max("LABEL".len());
    println!("{:<4}  {:<width$}  {}", "CODE", "LABEL", "SECTION", width = width);
    println!("{:-<4}  {:-<width$}  {}", "", "", "-------", width = width);
    for lang in Language::ALL {
        let marker = if lang == Language::default() {
            " (default)"
        } else {
            ""
        };
        println!(
            "{:<4}  {:<width$}  {}{}",
            lang.code(),
            lang.button_label(),
            lang.section_label(),
            marker,
            width = width
        );
    }
    Ok(())
}

#[cfg(feature = "web")]
fn handle_serve(
    corpus: std::sync::Arc<Corpus>,
    addr: std::net::SocketAddr,
    base_url: Option<String>,
    language: Language,
) -> Result<(), Box<dyn Error>> {
    use lectio_rs::web::{WebConfig, serve};

    let config = WebConfig {
        addr,
        default_language: language,
        base_url: base_url.unwrap_or_else(|| format!("http://{addr}")),
    };
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(corpus, config))?;
    Ok(())
}

fn stdout_is_tty() -> bool {
    atty::is(Stream::Stdout)
}

fn markdown_width() -> usize {
    let (width, _) = terminal_size();
    width.max(60) as usize
}

fn markdown_skin() -> MadSkin {
    MadSkin::default()
}

fn print_markdown(body: &str) {
    if stdout_is_tty() {
        let skin = markdown_skin();
        let formatted = FmtText::from(&skin, body, Some(markdown_width()));
        println!("{formatted}");
    } else {
        print!("{body}");
    }
}
