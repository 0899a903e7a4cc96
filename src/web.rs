use crate::{
    AnalysisPanel, Corpus, Event, Labels, Language, Outcome, PageView, Reader, ReaderState, Token,
    View, WordRef, current_year, render_content, show_analysis,
};
use askama::Html as HtmlEscaper;
use askama::{MarkupDisplay, Template};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use markdown::{Options as MarkdownOptions, to_html_with_options};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::compression::CompressionLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{debug, info};

type SharedState = Arc<AppState>;

#[derive(Clone)]
pub struct AppState {
    pub corpus: Arc<Corpus>,
    pub default_language: Language,
    pub base_url: String,
}

#[derive(Clone)]
pub struct WebConfig {
    pub addr: SocketAddr,
    pub default_language: Language,
    pub base_url: String,
}

#[derive(Debug)]
pub enum WebError {
    Io(std::io::Error),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for WebError {}

impl From<std::io::Error> for WebError {
    fn from(value: std::io::Error) -> Self {
        WebError::Io(value)
    }
}

pub async fn serve(corpus: Arc<Corpus>, config: WebConfig) -> Result<(), WebError> {
    let state = Arc::new(AppState {
        corpus,
        default_language: config.default_language,
        base_url: config.base_url.clone(),
    });
    let router = build_router(state);
    info!(
        %config.addr,
        language = %config.default_language,
        base = %config.base_url,
        "Binding HTTP listener"
    );
    let listener = TcpListener::bind(config.addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server exited");
    Ok(())
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = json!({ "error": self.message });
        (self.status, Json(payload)).into_response()
    }
}

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(page_html))
        .route("/api/page", get(api_page))
        .route("/api/analysis", get(api_analysis))
        .route("/healthz", get(health))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CompressionLayer::new())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            let _ = stream.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": "lectio-web" }))
}

#[derive(Debug, Default, Deserialize)]
struct PageParams {
    lang: Option<String>,
    verse: Option<usize>,
    sentence: Option<usize>,
    word: Option<String>,
    /// Token position within the verse line; picks one of several repetitions.
    pos: Option<usize>,
}

impl PageParams {
    fn word_ref(&self) -> Option<WordRef> {
        let word = self.word.as_deref().filter(|w| !w.is_empty())?;
        Some(WordRef::new(self.verse?, self.sentence?, word))
    }
}

/// Every request starts from a fresh reader and replays the clicks encoded in
/// the query string, so the server holds no per-visitor state.
async fn page_html(
    State(state): State<SharedState>,
    Query(params): Query<PageParams>,
) -> impl IntoResponse {
    let mut reader = Reader::new(&state.corpus, state.default_language, current_year());
    if let Some(code) = params.lang.as_deref() {
        match code.parse::<Language>() {
            Ok(language) => {
                reader.dispatch(Event::SwitchLanguage(language));
            }
            Err(err) => debug!(%err, "ignoring language parameter"),
        }
    }
    if let Some(word) = params.word_ref() {
        let event = match params.pos {
            Some(position) => Event::SelectToken { word, position },
            None => Event::SelectWord(word),
        };
        if reader.dispatch(event) == Outcome::Unchanged {
            debug!("selected word is not annotated");
        }
    }

    let view = HtmlView {
        base_url: &state.base_url,
    };
    match view.present(reader.page(), reader.state()) {
        Ok(html) => Html(html).into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(render_error_page(err.to_string())),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct LanguageParams {
    lang: Option<String>,
}

async fn api_page(
    State(state): State<SharedState>,
    Query(params): Query<LanguageParams>,
) -> Result<Json<PageView>, ApiError> {
    let language = parse_language(params.lang.as_deref(), state.default_language)?;
    Ok(Json(render_content(&state.corpus, language, current_year())))
}

async fn api_analysis(
    State(state): State<SharedState>,
    Query(params): Query<PageParams>,
) -> Result<Json<AnalysisPanel>, ApiError> {
    let language = parse_language(params.lang.as_deref(), state.default_language)?;
    let word = params.word_ref().ok_or_else(|| {
        ApiError::bad_request("Query parameters `verse`, `sentence` and `word` are required")
    })?;
    show_analysis(&state.corpus, &word, language)
        .map(Json)
        .ok_or_else(|| {
            ApiError::not_found(format!(
                "No annotated word {:?} in verse {} sentence {}",
                word.textus, word.verse, word.sentence
            ))
        })
}

fn parse_language(code: Option<&str>, fallback: Language) -> Result<Language, ApiError> {
    match code.map(str::trim).filter(|c| !c.is_empty()) {
        Some(code) => code
            .parse()
            .map_err(|err: crate::UnknownLanguage| ApiError::bad_request(err.to_string())),
        None => Ok(fallback),
    }
}

/// Server-side HTML rendition of the reader.
pub struct HtmlView<'a> {
    pub base_url: &'a str,
}

impl View for HtmlView<'_> {
    type Output = Result<String, askama::Error>;

    fn present(&self, page: &PageView, state: &ReaderState) -> Self::Output {
        let verses = page
            .verses
            .iter()
            .map(|line| VerseBlock {
                label: &line.label,
                segments: line
                    .tokens
                    .iter()
                    .map(|token| Segment::new(token, line.index, page.language, state))
                    .collect(),
            })
            .collect();
        let languages = page
            .languages
            .iter()
            .map(|button| LanguageLink {
                code: button.language.code(),
                label: &button.label,
                active: button.active,
                href: language_href(button.language, button.active, state),
            })
            .collect();
        PageTemplate {
            page,
            base_url: self.base_url,
            introduction_html: render_markdown_str(&page.introduction_body),
            verses,
            languages,
            panel: state.panel.as_ref(),
            labels: page.language.labels(),
        }
        .render()
    }
}

struct VerseBlock<'a> {
    label: &'a str,
    segments: Vec<Segment<'a>>,
}

struct Segment<'a> {
    text: &'a str,
    interactive: bool,
    active: bool,
    verse: usize,
    sentence: usize,
    textus: &'a str,
    href: String,
}

impl<'a> Segment<'a> {
    fn new(token: &'a Token, verse: usize, language: Language, state: &ReaderState) -> Self {
        match token {
            Token::Word {
                text,
                word,
                position,
            } => Segment {
                text,
                interactive: true,
                active: state.is_active(verse, *position),
                verse: word.verse,
                sentence: word.sentence,
                textus: &word.textus,
                href: word_href(word, *position, language),
            },
            Token::Plain { text } | Token::Space { text } => Segment {
                text,
                interactive: false,
                active: false,
                verse: 0,
                sentence: 0,
                textus: "",
                href: String::new(),
            },
        }
    }
}

struct LanguageLink<'a> {
    code: &'static str,
    label: &'a str,
    active: bool,
    href: String,
}

fn word_href(word: &WordRef, position: usize, language: Language) -> String {
    format!(
        "/?lang={}&verse={}&sentence={}&word={}&pos={}#marginalia-contentus",
        language.code(),
        word.verse,
        word.sentence,
        utf8_percent_encode(&word.textus, NON_ALPHANUMERIC),
        position
    )
}

/// The current language keeps the selection; any other one starts afresh.
fn language_href(language: Language, active: bool, state: &ReaderState) -> String {
    match &state.active {
        Some(token) if active => word_href(&token.word, token.position, language),
        _ => format!("/?lang={}", language.code()),
    }
}

fn markdown_options() -> MarkdownOptions {
    let mut options = MarkdownOptions::gfm();
    // Introductions are trusted Markdown; raw HTML blocks pass through.
    options.compile.allow_dangerous_html = true;
    options.compile.gfm_tagfilter = false;
    options
}

fn render_markdown_str(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    let options = markdown_options();
    let html = to_html_with_options(trimmed, &options).unwrap_or_else(|_| trimmed.to_string());
    Some(html)
}

fn render_error_page(message: impl Into<String>) -> String {
    let message = MarkupDisplay::new_unsafe(message.into(), HtmlEscaper).to_string();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <title>Lectio • Error</title>
  </head>
  <body>
    <main>
      <h1>Something went wrong</h1>
      <p>{message}</p>
      <a href="/">Back to the text</a>
    </main>
  </body>
</html>"#
    )
}

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html lang="{{ page.language }}">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>{{ page.title }} • {{ page.subtitle }}</title>
    <script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4"></script>
    <link rel="canonical" href="{{ base_url }}/?lang={{ page.language }}">
    <style>
      .verbum { cursor: pointer; border-radius: 0.25rem; }
      .verbum:hover { background-color: #fef3c7; }
      .verbum.activus { background-color: #fde68a; }
      .lang-btn.active-lang { background-color: #1e293b; color: #fff; }
    </style>
  </head>
  <body class="bg-slate-50 text-slate-900">
    <header class="max-w-6xl mx-auto px-4 pt-10 pb-6">
      <nav id="language-switcher" class="flex gap-2 mb-6" aria-label="Language">
        {% for lang in languages %}
        <a href="{{ lang.href }}" data-lang="{{ lang.code }}" class="lang-btn px-3 py-1 rounded border border-slate-300{% if lang.active %} active-lang{% endif %}">{{ lang.label }}</a>
        {% endfor %}
      </nav>
      <h1 id="main-title" class="text-4xl font-extrabold tracking-tight">{{ page.title }}</h1>
      <p id="subtitle" class="text-lg text-slate-600">{{ page.subtitle }}</p>
      <p id="author" class="text-sm uppercase tracking-wide text-slate-500">{{ page.author }}</p>
    </header>
    <main class="max-w-6xl mx-auto px-4 grid gap-8 md:grid-cols-3">
      <div class="md:col-span-2 space-y-8">
        <section>
          <h2 id="context-title" class="text-2xl font-semibold mb-2">{{ page.introduction_title }}</h2>
          <div id="context-content" class="prose prose-slate max-w-none">{% if introduction_html.is_some() %}{{ introduction_html.as_ref().unwrap()|safe }}{% endif %}</div>
        </section>
        <section>
          <h2 id="text-title" class="text-2xl font-semibold mb-4">{{ page.section_label }}</h2>
          <div id="paragrafus-contentus">
            {% for verse in verses %}
            <p class="mb-6 textum-classicum"><span class="verse-number font-bold mr-2 text-gray-400">{{ verse.label }}</span>{% for seg in verse.segments %}{% if seg.interactive %}<a href="{{ seg.href }}" class="verbum{% if seg.active %} activus{% endif %}" data-versus-index="{{ seg.verse }}" data-sententia-index="{{ seg.sentence }}" data-verbum-textus="{{ seg.textus }}">{{ seg.text }}</a>{% else %}{{ seg.text }}{% endif %}{% endfor %}</p>
            {% endfor %}
          </div>
        </section>
      </div>
      <aside id="marginalia-contentus" class="bg-white shadow rounded p-4 h-fit">
        {% match panel %}
        {% when Some with (p) %}
        <div class="space-y-4">
          <div>
            <p class="text-2xl textum-classicum text-gray-800 font-bold">{{ p.surface }}</p>
            <p class="text-lg text-blue-600 font-semibold mb-2">{{ p.translation }}</p>
            <p class="text-sm text-gray-600"><b>{{ labels.lemma }}:</b> <i>{{ p.lemma }}</i></p>
            <p class="text-sm text-gray-600"><b>{{ labels.morphology }}:</b> {{ p.morphology }}</p>
            <p class="text-sm text-gray-600"><b>{{ labels.syntax }}:</b> {{ p.syntax }}</p>
          </div>
          <hr>
          <details open>
            <summary class="font-semibold text-gray-700">{{ labels.sentence_translation }}</summary>
            <div class="details-content mt-2 text-sm text-gray-700"><p>{{ p.sentence_translation }}</p></div>
          </details>
          {% if p.syntactic_order.is_some() %}
          <details id="ordo-syntacticus">
            <summary class="font-semibold text-gray-700">{{ labels.syntactic_order }}</summary>
            <div class="details-content mt-2 text-sm text-gray-700"><code>{{ p.syntactic_order.as_ref().unwrap() }}</code></div>
          </details>
          {% endif %}
          {% if p.notes.is_some() %}
          <details id="notae">
            <summary class="font-semibold text-gray-700">{{ labels.notes }}</summary>
            <div class="details-content mt-2 text-sm text-gray-700"><p>{{ p.notes.as_ref().unwrap() }}</p></div>
          </details>
          {% endif %}
        </div>
        {% when None %}
        <p class="text-sm text-slate-500">{{ labels.empty_panel }}</p>
        {% endmatch %}
      </aside>
    </main>
    <footer class="max-w-6xl mx-auto px-4 py-10 text-sm text-slate-500">
      <p id="footer-text">{{ page.footer }}</p>
    </footer>
  </body>
</html>"#,
    ext = "html"
)]
struct PageTemplate<'a> {
    page: &'a PageView,
    base_url: &'a str,
    introduction_html: Option<String>,
    verses: Vec<VerseBlock<'a>>,
    languages: Vec<LanguageLink<'a>>,
    panel: Option<&'a AnalysisPanel>,
    labels: &'static Labels,
}
