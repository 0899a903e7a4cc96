use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Languages the page chrome and the analysis panel are localized into.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Es,
    En,
    Zh,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Es, Language::En, Language::Zh];

    pub fn code(self) -> &'static str {
        match self {
            Language::Es => "es",
            Language::En => "en",
            Language::Zh => "zh",
        }
    }

    /// Label shown on the language switcher button.
    pub fn button_label(self) -> &'static str {
        match self {
            Language::Es => "Español",
            Language::En => "English",
            Language::Zh => "中文",
        }
    }

    pub fn section_label(self) -> &'static str {
        match self {
            Language::Es => "Texto y Análisis",
            Language::En => "Text and Analysis",
            Language::Zh => "文本與分析",
        }
    }

    pub fn labels(self) -> &'static Labels {
        match self {
            Language::Es => &ES_LABELS,
            Language::En => &EN_LABELS,
            Language::Zh => &ZH_LABELS,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLanguage(pub String);

impl fmt::Display for UnknownLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown language code {:?} (expected one of es, en, zh)",
            self.0
        )
    }
}

impl std::error::Error for UnknownLanguage {}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "es" => Ok(Language::Es),
            "en" => Ok(Language::En),
            "zh" => Ok(Language::Zh),
            _ => Err(UnknownLanguage(value.to_string())),
        }
    }
}

/// Static UI strings for the analysis panel and footer.
#[derive(Debug)]
pub struct Labels {
    pub lemma: &'static str,
    pub morphology: &'static str,
    pub syntax: &'static str,
    pub sentence_translation: &'static str,
    pub syntactic_order: &'static str,
    pub notes: &'static str,
    pub empty_panel: &'static str,
    pub footer_tagline: &'static str,
}

static ES_LABELS: Labels = Labels {
    lemma: "Lema",
    morphology: "Morfología",
    syntax: "Sintaxis",
    sentence_translation: "Traducción del Verso",
    syntactic_order: "Orden Sintáctico",
    notes: "Notas Adicionales",
    empty_panel: "Haz clic en una palabra para ver su análisis.",
    footer_tagline: "Análisis Interactivo.",
};

static EN_LABELS: Labels = Labels {
    lemma: "Lemma",
    morphology: "Morphology",
    syntax: "Syntax",
    sentence_translation: "Verse Translation",
    syntactic_order: "Syntactic Order",
    notes: "Additional Notes",
    empty_panel: "Click a word to see its analysis.",
    footer_tagline: "Interactive Analysis.",
};

static ZH_LABELS: Labels = Labels {
    lemma: "詞元",
    morphology: "詞法",
    syntax: "句法",
    sentence_translation: "詩句翻譯",
    syntactic_order: "句法語序",
    notes: "附註",
    empty_panel: "點擊單詞以查看分析。",
    footer_tagline: "互動分析。",
};
