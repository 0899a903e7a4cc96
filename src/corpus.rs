use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Language code -> localized value, as stored in the corpus JSON.
pub type Localized<T> = BTreeMap<String, T>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Corpus {
    pub titulus_principalis: String,
    #[serde(default)]
    pub titulus_secundarius: Localized<String>,
    pub auctor: String,
    #[serde(default)]
    pub introductio: Localized<Introduction>,
    pub textus: Textus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Introduction {
    pub titulus: String,
    /// Trusted Markdown. The HTML view renders it with raw HTML passed
    /// through; the text view strips the tags.
    pub contentus: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Textus {
    pub capitula: Vec<Verse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verse {
    #[serde(deserialize_with = "display_label")]
    pub numerus: String,
    pub orationes: Vec<Sentence>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentence {
    pub original_lat: String,
    #[serde(default)]
    pub verba: Vec<Word>,
    #[serde(default)]
    pub translationes: Localized<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordo_syntacticus: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notae: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Word {
    pub textus: String,
    pub lemma: String,
    pub morphologia: String,
    pub syntaxis: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translatio: Option<Localized<String>>,
}

#[allow(dead_code)]
impl Corpus {
    pub fn verses(&self) -> &[Verse] {
        &self.textus.capitula
    }

    pub fn sentence(&self, verse: usize, sentence: usize) -> Option<&Sentence> {
        self.textus.capitula.get(verse)?.orationes.get(sentence)
    }

    pub fn word_count(&self) -> usize {
        self.textus
            .capitula
            .iter()
            .flat_map(|verse| verse.orationes.iter())
            .map(|sentence| sentence.verba.len())
            .sum()
    }
}

/// Verse numbers show up both as `"1"` and `1` in hand-written corpora.
fn display_label<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Label {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Label::deserialize(deserializer)? {
        Label::Text(text) => text,
        Label::Int(value) => value.to_string(),
        Label::Float(value) => value.to_string(),
    })
}
