use std::env;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use zstd::bulk::compress as zstd_compress;

#[path = "src/corpus.rs"]
mod corpus_model;
use corpus_model::Corpus;

const CORPUS_COMPRESSION_LEVEL: i32 = 5;

fn main() -> Result<(), Box<dyn Error>> {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);

    let raw = load_corpus(&manifest_dir)?;
    let compressed = zstd_compress(raw.as_bytes(), CORPUS_COMPRESSION_LEVEL)?;
    let corpus_path = out_dir.join("corpus.json.zst");
    fs::write(&corpus_path, compressed)?;
    println!("cargo:rustc-env=LECTIO_BUNDLED_CORPUS={}", corpus_path.display());

    Ok(())
}

fn load_corpus(manifest_dir: &Path) -> Result<String, Box<dyn Error>> {
    let corpus_file = manifest_dir.join("data/corpus.json");
    println!("cargo:rerun-if-changed={}", corpus_file.display());
    if !corpus_file.exists() {
        panic!("Missing bundled corpus {}", corpus_file.display());
    }
    let raw = fs::read_to_string(&corpus_file)?;
    let corpus: Corpus = serde_json::from_str(&raw)
        .map_err(|err| format!("{} is not a valid corpus: {err}", corpus_file.display()))?;
    if corpus.textus.capitula.is_empty() {
        panic!("Bundled corpus {} has no verses", corpus_file.display());
    }
    Ok(raw)
}
