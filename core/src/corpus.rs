//! Loading documents from disk.
//!
//! A corpus is a JSON file (one object or an array), a JSONL file, a plain
//! text file, or a directory tree holding any of those. Directory entries are
//! visited in file-name order so document ids are stable between runs.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, alias = "body")]
    pub content: String,
}

impl Document {
    pub fn meta(&self) -> DocMeta {
        DocMeta {
            title: self.title.clone().unwrap_or_else(|| "N/A".to_string()),
            url: self.url.clone(),
        }
    }
}

/// What result listings show for a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocMeta {
    pub title: String,
    pub url: Option<String>,
}

pub fn load_corpus<P: AsRef<Path>>(path: P) -> Result<Vec<Document>> {
    let path = path.as_ref();
    let mut docs = Vec::new();
    if path.is_dir() {
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let p = e.path().unwrap_or(path).to_path_buf();
                Error::io(p, e.into())
            })?;
            if entry.file_type().is_file() {
                load_file(entry.path(), &mut docs)?;
            }
        }
    } else {
        load_file(path, &mut docs)?;
    }
    let empty = docs.iter().filter(|d| d.content.is_empty()).count();
    if empty > 0 {
        tracing::warn!(empty, "documents without content will not be searchable");
    }
    tracing::info!(path = %path.display(), documents = docs.len(), "corpus loaded");
    Ok(docs)
}

fn load_file(file: &Path, docs: &mut Vec<Document>) -> Result<()> {
    match file.extension().and_then(|s| s.to_str()) {
        Some("jsonl") => load_jsonl(file, docs),
        Some("json") => load_json(file, docs),
        Some("txt") => {
            let content = fs::read_to_string(file).map_err(|e| Error::io(file, e))?;
            let title = file.file_stem().map(|s| s.to_string_lossy().into_owned());
            docs.push(Document { title, url: None, content });
            Ok(())
        }
        _ => {
            tracing::debug!(path = %file.display(), "skipping non-document file");
            Ok(())
        }
    }
}

fn load_jsonl(file: &Path, docs: &mut Vec<Document>) -> Result<()> {
    let f = File::open(file).map_err(|e| Error::io(file, e))?;
    for line in BufReader::new(f).lines() {
        let line = line.map_err(|e| Error::io(file, e))?;
        if line.trim().is_empty() { continue; }
        let doc: Document = serde_json::from_str(&line).map_err(|e| Error::json(file, e))?;
        docs.push(doc);
    }
    Ok(())
}

fn load_json(file: &Path, docs: &mut Vec<Document>) -> Result<()> {
    let f = File::open(file).map_err(|e| Error::io(file, e))?;
    let json: serde_json::Value = serde_json::from_reader(BufReader::new(f)).map_err(|e| Error::json(file, e))?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                docs.push(serde_json::from_value(v).map_err(|e| Error::json(file, e))?);
            }
        }
        serde_json::Value::Object(_) => {
            docs.push(serde_json::from_value(json).map_err(|e| Error::json(file, e))?);
        }
        _ => tracing::warn!(path = %file.display(), "JSON root is neither an object nor an array"),
    }
    Ok(())
}
