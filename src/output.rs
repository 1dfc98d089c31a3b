//! JSON artifact naming and writing.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::debug;

use crate::tree::SearchResult;

const MAX_SLUG_CHARS: usize = 50;

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("failed to create output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize result: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// `paa_<slug>_<YYYYmmdd_HHMMSS>.json`
pub fn default_file_name(query: &str, timestamp: NaiveDateTime) -> String {
    format!(
        "paa_{}_{}.json",
        slugify(query),
        timestamp.format("%Y%m%d_%H%M%S")
    )
}

fn slugify(query: &str) -> String {
    let mut slug = String::with_capacity(query.len());
    for c in query.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let slug: String = slug.chars().take(MAX_SLUG_CHARS).collect();
    let slug = slug.trim_end_matches('_');
    if slug.is_empty() {
        "query".to_string()
    } else {
        slug.to_string()
    }
}

pub fn to_json(result: &SearchResult) -> Result<String, OutputError> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Writes `result` into `dir` (created if missing) and returns the file path.
/// An existing file with the same name is never overwritten.
pub fn write_json(
    result: &SearchResult,
    dir: &Path,
    timestamp: NaiveDateTime,
) -> Result<PathBuf, OutputError> {
    fs::create_dir_all(dir).map_err(|source| OutputError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(default_file_name(&result.query, timestamp));
    let json = to_json(result)?;
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .and_then(|mut file| file.write_all(json.as_bytes()))
        .map_err(|source| OutputError::Write {
            path: path.clone(),
            source,
        })?;

    debug!(path = %path.display(), "result written");
    Ok(path)
}
