use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use log::debug;
use serde_json::Value;

use super::DEFAULT_DATA_PATH;

pub(super) fn candidate_paths(wanted: &str) -> Vec<PathBuf> {
    let wanted = wanted.trim();
    let wanted = if wanted.is_empty() {
        DEFAULT_DATA_PATH
    } else {
        wanted
    };

    let mut candidates = vec![PathBuf::from(wanted)];
    if Path::new(wanted).is_relative() && !wanted.starts_with("./") {
        candidates.push(PathBuf::from(format!("./{wanted}")));
    }
    candidates
}

/// Tries each candidate in order; a read or JSON failure moves on to the next one.
pub(super) fn read_first(candidates: &[PathBuf]) -> Result<(PathBuf, Value)> {
    let mut last_error = None;

    for candidate in candidates {
        match read_json(candidate) {
            Ok(value) => return Ok((candidate.clone(), value)),
            Err(error) => {
                debug!("candidate {} failed: {error:#}", candidate.display());
                last_error = Some(error);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| anyhow!("unable to load document: no candidate paths")))
}

fn read_json(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))
}
