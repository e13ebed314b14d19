mod fetch;
mod normalize;
mod parse;

use anyhow::{Context, Result};
use log::info;
use thiserror::Error;

use crate::graph::{Graph, StructureError};

pub const DEFAULT_DATA_PATH: &str = "data/latest.json";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document must be a JSON object")]
    NotAnObject,
    #[error(transparent)]
    Structure(#[from] StructureError),
}

/// Reads the first readable candidate for `path` and builds a repaired graph from it.
pub fn load_document(path: &str) -> Result<Graph> {
    let candidates = fetch::candidate_paths(path);
    let (source, value) = fetch::read_first(&candidates)?;

    let document = parse::parse_document(value)
        .with_context(|| format!("failed to parse {}", source.display()))?;
    let graph = normalize::build_graph(document)
        .with_context(|| format!("invalid structure in {}", source.display()))?;

    info!(
        "read {} ({} nodes, {} backlinks)",
        source.display(),
        graph.node_count(),
        graph.backlinks.len()
    );
    Ok(graph)
}
