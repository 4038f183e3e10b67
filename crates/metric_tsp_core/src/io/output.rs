use std::{fs, path::Path};

use crate::{Error, GraphModel, Result, Tour};

/// Tour labels separated by single spaces; the first label is not repeated.
pub fn format_tour(graph: &GraphModel, tour: &Tour) -> Result<String> {
    Ok(tour.labels(graph)?.join(" "))
}

/// Writes `format_tour` plus a newline, creating parent directories.
pub fn write_tour(path: &Path, graph: &GraphModel, tour: &Tour) -> Result<()> {
    let mut line = format_tour(graph, tour)?;
    line.push('\n');
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, line)
        .map_err(|e| Error::other(format!("failed to write {}: {e}", path.display())))
}
