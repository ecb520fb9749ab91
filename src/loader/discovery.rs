use crate::error::{Pm2InsomniaError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Expand the command line inputs into a list of files.
///
/// Files are taken as given. Directories are walked recursively for `*.json`
/// files, sorted by path. Duplicates are dropped, keeping the first
/// occurrence.
pub fn discover_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_file() {
            push_unique(&mut files, input.clone());
        } else if input.is_dir() {
            let mut found = json_files(input)?;
            found.sort();
            debug!(dir = %input.display(), count = found.len(), "Scanned directory");
            for file in found {
                push_unique(&mut files, file);
            }
        } else {
            return Err(Pm2InsomniaError::InvalidPath(format!(
                "{} does not exist",
                input.display()
            )));
        }
    }

    Ok(files)
}

fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(|e| {
            Pm2InsomniaError::InvalidPath(format!("Failed to walk {}: {}", dir.display(), e))
        })?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

fn push_unique(files: &mut Vec<PathBuf>, file: PathBuf) {
    if !files.contains(&file) {
        files.push(file);
    }
}
