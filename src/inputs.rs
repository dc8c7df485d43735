use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::CheckError;

/// File extensions the checker accepts, matched case-insensitively.
const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "bmp"];

/// List every usable image in `dir`, sorted by file name.
///
/// Subdirectories and files with other extensions are skipped silently; the
/// ordering is what makes "row i of both result matrices corresponds to
/// input i" hold, so callers must not reorder the result.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>, CheckError> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                IMAGE_EXTENSIONS.iter().any(|known| *known == ext)
            })
            .unwrap_or(false);
        if matches {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Take the first `count` images from `dir`, failing fast when the directory
/// cannot supply them. Exactly `count` available is enough.
pub fn select_images(dir: &Path, count: usize) -> Result<Vec<PathBuf>, CheckError> {
    let mut paths = list_images(dir)?;
    if paths.len() < count {
        return Err(CheckError::InsufficientInputs {
            requested: count,
            available: paths.len(),
            dir: dir.display().to_string(),
        });
    }
    paths.truncate(count);
    info!(
        dir = %dir.display(),
        selected = paths.len(),
        "selected evaluation images"
    );
    Ok(paths)
}
