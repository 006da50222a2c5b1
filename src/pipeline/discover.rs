//! Image discovery: list eligible files in the input directory.

use crate::error::Img2MdError;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File extensions treated as images, lowercase without the dot.
pub const RECOGNIZED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tiff", "bmp", "gif"];

/// Whether a path carries a recognized image extension.
///
/// Matching is case-insensitive and looks at the extension only; the file
/// itself is not opened here.
pub fn is_recognized(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            RECOGNIZED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// List images in `dir`, sorted by path.
///
/// Non-recursive: subdirectories are not descended into. Entries are
/// selected by extension alone, so an unreadable or misnamed entry
/// surfaces later as a per-image error rather than aborting the listing.
/// Dotfiles such as `.png` have no extension and are skipped.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>, Img2MdError> {
    if !dir.exists() {
        return Err(Img2MdError::DirNotFound {
            path: dir.to_path_buf(),
        });
    }
    if !dir.is_dir() {
        return Err(Img2MdError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| list_error(dir, e))?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| list_error(dir, e))?;
        let path = entry.path();
        if is_recognized(&path) {
            paths.push(path);
        }
    }
    paths.sort();

    debug!(dir = %dir.display(), count = paths.len(), "discovered images");
    Ok(paths)
}

fn list_error(dir: &Path, e: io::Error) -> Img2MdError {
    if e.kind() == io::ErrorKind::PermissionDenied {
        Img2MdError::PermissionDenied {
            path: dir.to_path_buf(),
        }
    } else {
        Img2MdError::ListFailed {
            path: dir.to_path_buf(),
            source: e,
        }
    }
}
