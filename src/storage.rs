// SPDX-License-Identifier: GPL-3.0-only

//! Storage for downloaded codes

use crate::errors::ExportError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Destination for exported files
pub trait FileSaver {
    /// Write `bytes` under `file_name`, returning the final path
    fn save(&self, bytes: &[u8], file_name: &str) -> Result<PathBuf, ExportError>;
}

/// Saves into a directory, creating it on demand
///
/// Existing files are never overwritten; like a browser download, a
/// numbered name (`qrcode (1).png`) is picked instead.
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl FileSaver for DirectorySaver {
    fn save(&self, bytes: &[u8], file_name: &str) -> Result<PathBuf, ExportError> {
        if file_name.is_empty() || file_name.contains(std::path::MAIN_SEPARATOR) {
            return Err(ExportError::SaveFailed(format!(
                "invalid file name {:?}",
                file_name
            )));
        }

        std::fs::create_dir_all(&self.dir)?;
        let path = unique_path(&self.dir, file_name);
        debug!(path = %path.display(), size = bytes.len(), "Writing file");
        std::fs::write(&path, bytes)?;

        info!(path = %path.display(), "Saved file");
        Ok(path)
    }
}

/// First free path for `file_name` in `dir`
fn unique_path(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let name = Path::new(file_name);
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = name
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (1u32..)
        .map(|n| dir.join(format!("{} ({}){}", stem, n, ext)))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_creates_directory() {
        let temp = tempfile::tempdir().unwrap();
        let saver = DirectorySaver::new(temp.path().join("QR Codes"));

        let path = saver.save(b"png", "qrcode.png").unwrap();
        assert_eq!(path, temp.path().join("QR Codes").join("qrcode.png"));
        assert_eq!(std::fs::read(&path).unwrap(), b"png");
    }

    #[test]
    fn test_save_never_overwrites() {
        let temp = tempfile::tempdir().unwrap();
        let saver = DirectorySaver::new(temp.path());

        let first = saver.save(b"one", "qrcode.png").unwrap();
        let second = saver.save(b"two", "qrcode.png").unwrap();

        assert_ne!(first, second);
        assert_eq!(second.file_name().unwrap(), "qrcode (1).png");
        assert_eq!(std::fs::read(&first).unwrap(), b"one");
    }

    #[test]
    fn test_rejects_path_in_file_name() {
        let temp = tempfile::tempdir().unwrap();
        let saver = DirectorySaver::new(temp.path());
        let name = format!("..{}qrcode.png", std::path::MAIN_SEPARATOR);
        assert!(matches!(
            saver.save(b"png", &name),
            Err(ExportError::SaveFailed(_))
        ));
    }
}
