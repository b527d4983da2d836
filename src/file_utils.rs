use anyhow::{Result, Context};
use log::warn;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::AppError;

// @module: File and directory utilities

// @const: Sidecar extension
pub const SIDECAR_EXTENSION: &str = "srt";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @generates: Sidecar subtitle path next to the video, same base name
    pub fn sidecar_path<P: AsRef<Path>>(video_file: P) -> PathBuf {
        video_file.as_ref().with_extension(SIDECAR_EXTENSION)
    }

    // @checks: Extension is one of `extensions` (lowercase, no dot)
    pub fn has_video_extension<P: AsRef<Path>>(path: P, extensions: &[String]) -> bool {
        path.as_ref()
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| extensions.iter().any(|e| *e == ext))
    }

    /// List video files in a directory, sorted by file name
    ///
    /// Only the directory itself is searched unless `recursive` is set. An
    /// unreadable root directory is an error; unreadable entries below it
    /// are logged and skipped.
    pub fn list_video_files<P: AsRef<Path>>(dir: P, extensions: &[String], recursive: bool) -> Result<Vec<PathBuf>, AppError> {
        let dir = dir.as_ref();

        fs::read_dir(dir).map_err(|e| AppError::DirectoryListing {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;

        let max_depth = if recursive { usize::MAX } else { 1 };
        let mut result = Vec::new();

        for entry in WalkDir::new(dir).min_depth(1).max_depth(max_depth).follow_links(true).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };

            if entry.file_type().is_file() && Self::has_video_extension(entry.path(), extensions) {
                result.push(entry.into_path());
            }
        }

        Ok(result)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file, replacing any existing content
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> io::Result<()> {
        fs::write(path, content)
    }
}
