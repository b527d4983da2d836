/*!
 * Tests for file utility functions
 */

use std::fs;
use std::path::{Path, PathBuf};
use anyhow::Result;
use exifsrt::errors::AppError;
use exifsrt::file_utils::FileManager;
use crate::common;

fn extensions() -> Vec<String> {
    vec!["mts".to_string(), "mp4".to_string()]
}

fn file_names(paths: &[PathBuf], root: &Path) -> Vec<String> {
    let mut names: Vec<String> = paths
        .iter()
        .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();
    names.sort();
    names
}

fn populate(dir: &Path) -> Result<()> {
    common::create_test_file(dir, "a.MTS", "")?;
    common::create_test_file(dir, "b.mp4", "")?;
    common::create_test_file(dir, "notes.txt", "")?;
    common::create_test_file(dir, "a.srt", "")?;
    fs::create_dir(dir.join("sub"))?;
    common::create_test_file(&dir.join("sub"), "c.mp4", "")?;
    Ok(())
}

/// Test that only the top level is listed by default
#[test]
fn test_list_video_files_withNonRecursive_shouldListTopLevelVideos() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    populate(temp_dir.path())?;

    let files = FileManager::list_video_files(temp_dir.path(), &extensions(), false)?;

    assert_eq!(file_names(&files, temp_dir.path()), vec!["a.MTS", "b.mp4"]);
    Ok(())
}

/// Test that subdirectories are walked when asked
#[test]
fn test_list_video_files_withRecursive_shouldIncludeSubdirectories() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    populate(temp_dir.path())?;

    let files = FileManager::list_video_files(temp_dir.path(), &extensions(), true)?;

    assert_eq!(file_names(&files, temp_dir.path()), vec!["a.MTS", "b.mp4", "sub/c.mp4"]);
    Ok(())
}

/// Test that a missing directory is reported as a listing failure
#[test]
fn test_list_video_files_withMissingDirectory_shouldFail() {
    let result = FileManager::list_video_files("./non_existent_directory_12345", &extensions(), false);
    assert!(matches!(result, Err(AppError::DirectoryListing { .. })));
}

/// Test sidecar naming
#[test]
fn test_sidecar_path_withVideoFile_shouldReplaceExtension() {
    assert_eq!(
        FileManager::sidecar_path("/tmp/card/20191015-132726-00027.MTS"),
        Path::new("/tmp/card/20191015-132726-00027.srt")
    );
    assert_eq!(FileManager::sidecar_path("clip.tar.mp4"), Path::new("clip.tar.srt"));
}

/// Test extension matching
#[test]
fn test_has_video_extension_withMixedCase_shouldMatch() {
    assert!(FileManager::has_video_extension("clip.MTS", &extensions()));
    assert!(FileManager::has_video_extension("clip.Mp4", &extensions()));
    assert!(!FileManager::has_video_extension("clip.srt", &extensions()));
    assert!(!FileManager::has_video_extension("mts", &extensions()));
}

/// Test that file_exists distinguishes files from directories
#[test]
fn test_file_exists_withFileAndDirectory_shouldOnlyAcceptFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file = common::create_test_file(temp_dir.path(), "clip.srt", "x")?;

    assert!(FileManager::file_exists(&file));
    assert!(!FileManager::file_exists(temp_dir.path()));
    assert!(!FileManager::file_exists(temp_dir.path().join("missing.srt")));
    Ok(())
}

/// Test that write_to_file replaces existing content
#[test]
fn test_write_to_file_withExistingFile_shouldOverwrite() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file = common::create_test_file(temp_dir.path(), "clip.srt", "old content that is longer")?;

    FileManager::write_to_file(&file, "new")?;

    assert_eq!(FileManager::read_to_string(&file)?, "new");
    Ok(())
}
