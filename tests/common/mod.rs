/*!
 * Common test utilities for the exifsrt test suite
 */

use std::path::{Path, PathBuf};
use std::fs;
use anyhow::Result;
use tempfile::TempDir;

// Re-export the mock extractor module
pub mod mock_extractor;

/// Tool output for a clip that only has summary metadata
pub const SUMMARY_OUTPUT: &str = "CreateDate: 2023:05:01 10:00:00\nDuration: 00:00:05\n";

/// Tool output for an AVCHD clip with two periodic samples
pub const PERIODIC_OUTPUT: &str = "\
[ExifTool]      ExifToolVersion                 : 12.01
[File]          FileName                        : 20191015-132726-00027.MTS
[M2TS]          Duration                        : 16.11 s
[H264]          ImageWidth                      : 1920
[H264]          DateTimeOriginal                : 2019:10:15 13:27:10+04:00
[H264]          ApertureSetting                 : Auto
[H264]          Gain                            : 6 dB
[H264]          ExposureProgram                 : Program AE
[H264]          WhiteBalance                    : Auto
[H264]          ExposureTime                    : 1/100
[H264]          FNumber                         : 3.5
[H264]          Make                            : Sony
[H264]          Model                           : DSC-WX300
[H264]          DateTimeOriginal                : 2019:10:15 13:27:11+04:00
[H264]          Gain                            : 3 dB
[H264]          ExposureTime                    : 1/60
[H264]          FNumber                         : 4.0
[Composite]     ShutterSpeed                    : 1/100
";

/// Initialise test logging once; later calls are no-ops
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Writes an executable shell script standing in for the metadata tool
#[cfg(unix)]
pub fn create_tool_script(dir: &Path, name: &str, body: &str) -> Result<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body))?;
    let mut permissions = fs::metadata(&path)?.permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(&path, permissions)?;
    Ok(path)
}
