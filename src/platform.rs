//! Platform specific bits: where the metadata tool lives by default, how
//! it is started, and how its output lines end.
//!
//! Everything else in the crate is platform independent.

use std::path::{Path, PathBuf};
use tokio::process::Command;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Default location of the metadata tool
///
/// On Windows the ExifTool installer puts the executable under
/// `%ProgramFiles(x86)%\EXIF\ExifTool`; that is preferred when present,
/// otherwise the tool is looked up on `PATH`.
#[cfg(windows)]
pub fn default_tool_path() -> PathBuf {
    if let Some(program_files) = std::env::var_os("ProgramFiles(x86)") {
        let installed = PathBuf::from(program_files)
            .join("EXIF")
            .join("ExifTool")
            .join("exiftool.exe");
        if installed.is_file() {
            return installed;
        }
    }
    PathBuf::from("exiftool.exe")
}

/// Default location of the metadata tool, looked up on `PATH`
#[cfg(not(windows))]
pub fn default_tool_path() -> PathBuf {
    PathBuf::from("exiftool")
}

/// Whether the tool path names a file directly rather than a `PATH` lookup
pub fn is_explicit_path(tool_path: &Path) -> bool {
    tool_path.components().count() > 1 || tool_path.is_absolute()
}

/// Build the subprocess command for the tool
///
/// The child is killed if the returned command's future is dropped, which
/// is how timeouts stop a hung tool.
pub fn tool_command(tool_path: &Path, args: &[String], file: &Path) -> Command {
    let mut command = Command::new(tool_path);
    command
        .args(args)
        .arg(file)
        .stdin(std::process::Stdio::null())
        .kill_on_drop(true);

    #[cfg(windows)]
    command.creation_flags(CREATE_NO_WINDOW);

    command
}

/// Normalise tool output line endings to `\n`
pub fn normalize_line_endings(output: &str) -> String {
    output.replace("\r\n", "\n").replace('\r', "\n")
}
