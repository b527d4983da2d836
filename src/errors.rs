/*!
 * Error types for the exifsrt application.
 *
 * `ConversionError` covers everything that can go wrong while converting a
 * single video file; it is reported and the run moves on to the next file.
 * `AppError` covers the few failures that stop a whole run.
 */

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while converting one video file
#[derive(Error, Debug)]
pub enum ConversionError {
    /// The metadata tool does not exist at the configured location
    #[error("Metadata tool not found: {}", .path.display())]
    ExternalToolNotFound {
        /// Configured tool path
        path: PathBuf,
    },

    /// The metadata tool exists but could not be started
    #[error("Failed to start metadata tool {}: {reason}", .path.display())]
    ExternalToolSpawn {
        /// Configured tool path
        path: PathBuf,
        /// Reason reported by the OS
        reason: String,
    },

    /// The metadata tool ran but exited unsuccessfully
    #[error("Metadata tool failed on {} ({}): {stderr}", .file.display(), format_status(.status))]
    ExternalToolFailure {
        /// Video file being processed
        file: PathBuf,
        /// Exit code, `None` when killed by a signal
        status: Option<i32>,
        /// Relevant stderr lines
        stderr: String,
    },

    /// The metadata tool did not finish in time
    #[error("Metadata tool timed out after {secs}s on {}", .file.display())]
    ExternalToolTimeout {
        /// Video file being processed
        file: PathBuf,
        /// Timeout that expired
        secs: u64,
    },

    /// The tool output did not have the expected shape or fields
    #[error("Malformed metadata{}: {reason}", format_line(.line))]
    MetadataParseError {
        /// 1-based output line, when the problem is tied to one line
        line: Option<usize>,
        /// What was wrong
        reason: String,
    },

    /// The subtitle sidecar could not be written
    #[error("Failed to write subtitle file {}: {source}", .path.display())]
    FileWriteError {
        /// Sidecar path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl ConversionError {
    /// Shorthand for a parse error tied to an output line
    pub fn parse_at(line: usize, reason: impl Into<String>) -> Self {
        Self::MetadataParseError { line: Some(line), reason: reason.into() }
    }

    /// Shorthand for a parse error about the record as a whole
    pub fn parse(reason: impl Into<String>) -> Self {
        Self::MetadataParseError { line: None, reason: reason.into() }
    }
}

fn format_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

fn format_line(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!(" at line {}", line),
        None => String::new(),
    }
}

/// Main application error type for failures that abort a run
#[derive(Error, Debug)]
pub enum AppError {
    /// The input directory could not be listed at all
    #[error("Cannot list directory {}: {reason}", .path.display())]
    DirectoryListing {
        /// Directory that was requested
        path: PathBuf,
        /// Underlying reason
        reason: String,
    },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}
