/*!
 * Running the external metadata tool.
 *
 * `MetadataExtractor` is the seam between the conversion pipeline and the
 * subprocess: `ExifTool` runs the real executable, tests plug in canned
 * output instead.
 */

use async_trait::async_trait;
use log::debug;
use std::fmt::Debug;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_config::Config;
use crate::errors::ConversionError;
use crate::metadata::MetadataRecord;
use crate::platform;

/// Source of raw `key: value` metadata text for a video file
#[async_trait]
pub trait MetadataExtractor: Send + Sync + Debug {
    /// Produce the tool output for one file
    ///
    /// # Arguments
    /// * `file` - The video file to inspect
    ///
    /// # Returns
    /// * `Result<String, ConversionError>` - Raw line oriented output
    async fn extract_raw(&self, file: &Path) -> Result<String, ConversionError>;
}

/// Extract and parse the metadata of one file
pub async fn extract_metadata(
    extractor: &dyn MetadataExtractor,
    file: &Path,
    periodic_groups: &[String],
) -> Result<MetadataRecord, ConversionError> {
    let output = extractor.extract_raw(file).await?;
    MetadataRecord::parse(&output, periodic_groups)
}

/// ExifTool subprocess runner
#[derive(Debug, Clone)]
pub struct ExifTool {
    tool_path: PathBuf,
    timeout: Option<Duration>,
    filename_charset: Option<String>,
    extra_args: Vec<String>,
}

impl ExifTool {
    // Short tag names, group prefixes, ignore minor errors, embedded data
    const BASE_ARGS: [&'static str; 4] = ["-s", "-G", "-m", "-ee"];

    // @lines: Max stderr lines carried into an error
    const MAX_STDERR_LINES: usize = 5;

    pub fn new<P: Into<PathBuf>>(tool_path: P) -> Self {
        ExifTool {
            tool_path: tool_path.into(),
            timeout: None,
            filename_charset: None,
            extra_args: Vec::new(),
        }
    }

    /// Build a runner from the application configuration
    pub fn from_config(config: &Config) -> Self {
        let mut tool = Self::new(config.tool_path.clone())
            .with_timeout_secs(config.tool_timeout_secs)
            .with_extra_args(config.extra_tool_args.clone());
        if let Some(charset) = &config.filename_charset {
            tool = tool.with_filename_charset(charset.clone());
        }
        tool
    }

    /// Limit each run; 0 means no limit
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        self
    }

    pub fn with_filename_charset(mut self, charset: String) -> Self {
        self.filename_charset = Some(charset);
        self
    }

    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// Arguments passed before the file name
    pub fn arguments(&self) -> Vec<String> {
        let mut args: Vec<String> = Self::BASE_ARGS.iter().map(|a| a.to_string()).collect();
        if let Some(charset) = &self.filename_charset {
            args.push("-charset".to_string());
            args.push(format!("filename={}", charset));
        }
        args.extend(self.extra_args.iter().cloned());
        args
    }

    /// Keep the meaningful stderr lines
    pub fn filter_stderr(stderr: &str) -> String {
        let lines: Vec<&str> = stderr
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter(|line| !line.ends_with("files read") && !line.ends_with("files updated"))
            .take(Self::MAX_STDERR_LINES)
            .collect();

        if lines.is_empty() {
            "no error output".to_string()
        } else {
            lines.join("; ")
        }
    }

    fn spawn_error(&self, error: io::Error) -> ConversionError {
        match error.kind() {
            io::ErrorKind::NotFound => ConversionError::ExternalToolNotFound {
                path: self.tool_path.clone(),
            },
            _ => ConversionError::ExternalToolSpawn {
                path: self.tool_path.clone(),
                reason: error.to_string(),
            },
        }
    }
}

#[async_trait]
impl MetadataExtractor for ExifTool {
    async fn extract_raw(&self, file: &Path) -> Result<String, ConversionError> {
        if platform::is_explicit_path(&self.tool_path) && !self.tool_path.is_file() {
            return Err(ConversionError::ExternalToolNotFound {
                path: self.tool_path.clone(),
            });
        }

        let args = self.arguments();
        debug!("Running {} {} {}", self.tool_path.display(), args.join(" "), file.display());

        let mut command = platform::tool_command(&self.tool_path, &args, file);
        let output_future = command.output();

        let result = match self.timeout {
            Some(timeout) => tokio::select! {
                result = output_future => result,
                _ = tokio::time::sleep(timeout) => {
                    return Err(ConversionError::ExternalToolTimeout {
                        file: file.to_path_buf(),
                        secs: timeout.as_secs(),
                    });
                }
            },
            None => output_future.await,
        };

        let output = result.map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(ConversionError::ExternalToolFailure {
                file: file.to_path_buf(),
                status: output.status.code(),
                stderr: Self::filter_stderr(&String::from_utf8_lossy(&output.stderr)),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
