/*!
 * Mock metadata extractor for pipeline tests.
 *
 * Responses are keyed by file name; unknown files fail like a tool that
 * cannot read them.
 */

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use exifsrt::errors::ConversionError;
use exifsrt::exiftool::MetadataExtractor;

/// Canned behaviour for one file
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Tool succeeds and prints this output
    Output(String),
    /// Tool exits with this code and stderr
    Failure { code: i32, stderr: String },
}

#[derive(Debug, Default)]
pub struct MockExtractor {
    responses: HashMap<String, MockResponse>,
    calls: Mutex<Vec<PathBuf>>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, file_name: &str, output: &str) -> Self {
        self.responses.insert(file_name.to_string(), MockResponse::Output(output.to_string()));
        self
    }

    pub fn with_failure(mut self, file_name: &str, code: i32, stderr: &str) -> Self {
        self.responses.insert(
            file_name.to_string(),
            MockResponse::Failure { code, stderr: stderr.to_string() },
        );
        self
    }

    /// Files the extractor was asked about, in order
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataExtractor for MockExtractor {
    async fn extract_raw(&self, file: &Path) -> Result<String, ConversionError> {
        self.calls.lock().unwrap().push(file.to_path_buf());

        let name = file.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        match self.responses.get(&name) {
            Some(MockResponse::Output(output)) => Ok(output.clone()),
            Some(MockResponse::Failure { code, stderr }) => Err(ConversionError::ExternalToolFailure {
                file: file.to_path_buf(),
                status: Some(*code),
                stderr: stderr.clone(),
            }),
            None => Err(ConversionError::ExternalToolFailure {
                file: file.to_path_buf(),
                status: Some(1),
                stderr: "Error: Unknown file type".to_string(),
            }),
        }
    }
}
