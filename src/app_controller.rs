use log::{error, warn, info, debug};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use indicatif::{ProgressBar, ProgressStyle};

use crate::app_config::Config;
use crate::errors::{AppError, ConversionError};
use crate::exiftool::{self, ExifTool, MetadataExtractor};
use crate::file_utils::FileManager;
use crate::subtitle_builder::SubtitleBuilder;
use crate::subtitle_processor::SubtitleCollection;

// @module: Application controller for metadata to subtitle conversion

/// What happened to a single video file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Sidecar written at the given path
    Written(PathBuf),
    /// Sidecar already existed and skipping was requested
    Skipped(PathBuf),
}

/// Totals for a folder run
#[derive(Debug, Default)]
pub struct RunSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Sidecars written, in processing order
    pub outputs: Vec<PathBuf>,
    /// Failed video files with the reported error
    pub failures: Vec<(PathBuf, String)>,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.processed + self.skipped + self.failed
    }
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Metadata source, the real tool outside of tests
    extractor: Arc<dyn MetadataExtractor>,

    // @field: Entry builder derived from config
    builder: SubtitleBuilder,
}

impl Controller {
    // @method: Create a controller running the configured metadata tool
    pub fn with_config(config: Config) -> Result<Self, AppError> {
        let extractor = Arc::new(ExifTool::from_config(&config));
        Self::with_extractor(config, extractor)
    }

    // @method: Create a controller with a custom metadata source
    pub fn with_extractor(config: Config, extractor: Arc<dyn MetadataExtractor>) -> Result<Self, AppError> {
        config.validate().map_err(|e| AppError::Config(e.to_string()))?;
        let builder = SubtitleBuilder::from_config(&config);

        Ok(Self {
            config,
            extractor,
            builder,
        })
    }

    /// Run extract, build and write for one video file
    ///
    /// Nothing is written unless extraction and entry building both succeed.
    pub async fn convert_file(&self, video_file: &Path) -> Result<PathBuf, ConversionError> {
        let record = exiftool::extract_metadata(
            self.extractor.as_ref(),
            video_file,
            &self.config.periodic_groups,
        ).await?;
        debug!("{}: {} fields, {} samples", video_file.display(), record.fields().len(), record.samples().len());

        let entries = self.builder.build(&record)?;
        let collection = SubtitleCollection::with_entries(video_file.to_path_buf(), entries);
        collection.write_sidecar()
    }

    /// Convert one video file, honouring `skip_existing`
    pub async fn process_file(&self, video_file: &Path) -> Result<FileOutcome, ConversionError> {
        let sidecar = FileManager::sidecar_path(video_file);
        if self.config.skip_existing && FileManager::file_exists(&sidecar) {
            return Ok(FileOutcome::Skipped(sidecar));
        }

        self.convert_file(video_file).await.map(FileOutcome::Written)
    }

    /// Convert every video file in a directory, one after another
    ///
    /// A failing file is logged and counted; only an unlistable directory
    /// fails the run.
    pub async fn run_folder(&self, input_dir: &Path) -> Result<RunSummary, AppError> {
        let start_time = Instant::now();

        let extensions = self.config.normalized_extensions();
        let video_files = FileManager::list_video_files(input_dir, &extensions, self.config.recursive)?;

        let mut summary = RunSummary::default();

        if video_files.is_empty() {
            warn!("No video files ({}) found in {}", extensions.join(", "), input_dir.display());
            return Ok(summary);
        }

        info!("Found {} video file(s) in {}", video_files.len(), input_dir.display());

        let progress = self.create_progress_bar(video_files.len() as u64);
        let mut seen_sidecars = HashSet::new();

        for video_file in &video_files {
            let file_name = video_file.file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            progress.set_message(format!("Processing: {}", file_name));

            let sidecar = FileManager::sidecar_path(video_file);
            if !seen_sidecars.insert(sidecar.clone()) {
                warn!("{} maps to an already written sidecar {}; it will be overwritten", file_name, sidecar.display());
            }

            match self.process_file(video_file).await {
                Ok(FileOutcome::Written(path)) => {
                    info!("{} -> {}", file_name, path.display());
                    summary.processed += 1;
                    summary.outputs.push(path);
                }
                Ok(FileOutcome::Skipped(path)) => {
                    warn!("Skipping {}, {} already exists", file_name, path.display());
                    summary.skipped += 1;
                }
                Err(e) => {
                    error!("Error processing file {}: {}", file_name, e);
                    summary.failed += 1;
                    summary.failures.push((video_file.clone(), e.to_string()));
                }
            }

            progress.inc(1);
        }

        progress.finish_with_message("Folder processing complete");

        summary.elapsed = start_time.elapsed();
        info!(
            "Folder processing completed: {} processed, {} skipped, {} errors in {}",
            summary.processed,
            summary.skipped,
            summary.failed,
            Self::format_duration(summary.elapsed)
        );

        Ok(summary)
    }

    fn create_progress_bar(&self, len: u64) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new(len);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress.set_style(style.progress_chars("=> "));
        progress
    }

    /// Format a duration as "1m 05s" or "850ms"
    pub fn format_duration(duration: Duration) -> String {
        let total_secs = duration.as_secs();
        if total_secs == 0 {
            return format!("{}ms", duration.as_millis());
        }

        let hours = total_secs / 3600;
        let minutes = (total_secs % 3600) / 60;
        let seconds = total_secs % 60;

        if hours > 0 {
            format!("{}h {:02}m {:02}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {:02}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}
