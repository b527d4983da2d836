/*!
 * # exifsrt - camera metadata to SRT subtitles
 *
 * Reads the metadata consumer cameras embed in their video files (recording
 * time, exposure, gain, GPS) through ExifTool and writes it next to each
 * video as an `.srt` subtitle file, so players can show it over the footage.
 *
 * ## Features
 *
 * - Per-second subtitles for AVCHD/H.264 recordings with periodic metadata
 * - A single whole-clip subtitle for files that only carry a creation date
 * - Configurable tool location, timeout, extensions and date format
 * - One failing file never stops the rest of the batch
 *
 * ## Architecture
 *
 * - `app_config`: Configuration management
 * - `file_utils`: Video discovery and sidecar paths
 * - `platform`: Tool location and subprocess details per OS
 * - `exiftool`: Running the metadata tool
 * - `metadata`: Parsing the tool output
 * - `subtitle_builder`: Metadata to timed entries
 * - `subtitle_processor`: SRT model, writing and reading
 * - `app_controller`: The per-file pipeline and folder loop
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod file_utils;
pub mod platform;
pub mod exiftool;
pub mod metadata;
pub mod subtitle_builder;
pub mod subtitle_processor;
pub mod app_controller;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, FileOutcome, RunSummary};
pub use exiftool::{ExifTool, MetadataExtractor};
pub use metadata::{MetadataRecord, MetadataSample};
pub use subtitle_builder::SubtitleBuilder;
pub use subtitle_processor::{SubtitleCollection, SubtitleEntry};
pub use errors::{AppError, ConversionError};
