use std::fmt;
use regex::Regex;
use once_cell::sync::Lazy;
use anyhow::{Result, Context, anyhow};
use std::path::{Path, PathBuf};
use log::debug;

use crate::errors::ConversionError;
use crate::file_utils::FileManager;

// @module: SRT subtitle model, serialization and parsing

// @const: SRT timestamp regex
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2,}):(\d{2}):(\d{2}),(\d{3}) --> (\d{2,}):(\d{2}):(\d{2}),(\d{3})$").unwrap()
});

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    // @field: Sequence number
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Subtitle text, one or more lines
    pub text: String,
}

impl SubtitleEntry {
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: String) -> Self {
        SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            text,
        }
    }

    // @creates: Validated subtitle entry
    // @validates: Time range and non-empty text
    pub fn new_validated(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: String) -> Result<Self> {
        // Zero-length entries are allowed, the camera header uses one
        if end_time_ms < start_time_ms {
            return Err(anyhow!(
                "Invalid time range: end time {} < start time {}",
                end_time_ms, start_time_ms
            ));
        }

        if text.trim().is_empty() {
            return Err(anyhow!("Empty subtitle text for entry {}", seq_num));
        }

        Ok(SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            text,
        })
    }

    /// Parse an SRT timestamp (HH:MM:SS,mmm) to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64> {
        let parts: Vec<&str> = timestamp.trim().split(&[':', ','][..]).collect();

        if parts.len() != 4 {
            return Err(anyhow!("Invalid timestamp format: {}", timestamp));
        }

        let hours: u64 = parts[0].parse().context("Failed to parse hours")?;
        let minutes: u64 = parts[1].parse().context("Failed to parse minutes")?;
        let seconds: u64 = parts[2].parse().context("Failed to parse seconds")?;
        let millis: u64 = parts[3].parse().context("Failed to parse milliseconds")?;

        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return Err(anyhow!("Invalid time components in timestamp: {}", timestamp));
        }

        Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_time_ms)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_time_ms)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Subtitle entries generated for one video file
#[derive(Debug)]
pub struct SubtitleCollection {
    /// Video file the entries describe
    pub source_file: PathBuf,

    /// List of subtitle entries
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleCollection {
    /// Create a collection from already built entries
    pub fn with_entries(source_file: PathBuf, entries: Vec<SubtitleEntry>) -> Self {
        SubtitleCollection { source_file, entries }
    }

    /// Sidecar path the collection is written to
    pub fn sidecar_path(&self) -> PathBuf {
        FileManager::sidecar_path(&self.source_file)
    }

    /// Render all entries as SRT text
    pub fn to_srt_string(&self) -> String {
        self.entries.iter().map(|entry| entry.to_string()).collect()
    }

    /// Check numbering and timing: indices 1..=n, start <= end, no overlap
    pub fn validate(&self) -> Result<()> {
        let mut previous_end = 0;
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.seq_num != i + 1 {
                return Err(anyhow!("Entry {} has sequence number {}", i + 1, entry.seq_num));
            }
            if entry.end_time_ms < entry.start_time_ms {
                return Err(anyhow!("Entry {} ends before it starts", entry.seq_num));
            }
            if entry.start_time_ms < previous_end {
                return Err(anyhow!("Entry {} overlaps the previous entry", entry.seq_num));
            }
            previous_end = entry.end_time_ms;
        }
        Ok(())
    }

    /// Write subtitles to the sidecar file next to the video, replacing any existing file
    pub fn write_sidecar(&self) -> Result<PathBuf, ConversionError> {
        let path = self.sidecar_path();
        self.write_to_srt(&path)?;
        Ok(path)
    }

    /// Write subtitles to an SRT file
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<(), ConversionError> {
        let path = path.as_ref();
        FileManager::write_to_file(path, &self.to_srt_string())
            .map_err(|source| ConversionError::FileWriteError {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("Wrote {} subtitle entries to {}", self.entries.len(), path.display());
        Ok(())
    }

    /// Read and parse an SRT file
    pub fn parse_srt_file<P: AsRef<Path>>(path: P) -> Result<Vec<SubtitleEntry>> {
        let content = FileManager::read_to_string(path)?;
        Self::parse_srt_string(&content)
    }

    /// Parse SRT format string into subtitle entries
    ///
    /// Text lines keep their leading whitespace; a blank line ends an entry.
    pub fn parse_srt_string(content: &str) -> Result<Vec<SubtitleEntry>> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut entries = Vec::new();

        let mut current_seq_num: Option<usize> = None;
        let mut current_times: Option<(u64, u64)> = None;
        let mut current_text: Vec<&str> = Vec::new();

        for (index, line) in content.lines().enumerate() {
            let line_number = index + 1;
            let line = line.trim_end();

            if line.trim().is_empty() {
                if let Some(seq_num) = current_seq_num.take() {
                    let (start_ms, end_ms) = current_times.take()
                        .ok_or_else(|| anyhow!("Entry {} has no timestamp line", seq_num))?;
                    entries.push(SubtitleEntry::new_validated(seq_num, start_ms, end_ms, current_text.join("\n"))?);
                    current_text.clear();
                }
                continue;
            }

            match (current_seq_num, current_times) {
                (None, _) => {
                    let num = line.trim().parse::<usize>()
                        .with_context(|| format!("Expected sequence number at line {}: {}", line_number, line))?;
                    current_seq_num = Some(num);
                }
                (Some(_), None) => {
                    let caps = TIMESTAMP_REGEX.captures(line.trim())
                        .ok_or_else(|| anyhow!("Expected timestamp at line {}: {}", line_number, line))?;
                    current_times = Some((
                        Self::parse_timestamp_to_ms(&caps, 1)?,
                        Self::parse_timestamp_to_ms(&caps, 5)?,
                    ));
                }
                (Some(_), Some(_)) => current_text.push(line),
            }
        }

        if let Some(seq_num) = current_seq_num {
            let (start_ms, end_ms) = current_times
                .ok_or_else(|| anyhow!("Entry {} has no timestamp line", seq_num))?;
            entries.push(SubtitleEntry::new_validated(seq_num, start_ms, end_ms, current_text.join("\n"))?);
        }

        Ok(entries)
    }

    /// Parse timestamp to milliseconds
    fn parse_timestamp_to_ms(caps: &regex::Captures, start_idx: usize) -> Result<u64> {
        let hours: u64 = caps[start_idx].parse()?;
        let minutes: u64 = caps[start_idx + 1].parse()?;
        let seconds: u64 = caps[start_idx + 2].parse()?;
        let millis: u64 = caps[start_idx + 3].parse()?;

        if minutes >= 60 || seconds >= 60 {
            return Err(anyhow!("Invalid time components: {}:{}:{}", hours, minutes, seconds));
        }

        Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
    }
}
