use log::debug;

use crate::app_config::Config;
use crate::errors::ConversionError;
use crate::metadata::{self, MetadataRecord, MetadataSample};
use crate::subtitle_processor::SubtitleEntry;

// @module: Turning a metadata record into timed subtitle entries

/// Fields tried, in order, for the recording date
pub const CREATION_DATE_KEYS: &[&str] = &["CreateDate", "DateTimeOriginal", "MediaCreateDate", "TrackCreateDate"];

/// Fields tried, in order, for the recording length
pub const DURATION_KEYS: &[&str] = &["Duration", "MediaDuration", "TrackDuration"];

/// Builds subtitle entries from parsed metadata
///
/// Records with periodic samples produce one entry per sample, optionally
/// preceded by a zero-length camera settings entry. Records without samples
/// produce a single entry covering the whole recording.
#[derive(Debug, Clone)]
pub struct SubtitleBuilder {
    date_format: String,
    sample_interval_ms: u64,
    camera_info_header: bool,
}

impl Default for SubtitleBuilder {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl SubtitleBuilder {
    pub fn new(date_format: impl Into<String>, sample_interval_ms: u64, camera_info_header: bool) -> Self {
        SubtitleBuilder {
            date_format: date_format.into(),
            sample_interval_ms: sample_interval_ms.max(1),
            camera_info_header,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.date_format.clone(), config.sample_interval_ms, config.camera_info_header)
    }

    /// Build the ordered entries for a record
    pub fn build(&self, record: &MetadataRecord) -> Result<Vec<SubtitleEntry>, ConversionError> {
        if record.has_samples() {
            self.build_periodic(record)
        } else {
            self.build_summary(record)
        }
    }

    fn build_periodic(&self, record: &MetadataRecord) -> Result<Vec<SubtitleEntry>, ConversionError> {
        let mut entries = Vec::with_capacity(record.samples().len() + 1);

        if self.camera_info_header && !record.camera().is_empty() {
            let text = record.camera()
                .iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect::<Vec<_>>()
                .join("\n");
            entries.push(SubtitleEntry::new(1, 0, 0, text));
        }

        for (n, sample) in record.samples().iter().enumerate() {
            let (start_ms, end_ms) = self.sample_range(n)
                .ok_or_else(|| ConversionError::parse(format!("sample {} overflows the timeline at a {} ms interval", n + 1, self.sample_interval_ms)))?;

            let mut lines = vec![self.format_datetime(&sample.timestamp)];
            lines.extend(exposure_line(sample));
            lines.extend(gps_line(sample));

            entries.push(SubtitleEntry::new(entries.len() + 1, start_ms, end_ms, lines.join("\n")));
        }

        debug!("Built {} entries from {} periodic samples", entries.len(), record.samples().len());
        Ok(entries)
    }

    // Start and inclusive end of the n-th sample, None on overflow
    fn sample_range(&self, n: usize) -> Option<(u64, u64)> {
        let start_ms = u64::try_from(n).ok()?.checked_mul(self.sample_interval_ms)?;
        let end_ms = start_ms.checked_add(self.sample_interval_ms - 1)?;
        Some((start_ms, end_ms))
    }

    fn build_summary(&self, record: &MetadataRecord) -> Result<Vec<SubtitleEntry>, ConversionError> {
        let created = creation_date(record)
            .ok_or_else(|| ConversionError::parse("missing creation date (CreateDate)"))?;

        let (duration_key, raw_duration) = record.first_of(DURATION_KEYS)
            .ok_or_else(|| ConversionError::parse("missing Duration"))?;

        let duration_ms = metadata::parse_duration_ms(raw_duration)
            .ok_or_else(|| ConversionError::parse(format!("unrecognised {} value '{}'", duration_key, raw_duration)))?;

        if duration_ms == 0 {
            return Err(ConversionError::parse(format!("{} is zero", duration_key)));
        }

        let mut lines = vec![self.format_datetime(created)];

        let camera = [record.get("Make"), record.get("Model")]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        if !camera.is_empty() {
            lines.push(camera);
        }

        if let Some(position) = record.get("GPSPosition") {
            lines.push(format!("GPS: {}", position));
        }

        Ok(vec![SubtitleEntry::new(1, 0, duration_ms, lines.join("\n"))])
    }

    /// Format a tool timestamp for display, leaving unparseable values as they are
    pub fn format_datetime(&self, raw: &str) -> String {
        match metadata::parse_datetime(raw) {
            Some(datetime) => datetime.format(&self.date_format).to_string(),
            None => raw.trim().to_string(),
        }
    }
}

// First creation date that parses, else the first non-empty raw value
fn creation_date(record: &MetadataRecord) -> Option<&str> {
    CREATION_DATE_KEYS
        .iter()
        .filter_map(|key| record.get(key))
        .find(|value| metadata::parse_datetime(value).is_some())
        .or_else(|| record.first_of(CREATION_DATE_KEYS).map(|(_, value)| value))
}

// Shutter and aperture, e.g. "100/3.5, 6 dB"
fn exposure_line(sample: &MetadataSample) -> Option<String> {
    let shutter = sample.get("ExposureTime").map(|e| e.trim_start_matches("1/"));
    let aperture = match (shutter, sample.get("FNumber")) {
        (Some(shutter), Some(f_number)) => Some(format!("{:>3}/{}", shutter, f_number)),
        (Some(shutter), None) => Some(format!("{:>3}", shutter)),
        (None, Some(f_number)) => Some(format!("F{}", f_number)),
        (None, None) => None,
    };

    match (aperture, sample.get("Gain")) {
        (Some(aperture), Some(gain)) => Some(format!("{}, {}", aperture, gain)),
        (Some(aperture), None) => Some(aperture),
        (None, Some(gain)) => Some(gain.to_string()),
        (None, None) => None,
    }
}

fn gps_line(sample: &MetadataSample) -> Option<String> {
    let position = match (sample.get("GPSLatitude"), sample.get("GPSLongitude")) {
        (Some(lat), Some(lon)) => format!("{}, {}", lat, lon),
        _ => sample.get("GPSPosition")?.to_string(),
    };

    match sample.get("GPSSpeed") {
        Some(speed) => Some(format!("GPS: {} @ {}", position, speed)),
        None => Some(format!("GPS: {}", position)),
    }
}
