use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

use crate::errors::ConversionError;
use crate::platform;

// @module: Metadata record model and tool output parsing

// @const: One output line, optionally prefixed by its group in brackets
static LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\[(?P<group>[^\]]*)\]\s*)?(?P<key>[A-Za-z0-9_\- ]*?[A-Za-z0-9_\-])\s*:(?P<value>.*)$").unwrap()
});

// @const: Tool date format, YYYY:MM:DD HH:MM:SS[.fff] followed by an optional zone
static DATETIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4}):(\d{2}):(\d{2}) (\d{2}):(\d{2}):(\d{2})(?:\.(\d+))?").unwrap()
});

static SECONDS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)?)\s*s?$").unwrap()
});

static CLOCK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d+):)?(\d{1,2}):(\d{1,2}(?:\.\d+)?)$").unwrap()
});

/// Key that opens a new periodic sample
pub const SAMPLE_START_KEY: &str = "DateTimeOriginal";

/// Camera settings that stay fixed for a whole recording
pub const CAMERA_INFO_KEYS: &[&str] = &[
    "Make",
    "Model",
    "ApertureSetting",
    "Focus",
    "ImageStabilization",
    "ExposureProgram",
    "WhiteBalance",
];

/// One periodic metadata block, usually one per second of video
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataSample {
    /// Raw DateTimeOriginal value that opened the block
    pub timestamp: String,

    /// Values reported in the block, by field name
    pub values: BTreeMap<String, String>,
}

impl MetadataSample {
    pub fn new(timestamp: impl Into<String>) -> Self {
        MetadataSample {
            timestamp: timestamp.into(),
            values: BTreeMap::new(),
        }
    }

    /// Non-empty value for a field
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }
}

/// Metadata parsed from one run of the tool over one video file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataRecord {
    fields: BTreeMap<String, String>,
    camera: BTreeMap<String, String>,
    samples: Vec<MetadataSample>,
}

impl MetadataRecord {
    /// Parse line oriented `key: value` output
    ///
    /// Lines may carry a `[Group]` prefix. A `DateTimeOriginal` line from
    /// one of `periodic_groups` starts a new sample; later lines of those
    /// groups belong to it, except the fixed camera settings which are
    /// collected separately. Every line is also recorded as a plain field,
    /// keeping the first value seen for each name.
    pub fn parse(output: &str, periodic_groups: &[String]) -> Result<Self, ConversionError> {
        let output = platform::normalize_line_endings(output);
        let mut record = MetadataRecord::default();

        for (index, line) in output.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let caps = LINE_REGEX.captures(trimmed).ok_or_else(|| {
                ConversionError::parse_at(index + 1, format!("expected 'key: value', got '{}'", abbreviate(trimmed)))
            })?;

            let group = caps.name("group").map(|g| g.as_str().trim());
            let key = normalize_key(&caps["key"]);
            let value = caps["value"].trim().to_string();

            let periodic = group.is_some_and(|g| {
                periodic_groups.iter().any(|p| p.eq_ignore_ascii_case(g))
            });

            if periodic {
                record.add_periodic(&key, &value);
            }

            record.fields.entry(key).or_insert(value);
        }

        if record.fields.is_empty() {
            return Err(ConversionError::parse("metadata tool produced no output"));
        }

        Ok(record)
    }

    fn add_periodic(&mut self, key: &str, value: &str) {
        if key == SAMPLE_START_KEY && !value.is_empty() {
            self.camera.entry(key.to_string()).or_insert_with(|| value.to_string());
            self.samples.push(MetadataSample::new(value));
        } else if CAMERA_INFO_KEYS.contains(&key) {
            self.camera.entry(key.to_string()).or_insert_with(|| value.to_string());
        } else if let Some(sample) = self.samples.last_mut() {
            sample.values.entry(key.to_string()).or_insert_with(|| value.to_string());
        }
    }

    /// Non-empty value for a field
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    /// First field from `keys` that has a non-empty value
    pub fn first_of<'a>(&'a self, keys: &[&'a str]) -> Option<(&'a str, &'a str)> {
        keys.iter().find_map(|key| self.get(key).map(|value| (*key, value)))
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn camera(&self) -> &BTreeMap<String, String> {
        &self.camera
    }

    pub fn samples(&self) -> &[MetadataSample] {
        &self.samples
    }

    pub fn has_samples(&self) -> bool {
        !self.samples.is_empty()
    }
}

/// Field names are compared without whitespace ("Create Date" == "CreateDate")
pub fn normalize_key(key: &str) -> String {
    key.split_whitespace().collect()
}

/// Parse a tool timestamp, ignoring any timezone suffix
///
/// Returns `None` for placeholder dates such as `0000:00:00 00:00:00`.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let caps = DATETIME_REGEX.captures(value.trim())?;
    let num = |i: usize| caps[i].parse::<u32>().ok();

    let year: i32 = caps[1].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, num(2)?, num(3)?)?;

    let millis = match caps.get(7) {
        Some(frac) => {
            let digits: String = frac.as_str().chars().chain("000".chars()).take(3).collect();
            digits.parse::<u32>().ok()?
        }
        None => 0,
    };

    date.and_hms_milli_opt(num(4)?, num(5)?, num(6)?, millis)
}

/// Parse a duration value into milliseconds
///
/// Accepts `H:MM:SS[.fff]`, `MM:SS`, `N[.fff] s` and bare seconds, with an
/// optional trailing `(approx)`.
pub fn parse_duration_ms(value: &str) -> Option<u64> {
    let value = value.trim().trim_end_matches("(approx)").trim();

    if let Some(caps) = SECONDS_REGEX.captures(value) {
        let secs: f64 = caps[1].parse().ok()?;
        return Some((secs * 1000.0).round() as u64);
    }

    let caps = CLOCK_REGEX.captures(value)?;
    let hours: u64 = match caps.get(1) {
        Some(h) => h.as_str().parse().ok()?,
        None => 0,
    };
    let minutes: u64 = caps[2].parse().ok()?;
    let seconds: f64 = caps[3].parse().ok()?;

    if minutes >= 60 || seconds >= 60.0 {
        return None;
    }

    Some(hours * 3_600_000 + minutes * 60_000 + (seconds * 1000.0).round() as u64)
}

fn abbreviate(line: &str) -> String {
    const MAX_CHARS: usize = 60;
    if line.chars().count() <= MAX_CHARS {
        line.to_string()
    } else {
        let head: String = line.chars().take(MAX_CHARS).collect();
        format!("{}...", head)
    }
}
