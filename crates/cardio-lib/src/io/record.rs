use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::activity::ActivitySegment;
use crate::signal::Sample;

/// Heart rate reported directly by the sensor (BPM).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeartRatePoint {
    #[serde(deserialize_with = "crate::signal::rounded_millis")]
    pub timestamp: i64,
    pub value: f64,
}

/// A finished recording as handed to storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub user_id: String,
    pub datetime: DateTime<Utc>,
    pub ecg: Vec<Sample>,
    #[serde(default)]
    pub hr: Vec<HeartRatePoint>,
    #[serde(default)]
    pub activity_segments: Vec<ActivitySegment>,
}

impl Record {
    pub fn new(user_id: impl Into<String>, datetime: DateTime<Utc>, ecg: Vec<Sample>) -> Self {
        Self {
            user_id: user_id.into(),
            datetime,
            ecg,
            hr: Vec::new(),
            activity_segments: Vec::new(),
        }
    }
}

pub fn read_record(path: &Path) -> Result<Record> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing record {}", path.display()))
}

pub fn write_record(path: &Path, record: &Record) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, record)
        .with_context(|| format!("writing record {}", path.display()))?;
    writer.flush()?;
    Ok(())
}

/// Load an activity segment list (`[{type,start,end}, ...]`).
pub fn read_segments(path: &Path) -> Result<Vec<ActivitySegment>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing segments {}", path.display()))
}
