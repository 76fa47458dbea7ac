use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, Trim, WriterBuilder};
use std::path::Path;

use crate::io::record::read_record;
use crate::signal::Sample;

/// Read a `timestamp,value` CSV (header required, extra columns ignored).
pub fn read_samples_csv(path: &Path) -> Result<Vec<Sample>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let headers = reader.headers()?.clone();
    let timestamp_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("timestamp"))
        .context("missing timestamp column")?;
    let value_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("value"))
        .context("missing value column")?;

    let mut samples = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("reading row {}", row + 1))?;
        let ts_str = record
            .get(timestamp_idx)
            .ok_or_else(|| anyhow::anyhow!("row {} has no timestamp", row + 1))?;
        let timestamp = parse_timestamp(ts_str)
            .with_context(|| format!("row {}: parsing timestamp {}", row + 1, ts_str))?;
        let value_str = record
            .get(value_idx)
            .ok_or_else(|| anyhow::anyhow!("row {} has no value", row + 1))?;
        let value: f64 = value_str
            .parse()
            .with_context(|| format!("row {}: parsing value {}", row + 1, value_str))?;
        samples.push(Sample::new(timestamp, value));
    }
    if samples.is_empty() {
        bail!("no samples found in {}", path.display());
    }
    Ok(samples)
}

// Fractional millisecond timestamps are rounded.
fn parse_timestamp(text: &str) -> Result<i64> {
    if let Ok(ts) = text.parse::<i64>() {
        return Ok(ts);
    }
    let ts: f64 = text.parse()?;
    Ok(ts.round() as i64)
}

/// Parse newline-delimited amplitudes, ignoring blank/comment lines, and
/// timestamp them at `fs` starting from `start_ms`.
pub fn parse_value_series(text: &str, fs: f64, start_ms: i64) -> Result<Vec<Sample>> {
    if fs <= 0.0 {
        bail!("sampling rate must be positive, got {fs}");
    }
    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let value: f64 = trimmed
            .parse()
            .with_context(|| format!("line {} is not f64: {}", idx + 1, trimmed))?;
        let timestamp = start_ms + (out.len() as f64 * 1000.0 / fs).round() as i64;
        out.push(Sample::new(timestamp, value));
    }
    if out.is_empty() {
        bail!("no numeric samples found");
    }
    Ok(out)
}

/// Load a stream by extension: `.csv` samples, `.json` record, anything else
/// a bare value series sampled at `fs`.
pub fn read_stream(path: &Path, fs: f64) -> Result<Vec<Sample>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("csv") => read_samples_csv(path),
        Some("json") => Ok(read_record(path)?.ecg),
        _ => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            parse_value_series(&text, fs, 0)
        }
    }
}

/// Write samples as a `timestamp,value` CSV.
pub fn write_samples_csv(path: &Path, samples: &[Sample]) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for sample in samples {
        writer.serialize(sample)?;
    }
    writer.flush()?;
    Ok(())
}
