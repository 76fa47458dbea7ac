use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;

/// One timestamped ECG reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Milliseconds, non-decreasing within a stream. Fractional values are
    /// rounded on load.
    #[serde(deserialize_with = "rounded_millis")]
    pub timestamp: i64,
    /// Signal amplitude as delivered by the sensor.
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

pub(crate) fn rounded_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Millis {
        Whole(i64),
        Fractional(f64),
    }

    match Millis::deserialize(deserializer)? {
        Millis::Whole(ms) => Ok(ms),
        Millis::Fractional(ms) if ms.is_finite() => Ok(ms.round() as i64),
        Millis::Fractional(ms) => Err(serde::de::Error::custom(format!(
            "timestamp {ms} is not finite"
        ))),
    }
}

/// Immutable snapshot of the trailing samples of a stream.
///
/// Cloning is cheap and never aliases the buffer that produced it, so an
/// analysis pass can hold on to a window while ingestion keeps appending.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    samples: Arc<[Sample]>,
}

impl Window {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self {
            samples: samples.into(),
        }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// First index whose timestamp equals `timestamp`.
    pub fn index_of(&self, timestamp: i64) -> Option<usize> {
        self.samples.iter().position(|s| s.timestamp == timestamp)
    }

    pub fn first_timestamp(&self) -> Option<i64> {
        self.samples.first().map(|s| s.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<i64> {
        self.samples.last().map(|s| s.timestamp)
    }
}

impl From<Vec<Sample>> for Window {
    fn from(samples: Vec<Sample>) -> Self {
        Self::new(samples)
    }
}

/// Timestamps of detected R-peaks within one window, in window order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RPeaks {
    pub timestamps: Vec<i64>,
}

impl RPeaks {
    pub fn from_timestamps(timestamps: Vec<i64>) -> Self {
        Self { timestamps }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn last(&self) -> Option<i64> {
        self.timestamps.last().copied()
    }
}

/// RR intervals (milliseconds)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RRSeries {
    pub rr: Vec<f64>,
}

impl RRSeries {
    pub fn from_peaks(peaks: &RPeaks) -> Self {
        let rr = peaks
            .timestamps
            .windows(2)
            .map(|w| (w[1] - w[0]) as f64)
            .collect();
        Self { rr }
    }

    pub fn len(&self) -> usize {
        self.rr.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rr.is_empty()
    }

    pub fn mean(&self) -> f64 {
        if self.rr.is_empty() {
            return 0.0;
        }
        self.rr.iter().sum::<f64>() / self.rr.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rr_series_from_peak_timestamps() {
        let peaks = RPeaks::from_timestamps(vec![100, 900, 1750]);
        let rr = RRSeries::from_peaks(&peaks);
        assert_eq!(rr.rr, vec![800.0, 850.0]);
        assert!((rr.mean() - 825.0).abs() < 1e-9);
    }

    #[test]
    fn index_of_returns_first_match() {
        let window = Window::new(vec![
            Sample::new(0, 0.1),
            Sample::new(8, 0.2),
            Sample::new(8, 0.3),
        ]);
        assert_eq!(window.index_of(8), Some(1));
        assert_eq!(window.index_of(16), None);
    }

    #[test]
    fn fractional_timestamps_are_rounded() {
        let samples: Vec<Sample> = serde_json::from_str(
            r#"[{"timestamp":1700000000000,"value":0.1},{"timestamp":1700000000007.6923,"value":0.2}]"#,
        )
        .unwrap();
        assert_eq!(samples[0].timestamp, 1_700_000_000_000);
        assert_eq!(samples[1].timestamp, 1_700_000_000_008);
    }

    #[test]
    fn rpeaks_serialize_as_plain_array() {
        let peaks = RPeaks::from_timestamps(vec![10, 20]);
        assert_eq!(serde_json::to_string(&peaks).unwrap(), "[10,20]");
    }
}
