use crate::buffer::DEFAULT_HISTORY;
use crate::error::{CardioError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Source of the instant used to pick the active activity segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityClock {
    /// The moment the comparison is recomputed (host wall clock).
    #[default]
    WallClock,
    /// Timestamp of the newest sample in the current window.
    SignalTime,
}

/// Constants for the windowed analysis pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Samples per analysis window.
    pub window_size: usize,
    /// Nominal sensor sampling rate (Hz).
    pub sampling_rate_hz: u32,
    /// Peaks required before SDNN is reported.
    pub min_rr_intervals: usize,
    /// Forward search span for the T-wave end (seconds).
    pub qt_search_s: f64,
    /// ST segment offset after the R-peak (seconds).
    pub st_start_s: f64,
    /// ST segment end offset after the R-peak (seconds).
    pub st_end_s: f64,
    /// Samples scanned on each side of the R-peak for Q and S.
    pub qrs_search_samples: usize,
    /// Trailing samples the live buffer keeps (at least `window_size`).
    pub history_size: usize,
    pub activity_clock: ActivityClock,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_size: 260,
            sampling_rate_hz: 130,
            min_rr_intervals: 6,
            qt_search_s: 0.4,
            st_start_s: 0.08,
            st_end_s: 0.16,
            qrs_search_samples: 30,
            history_size: DEFAULT_HISTORY,
            activity_clock: ActivityClock::WallClock,
        }
    }
}

impl AnalysisConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CardioError::Config(format!("reading {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_size < 3 {
            return Err(CardioError::Config(format!(
                "window_size must be at least 3, got {}",
                self.window_size
            )));
        }
        if self.sampling_rate_hz == 0 {
            return Err(CardioError::Config("sampling_rate_hz must be positive".into()));
        }
        for (name, seconds) in [
            ("qt_search_s", self.qt_search_s),
            ("st_start_s", self.st_start_s),
            ("st_end_s", self.st_end_s),
        ] {
            if !seconds.is_finite() || seconds < 0.0 {
                return Err(CardioError::Config(format!(
                    "{name} must be a non-negative number of seconds, got {seconds}"
                )));
            }
            if seconds * self.sampling_rate_hz as f64 > self.window_size as f64 {
                return Err(CardioError::Config(format!(
                    "{name} ({seconds} s) reaches past one window of {} samples",
                    self.window_size
                )));
            }
        }
        if self.qrs_search_samples > self.window_size {
            return Err(CardioError::Config(format!(
                "qrs_search_samples ({}) exceeds window_size ({})",
                self.qrs_search_samples, self.window_size
            )));
        }
        if self.st_end_s < self.st_start_s {
            return Err(CardioError::Config(format!(
                "st_end_s ({}) is before st_start_s ({})",
                self.st_end_s, self.st_start_s
            )));
        }
        Ok(())
    }

    fn offset(&self, seconds: f64) -> usize {
        (seconds * self.sampling_rate_hz as f64).floor().max(0.0) as usize
    }

    /// `floor(qt_search_s * fs)`
    pub fn qt_search_samples(&self) -> usize {
        self.offset(self.qt_search_s)
    }

    pub fn st_start_samples(&self) -> usize {
        self.offset(self.st_start_s)
    }

    pub fn st_end_samples(&self) -> usize {
        self.offset(self.st_end_s)
    }

    /// Milliseconds represented by one sample at the nominal rate.
    pub fn sample_period_ms(&self) -> f64 {
        1000.0 / self.sampling_rate_hz as f64
    }

    pub fn history_capacity(&self) -> usize {
        self.history_size.max(self.window_size)
    }
}
