//! Morphology around the most recent R-peak of a window: QT interval,
//! ST segment and QRS complex.
//!
//! Every analyzer anchors on the last detected peak and returns zeros when
//! there is no peak or its timestamp cannot be found in the window.

use crate::config::AnalysisConfig;
use crate::signal::{RPeaks, Window};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StSegment {
    /// Mean amplitude over the ST region.
    pub elevation: f64,
    /// Milliseconds.
    pub duration: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QrsComplex {
    /// Milliseconds from Q to S.
    pub duration: f64,
    /// Value at the R-peak.
    pub amplitude: f64,
}

fn last_peak_index(window: &Window, peaks: &RPeaks) -> Option<usize> {
    peaks.last().and_then(|ts| window.index_of(ts))
}

/// Time from the last R-peak to the first non-negative to negative crossing
/// within the QT search span.
pub fn qt_interval(window: &Window, peaks: &RPeaks, cfg: &AnalysisConfig) -> f64 {
    let Some(peak) = last_peak_index(window, peaks) else {
        return 0.0;
    };
    let samples = window.samples();
    let end = peak.saturating_add(cfg.qt_search_samples()).min(samples.len());

    let mut t_wave_end = peak;
    for i in (peak + 1)..end {
        t_wave_end = i;
        if samples[i].value < 0.0 && samples[i - 1].value >= 0.0 {
            break;
        }
    }

    (samples[t_wave_end].timestamp - samples[peak].timestamp) as f64
}

/// Mean level of the fixed ST region after the last R-peak.
pub fn st_segment(window: &Window, peaks: &RPeaks, cfg: &AnalysisConfig) -> StSegment {
    let Some(peak) = last_peak_index(window, peaks) else {
        return StSegment::default();
    };
    let samples = window.samples();
    let st_start = cfg.st_start_samples();
    let st_end = cfg.st_end_samples();

    let from = peak.saturating_add(st_start).min(samples.len());
    let to = peak.saturating_add(st_end).min(samples.len()).max(from);
    let region = &samples[from..to];
    let elevation = if region.is_empty() {
        0.0
    } else {
        region.iter().map(|s| s.value).sum::<f64>() / region.len() as f64
    };

    StSegment {
        elevation,
        duration: st_end.saturating_sub(st_start) as f64 * cfg.sample_period_ms(),
    }
}

/// Q and S are the nearest non-negative samples on either side of the last
/// R-peak, bounded by `qrs_search_samples`. A side without one falls back to
/// the peak itself.
pub fn qrs_complex(window: &Window, peaks: &RPeaks, cfg: &AnalysisConfig) -> QrsComplex {
    let Some(peak) = last_peak_index(window, peaks) else {
        return QrsComplex::default();
    };
    let samples = window.samples();
    let span = cfg.qrs_search_samples;

    let q = (peak.saturating_sub(span)..peak)
        .rev()
        .find(|&i| samples[i].value >= 0.0)
        .unwrap_or(peak);
    let s = ((peak + 1)..peak.saturating_add(span).min(samples.len()))
        .find(|&i| samples[i].value >= 0.0)
        .unwrap_or(peak);

    QrsComplex {
        duration: (samples[s].timestamp - samples[q].timestamp) as f64,
        amplitude: samples[peak].value,
    }
}
