pub mod hrv;
pub mod morphology;

use crate::config::AnalysisConfig;
use crate::detectors::ecg::detect_r_peaks;
use crate::signal::{RPeaks, Window};
use morphology::{QrsComplex, StSegment};
use serde::{Deserialize, Serialize};

/// Result of one analysis pass over a window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    /// Beats per minute.
    pub heart_rate: f64,
    /// SDNN, milliseconds.
    pub heart_rate_variability: f64,
    /// Milliseconds.
    pub qt_interval: f64,
    pub st_segment: StSegment,
    pub qrs_complex: QrsComplex,
    pub r_peaks: RPeaks,
}

/// Full recompute of every metric from a single window. Pure: the same window
/// always produces the same value.
pub fn analyze_window(window: &Window, cfg: &AnalysisConfig) -> Metrics {
    let r_peaks = detect_r_peaks(window);

    Metrics {
        heart_rate: hrv::heart_rate(&r_peaks),
        heart_rate_variability: hrv::heart_rate_variability(&r_peaks, cfg.min_rr_intervals),
        qt_interval: morphology::qt_interval(window, &r_peaks, cfg),
        st_segment: morphology::st_segment(window, &r_peaks, cfg),
        qrs_complex: morphology::qrs_complex(window, &r_peaks, cfg),
        r_peaks,
    }
}
