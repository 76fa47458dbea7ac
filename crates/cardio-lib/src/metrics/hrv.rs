use crate::signal::{RPeaks, RRSeries};

/// Heart rate (BPM, rounded) from the mean RR interval; 0 with fewer than two peaks.
pub fn heart_rate(peaks: &RPeaks) -> f64 {
    if peaks.len() < 2 {
        return 0.0;
    }
    let rr = RRSeries::from_peaks(peaks);
    let avg = rr.mean();
    if avg <= 0.0 {
        // Duplicate timestamps only; there is no meaningful rate.
        return 0.0;
    }
    (60_000.0 / avg).round()
}

/// SDNN in milliseconds; 0 until `min_peaks` peaks are available.
pub fn heart_rate_variability(peaks: &RPeaks, min_peaks: usize) -> f64 {
    if peaks.len() < min_peaks.max(2) {
        return 0.0;
    }
    sdnn(&RRSeries::from_peaks(peaks))
}

/// Population standard deviation of the RR intervals.
pub fn sdnn(rr: &RRSeries) -> f64 {
    if rr.is_empty() {
        return 0.0;
    }
    let mean = rr.mean();
    let var = rr.rr.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / rr.len() as f64;
    var.sqrt()
}
