use crate::signal::{RPeaks, Sample, Window};

/// Minimum number of samples the detector needs to look at neighbors.
pub const MIN_DETECTION_SAMPLES: usize = 3;

/// `mean + 2 * stddev` (population) over the sample values.
pub fn dynamic_threshold(samples: &[Sample]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let n = samples.len() as f64;
    let mean = samples.iter().map(|s| s.value).sum::<f64>() / n;
    let var = samples
        .iter()
        .map(|s| (s.value - mean).powi(2))
        .sum::<f64>()
        / n;
    mean + 2.0 * var.sqrt()
}

/// Detect R-peaks in a window as strict local maxima above the dynamic threshold.
pub fn detect_r_peaks(window: &Window) -> RPeaks {
    detect_r_peaks_in(window.samples())
}

/// Same as [`detect_r_peaks`] over a bare slice.
///
/// Plateaus are never reported since both neighbors must be strictly lower.
pub fn detect_r_peaks_in(samples: &[Sample]) -> RPeaks {
    if samples.len() < MIN_DETECTION_SAMPLES {
        return RPeaks::default();
    }

    let threshold = dynamic_threshold(samples);
    let peaks = samples
        .windows(3)
        .filter(|w| w[1].value > threshold && w[1].value > w[0].value && w[1].value > w[2].value)
        .map(|w| w[1].timestamp)
        .collect();

    RPeaks::from_timestamps(peaks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic_window(fs: f64, beats_s: &[f64], n: usize) -> Window {
        let mut samples = Vec::with_capacity(n);
        for i in 0..n {
            let time = i as f64 / fs;
            let mut v = 0.0;
            for &bt in beats_s {
                let width = 0.012;
                v += 1.2 * (-0.5 * ((time - bt) / width).powi(2)).exp();
            }
            samples.push(Sample::new((time * 1000.0).round() as i64, v));
        }
        Window::new(samples)
    }

    #[test]
    fn short_windows_have_no_peaks() {
        let window = Window::new(vec![Sample::new(0, 0.0), Sample::new(8, 5.0)]);
        assert!(detect_r_peaks(&window).is_empty());
    }

    #[test]
    fn detects_regular_beats() {
        let window = synthetic_window(130.0, &[0.26, 1.07, 1.88], 260);
        let peaks = detect_r_peaks(&window);
        assert_eq!(peaks.len(), 3);
        let expected = [260, 1070, 1880];
        for (got, want) in peaks.timestamps.iter().zip(expected) {
            assert!((got - want).abs() <= 8, "peak at {got}, expected near {want}");
        }
    }

    #[test]
    fn threshold_is_mean_plus_two_sd() {
        let samples: Vec<Sample> = [1.0, 2.0, 3.0, 4.0]
            .iter()
            .enumerate()
            .map(|(i, &v)| Sample::new(i as i64, v))
            .collect();
        let expected = 2.5 + 2.0 * 1.25f64.sqrt();
        assert!((dynamic_threshold(&samples) - expected).abs() < 1e-12);
    }

    #[test]
    fn plateaus_are_not_peaks() {
        let mut values = vec![0.0; 20];
        values[10] = 10.0;
        values[11] = 10.0;
        let samples: Vec<Sample> = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| Sample::new(i as i64 * 8, v))
            .collect();
        assert!(detect_r_peaks_in(&samples).is_empty());
    }

    #[test]
    fn edges_are_never_flagged() {
        let mut values = vec![0.0; 20];
        values[0] = 10.0;
        values[19] = 10.0;
        let samples: Vec<Sample> = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| Sample::new(i as i64 * 8, v))
            .collect();
        assert!(detect_r_peaks_in(&samples).is_empty());
    }

    #[test]
    fn detection_is_deterministic() {
        let window = synthetic_window(130.0, &[0.4, 1.3], 260);
        assert_eq!(detect_r_peaks(&window), detect_r_peaks(&window.clone()));
        assert_eq!(
            dynamic_threshold(window.samples()).to_bits(),
            dynamic_threshold(window.samples()).to_bits()
        );
    }
}
