use crate::activity::{active_segment, ActivityMultipliers, ActivitySegment, ActivityType};
use crate::config::{ActivityClock, AnalysisConfig};
use crate::metrics::{analyze_window, Metrics};
use crate::signal::Window;
use serde::{Deserialize, Serialize};

/// Current-window metrics together with their activity-scaled deltas from
/// the baseline window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonMetrics {
    #[serde(flatten)]
    pub metrics: Metrics,
    /// BPM above baseline, scaled by activity.
    pub heart_rate_recovery: f64,
    /// ST elevation difference, scaled by activity.
    pub st_deviation: f64,
    /// Percent.
    pub hrv_change: f64,
    /// Percent.
    pub qt_change: f64,
}

fn percent_change(baseline: f64, current: f64) -> f64 {
    if baseline == 0.0 {
        return 0.0;
    }
    (current - baseline) / baseline * 100.0
}

/// Derive the comparison fields from two finished passes.
pub fn compare_metrics(
    baseline: &Metrics,
    current: &Metrics,
    activity: Option<ActivityType>,
) -> ComparisonMetrics {
    let multipliers = activity
        .map(ActivityType::multipliers)
        .unwrap_or(ActivityMultipliers::NEUTRAL);

    let heart_rate_recovery = if baseline.heart_rate == 0.0 || current.heart_rate == 0.0 {
        0.0
    } else {
        (current.heart_rate - baseline.heart_rate).max(0.0) * multipliers.heart_rate_recovery
    };
    let st_deviation = (current.st_segment.elevation - baseline.st_segment.elevation)
        * multipliers.st_deviation;

    ComparisonMetrics {
        metrics: current.clone(),
        heart_rate_recovery,
        st_deviation,
        hrv_change: percent_change(
            baseline.heart_rate_variability,
            current.heart_rate_variability,
        ),
        qt_change: percent_change(baseline.qt_interval, current.qt_interval),
    }
}

/// Analyze both windows and compare them, using the segment active at
/// `reference_ms` for activity scaling.
pub fn compare_windows(
    baseline: &Window,
    current: &Window,
    segments: &[ActivitySegment],
    reference_ms: i64,
    cfg: &AnalysisConfig,
) -> ComparisonMetrics {
    let baseline_metrics = analyze_window(baseline, cfg);
    let current_metrics = analyze_window(current, cfg);
    let activity = active_segment(segments, reference_ms).map(|s| s.activity);
    compare_metrics(&baseline_metrics, &current_metrics, activity)
}

/// Instant used to pick the active segment for a comparison of `current`.
pub fn reference_instant(clock: ActivityClock, current: &Window) -> i64 {
    match clock {
        ActivityClock::WallClock => chrono::Utc::now().timestamp_millis(),
        ActivityClock::SignalTime => current
            .last_timestamp()
            .unwrap_or_else(|| chrono::Utc::now().timestamp_millis()),
    }
}
