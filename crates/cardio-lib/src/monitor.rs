use crate::activity::{active_segment, ActivitySegment};
use crate::buffer::WindowBuffer;
use crate::comparison::{compare_metrics, reference_instant, ComparisonMetrics};
use crate::config::AnalysisConfig;
use crate::metrics::{analyze_window, Metrics};
use crate::signal::{Sample, Window};
use log::debug;

/// Live analysis of one sample stream.
///
/// Each appended batch triggers a full recompute once a window is available.
/// Until then, and whenever a batch leaves the stream short, the previously
/// published metrics stay in place.
#[derive(Debug, Clone)]
pub struct StreamAnalyzer {
    buffer: WindowBuffer,
    cfg: AnalysisConfig,
    latest: Metrics,
}

impl StreamAnalyzer {
    pub fn new(cfg: AnalysisConfig) -> Self {
        Self {
            buffer: WindowBuffer::with_capacity(cfg.window_size, cfg.history_capacity()),
            cfg,
            latest: Metrics::default(),
        }
    }

    /// Feed a batch; returns `true` when new metrics were published.
    pub fn append(&mut self, batch: &[Sample]) -> bool {
        self.buffer.append(batch);
        let Some(window) = self.buffer.current_window() else {
            debug!(
                "window not ready: {}/{} samples",
                self.buffer.len(),
                self.cfg.window_size
            );
            return false;
        };
        self.latest = analyze_window(&window, &self.cfg);
        debug!(
            "recomputed metrics: hr={} peaks={}",
            self.latest.heart_rate,
            self.latest.r_peaks.len()
        );
        true
    }

    pub fn latest(&self) -> &Metrics {
        &self.latest
    }

    pub fn window(&self) -> Option<Window> {
        self.buffer.current_window()
    }

    pub fn is_ready(&self) -> bool {
        self.buffer.is_ready()
    }

    /// Drop buffered samples; published metrics are kept.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

/// Baseline-versus-current comparison fed by two independent streams.
#[derive(Debug, Clone)]
pub struct ComparisonSession {
    baseline: StreamAnalyzer,
    current: StreamAnalyzer,
    segments: Vec<ActivitySegment>,
    cfg: AnalysisConfig,
    latest: ComparisonMetrics,
}

impl ComparisonSession {
    pub fn new(cfg: AnalysisConfig) -> Self {
        Self {
            baseline: StreamAnalyzer::new(cfg),
            current: StreamAnalyzer::new(cfg),
            segments: Vec::new(),
            cfg,
            latest: ComparisonMetrics::default(),
        }
    }

    pub fn append_baseline(&mut self, batch: &[Sample]) -> bool {
        self.baseline.append(batch);
        self.recompute()
    }

    pub fn append_current(&mut self, batch: &[Sample]) -> bool {
        self.current.append(batch);
        self.recompute()
    }

    pub fn set_segments(&mut self, segments: Vec<ActivitySegment>) -> bool {
        self.segments = segments;
        self.recompute()
    }

    pub fn segments(&self) -> &[ActivitySegment] {
        &self.segments
    }

    pub fn baseline(&self) -> &StreamAnalyzer {
        &self.baseline
    }

    pub fn current(&self) -> &StreamAnalyzer {
        &self.current
    }

    pub fn latest(&self) -> &ComparisonMetrics {
        &self.latest
    }

    /// Re-derive the comparison at an explicit instant, bypassing the clock.
    pub fn recompute_at(&mut self, reference_ms: i64) -> bool {
        if !(self.baseline.is_ready() && self.current.is_ready()) {
            debug!("comparison skipped: both streams need a full window");
            return false;
        }
        let activity = active_segment(&self.segments, reference_ms).map(|s| s.activity);
        debug!(
            "comparison at {reference_ms}: activity={}",
            activity.map(|a| a.as_str()).unwrap_or("none")
        );
        self.latest = compare_metrics(self.baseline.latest(), self.current.latest(), activity);
        true
    }

    fn recompute(&mut self) -> bool {
        let Some(window) = self.current.window() else {
            return false;
        };
        let reference = reference_instant(self.cfg.activity_clock, &window);
        self.recompute_at(reference)
    }
}
