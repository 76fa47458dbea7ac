//! Synthetic P-QRS-T waveform used by simulation mode and tests.

use crate::signal::Sample;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub sampling_rate_hz: f64,
    /// Length of each generated batch (seconds).
    pub duration_s: f64,
    pub base_heart_rate_bpm: f64,
    /// Per-batch heart rate drawn uniformly from `base ± jitter`.
    pub heart_rate_jitter_bpm: f64,
    /// Peak-to-peak span of the uniform noise (mV).
    pub noise_mv: f64,
    /// Chance per sample of a motion artifact.
    pub artifact_probability: f64,
    /// Peak-to-peak span of an artifact (mV).
    pub artifact_mv: f64,
    /// Amplitude of the respiratory baseline wander (mV).
    pub wander_mv: f64,
    /// Angular frequency of the wander (rad/s).
    pub wander_rad_per_s: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            sampling_rate_hz: 130.0,
            duration_s: 5.0,
            base_heart_rate_bpm: 60.0,
            heart_rate_jitter_bpm: 10.0,
            noise_mv: 0.05,
            artifact_probability: 0.01,
            artifact_mv: 0.5,
            wander_mv: 0.05,
            wander_rad_per_s: 0.5,
        }
    }
}

/// One generated batch plus the heart rate it was drawn at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedBatch {
    pub samples: Vec<Sample>,
    pub actual_heart_rate: f64,
}

fn gaussian_bump(position: f64, center: f64, sharpness: f64, amplitude: f64) -> f64 {
    let x = (position - center) * sharpness;
    amplitude * (-x * x).exp()
}

/// Generate `duration_s` of signal starting at `start_ms`.
pub fn generate_ecg<R: Rng + ?Sized>(
    start_ms: i64,
    cfg: &SimulatorConfig,
    rng: &mut R,
) -> SimulatedBatch {
    let fs = cfg.sampling_rate_hz.max(1.0);
    let total = (cfg.duration_s * fs).round().max(0.0) as usize;

    let jitter = if cfg.heart_rate_jitter_bpm > 0.0 {
        rng.gen_range(-cfg.heart_rate_jitter_bpm..=cfg.heart_rate_jitter_bpm)
    } else {
        0.0
    };
    let actual_heart_rate = (cfg.base_heart_rate_bpm + jitter).max(1.0);
    let rr_ms = 60_000.0 / actual_heart_rate;
    let points_per_beat = ((rr_ms * fs / 1000.0).floor() as usize).max(1);

    let p_amp = 0.1 + rng.gen::<f64>() * 0.1;
    let qrs_amp = 1.0 + rng.gen::<f64>() * 0.5;
    let t_amp = 0.2 + rng.gen::<f64>() * 0.1;

    let mut samples = Vec::with_capacity(total);
    for i in 0..total {
        let t = i as f64 / fs;
        let pos = (i % points_per_beat) as f64 / points_per_beat as f64;

        let mut value = 0.0;
        if pos < 0.15 {
            value += gaussian_bump(pos, 0.05, 20.0, p_amp);
        }
        if (0.15..0.25).contains(&pos) {
            value += gaussian_bump(pos, 0.2, 50.0, qrs_amp);
        }
        if (0.25..0.45).contains(&pos) {
            value += gaussian_bump(pos, 0.35, 20.0, t_amp);
        }

        value += (rng.gen::<f64>() - 0.5) * cfg.noise_mv;
        if cfg.artifact_probability > 0.0 && rng.gen::<f64>() < cfg.artifact_probability {
            value += (rng.gen::<f64>() - 0.5) * cfg.artifact_mv;
        }
        value += (t * cfg.wander_rad_per_s).sin() * cfg.wander_mv;

        let timestamp = start_ms + (i as f64 * 1000.0 / fs).round() as i64;
        samples.push(Sample::new(timestamp, value));
    }

    SimulatedBatch {
        samples,
        actual_heart_rate,
    }
}

/// Emits contiguous batches, one per tick, like a connected sensor would.
pub struct SimulatedTicker {
    cfg: SimulatorConfig,
    rng: StdRng,
    next_start_ms: i64,
}

impl SimulatedTicker {
    pub fn new(cfg: SimulatorConfig, start_ms: i64, seed: u64) -> Self {
        Self {
            cfg,
            rng: StdRng::seed_from_u64(seed),
            next_start_ms: start_ms,
        }
    }

    pub fn tick(&mut self) -> SimulatedBatch {
        let batch = generate_ecg(self.next_start_ms, &self.cfg, &mut self.rng);
        let n = batch.samples.len() as f64;
        self.next_start_ms += (n * 1000.0 / self.cfg.sampling_rate_hz.max(1.0)).round() as i64;
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_length_follows_duration_and_rate() {
        let mut rng = StdRng::seed_from_u64(1);
        let batch = generate_ecg(0, &SimulatorConfig::default(), &mut rng);
        assert_eq!(batch.samples.len(), 650);
        assert!((50.0..=70.0).contains(&batch.actual_heart_rate));
    }

    #[test]
    fn timestamps_are_monotonic() {
        let mut rng = StdRng::seed_from_u64(2);
        let batch = generate_ecg(1000, &SimulatorConfig::default(), &mut rng);
        assert_eq!(batch.samples[0].timestamp, 1000);
        assert!(batch
            .samples
            .windows(2)
            .all(|w| w[1].timestamp >= w[0].timestamp));
    }

    #[test]
    fn same_seed_same_signal() {
        let cfg = SimulatorConfig::default();
        let a = generate_ecg(0, &cfg, &mut StdRng::seed_from_u64(9));
        let b = generate_ecg(0, &cfg, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn ticker_batches_are_contiguous() {
        let cfg = SimulatorConfig {
            duration_s: 1.0,
            ..SimulatorConfig::default()
        };
        let mut ticker = SimulatedTicker::new(cfg, 0, 3);
        let first = ticker.tick();
        let second = ticker.tick();
        assert_eq!(first.samples.len(), 130);
        assert_eq!(second.samples[0].timestamp, 1000);
        assert!(first.samples.last().unwrap().timestamp < second.samples[0].timestamp);
    }
}
