use anyhow::{bail, Context, Result};
use cardio_lib::{
    activity::{validate_segments, ActivitySegment},
    comparison::reference_instant,
    config::{ActivityClock, AnalysisConfig},
    io::{
        record::{read_segments, write_record, HeartRatePoint, Record},
        samples::{read_stream, write_samples_csv},
    },
    monitor::{ComparisonSession, StreamAnalyzer},
    signal::Sample,
    simulate::{SimulatedTicker, SimulatorConfig},
};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "cardio",
    version,
    about = "Windowed ECG metrics and baseline comparison"
)]
struct Cli {
    /// TOML file overriding analysis constants
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Sampling rate used to timestamp bare value files [default: the
    /// config's `sampling_rate_hz`]
    #[arg(long, global = true)]
    fs: Option<f64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ClockArg {
    #[value(name = "wall-clock")]
    WallClock,
    #[value(name = "signal-time")]
    SignalTime,
}

impl From<ClockArg> for ActivityClock {
    fn from(arg: ClockArg) -> Self {
        match arg {
            ClockArg::WallClock => ActivityClock::WallClock,
            ClockArg::SignalTime => ActivityClock::SignalTime,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Metrics for the trailing window of a recorded stream
    Analyze {
        #[arg(long)]
        input: PathBuf,
    },
    /// Feed a stream in batches and print metrics after every recompute
    Replay {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value_t = 73)]
        batch_size: usize,
    },
    /// Compare the current stream against a baseline stream
    Compare {
        #[arg(long)]
        baseline: PathBuf,
        #[arg(long)]
        current: PathBuf,
        /// JSON list of {type,start,end} activity segments
        #[arg(long)]
        segments: Option<PathBuf>,
        /// Overrides `activity_clock` from the config
        #[arg(long)]
        clock: Option<ClockArg>,
        /// Explicit reference instant (ms) for the activity lookup
        #[arg(long)]
        at: Option<i64>,
    },
    /// Write a synthetic ECG stream as CSV
    Simulate {
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = 60.0)]
        bpm: f64,
        #[arg(long, default_value_t = 10.0)]
        jitter_bpm: f64,
        /// Seconds per tick
        #[arg(long, default_value_t = 5.0)]
        duration_s: f64,
        #[arg(long, default_value_t = 1)]
        ticks: usize,
        #[arg(long, default_value_t = 0.05)]
        noise_mv: f64,
        #[arg(long, default_value_t = 0.01)]
        artifact_probability: f64,
        #[arg(long, default_value_t = 0.05)]
        wander_mv: f64,
        #[arg(long, default_value_t = 0)]
        start_ms: i64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Bundle a stream and its segments into a storage record
    Record {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        segments: Option<PathBuf>,
        /// Recording start (RFC 3339); defaults to now
        #[arg(long)]
        datetime: Option<DateTime<Utc>>,
        /// Also derive one heart-rate point per window from the stream
        #[arg(long)]
        with_hr: bool,
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref())?;
    let fs = cli.fs.unwrap_or(cfg.sampling_rate_hz as f64);
    match cli.command {
        Commands::Analyze { input } => cmd_analyze(&cfg, &input, fs)?,
        Commands::Replay { input, batch_size } => cmd_replay(&cfg, &input, fs, batch_size)?,
        Commands::Compare {
            baseline,
            current,
            segments,
            clock,
            at,
        } => cmd_compare(
            &cfg,
            &baseline,
            &current,
            segments.as_deref(),
            clock.map(ActivityClock::from),
            at,
            fs,
        )?,
        Commands::Simulate {
            out,
            bpm,
            jitter_bpm,
            duration_s,
            ticks,
            noise_mv,
            artifact_probability,
            wander_mv,
            start_ms,
            seed,
        } => {
            let sim = SimulatorConfig {
                sampling_rate_hz: cfg.sampling_rate_hz as f64,
                duration_s,
                base_heart_rate_bpm: bpm,
                heart_rate_jitter_bpm: jitter_bpm,
                noise_mv,
                artifact_probability,
                wander_mv,
                ..SimulatorConfig::default()
            };
            cmd_simulate(&sim, &out, ticks, start_ms, seed)?
        }
        Commands::Record {
            user_id,
            input,
            segments,
            datetime,
            with_hr,
            out,
        } => cmd_record(
            &cfg,
            user_id,
            &input,
            segments.as_deref(),
            datetime,
            with_hr,
            &out,
            fs,
        )?,
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => AnalysisConfig::from_toml_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(AnalysisConfig::default()),
    }
}

fn load_segments(path: Option<&Path>) -> Result<Vec<ActivitySegment>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let segments = read_segments(path)?;
    if let Err(err) = validate_segments(&segments) {
        warn!("rejecting segments from {}: {}", path.display(), err);
        return Err(err).with_context(|| format!("validating {}", path.display()));
    }
    Ok(segments)
}

fn cmd_analyze(cfg: &AnalysisConfig, input: &Path, fs: f64) -> Result<()> {
    let samples = read_stream(input, fs)?;
    let mut analyzer = StreamAnalyzer::new(*cfg);
    if !analyzer.append(&samples) {
        warn!(
            "{} holds {} samples, fewer than one window ({}); reporting defaults",
            input.display(),
            samples.len(),
            cfg.window_size
        );
    }
    println!("{}", serde_json::to_string(analyzer.latest())?);
    Ok(())
}

fn cmd_replay(cfg: &AnalysisConfig, input: &Path, fs: f64, batch_size: usize) -> Result<()> {
    if batch_size == 0 {
        bail!("batch size must be positive");
    }
    let samples = read_stream(input, fs)?;
    let mut analyzer = StreamAnalyzer::new(*cfg);
    let mut published = 0usize;
    for batch in samples.chunks(batch_size) {
        if analyzer.append(batch) {
            published += 1;
            println!("{}", serde_json::to_string(analyzer.latest())?);
        }
    }
    info!(
        "replayed {} samples in batches of {}, {} recomputes",
        samples.len(),
        batch_size,
        published
    );
    Ok(())
}

fn cmd_compare(
    cfg: &AnalysisConfig,
    baseline: &Path,
    current: &Path,
    segments: Option<&Path>,
    clock: Option<ActivityClock>,
    at: Option<i64>,
    fs: f64,
) -> Result<()> {
    let segments = load_segments(segments)?;
    let baseline_samples = read_stream(baseline, fs)?;
    let current_samples = read_stream(current, fs)?;

    let mut session = ComparisonSession::new(*cfg);
    session.set_segments(segments);
    session.append_baseline(&baseline_samples);
    session.append_current(&current_samples);

    let Some(current_window) = session.current().window() else {
        warn!(
            "current stream holds {} samples, fewer than one window ({}); reporting defaults",
            current_samples.len(),
            cfg.window_size
        );
        println!("{}", serde_json::to_string(session.latest())?);
        return Ok(());
    };
    if !session.baseline().is_ready() {
        warn!(
            "baseline stream holds {} samples, fewer than one window ({}); reporting defaults",
            baseline_samples.len(),
            cfg.window_size
        );
    }

    let clock = clock.unwrap_or(cfg.activity_clock);
    let reference = at.unwrap_or_else(|| reference_instant(clock, &current_window));
    session.recompute_at(reference);
    println!("{}", serde_json::to_string(session.latest())?);
    Ok(())
}

fn cmd_simulate(
    sim: &SimulatorConfig,
    out: &Path,
    ticks: usize,
    start_ms: i64,
    seed: u64,
) -> Result<()> {
    let mut ticker = SimulatedTicker::new(*sim, start_ms, seed);
    let mut samples = Vec::new();
    for _ in 0..ticks.max(1) {
        let batch = ticker.tick();
        info!(
            "generated {} samples at {:.1} bpm",
            batch.samples.len(),
            batch.actual_heart_rate
        );
        samples.extend(batch.samples);
    }
    write_samples_csv(out, &samples)
}

#[allow(clippy::too_many_arguments)]
fn cmd_record(
    cfg: &AnalysisConfig,
    user_id: String,
    input: &Path,
    segments: Option<&Path>,
    datetime: Option<DateTime<Utc>>,
    with_hr: bool,
    out: &Path,
    fs: f64,
) -> Result<()> {
    let ecg = read_stream(input, fs)?;
    let mut record = Record::new(user_id, datetime.unwrap_or_else(Utc::now), ecg);
    record.activity_segments = load_segments(segments)?;
    if with_hr {
        record.hr = windowed_heart_rate(&record.ecg, cfg);
    }
    write_record(out, &record)
}

/// Heart rate of each consecutive, non-overlapping window, stamped at its end.
fn windowed_heart_rate(ecg: &[Sample], cfg: &AnalysisConfig) -> Vec<HeartRatePoint> {
    let mut analyzer = StreamAnalyzer::new(*cfg);
    let mut points = Vec::new();
    for chunk in ecg.chunks(cfg.window_size) {
        if analyzer.append(chunk) && analyzer.latest().heart_rate > 0.0 {
            if let Some(last) = chunk.last() {
                points.push(HeartRatePoint {
                    timestamp: last.timestamp,
                    value: analyzer.latest().heart_rate,
                });
            }
        }
    }
    points
}
